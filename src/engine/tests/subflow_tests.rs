//! Entering and exiting sub-flows

use super::helpers::*;
use crate::config::EngineConfig;
use crate::events::EventKind;
use crate::ids::ExitId;
use crate::runs::{RunStatus, SessionStatus};

const LOOPING_CHILD: &str = r#"{
    "uuid": "flow-child",
    "name": "Child",
    "spec_version": "14.3.0",
    "nodes": [
        {
            "uuid": "node-loop",
            "actions": [],
            "exits": [{"uuid": "exit-loop", "destination_uuid": "node-loop"}]
        }
    ]
}"#;

#[test]
fn test_enter_flow_suspends_in_child() {
    let h = harness(&[PARENT, CHILD_COLOR]);
    let (session, sprint) = h.start("flow-parent");

    assert_eq!(sprint.status, SessionStatus::Waiting);
    assert_eq!(
        event_types(&sprint.events),
        vec!["flow_entered", "msg_created", "msg_wait"]
    );

    assert_eq!(session.runs.len(), 2);
    let parent = &session.runs[0];
    let child = &session.runs[1];
    assert_eq!(parent.status, RunStatus::Active);
    assert_eq!(child.status, RunStatus::Waiting);
    assert_eq!(parent.child_uuid.as_ref(), Some(&child.uuid));
    assert_eq!(child.parent_uuid.as_ref(), Some(&parent.uuid));
    assert_eq!(session.waiting_run().unwrap().uuid, child.uuid);

    // the parent's step stays open until the child returns
    assert!(parent.path[0].is_open());
}

#[test]
fn test_child_completion_returns_to_parent() {
    let h = harness(&[PARENT, CHILD_COLOR]);
    let (mut session, _) = h.start("flow-parent");

    let sprint = h.resume(&mut session, vec![h.msg("red")]);

    assert_eq!(sprint.status, SessionStatus::Completed);
    assert_eq!(
        event_types(&sprint.events),
        vec!["run_result_changed", "flow_exited", "msg_created"]
    );
    assert_eq!(sent_texts(&sprint.events), vec!["Back with red"]);
    assert!(matches!(
        &sprint.events[1].kind,
        EventKind::FlowExited { status: RunStatus::Completed, .. }
    ));

    let parent = &session.runs[0];
    assert_eq!(parent.status, RunStatus::Completed);
    assert_eq!(session.runs[1].status, RunStatus::Completed);
    assert_eq!(parent.path[0].exit_uuid, Some(ExitId::new("exit-complete")));
    assert!(parent.results.is_empty());
    assert_eq!(session.runs[1].results["color"].value, "red");
}

#[test]
fn test_child_failure_fails_parent() {
    let config = EngineConfig {
        max_steps_per_sprint: 10,
        ..Default::default()
    };
    let h = harness_with_config(&[PARENT, LOOPING_CHILD], config);
    let (session, sprint) = h.start("flow-parent");

    assert_eq!(sprint.status, SessionStatus::Errored);
    assert_eq!(session.runs[0].status, RunStatus::Errored);
    assert_eq!(session.runs[1].status, RunStatus::Errored);

    let types = event_types(&sprint.events);
    assert_eq!(
        &types[types.len() - 3..],
        &["failure", "flow_exited", "failure"]
    );
}
