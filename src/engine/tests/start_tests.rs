//! Starting sessions

use super::helpers::*;
use crate::engine::Engine;
use crate::errors::EngineError;
use crate::events::EventKind;
use crate::ids::{ExitId, NodeId};
use crate::party::Party;
use crate::runs::{RunStatus, SessionStatus};
use crate::triggers::Trigger;
use crate::definition::FlowRef;
use maplit::btreemap;

#[test]
fn test_start_suspends_on_msg_wait() {
    let h = harness(&[FAVORITES]);
    let (session, sprint) = h.start("flow-favorites");

    assert_eq!(sprint.status, SessionStatus::Waiting);
    assert_eq!(session.status(), SessionStatus::Waiting);
    assert_eq!(event_types(&sprint.events), vec!["msg_created", "msg_wait"]);
    assert_eq!(sent_texts(&sprint.events), vec!["Do you like flows, Ryan?"]);

    let run = session.root().unwrap();
    assert_eq!(run.status, RunStatus::Waiting);
    assert_eq!(run.path.len(), 1);
    assert_eq!(run.path[0].node_uuid, NodeId::new("node-ask"));
    assert!(run.path[0].is_open());
}

#[test]
fn test_sprint_events_are_stamped_with_step() {
    let h = harness(&[FAVORITES]);
    let (session, sprint) = h.start("flow-favorites");

    let step = &session.root().unwrap().path[0];
    for event in &sprint.events {
        assert_eq!(event.step_uuid.as_ref(), Some(&step.uuid));
    }
    assert_eq!(step.events, sprint.events);
}

#[test]
fn test_msg_trigger_answers_first_wait() {
    let h = harness(&[FAVORITES]);
    let (session, sprint) = h.start_with_msg("flow-favorites", "yes please");

    assert_eq!(sprint.status, SessionStatus::Completed);
    assert_eq!(
        event_types(&sprint.events),
        vec!["msg_created", "run_result_changed", "msg_created"]
    );
    assert_eq!(sent_texts(&sprint.events)[1], "You said yes");

    let run = session.root().unwrap();
    assert_eq!(run.path[0].exit_uuid, Some(ExitId::new("exit-yes")));
    assert_eq!(run.wait_count(), 0);
}

#[test]
fn test_localized_action_text() {
    let h = harness(&[FAVORITES]);
    let (_, sprint) = h.start_as("flow-favorites", Party::new("Ana").with_language("spa"));

    assert_eq!(sent_texts(&sprint.events), vec!["¿Te gustan los flujos?"]);
}

#[test]
fn test_localized_case_arguments() {
    let h = harness(&[FAVORITES]);
    let (mut session, _) = h.start_as("flow-favorites", Party::new("Ana").with_language("spa"));
    h.resume(&mut session, vec![h.msg("si")]);

    let result = &session.root().unwrap().results["answer"];
    assert_eq!(result.category.as_deref(), Some("Yes"));
    assert_eq!(result.value, "si");
}

#[test]
fn test_start_missing_flow() {
    let h = harness(&[FAVORITES]);
    let trigger = Trigger::manual(FlowRef::new("flow-nope", "Nope"), Party::new("Ryan"), start_time());

    let err = h.engine.start(trigger).unwrap_err();
    assert!(matches!(err, EngineError::MissingDependency(id) if id.as_str() == "flow-nope"));
}

#[test]
fn test_start_missing_sub_flow() {
    // parent is loaded but its child isn't
    let h = harness(&[PARENT]);
    let trigger = Trigger::manual(FlowRef::new("flow-parent", "Parent"), Party::new("Ryan"), start_time());

    let err = h.engine.start(trigger).unwrap_err();
    assert!(matches!(err, EngineError::MissingDependency(id) if id.as_str() == "flow-child"));
}

#[test]
fn test_flow_without_nodes_completes() {
    let h = harness(&[r#"{"uuid": "flow-empty", "name": "Empty", "spec_version": "14.3.0", "nodes": []}"#]);
    let (session, sprint) = h.start("flow-empty");

    assert_eq!(sprint.status, SessionStatus::Completed);
    assert!(sprint.events.is_empty());
    assert!(session.root().unwrap().path.is_empty());
}

#[test]
fn test_evaluation_error_is_logged_and_walk_continues() {
    let h = harness(&[r#"{
        "uuid": "flow-broken",
        "name": "Broken",
        "spec_version": "14.3.0",
        "nodes": [
            {
                "uuid": "node-1",
                "actions": [
                    {"type": "send_msg", "uuid": "act-1", "text": "Hi @results.missing"},
                    {"type": "send_msg", "uuid": "act-2", "text": "Still here"}
                ],
                "exits": []
            }
        ]
    }"#]);
    let (session, sprint) = h.start("flow-broken");

    assert_eq!(sprint.status, SessionStatus::Completed);
    assert!(event_types(&sprint.events).contains(&"error"));
    assert_eq!(sent_texts(&sprint.events), vec!["Still here"]);
    assert_eq!(session.root().unwrap().status, RunStatus::Completed);
}

#[test]
fn test_contact_actions() {
    let h = harness(&[r#"{
        "uuid": "flow-contact",
        "name": "Contact",
        "spec_version": "14.3.0",
        "nodes": [
            {
                "uuid": "node-1",
                "actions": [
                    {"type": "set_contact_field", "uuid": "act-field", "field": {"key": "nickname", "name": "Nickname"}, "value": "Ry @contact.name"},
                    {"type": "add_contact_groups", "uuid": "act-groups", "groups": [{"uuid": "group-testers", "name": "Testers"}]},
                    {"type": "send_msg", "uuid": "act-msg", "text": "Hi @fields.nickname"}
                ],
                "exits": []
            }
        ]
    }"#]);
    let (session, sprint) = h.start("flow-contact");

    assert_eq!(
        event_types(&sprint.events),
        vec!["contact_field_changed", "contact_groups_changed", "msg_created"]
    );
    assert_eq!(sent_texts(&sprint.events), vec!["Hi Ry Ryan"]);
    assert_eq!(session.party.fields["nickname"], "Ry Ryan");
    assert!(session.party.in_group("group-testers"));
}

#[test]
fn test_set_run_result_action() {
    let h = harness(&[r#"{
        "uuid": "flow-result",
        "name": "Result",
        "spec_version": "14.3.0",
        "nodes": [
            {
                "uuid": "node-1",
                "actions": [
                    {"type": "set_run_result", "uuid": "act-1", "name": "Favorite Color", "value": "blue", "category": "Blue"},
                    {"type": "send_msg", "uuid": "act-2", "text": "@results.favorite_color.category"}
                ],
                "exits": []
            }
        ]
    }"#]);
    let (session, sprint) = h.start("flow-result");

    let result = &session.root().unwrap().results["favorite_color"];
    assert_eq!(result.name, "Favorite Color");
    assert_eq!(result.value, "blue");
    assert_eq!(sent_texts(&sprint.events), vec!["Blue"]);
    assert!(matches!(
        &sprint.events[0].kind,
        EventKind::RunResultChanged { name, .. } if name == "Favorite Color"
    ));
}

#[test]
fn test_default_engine_has_no_flows() {
    let engine = Engine::builder().build();
    let trigger = Trigger::manual(FlowRef::new("flow-favorites", ""), Party::new("Ryan"), start_time());
    assert!(engine.start(trigger).is_err());
}

#[test]
fn test_party_fields_in_templates() {
    let h = harness(&[r#"{
        "uuid": "flow-fields",
        "name": "Fields",
        "spec_version": "14.3.0",
        "nodes": [
            {
                "uuid": "node-1",
                "actions": [{"type": "send_msg", "uuid": "act-1", "text": "Hey @fields.nickname from @contact.fields.city"}],
                "exits": []
            }
        ]
    }"#]);
    let mut party = Party::new("Ryan");
    party.fields = btreemap! {
        "nickname".to_string() => "Ry".to_string(),
        "city".to_string() => "Kigali".to_string(),
    };
    let (_, sprint) = h.start_as("flow-fields", party);

    assert_eq!(sent_texts(&sprint.events), vec!["Hey Ry from Kigali"]);
}
