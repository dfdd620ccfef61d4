//! Routing through the engine

use super::helpers::*;
use crate::config::EngineConfig;
use crate::events::EventKind;
use crate::ids::{ExitId, NodeId};
use crate::party::{GroupRef, Party};
use crate::runs::{Run, SessionStatus};

fn exits_taken(run: &Run) -> Vec<String> {
    run.path
        .iter()
        .filter_map(|s| s.exit_uuid.as_ref().map(|e| e.to_string()))
        .collect()
}

fn one_node_switch(operand: &str, cases: &str, default: bool) -> String {
    let default = if default {
        r#", "default_category_uuid": "cat-other""#
    } else {
        ""
    };
    format!(
        r#"{{
        "uuid": "flow-switch",
        "name": "Switch",
        "spec_version": "14.3.0",
        "nodes": [
            {{
                "uuid": "node-switch",
                "actions": [],
                "router": {{
                    "type": "switch",
                    "operand": "{operand}",
                    "result_name": "Outcome",
                    "categories": [
                        {{"uuid": "cat-a", "name": "A", "exit_uuid": "exit-a"}},
                        {{"uuid": "cat-b", "name": "B", "exit_uuid": "exit-b"}},
                        {{"uuid": "cat-other", "name": "Other", "exit_uuid": "exit-other"}}
                    ],
                    "cases": {cases}{default}
                }},
                "exits": [{{"uuid": "exit-a"}}, {{"uuid": "exit-b"}}, {{"uuid": "exit-other"}}]
            }}
        ]
    }}"#
    )
}

/* ===================== Switch ===================== */

#[test]
fn test_switch_first_matching_case_wins() {
    let flow = one_node_switch(
        "@contact.name",
        r#"[
            {"uuid": "case-a", "type": "has_text", "category_uuid": "cat-a"},
            {"uuid": "case-b", "type": "has_beginning", "arguments": ["Ry"], "category_uuid": "cat-b"}
        ]"#,
        true,
    );
    let h = harness(&[&flow]);
    let (session, _) = h.start("flow-switch");

    let run = session.root().unwrap();
    assert_eq!(exits_taken(run), vec!["exit-a"]);
    assert_eq!(run.results["outcome"].value, "Ryan");
}

#[test]
fn test_switch_is_deterministic() {
    let flow = one_node_switch(
        "@contact.name",
        r#"[
            {"uuid": "case-a", "type": "has_number", "category_uuid": "cat-a"},
            {"uuid": "case-b", "type": "has_beginning", "arguments": ["Ry"], "category_uuid": "cat-b"}
        ]"#,
        true,
    );
    for _ in 0..3 {
        let h = harness(&[&flow]);
        let (session, _) = h.start("flow-switch");
        assert_eq!(exits_taken(session.root().unwrap()), vec!["exit-b"]);
    }
}

#[test]
fn test_switch_arguments_are_evaluated() {
    let flow = one_node_switch(
        "hello Ryan",
        r#"[
            {"uuid": "case-a", "type": "has_any_word", "arguments": ["@contact.name"], "category_uuid": "cat-a"}
        ]"#,
        true,
    );
    let h = harness(&[&flow]);
    let (session, _) = h.start("flow-switch");

    assert_eq!(exits_taken(session.root().unwrap()), vec!["exit-a"]);
}

#[test]
fn test_switch_group_case() {
    let flow = one_node_switch(
        "@contact",
        r#"[
            {"uuid": "case-a", "type": "has_group", "arguments": ["group-testers"], "category_uuid": "cat-a"}
        ]"#,
        true,
    );
    let h = harness(&[&flow]);

    let (outsider, _) = h.start("flow-switch");
    assert_eq!(exits_taken(outsider.root().unwrap()), vec!["exit-other"]);

    let mut party = Party::new("Ryan");
    party.add_group(GroupRef {
        uuid: "group-testers".to_string(),
        name: "Testers".to_string(),
    });
    let (member, _) = h.start_as("flow-switch", party);
    assert_eq!(exits_taken(member.root().unwrap()), vec!["exit-a"]);
}

#[test]
fn test_switch_pattern_groups_saved_as_extra() {
    let flow = one_node_switch(
        "order 1234",
        r#"[
            {"uuid": "case-a", "type": "has_pattern", "arguments": ["order (\\d+)"], "category_uuid": "cat-a"}
        ]"#,
        true,
    );
    let h = harness(&[&flow]);
    let (session, _) = h.start("flow-switch");

    let result = &session.root().unwrap().results["outcome"];
    assert_eq!(result.category.as_deref(), Some("A"));
    assert_eq!(result.value, "order 1234");
    assert!(result.extra.is_some());
}

#[test]
fn test_switch_without_match_or_default_logs_error() {
    let flow = one_node_switch(
        "nothing here",
        r#"[{"uuid": "case-a", "type": "has_number", "category_uuid": "cat-a"}]"#,
        false,
    );
    let h = harness(&[&flow]);
    let (session, sprint) = h.start("flow-switch");

    assert_eq!(sprint.status, SessionStatus::Completed);
    assert_eq!(event_types(&sprint.events), vec!["error"]);
    let step = &session.root().unwrap().path[0];
    assert_eq!(step.exit_uuid, None);
    assert!(!step.is_open());
}

#[test]
fn test_switch_unknown_test_logs_error() {
    let flow = one_node_switch(
        "anything",
        r#"[{"uuid": "case-a", "type": "has_magic", "category_uuid": "cat-a"}]"#,
        true,
    );
    let h = harness(&[&flow]);
    let (session, sprint) = h.start("flow-switch");

    assert!(matches!(
        &sprint.events[0].kind,
        EventKind::Error { text } if text.contains("has_magic")
    ));
    assert!(session.root().unwrap().results.is_empty());
}

#[test]
fn test_switch_broken_case_is_skipped() {
    // an invalid regex fails its case, the next case still gets a chance
    let flow = one_node_switch(
        "abc",
        r#"[
            {"uuid": "case-a", "type": "has_pattern", "arguments": ["("], "category_uuid": "cat-a"},
            {"uuid": "case-b", "type": "has_text", "category_uuid": "cat-b"}
        ]"#,
        true,
    );
    let h = harness(&[&flow]);
    let (session, sprint) = h.start("flow-switch");

    assert_eq!(event_types(&sprint.events), vec!["error", "run_result_changed"]);
    assert_eq!(exits_taken(session.root().unwrap()), vec!["exit-b"]);
}

/* ===================== Random ===================== */

const RANDOM: &str = r#"{
    "uuid": "flow-random",
    "name": "Random",
    "spec_version": "14.3.0",
    "nodes": [
        {
            "uuid": "node-split",
            "actions": [],
            "router": {
                "type": "random",
                "result_name": "Bucket",
                "categories": [
                    {"uuid": "cat-1", "name": "One", "exit_uuid": "exit-1"},
                    {"uuid": "cat-2", "name": "Two", "exit_uuid": "exit-2"},
                    {"uuid": "cat-3", "name": "Three", "exit_uuid": "exit-3"}
                ]
            },
            "exits": [{"uuid": "exit-1"}, {"uuid": "exit-2"}, {"uuid": "exit-3"}]
        }
    ]
}"#;

#[test]
fn test_random_picks_an_exit() {
    let h = harness(&[RANDOM]);
    let (session, _) = h.start("flow-random");

    let run = session.root().unwrap();
    let exit = &exits_taken(run)[0];
    assert!(["exit-1", "exit-2", "exit-3"].contains(&exit.as_str()));

    let result = &run.results["bucket"];
    let index: usize = result.value.parse().unwrap();
    assert_eq!(format!("exit-{}", index + 1), *exit);
}

#[test]
fn test_random_is_reproducible_with_seed() {
    let config = EngineConfig {
        random_seed: Some(7),
        ..Default::default()
    };
    let picks: Vec<Vec<String>> = (0..3)
        .map(|_| {
            let h = harness_with_config(&[RANDOM], config.clone());
            let (session, _) = h.start("flow-random");
            exits_taken(session.root().unwrap())
        })
        .collect();
    assert_eq!(picks[0], picks[1]);
    assert_eq!(picks[1], picks[2]);
}

/* ===================== First ===================== */

#[test]
fn test_first_router() {
    let h = harness(&[r#"{
        "uuid": "flow-first",
        "name": "First",
        "spec_version": "14.3.0",
        "nodes": [
            {
                "uuid": "node-first",
                "actions": [],
                "router": {"type": "first"},
                "exits": [{"uuid": "exit-1"}, {"uuid": "exit-2"}]
            }
        ]
    }"#]);
    let (session, _) = h.start("flow-first");
    assert_eq!(exits_taken(session.root().unwrap()), vec!["exit-1"]);
}

/* ===================== Random Once ===================== */

#[test]
fn test_random_once_exhausts_then_defaults() {
    let h = harness(&[RANDOM_ONCE]);
    let (mut session, sprint) = h.start("flow-random-once");
    assert_eq!(sprint.status, SessionStatus::Waiting);

    let run = session.root().unwrap();
    let taken = exits_taken(run);
    assert_eq!(taken.len(), 3);
    let mut first_two = taken[..2].to_vec();
    first_two.sort();
    assert_eq!(first_two, vec!["exit-1", "exit-2"]);
    assert_eq!(taken[2], "exit-3");
    assert_eq!(run.results["pick"].category.as_deref(), Some("Done"));
    assert_eq!(run.results["pick"].value, "Done");

    for _ in 0..3 {
        h.resume(&mut session, vec![h.msg("again")]);
        let run = session.root().unwrap();
        let last_pick = run
            .path
            .iter()
            .rev()
            .find(|s| s.node_uuid == NodeId::new("node-pick"))
            .unwrap();
        assert_eq!(last_pick.exit_uuid, Some(ExitId::new("exit-3")));
        assert_eq!(session.status(), SessionStatus::Waiting);
    }
}

#[test]
fn test_random_once_same_seed_same_order() {
    let first = {
        let h = harness(&[RANDOM_ONCE]);
        let (session, _) = h.start("flow-random-once");
        exits_taken(session.root().unwrap())
    };
    let second = {
        let h = harness(&[RANDOM_ONCE]);
        let (session, _) = h.start("flow-random-once");
        exits_taken(session.root().unwrap())
    };
    assert_eq!(first, second);
}
