use super::*;
use crate::definition::{FlowLoader, Registry};
use serde_json::{json, Value};
use std::sync::Arc;

/// Decode without validating so rules can be run one at a time
fn decode(definition: Value) -> Flow {
    FlowLoader::new(Arc::new(Registry::with_builtins()))
        .decode(&definition)
        .expect("definition should decode")
}

fn flow_with_nodes(nodes: Value) -> Flow {
    decode(json!({"uuid": "flow-1", "spec_version": "14.3.0", "nodes": nodes}))
}

fn run_rule(rule: &dyn ValidationRule, flow: &Flow) -> Vec<ValidationError> {
    rule.validate(flow)
}

#[test]
fn test_validator_lists_rules() {
    let ids: Vec<_> = Validator::new().rules().map(|(id, _)| id).collect();
    assert_eq!(
        ids,
        vec![
            "duplicate-id",
            "dangling-exit",
            "exit-count",
            "router-exits",
            "unreachable-node"
        ]
    );
}

#[test]
fn test_valid_flow_has_no_findings() {
    let flow = flow_with_nodes(json!([
        {"uuid": "node-1", "exits": [{"uuid": "exit-1", "destination_uuid": "node-2"}]},
        {"uuid": "node-2", "exits": []}
    ]));
    assert!(Validator::new().validate(&flow).is_empty());
}

#[test]
fn test_duplicate_action_ids() {
    let flow = flow_with_nodes(json!([
        {
            "uuid": "node-1",
            "actions": [
                {"type": "send_msg", "uuid": "act-1", "text": "one"},
                {"type": "send_msg", "uuid": "act-1", "text": "two"}
            ],
            "exits": []
        }
    ]));

    let errors = run_rule(&rules::DuplicateIdsRule, &flow);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("act-1"));
    assert!(errors[0].is_error());
}

#[test]
fn test_dangling_exit_names_node() {
    let flow = flow_with_nodes(json!([
        {"uuid": "node-1", "exits": [{"uuid": "exit-1", "destination_uuid": "node-gone"}]}
    ]));

    let errors = run_rule(&rules::DanglingExitRule, &flow);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].node_uuid, Some(NodeId::new("node-1")));
    assert!(errors[0].message.contains("node-gone"));
}

#[test]
fn test_exit_count() {
    let flow = flow_with_nodes(json!([
        {"uuid": "node-1", "router": {"type": "random"}, "exits": []},
        {"uuid": "node-2", "exits": [{"uuid": "exit-a"}, {"uuid": "exit-b"}]},
        {"uuid": "node-3", "router": {"type": "random"}, "exits": [{"uuid": "exit-c"}, {"uuid": "exit-d"}]},
        {"uuid": "node-4", "exits": []}
    ]));

    let errors = run_rule(&rules::ExitCountRule, &flow);
    let nodes: Vec<_> = errors.iter().filter_map(|e| e.node_uuid.clone()).collect();
    assert_eq!(nodes, vec![NodeId::new("node-1"), NodeId::new("node-2")]);
}

#[test]
fn test_random_once_default_must_exist() {
    let flow = flow_with_nodes(json!([
        {
            "uuid": "node-1",
            "router": {
                "type": "random_once",
                "categories": [{"uuid": "cat-1", "name": "One", "exit_uuid": "exit-1"}],
                "default_category_uuid": "cat-missing"
            },
            "exits": [{"uuid": "exit-1"}]
        }
    ]));

    let errors = run_rule(&rules::RouterExitsRule, &flow);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("cat-missing"));
}

#[test]
fn test_duplicate_category_ids() {
    let flow = flow_with_nodes(json!([
        {
            "uuid": "node-1",
            "router": {
                "type": "random",
                "categories": [
                    {"uuid": "cat-1", "name": "One", "exit_uuid": "exit-1"},
                    {"uuid": "cat-1", "name": "Two", "exit_uuid": "exit-2"}
                ]
            },
            "exits": [{"uuid": "exit-1"}, {"uuid": "exit-2"}]
        }
    ]));

    let errors = run_rule(&rules::RouterExitsRule, &flow);
    assert_eq!(errors.len(), 1);
}

#[test]
fn test_timeout_without_router() {
    let flow = flow_with_nodes(json!([
        {
            "uuid": "node-1",
            "wait": {"type": "msg", "timeout": {"seconds": 10, "category_uuid": "cat-timeout"}},
            "exits": [{"uuid": "exit-1"}]
        }
    ]));

    let errors = run_rule(&rules::RouterExitsRule, &flow);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("cat-timeout"));
}

#[test]
fn test_unreachable_node_warning() {
    let flow = flow_with_nodes(json!([
        {"uuid": "node-1", "exits": []},
        {"uuid": "node-2", "exits": []}
    ]));

    let findings = Validator::new().validate(&flow);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].severity, Severity::Warning);
    assert_eq!(findings[0].rule_id, "unreachable-node");
    assert_eq!(findings[0].node_uuid, Some(NodeId::new("node-2")));
    assert_eq!(
        findings[0].to_string(),
        "warning on node node-2: no exit leads to this node [unreachable-node]"
    );
}

#[test]
fn test_self_loop_counts_as_reachable() {
    let flow = flow_with_nodes(json!([
        {"uuid": "node-1", "exits": []},
        {"uuid": "node-2", "exits": [{"uuid": "exit-2", "destination_uuid": "node-2"}]}
    ]));

    // only reachable from itself, still not flagged
    assert!(run_rule(&rules::UnreachableNodeRule, &flow).is_empty());
}
