//! Evaluation context
//!
//! Builds the JSON object templates are evaluated against. Roots:
//! `contact`, `fields`, `input`, `results`, `run`, `child`, `parent`,
//! `trigger` and `node`. Objects carry a `__default__` rendering so that
//! `@contact` or `@results.color` read naturally in text.

use super::DEFAULT_KEY;
use crate::ids::NodeId;
use crate::party::Party;
use crate::runs::{Run, RunResult, Session};
use crate::triggers::TriggerKind;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

pub fn build(session: &Session, run: &Run, node: &NodeId) -> Value {
    let related = |other: Option<&Run>| other.map(run_summary).unwrap_or(Value::Null);

    json!({
        "contact": contact(&session.party),
        "fields": fields(&session.party.fields),
        "input": input(session),
        "results": results(&run.results),
        "run": run_summary(run),
        "child": related(session.child_of(run)),
        "parent": related(session.parent_of(run)),
        "trigger": trigger(session),
        "node": {
            "uuid": node.as_str(),
            "visit_count": run.visit_count(node),
        },
    })
}

fn contact(party: &Party) -> Value {
    let groups: Vec<Value> = party
        .groups
        .iter()
        .map(|g| json!({"uuid": g.uuid, "name": g.name, DEFAULT_KEY: g.name}))
        .collect();

    json!({
        "uuid": party.uuid.as_str(),
        "name": party.name,
        "language": party.language,
        "fields": fields(&party.fields),
        "groups": groups,
        DEFAULT_KEY: party.name,
    })
}

fn fields(fields: &BTreeMap<String, String>) -> Value {
    let map: Map<String, Value> = fields
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();
    Value::Object(map)
}

fn input(session: &Session) -> Value {
    match &session.input {
        Some(msg) => json!({
            "uuid": msg.uuid.as_str(),
            "text": msg.text,
            "attachments": msg.attachments,
            DEFAULT_KEY: msg.text,
        }),
        None => json!({"text": "", "attachments": [], DEFAULT_KEY: ""}),
    }
}

fn results(results: &BTreeMap<String, RunResult>) -> Value {
    let map: Map<String, Value> = results
        .iter()
        .map(|(key, result)| {
            let value = json!({
                "name": result.name,
                "value": result.value,
                "category": result.category,
                "node_uuid": result.node_uuid.as_str(),
                "input": result.input,
                "extra": result.extra,
                "created_on": result.created_on.to_rfc3339(),
                DEFAULT_KEY: result.value,
            });
            (key.clone(), value)
        })
        .collect();
    Value::Object(map)
}

fn run_summary(run: &Run) -> Value {
    json!({
        "uuid": run.uuid.as_str(),
        "status": run.status.to_string(),
        "flow": {
            "uuid": run.flow.uuid.as_str(),
            "name": run.flow.name,
            "revision": run.flow.revision,
            DEFAULT_KEY: run.flow.name,
        },
        "results": results(&run.results),
        "created_on": run.created_on.to_rfc3339(),
        DEFAULT_KEY: run.status.to_string(),
    })
}

fn trigger(session: &Session) -> Value {
    let trigger = &session.trigger;
    match &trigger.kind {
        TriggerKind::Manual { params } => json!({
            "type": trigger.type_name(),
            "params": params,
        }),
        TriggerKind::Msg { msg } => json!({
            "type": trigger.type_name(),
            "params": {},
            "msg": {"uuid": msg.uuid.as_str(), "text": msg.text, DEFAULT_KEY: msg.text},
        }),
    }
}
