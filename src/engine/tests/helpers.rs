//! Test helpers for engine tests
//!
//! Common flows plus a harness that loads them into an engine with a fixed
//! clock and a seeded random generator.

use crate::assets::{Field, Group, StaticAssets};
use crate::clock::{Clock, FixedClock};
use crate::config::EngineConfig;
use crate::definition::{Flow, FlowLoader, FlowRef, Registry};
use crate::engine::{Engine, Sprint};
use crate::events::{Event, EventKind};
use crate::party::{Msg, Party};
use crate::runs::Session;
use crate::triggers::Trigger;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::{Arc, Once};
use tracing_subscriber::EnvFilter;

/// Ask a question, route the answer, thank the party
pub const FAVORITES: &str = r#"{
    "uuid": "flow-favorites",
    "name": "Favorites",
    "spec_version": "14.3.0",
    "language": "eng",
    "type": "messaging",
    "localization": {
        "spa": {
            "act-ask": {"text": ["¿Te gustan los flujos?"]},
            "case-yes": {"arguments": ["si"]}
        }
    },
    "nodes": [
        {
            "uuid": "node-ask",
            "actions": [
                {"type": "send_msg", "uuid": "act-ask", "text": "Do you like flows, @contact.name?", "quick_replies": ["yes", "no"]}
            ],
            "wait": {"type": "msg"},
            "router": {
                "type": "switch",
                "operand": "@input.text",
                "result_name": "Answer",
                "categories": [
                    {"uuid": "cat-yes", "name": "Yes", "exit_uuid": "exit-yes"},
                    {"uuid": "cat-other", "name": "Other", "exit_uuid": "exit-other"}
                ],
                "cases": [
                    {"uuid": "case-yes", "type": "has_any_word", "arguments": ["yes"], "category_uuid": "cat-yes"}
                ],
                "default_category_uuid": "cat-other"
            },
            "exits": [
                {"uuid": "exit-yes", "destination_uuid": "node-thanks"},
                {"uuid": "exit-other", "destination_uuid": "node-thanks"}
            ]
        },
        {
            "uuid": "node-thanks",
            "actions": [
                {"type": "send_msg", "uuid": "act-thanks", "text": "You said @results.answer"}
            ],
            "exits": []
        }
    ]
}"#;

/// A message wait that gives up after a minute
pub const TIMEOUT: &str = r#"{
    "uuid": "flow-timeout",
    "name": "Timeout",
    "spec_version": "14.3.0",
    "nodes": [
        {
            "uuid": "node-ask",
            "actions": [],
            "wait": {"type": "msg", "timeout": {"seconds": 60, "category_uuid": "cat-timeout"}},
            "router": {
                "type": "switch",
                "operand": "@input.text",
                "result_name": "Reply",
                "categories": [
                    {"uuid": "cat-any", "name": "Any", "exit_uuid": "exit-any"},
                    {"uuid": "cat-timeout", "name": "Timeout", "exit_uuid": "exit-timeout"}
                ],
                "cases": [
                    {"uuid": "case-any", "type": "has_text", "category_uuid": "cat-any"}
                ]
            },
            "exits": [
                {"uuid": "exit-any"},
                {"uuid": "exit-timeout", "destination_uuid": "node-late"}
            ]
        },
        {
            "uuid": "node-late",
            "actions": [{"type": "send_msg", "uuid": "act-late", "text": "Too slow"}],
            "exits": []
        }
    ]
}"#;

/// Loops through a random_once node; the default exit parks on a message wait
pub const RANDOM_ONCE: &str = r#"{
    "uuid": "flow-random-once",
    "name": "Random Once",
    "spec_version": "14.3.0",
    "nodes": [
        {
            "uuid": "node-pick",
            "actions": [],
            "router": {
                "type": "random_once",
                "result_name": "Pick",
                "categories": [
                    {"uuid": "cat-1", "name": "One", "exit_uuid": "exit-1"},
                    {"uuid": "cat-2", "name": "Two", "exit_uuid": "exit-2"},
                    {"uuid": "cat-3", "name": "Done", "exit_uuid": "exit-3"}
                ],
                "default_category_uuid": "cat-3"
            },
            "exits": [
                {"uuid": "exit-1", "destination_uuid": "node-pick"},
                {"uuid": "exit-2", "destination_uuid": "node-pick"},
                {"uuid": "exit-3", "destination_uuid": "node-park"}
            ]
        },
        {
            "uuid": "node-park",
            "actions": [],
            "wait": {"type": "msg"},
            "exits": [{"uuid": "exit-park", "destination_uuid": "node-pick"}]
        }
    ]
}"#;

/// Enters CHILD_COLOR and routes on how it ended
pub const PARENT: &str = r#"{
    "uuid": "flow-parent",
    "name": "Parent",
    "spec_version": "14.3.0",
    "nodes": [
        {
            "uuid": "node-enter",
            "actions": [
                {"type": "enter_flow", "uuid": "act-enter", "flow": {"uuid": "flow-child", "name": "Child"}}
            ],
            "router": {
                "type": "switch",
                "operand": "@child.status",
                "categories": [
                    {"uuid": "cat-complete", "name": "Complete", "exit_uuid": "exit-complete"},
                    {"uuid": "cat-incomplete", "name": "Incomplete", "exit_uuid": "exit-incomplete"}
                ],
                "cases": [
                    {"uuid": "case-complete", "type": "has_only_text", "arguments": ["completed"], "category_uuid": "cat-complete"}
                ],
                "default_category_uuid": "cat-incomplete"
            },
            "exits": [
                {"uuid": "exit-complete", "destination_uuid": "node-after"},
                {"uuid": "exit-incomplete"}
            ]
        },
        {
            "uuid": "node-after",
            "actions": [
                {"type": "send_msg", "uuid": "act-after", "text": "Back with @child.results.color"}
            ],
            "exits": []
        }
    ]
}"#;

pub const CHILD_COLOR: &str = r#"{
    "uuid": "flow-child",
    "name": "Child",
    "spec_version": "14.3.0",
    "nodes": [
        {
            "uuid": "node-color",
            "actions": [{"type": "send_msg", "uuid": "act-color", "text": "Favorite color?"}],
            "wait": {"type": "msg"},
            "router": {
                "type": "switch",
                "operand": "@input.text",
                "result_name": "Color",
                "categories": [{"uuid": "cat-color", "name": "Color", "exit_uuid": "exit-color"}],
                "cases": [{"uuid": "case-color", "type": "has_text", "category_uuid": "cat-color"}]
            },
            "exits": [{"uuid": "exit-color"}]
        }
    ]
}"#;

static TRACING: Once = Once::new();

/// Send engine logs to the test output, filtered by `RUST_LOG`
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap()
}

pub fn registry() -> Arc<Registry> {
    Arc::new(Registry::with_builtins())
}

/// Load a flow, panicking if it doesn't validate
pub fn load_flow(json: &str) -> Flow {
    FlowLoader::new(registry())
        .load_str(json)
        .expect("flow should load")
}

pub struct Harness {
    pub engine: Engine,
    pub clock: Arc<FixedClock>,
}

pub fn harness(flows: &[&str]) -> Harness {
    harness_with_config(flows, EngineConfig::default())
}

pub fn harness_with_config(flows: &[&str], mut config: EngineConfig) -> Harness {
    init_tracing();
    config.random_seed = config.random_seed.or(Some(42));

    let mut assets = StaticAssets::new()
        .with_group(Group {
            uuid: "group-testers".to_string(),
            name: "Testers".to_string(),
        })
        .with_field(Field {
            key: "nickname".to_string(),
            name: "Nickname".to_string(),
            value_type: "text".to_string(),
        });
    for json in flows {
        assets = assets.with_flow(load_flow(json));
    }

    let clock = Arc::new(FixedClock::new(start_time()));
    let engine = Engine::builder()
        .registry(registry())
        .assets(Arc::new(assets))
        .clock(clock.clone())
        .config(config)
        .build();

    Harness { engine, clock }
}

impl Harness {
    pub fn party(&self) -> Party {
        Party::new("Ryan")
    }

    pub fn start(&self, flow_uuid: &str) -> (Session, Sprint) {
        self.start_as(flow_uuid, self.party())
    }

    pub fn start_as(&self, flow_uuid: &str, party: Party) -> (Session, Sprint) {
        let trigger = Trigger::manual(FlowRef::new(flow_uuid, ""), party, self.clock.now());
        self.engine.start(trigger).expect("start should succeed")
    }

    pub fn start_with_msg(&self, flow_uuid: &str, text: &str) -> (Session, Sprint) {
        let trigger = Trigger::msg(
            FlowRef::new(flow_uuid, ""),
            self.party(),
            Msg::new(text),
            self.clock.now(),
        );
        self.engine.start(trigger).expect("start should succeed")
    }

    pub fn msg(&self, text: &str) -> Event {
        Event::msg_received(Msg::new(text), self.clock.now())
    }

    pub fn resume(&self, session: &mut Session, events: Vec<Event>) -> Sprint {
        self.engine
            .resume(session, events)
            .expect("resume should succeed")
    }
}

/// Wire names of a list of events
pub fn event_types(events: &[Event]) -> Vec<&'static str> {
    events.iter().map(Event::type_name).collect()
}

/// Texts of the messages sent in a sprint
pub fn sent_texts(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match &e.kind {
            EventKind::MsgCreated { msg } => Some(msg.text.clone()),
            _ => None,
        })
        .collect()
}
