//! Triggers start sessions

use crate::definition::FlowRef;
use crate::party::{Msg, Party};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    #[serde(flatten)]
    pub kind: TriggerKind,
    pub flow: FlowRef,
    pub party: Party,
    pub triggered_on: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TriggerKind {
    /// Started explicitly by the caller, with optional parameters
    Manual {
        #[serde(default)]
        params: serde_json::Value,
    },
    /// Started by an inbound message, which becomes the run's first input
    Msg { msg: Msg },
}

impl Trigger {
    pub fn manual(flow: FlowRef, party: Party, triggered_on: DateTime<Utc>) -> Self {
        Self {
            kind: TriggerKind::Manual {
                params: serde_json::Value::Null,
            },
            flow,
            party,
            triggered_on,
        }
    }

    pub fn msg(flow: FlowRef, party: Party, msg: Msg, triggered_on: DateTime<Utc>) -> Self {
        Self {
            kind: TriggerKind::Msg { msg },
            flow,
            party,
            triggered_on,
        }
    }

    pub fn msg_payload(&self) -> Option<&Msg> {
        match &self.kind {
            TriggerKind::Msg { msg } => Some(msg),
            TriggerKind::Manual { .. } => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self.kind {
            TriggerKind::Manual { .. } => "manual",
            TriggerKind::Msg { .. } => "msg",
        }
    }
}
