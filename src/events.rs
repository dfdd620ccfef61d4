//! Events
//!
//! The engine talks to its caller only through events. The boundary
//! vocabulary is small: `msg_received` comes in, wait events
//! (`msg_wait`, `time_wait`), `flow_entered`, `flow_exited` and `error` go
//! out. Everything else is emitted by actions and routers as opaque domain
//! data attached to the current step.

use crate::definition::FlowRef;
use crate::ids::{RunId, StepId};
use crate::party::{GroupRef, Msg};
use crate::runs::RunStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub created_on: DateTime<Utc>,

    /// Step the event was recorded on, set when it is attached to a run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_uuid: Option<StepId>,

    #[serde(flatten)]
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /* ===================== Boundary ===================== */
    MsgReceived {
        msg: Msg,
    },
    MsgWait {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeout_on: Option<DateTime<Utc>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expires_on: Option<DateTime<Utc>>,
    },
    TimeWait {
        resume_on: DateTime<Utc>,
    },
    /// Marker left by a wait that never suspends
    WaitSkipped,
    /// Substituted for the missing message when a message wait times out
    WaitTimedOut,
    FlowEntered {
        flow: FlowRef,
        run_uuid: RunId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent_run_uuid: Option<RunId>,
    },
    FlowExited {
        flow: FlowRef,
        run_uuid: RunId,
        status: RunStatus,
    },
    /// A recoverable problem, execution continued
    Error {
        text: String,
    },
    /// A problem that ended the run
    Failure {
        text: String,
    },

    /* ===================== Domain ===================== */
    MsgCreated {
        msg: Msg,
    },
    RunResultChanged {
        name: String,
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        category: Option<String>,
    },
    ContactFieldChanged {
        field: String,
        value: String,
    },
    ContactGroupsChanged {
        groups_added: Vec<GroupRef>,
    },
}

impl Event {
    pub fn new(kind: EventKind, created_on: DateTime<Utc>) -> Self {
        Self {
            created_on,
            step_uuid: None,
            kind,
        }
    }

    pub fn msg_received(msg: Msg, created_on: DateTime<Utc>) -> Self {
        Self::new(EventKind::MsgReceived { msg }, created_on)
    }

    pub fn error(text: impl Into<String>, created_on: DateTime<Utc>) -> Self {
        Self::new(EventKind::Error { text: text.into() }, created_on)
    }

    pub fn failure(text: impl Into<String>, created_on: DateTime<Utc>) -> Self {
        Self::new(EventKind::Failure { text: text.into() }, created_on)
    }

    /// The wire name of this event's type
    pub fn type_name(&self) -> &'static str {
        match &self.kind {
            EventKind::MsgReceived { .. } => "msg_received",
            EventKind::MsgWait { .. } => "msg_wait",
            EventKind::TimeWait { .. } => "time_wait",
            EventKind::WaitSkipped => "wait_skipped",
            EventKind::WaitTimedOut => "wait_timed_out",
            EventKind::FlowEntered { .. } => "flow_entered",
            EventKind::FlowExited { .. } => "flow_exited",
            EventKind::Error { .. } => "error",
            EventKind::Failure { .. } => "failure",
            EventKind::MsgCreated { .. } => "msg_created",
            EventKind::RunResultChanged { .. } => "run_result_changed",
            EventKind::ContactFieldChanged { .. } => "contact_field_changed",
            EventKind::ContactGroupsChanged { .. } => "contact_groups_changed",
        }
    }

    /// Whether this event records the start of a wait
    pub fn is_wait(&self) -> bool {
        matches!(
            self.kind,
            EventKind::MsgWait { .. } | EventKind::TimeWait { .. }
        )
    }

    pub fn received_msg(&self) -> Option<&Msg> {
        match &self.kind {
            EventKind::MsgReceived { msg } => Some(msg),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_event_wire_format() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let event = Event::error("bad expression", now);

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["text"], "bad expression");
        assert!(json.get("step_uuid").is_none());

        let back: Event = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_caller_msg_event_parses() {
        let json = r#"{
            "type": "msg_received",
            "created_on": "2024-03-01T12:00:00Z",
            "msg": {"uuid": "7d1b8c5e-0000-4000-8000-000000000001", "text": "yes"}
        }"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.type_name(), "msg_received");
        assert_eq!(event.received_msg().map(|m| m.text.as_str()), Some("yes"));
    }
}
