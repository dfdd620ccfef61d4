use super::{Resumption, Wait};
use crate::definition::tagged;
use crate::engine::RunScope;
use crate::events::{Event, EventKind};
use crate::ids::CategoryId;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgTimeout {
    pub seconds: u32,
    pub category_uuid: CategoryId,
}

/// Waits for an inbound message, optionally giving up after a timeout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MsgWait {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<MsgTimeout>,
}

impl MsgWait {
    pub const KIND: &'static str = "msg";
}

impl Wait for MsgWait {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn begin(&self, scope: &mut RunScope<'_>) -> bool {
        let now = scope.now();
        let timeout_on = self
            .timeout
            .as_ref()
            .map(|t| now + Duration::seconds(i64::from(t.seconds)));
        let expires_on = now + Duration::minutes(i64::from(scope.flow().expire_after_minutes));

        scope.log(EventKind::MsgWait {
            timeout_on,
            expires_on: Some(expires_on),
        });
        true
    }

    fn resumption(
        &self,
        wait_event: Option<&Event>,
        caller_events: &[Event],
        now: DateTime<Utc>,
    ) -> Resumption {
        if caller_events.iter().any(|e| e.received_msg().is_some()) {
            return Resumption::Accepted { timed_out: false };
        }

        let timeout_on = wait_event.and_then(|e| match &e.kind {
            EventKind::MsgWait { timeout_on, .. } => *timeout_on,
            _ => None,
        });
        match timeout_on {
            Some(deadline) if now >= deadline => Resumption::Accepted { timed_out: true },
            _ => Resumption::Rejected,
        }
    }

    fn timeout_category(&self) -> Option<&CategoryId> {
        self.timeout.as_ref().map(|t| &t.category_uuid)
    }

    fn to_json(&self) -> Value {
        tagged(Self::KIND, self)
    }
}
