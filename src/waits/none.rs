use super::{Resumption, Wait};
use crate::definition::tagged;
use crate::engine::RunScope;
use crate::events::{Event, EventKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Records that the node was a wait point without ever suspending
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoWait {}

impl NoWait {
    pub const KIND: &'static str = "none";
}

impl Wait for NoWait {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn begin(&self, scope: &mut RunScope<'_>) -> bool {
        scope.log(EventKind::WaitSkipped);
        false
    }

    fn resumption(
        &self,
        _wait_event: Option<&Event>,
        _caller_events: &[Event],
        _now: DateTime<Utc>,
    ) -> Resumption {
        Resumption::Accepted { timed_out: false }
    }

    fn to_json(&self) -> Value {
        tagged(Self::KIND, self)
    }
}
