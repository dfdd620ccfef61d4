use super::{Resumption, Wait};
use crate::definition::tagged;
use crate::engine::RunScope;
use crate::events::{Event, EventKind};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Waits until a fixed delay has passed
///
/// Any resume at or after the deadline continues the run, whatever the caller
/// sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWait {
    pub seconds: u32,
}

impl TimeWait {
    pub const KIND: &'static str = "time";
}

impl Wait for TimeWait {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn begin(&self, scope: &mut RunScope<'_>) -> bool {
        let resume_on = scope.now() + Duration::seconds(i64::from(self.seconds));
        scope.log(EventKind::TimeWait { resume_on });
        true
    }

    fn resumption(
        &self,
        wait_event: Option<&Event>,
        _caller_events: &[Event],
        now: DateTime<Utc>,
    ) -> Resumption {
        let resume_on = wait_event.and_then(|e| match &e.kind {
            EventKind::TimeWait { resume_on } => Some(*resume_on),
            _ => None,
        });
        match resume_on {
            Some(deadline) if now >= deadline => Resumption::Accepted { timed_out: false },
            _ => Resumption::Rejected,
        }
    }

    fn to_json(&self) -> Value {
        tagged(Self::KIND, self)
    }
}
