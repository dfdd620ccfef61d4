//! Waits
//!
//! A wait marks a node where the run may suspend. Suspension is not a blocked
//! thread: the engine records the wait event, marks the run `waiting` and
//! returns. On resume the wait decides, from the caller's events and the
//! deadline it recorded, whether the run may continue.

mod msg;
mod none;
mod time;


use crate::engine::RunScope;
use crate::events::Event;
use crate::ids::CategoryId;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;

pub use msg::{MsgTimeout, MsgWait};
pub use none::NoWait;
pub use time::TimeWait;

/// Whether a resume attempt may proceed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resumption {
    /// Leave the session exactly as it was
    Rejected,
    /// Continue past the wait; `timed_out` when a deadline stood in for the expected event
    Accepted { timed_out: bool },
}

pub trait Wait: fmt::Debug + Send + Sync {
    fn kind(&self) -> &'static str;

    /// Start waiting, logging the wait's event. Returns false if the run should
    /// carry on without suspending.
    fn begin(&self, scope: &mut RunScope<'_>) -> bool;

    /// Decide whether `caller_events` resume a run suspended here
    ///
    /// `wait_event` is the event this wait logged when it began.
    fn resumption(
        &self,
        wait_event: Option<&Event>,
        caller_events: &[Event],
        now: DateTime<Utc>,
    ) -> Resumption;

    /// Category to route to when the wait times out
    fn timeout_category(&self) -> Option<&CategoryId> {
        None
    }

    fn to_json(&self) -> Value;
}
