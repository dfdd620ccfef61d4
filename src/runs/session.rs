use super::run::{Run, RunStatus};
use crate::ids::{RunId, SessionId};
use crate::party::{Msg, Party};
use crate::triggers::Trigger;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Waiting,
    Completed,
    Expired,
    Errored,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionStatus::Active => "active",
            SessionStatus::Waiting => "waiting",
            SessionStatus::Completed => "completed",
            SessionStatus::Expired => "expired",
            SessionStatus::Errored => "errored",
        };
        f.write_str(name)
    }
}

/// The persisted unit of interpretation
///
/// A session owns every run it has started, root first. Parent and child runs
/// refer to each other by id and are resolved here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub uuid: SessionId,
    pub trigger: Trigger,
    pub party: Party,
    /// The most recent input received, visible to expressions as `@input`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Msg>,
    #[serde(default)]
    pub runs: Vec<Run>,
    pub created_on: DateTime<Utc>,
}

impl Session {
    pub fn new(trigger: Trigger, now: DateTime<Utc>) -> Self {
        Self {
            uuid: SessionId::generate(),
            party: trigger.party.clone(),
            input: trigger.msg_payload().cloned(),
            trigger,
            runs: Vec::new(),
            created_on: now,
        }
    }

    /// Overall status, derived from the currently active run
    pub fn status(&self) -> SessionStatus {
        if let Some(run) = self.current_run() {
            return match run.status {
                RunStatus::Waiting => SessionStatus::Waiting,
                _ => SessionStatus::Active,
            };
        }
        match self.runs.first().map(|r| r.status) {
            Some(RunStatus::Expired) => SessionStatus::Expired,
            Some(RunStatus::Errored) => SessionStatus::Errored,
            _ => SessionStatus::Completed,
        }
    }

    pub fn root(&self) -> Option<&Run> {
        self.runs.first()
    }

    /// The innermost run that has not finished
    pub fn current_run(&self) -> Option<&Run> {
        self.runs.iter().rev().find(|r| !r.status.is_terminal())
    }

    pub fn waiting_run(&self) -> Option<&Run> {
        self.runs.iter().find(|r| r.status == RunStatus::Waiting)
    }

    pub fn run(&self, uuid: &RunId) -> Option<&Run> {
        self.runs.iter().find(|r| &r.uuid == uuid)
    }

    pub fn run_index(&self, uuid: &RunId) -> Option<usize> {
        self.runs.iter().position(|r| &r.uuid == uuid)
    }

    pub fn parent_of(&self, run: &Run) -> Option<&Run> {
        run.parent_uuid.as_ref().and_then(|id| self.run(id))
    }

    pub fn child_of(&self, run: &Run) -> Option<&Run> {
        run.child_uuid.as_ref().and_then(|id| self.run(id))
    }

    /// Number of waits begun across all runs, each one a potential resume
    pub fn wait_count(&self) -> usize {
        self.runs.iter().map(Run::wait_count).sum()
    }
}
