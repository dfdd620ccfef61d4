use super::step::Step;
use crate::definition::FlowRef;
use crate::errors::EngineError;
use crate::events::Event;
use crate::ids::{ExitId, NodeId, PartyId, RunId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/* ===================== Status ===================== */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Active,
    Waiting,
    Completed,
    Expired,
    Errored,
}

impl RunStatus {
    /// Completed, expired and errored runs never change again
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RunStatus::Completed | RunStatus::Expired | RunStatus::Errored
        )
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunStatus::Active => "active",
            RunStatus::Waiting => "waiting",
            RunStatus::Completed => "completed",
            RunStatus::Expired => "expired",
            RunStatus::Errored => "errored",
        };
        f.write_str(name)
    }
}

/* ===================== Results ===================== */

/// A named value saved by a router or action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub node_uuid: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<serde_json::Value>,
    pub created_on: DateTime<Utc>,
}

/// Key a result name is stored under: `Favorite Color!` becomes `favorite_color`
pub fn snakify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_sep = false;
    for c in name.trim().chars() {
        if c.is_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.extend(c.to_lowercase());
        } else {
            pending_sep = true;
        }
    }
    out
}

/* ===================== Run ===================== */

/// One execution of one flow for one party
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub uuid: RunId,
    pub flow: FlowRef,
    pub party_uuid: PartyId,
    pub status: RunStatus,
    #[serde(default)]
    pub path: Vec<Step>,
    #[serde(default)]
    pub results: BTreeMap<String, RunResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_uuid: Option<RunId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_uuid: Option<RunId>,
    pub created_on: DateTime<Utc>,
    pub modified_on: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exited_on: Option<DateTime<Utc>>,
}

impl Run {
    pub fn new(
        flow: FlowRef,
        party_uuid: PartyId,
        parent_uuid: Option<RunId>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            uuid: RunId::generate(),
            flow,
            party_uuid,
            status: RunStatus::Active,
            path: Vec::new(),
            results: BTreeMap::new(),
            parent_uuid,
            child_uuid: None,
            created_on: now,
            modified_on: now,
            exited_on: None,
        }
    }

    pub fn current_step(&self) -> Option<&Step> {
        self.path.last()
    }

    pub fn current_step_mut(&mut self) -> Option<&mut Step> {
        self.path.last_mut()
    }

    pub fn current_node(&self) -> Option<&NodeId> {
        self.current_step().map(|s| &s.node_uuid)
    }

    fn ensure_mutable(&self) -> Result<(), EngineError> {
        if self.status.is_terminal() {
            return Err(EngineError::InvalidState(format!(
                "run {} is {} and can no longer change",
                self.uuid, self.status
            )));
        }
        Ok(())
    }

    /// Arrive at a node, opening a new step
    pub fn open_step(&mut self, node: NodeId, now: DateTime<Utc>) -> Result<&mut Step, EngineError> {
        self.ensure_mutable()?;
        if self.current_step().is_some_and(Step::is_open) {
            return Err(EngineError::InvalidState(format!(
                "run {} cannot arrive at {} before leaving its current step",
                self.uuid, node
            )));
        }
        self.modified_on = now;
        self.path.push(Step::new(node, now));
        let index = self.path.len() - 1;
        Ok(&mut self.path[index])
    }

    pub fn leave_step(&mut self, exit: Option<ExitId>, now: DateTime<Utc>) -> Result<(), EngineError> {
        self.ensure_mutable()?;
        self.modified_on = now;
        match self.current_step_mut() {
            Some(step) => step.leave(exit, now),
            None => Err(EngineError::InvalidState(format!(
                "run {} has no step to leave",
                self.uuid
            ))),
        }
    }

    /// Record an event on the current step, returning the stamped copy
    ///
    /// A run that never reached a node has nowhere to keep events, so they are
    /// only handed back to the caller.
    pub fn record(&mut self, event: Event) -> Event {
        match self.path.last_mut() {
            Some(step) => step.record(event),
            None => event,
        }
    }

    pub fn set_status(&mut self, status: RunStatus, now: DateTime<Utc>) -> Result<(), EngineError> {
        self.ensure_mutable()?;
        self.status = status;
        self.modified_on = now;
        if status.is_terminal() {
            self.exited_on = Some(now);
        }
        Ok(())
    }

    pub fn save_result(&mut self, result: RunResult) {
        self.results.insert(snakify(&result.name), result);
    }

    /// Exits this run has already taken out of `node`
    pub fn exits_taken_at(&self, node: &NodeId) -> Vec<&ExitId> {
        self.path
            .iter()
            .filter(|s| &s.node_uuid == node)
            .filter_map(|s| s.exit_uuid.as_ref())
            .collect()
    }

    pub fn visit_count(&self, node: &NodeId) -> usize {
        self.path.iter().filter(|s| &s.node_uuid == node).count()
    }

    pub fn wait_count(&self) -> usize {
        self.path
            .iter()
            .flat_map(|s| s.events.iter())
            .filter(|e| e.is_wait())
            .count()
    }
}
