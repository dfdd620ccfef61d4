use crate::errors::EngineError;
use crate::events::Event;
use crate::ids::{ExitId, NodeId, StepId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One visit of a run to one node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub uuid: StepId,
    pub node_uuid: NodeId,
    /// Set when the node is left, absent when it was left with no continuation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_uuid: Option<ExitId>,
    pub arrived_on: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_on: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<Event>,
}

impl Step {
    pub fn new(node_uuid: NodeId, arrived_on: DateTime<Utc>) -> Self {
        Self {
            uuid: StepId::generate(),
            node_uuid,
            exit_uuid: None,
            arrived_on,
            left_on: None,
            events: Vec::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.left_on.is_none()
    }

    /// Close the step. A step is left exactly once.
    pub fn leave(&mut self, exit: Option<ExitId>, now: DateTime<Utc>) -> Result<(), EngineError> {
        if !self.is_open() {
            return Err(EngineError::InvalidState(format!(
                "step {} at node {} was already left",
                self.uuid, self.node_uuid
            )));
        }
        self.exit_uuid = exit;
        self.left_on = Some(now);
        Ok(())
    }

    /// Append an event, stamping it with this step's id
    pub fn record(&mut self, mut event: Event) -> Event {
        event.step_uuid = Some(self.uuid.clone());
        self.events.push(event.clone());
        event
    }

    /// The most recent wait event logged on this step
    pub fn wait_event(&self) -> Option<&Event> {
        self.events.iter().rev().find(|e| e.is_wait())
    }
}
