//! Rule: Duplicate Ids
//!
//! Node ids must be unique within a flow, and so must exit and action ids:
//! runs record them in their path and would otherwise be ambiguous.

use std::collections::HashSet;

use crate::definition::Flow;

use super::super::{ValidationError, ValidationRule};

pub struct DuplicateIdsRule;

impl ValidationRule for DuplicateIdsRule {
    fn id(&self) -> &'static str {
        "duplicate-id"
    }

    fn description(&self) -> &'static str {
        "node, exit and action ids must be unique within a flow"
    }

    fn validate(&self, flow: &Flow) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let mut nodes = HashSet::new();
        let mut exits = HashSet::new();
        let mut actions = HashSet::new();

        for node in &flow.nodes {
            if !nodes.insert(&node.uuid) {
                errors.push(ValidationError::error(
                    Some(&node.uuid),
                    format!("node id {} is used more than once", node.uuid),
                    self.id(),
                ));
            }

            for exit in &node.exits {
                if !exits.insert(&exit.uuid) {
                    errors.push(ValidationError::error(
                        Some(&node.uuid),
                        format!("exit id {} is used more than once", exit.uuid),
                        self.id(),
                    ));
                }
            }

            for action in &node.actions {
                if !actions.insert(action.uuid()) {
                    errors.push(ValidationError::error(
                        Some(&node.uuid),
                        format!("action id {} is used more than once", action.uuid()),
                        self.id(),
                    ));
                }
            }
        }

        errors
    }
}
