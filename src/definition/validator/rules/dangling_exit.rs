//! Rule: Dangling Exit
//!
//! An exit with a destination must name a node in the same flow. An exit
//! without one ends the flow and is always fine.

use std::collections::HashSet;

use crate::definition::Flow;

use super::super::{ValidationError, ValidationRule};

pub struct DanglingExitRule;

impl ValidationRule for DanglingExitRule {
    fn id(&self) -> &'static str {
        "dangling-exit"
    }

    fn description(&self) -> &'static str {
        "exit destinations must be nodes in the same flow"
    }

    fn validate(&self, flow: &Flow) -> Vec<ValidationError> {
        let known: HashSet<_> = flow.nodes.iter().map(|n| &n.uuid).collect();

        flow.nodes
            .iter()
            .flat_map(|node| node.exits.iter().map(move |exit| (node, exit)))
            .filter_map(|(node, exit)| {
                let destination = exit.destination_uuid.as_ref()?;
                if known.contains(destination) {
                    return None;
                }
                Some(ValidationError::error(
                    Some(&node.uuid),
                    format!(
                        "exit {} leads to node {} which does not exist",
                        exit.uuid, destination
                    ),
                    self.id(),
                ))
            })
            .collect()
    }
}
