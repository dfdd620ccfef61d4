//! Rule: Unreachable Node
//!
//! Warns about nodes no exit leads to. The first node is the entry point and
//! is always reachable.

use std::collections::HashSet;

use crate::definition::Flow;

use super::super::{ValidationError, ValidationRule};

pub struct UnreachableNodeRule;

impl ValidationRule for UnreachableNodeRule {
    fn id(&self) -> &'static str {
        "unreachable-node"
    }

    fn description(&self) -> &'static str {
        "nodes other than the first should be the destination of some exit"
    }

    fn validate(&self, flow: &Flow) -> Vec<ValidationError> {
        let targeted: HashSet<_> = flow
            .nodes
            .iter()
            .flat_map(|n| n.exits.iter())
            .filter_map(|e| e.destination_uuid.as_ref())
            .collect();

        flow.nodes
            .iter()
            .skip(1)
            .filter(|node| !targeted.contains(&node.uuid))
            .map(|node| {
                ValidationError::warning(
                    Some(&node.uuid),
                    "no exit leads to this node",
                    self.id(),
                )
            })
            .collect()
    }
}
