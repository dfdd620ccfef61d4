//! Rule: Exit Count
//!
//! A node with a router needs at least one exit to route to. A node without a
//! router continues linearly and so may have at most one exit. A node with a
//! wait and no exits is a legal terminal wait.

use crate::definition::Flow;

use super::super::{ValidationError, ValidationRule};

pub struct ExitCountRule;

impl ValidationRule for ExitCountRule {
    fn id(&self) -> &'static str {
        "exit-count"
    }

    fn description(&self) -> &'static str {
        "router nodes need exits, linear nodes have at most one"
    }

    fn validate(&self, flow: &Flow) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        for node in &flow.nodes {
            match (&node.router, node.exits.len()) {
                (Some(router), 0) => errors.push(ValidationError::error(
                    Some(&node.uuid),
                    format!("{} router has no exits to route to", router.kind()),
                    self.id(),
                )),
                (None, n) if n > 1 => errors.push(ValidationError::error(
                    Some(&node.uuid),
                    format!("node has {} exits but no router to choose between them", n),
                    self.id(),
                )),
                _ => {}
            }
        }

        errors
    }
}
