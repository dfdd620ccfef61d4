//! Rule: Router Exits
//!
//! Every category, case and default a router declares must line up with the
//! exits of the node that owns it. The per-variant checks live on the router
//! itself; this rule also checks that a wait's timeout category belongs to
//! the node's router.

use crate::definition::Flow;

use super::super::{ValidationError, ValidationRule};

pub struct RouterExitsRule;

impl ValidationRule for RouterExitsRule {
    fn id(&self) -> &'static str {
        "router-exits"
    }

    fn description(&self) -> &'static str {
        "router categories, cases and defaults must reference the node's exits"
    }

    fn validate(&self, flow: &Flow) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        for node in &flow.nodes {
            if let Some(router) = &node.router {
                for problem in router.validate(&node.exits) {
                    errors.push(ValidationError::error(Some(&node.uuid), problem, self.id()));
                }
            }

            let Some(timeout_category) = node.wait.as_ref().and_then(|w| w.timeout_category())
            else {
                continue;
            };
            let declared = node
                .router
                .as_ref()
                .is_some_and(|r| r.base().category(timeout_category).is_some());
            if !declared {
                errors.push(ValidationError::error(
                    Some(&node.uuid),
                    format!(
                        "wait timeout category {} is not a category of the node's router",
                        timeout_category
                    ),
                    self.id(),
                ));
            }
        }

        errors
    }
}
