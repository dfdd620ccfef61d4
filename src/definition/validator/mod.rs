//! Graph Validation for Flows
//!
//! Runs once, at load time, before any run may reference the flow. Each check
//! is a [`ValidationRule`]; the [`Validator`] runs them all and collects what
//! they find. Any finding with [`Severity::Error`] makes the flow unusable.
//!
//! # Adding a New Rule
//!
//! 1. Create a new file in `validator/rules/`
//! 2. Implement `ValidationRule` for your struct
//! 3. Add it to the `Validator::new()` constructor

pub mod rules;

#[cfg(test)]
mod tests;

use super::Flow;
use crate::ids::NodeId;
use serde::Serialize;

// ============================================================================
// Validation Error Types
// ============================================================================

/// A problem found in a flow graph
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    /// The node the problem was found on, if it is tied to one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_uuid: Option<NodeId>,
    pub message: String,
    pub severity: Severity,
    /// Which rule produced this error
    pub rule_id: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The flow cannot be loaded
    Error,
    /// Loads, but is probably not what the author meant
    Warning,
}

impl ValidationError {
    pub fn error(node: Option<&NodeId>, message: impl Into<String>, rule_id: &'static str) -> Self {
        Self {
            node_uuid: node.cloned(),
            message: message.into(),
            severity: Severity::Error,
            rule_id,
        }
    }

    pub fn warning(
        node: Option<&NodeId>,
        message: impl Into<String>,
        rule_id: &'static str,
    ) -> Self {
        Self {
            node_uuid: node.cloned(),
            message: message.into(),
            severity: Severity::Warning,
            rule_id,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        match &self.node_uuid {
            Some(node) => write!(
                f,
                "{} on node {}: {} [{}]",
                severity, node, self.message, self.rule_id
            ),
            None => write!(f, "{}: {} [{}]", severity, self.message, self.rule_id),
        }
    }
}

impl std::error::Error for ValidationError {}

// ============================================================================
// ValidationRule Trait
// ============================================================================

/// Each rule checks one aspect of the graph and must not depend on other rules' results.
pub trait ValidationRule: Send + Sync {
    /// Unique identifier for this rule (e.g., "dangling-exit")
    fn id(&self) -> &'static str;

    /// Human-readable description of what this rule checks
    fn description(&self) -> &'static str;

    fn validate(&self, flow: &Flow) -> Vec<ValidationError>;
}

// ============================================================================
// Validator - Runs All Rules
// ============================================================================

pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    /// Create a new validator with all built-in rules.
    pub fn new() -> Self {
        Self {
            rules: vec![
                // Error rules - the flow cannot run
                Box::new(rules::DuplicateIdsRule),
                Box::new(rules::DanglingExitRule),
                Box::new(rules::ExitCountRule),
                Box::new(rules::RouterExitsRule),
                // Warning rules
                Box::new(rules::UnreachableNodeRule),
            ],
        }
    }

    pub fn validate(&self, flow: &Flow) -> Vec<ValidationError> {
        self.rules
            .iter()
            .flat_map(|rule| rule.validate(flow))
            .collect()
    }

    /// Get a list of all registered rules
    pub fn rules(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.rules.iter().map(|r| (r.id(), r.description()))
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
