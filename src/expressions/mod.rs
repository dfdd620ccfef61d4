//! Expression evaluation
//!
//! The engine treats evaluation as a collaborator: anything implementing
//! [`Evaluator`] can render templates against the JSON context built by
//! [`context::build`]. [`TemplateEvaluator`] is the default.
//!
//! Evaluation never panics. An error is always recoverable: callers record it
//! as an `error` event and carry on with an empty value.

pub mod context;
pub mod template;


use crate::errors::EvaluationError;
use serde_json::Value;
use std::fmt;

pub use template::TemplateEvaluator;

/// Key under which a context object carries its text rendering
pub const DEFAULT_KEY: &str = "__default__";

pub trait Evaluator: fmt::Debug + Send + Sync {
    /// Evaluate a template, keeping the value's type when the template is a single reference
    fn evaluate(&self, template: &str, context: &Value) -> Result<Value, EvaluationError>;

    /// Evaluate a template and render the result as text
    fn evaluate_text(&self, template: &str, context: &Value) -> Result<String, EvaluationError> {
        self.evaluate(template, context).map(|v| value_to_text(&v))
    }
}

/// Render a context value as text
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(value_to_text)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(map) => match map.get(DEFAULT_KEY) {
            Some(default) => value_to_text(default),
            None => value.to_string(),
        },
    }
}

/// Truncate to at most `limit` characters
pub fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}
