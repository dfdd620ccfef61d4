//! Default template evaluator
//!
//! Resolves `@path` and `@(path)` references against the JSON evaluation
//! context. A reference whose first segment is not a context root is left as
//! literal text, so e-mail addresses and handles survive untouched.

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use serde_json::Value;

use super::{value_to_text, Evaluator};
use crate::errors::EvaluationError;

#[derive(Parser)]
#[grammar = "expressions/template.pest"]
struct TemplateParser;

/* ===================== Evaluator ===================== */

#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateEvaluator;

/// A parsed template segment
enum Segment<'a> {
    Text(&'a str),
    Reference { source: &'a str, path: &'a str },
}

impl Evaluator for TemplateEvaluator {
    fn evaluate(&self, template: &str, context: &Value) -> Result<Value, EvaluationError> {
        let segments = parse(template)?;

        // A template that is exactly one reference keeps the referenced value's type
        if let [Segment::Reference { source, path }] = segments.as_slice() {
            return match resolve(path, context)? {
                Some(value) => Ok(value.clone()),
                None => Ok(Value::String(source.to_string())),
            };
        }

        let mut out = String::with_capacity(template.len());
        for segment in &segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Reference { source, path } => match resolve(path, context)? {
                    Some(value) => out.push_str(&value_to_text(value)),
                    None => out.push_str(source),
                },
            }
        }
        Ok(Value::String(out))
    }
}

fn parse(template: &str) -> Result<Vec<Segment<'_>>, EvaluationError> {
    let mut pairs =
        TemplateParser::parse(Rule::template, template).map_err(|e| EvaluationError::Syntax {
            template: template.to_string(),
            message: e.variant.message().to_string(),
        })?;

    let Some(root) = pairs.next() else {
        return Ok(Vec::new());
    };

    let mut segments = Vec::new();
    for pair in root.into_inner() {
        match pair.as_rule() {
            Rule::escaped_at | Rule::lone_at => segments.push(Segment::Text("@")),
            Rule::text => segments.push(Segment::Text(pair.as_str())),
            Rule::expression => segments.push(build_reference(pair)),
            Rule::EOI => {}
            _ => unreachable!("unexpected template rule: {:?}", pair.as_rule()),
        }
    }
    Ok(segments)
}

fn build_reference(pair: Pair<'_, Rule>) -> Segment<'_> {
    let source = pair.as_str();
    let path = pair
        .into_inner()
        .find_map(|inner| match inner.as_rule() {
            Rule::path => Some(inner.as_str()),
            Rule::paren_path => inner.into_inner().next().map(|p| p.as_str()),
            _ => None,
        })
        .unwrap_or("");
    Segment::Reference { source, path }
}

/// Walk a dotted path through the context
///
/// Returns `Ok(None)` when the root is not part of the context (the reference
/// is literal text), and an error when the root exists but a later key does not.
fn resolve<'v>(path: &str, context: &'v Value) -> Result<Option<&'v Value>, EvaluationError> {
    let mut keys = path.split('.');
    let Some(root) = keys.next().and_then(|name| context.get(name)) else {
        return Ok(None);
    };

    let mut current = root;
    let mut walked = path.split('.').next().unwrap_or_default().to_string();
    for key in keys {
        let next = match current {
            Value::Object(map) => map.get(key),
            Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        current = next.ok_or_else(|| EvaluationError::MissingProperty {
            path: walked.clone(),
            key: key.to_string(),
        })?;
        walked.push('.');
        walked.push_str(key);
    }
    Ok(Some(current))
}
