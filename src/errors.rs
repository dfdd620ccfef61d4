//! Error taxonomy
//!
//! Definition errors are fatal at load time. Evaluation, routing and most
//! action errors are recorded as `error` events on the current step and never
//! abort a start/resume call. Only a missing sub-flow or a broken engine
//! invariant surfaces as an [`EngineError`].

use crate::assets::AssetKind;
use crate::definition::validator::ValidationError;
use crate::ids::{FlowId, NodeId, RunId, SessionId};
use crate::runs::SessionStatus;

/* ===================== Load Time ===================== */

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("flow definition must be a JSON object")]
    NotAnObject,

    #[error("flow definition has no spec_version")]
    MissingVersion,

    #[error("invalid spec version `{0}`")]
    Malformed(String),

    #[error("unsupported spec version {found}, current is {current}")]
    Unsupported { found: String, current: String },
}

#[derive(Debug, thiserror::Error)]
pub enum DefinitionError {
    #[error("malformed flow definition: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{context} is missing required field `{field}`")]
    MissingField { context: String, field: &'static str },

    #[error("unknown {category} type `{kind}`")]
    UnknownType { category: &'static str, kind: String },

    #[error("flow {flow} failed validation: {}", summarize(.errors))]
    Invalid {
        flow: FlowId,
        errors: Vec<ValidationError>,
    },

    #[error(transparent)]
    Migration(#[from] MigrationError),
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/* ===================== Run Time ===================== */

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error("unable to parse template `{template}`: {message}")]
    Syntax { template: String, message: String },

    #[error("`{path}` has no property `{key}`")]
    MissingProperty { path: String, key: String },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RoutingError {
    #[error("unknown case test `{0}`")]
    UnknownTest(String),

    #[error("case test `{test}` failed: {message}")]
    TestFailed { test: String, message: String },

    #[error("no case matched and the router has no default category")]
    NoMatch,

    #[error("node has no exits to route through")]
    NoExits,

    #[error("router references undefined category {0}")]
    UnknownCategory(String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssetError {
    #[error("{kind} `{id}` not found")]
    NotFound { kind: AssetKind, id: String },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ActionError {
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    #[error("missing dependency: {0}")]
    MissingAsset(AssetError),

    #[error("missing flow dependency {0}")]
    MissingFlow(FlowId),

    #[error("{0}")]
    Invalid(String),
}

impl ActionError {
    /// Whether this error must abort the current start/resume call
    pub fn is_fatal(&self) -> bool {
        matches!(self, ActionError::MissingFlow(_))
    }
}

/* ===================== Engine ===================== */

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("missing flow dependency {0}")]
    MissingDependency(FlowId),

    #[error("session {session} cannot be resumed, its status is {status}")]
    NotWaiting {
        session: SessionId,
        status: SessionStatus,
    },

    #[error("session {0} has no waiting run")]
    NoWaitingRun(SessionId),

    #[error("run {0} is not part of this session")]
    UnknownRun(RunId),

    #[error("flow {flow} has no node {node}")]
    MissingNode { flow: FlowId, node: NodeId },

    #[error("invalid engine state: {0}")]
    InvalidState(String),
}
