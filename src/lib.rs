//! Rhythm Flows - a resumable interpreter for graph-shaped conversation flows.
//!
//! A [`definition::Flow`] is loaded once through the [`definition::FlowLoader`]
//! (migrate, decode, validate), then executed by the [`engine::Engine`]:
//! `start` walks the graph from a trigger until the run completes or reaches a
//! wait, and `resume` re-enters a persisted [`runs::Session`] with fresh caller
//! events. The engine never blocks and never persists anything itself.

pub mod actions;
pub mod assets;
pub mod clock;
pub mod config;
pub mod definition;
pub mod engine;
pub mod errors;
pub mod events;
pub mod expressions;
pub mod ids;
pub mod migrations;
pub mod party;
pub mod routers;
pub mod runs;
pub mod triggers;
pub mod waits;

// Re-export the types most callers need
pub use definition::{Flow, FlowLoader, Node};
pub use engine::{Engine, EngineBuilder, Sprint};
pub use errors::{DefinitionError, EngineError};
pub use events::{Event, EventKind};
pub use runs::{Run, RunStatus, Session, SessionStatus, Step};
pub use triggers::Trigger;
