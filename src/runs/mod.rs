//! Runs, steps and sessions
//!
//! This is the state the engine reads and writes. Everything here is plain
//! serializable data: a session persisted after one call and deserialized
//! before the next is indistinguishable from the original.

pub mod run;
pub mod session;
pub mod step;


pub use run::{snakify, Run, RunResult, RunStatus};
pub use session::{Session, SessionStatus};
pub use step::Step;
