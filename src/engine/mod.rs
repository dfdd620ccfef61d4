//! # Engine - Resumable Flow Interpreter
//!
//! The engine is stateless. `start` builds a new [`Session`] from a trigger and
//! walks it until it waits or finishes; `resume` takes a session the caller
//! persisted and re-enters it with fresh events.
//!
//! ## Core Principles
//!
//! 1. **Pure**: no I/O, no threads, no persistence. A wait is a return with
//!    status `waiting`, never a blocked call.
//! 2. **Sessions are data**: every run, step and event is serializable, so a
//!    session can be stored and rebuilt between calls.
//! 3. **Errors are events**: bad expressions, failed tests and missing assets
//!    are logged on the current step and the walk continues. Only a missing
//!    flow aborts a call.

mod exec_loop;
mod scope;

#[cfg(test)]
mod tests;

use crate::assets::{AssetResolver, StaticAssets};
use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::definition::Registry;
use crate::errors::EngineError;
use crate::events::{Event, EventKind};
use crate::expressions::{Evaluator, TemplateEvaluator};
use crate::runs::{Run, RunStatus, Session, SessionStatus, Step};
use crate::triggers::Trigger;
use crate::waits::Resumption;
use exec_loop::{Entry, Walker};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub use scope::RunScope;

/// What happened during one start/resume call
#[derive(Debug, Clone, PartialEq)]
pub struct Sprint {
    /// Events generated by the engine, in order. Caller events are recorded
    /// on the run but not echoed here.
    pub events: Vec<Event>,
    pub status: SessionStatus,
}

impl Sprint {
    fn empty(status: SessionStatus) -> Self {
        Self {
            events: Vec::new(),
            status,
        }
    }
}

/* ===================== Engine ===================== */

pub struct Engine {
    registry: Arc<Registry>,
    evaluator: Arc<dyn Evaluator>,
    assets: Arc<dyn AssetResolver>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Start a new session from a trigger
    pub fn start(&self, trigger: Trigger) -> Result<(Session, Sprint), EngineError> {
        let now = self.clock.now();
        let flow = self
            .assets
            .flow(&trigger.flow.uuid)
            .map_err(|_| EngineError::MissingDependency(trigger.flow.uuid.clone()))?;

        let mut session = Session::new(trigger, now);
        let root = Run::new(flow.reference(), session.party.uuid.clone(), None, now);
        let root_uuid = root.uuid.clone();
        session.runs.push(root);

        info!(
            session_id = %session.uuid,
            flow_id = %flow.uuid,
            trigger = session.trigger.type_name(),
            "starting session"
        );

        let mut walker = Walker::new(self, now);
        if session.trigger.msg_payload().is_some() {
            walker = walker.skip_first_msg_wait();
        }
        walker.continue_until_wait(&mut session, root_uuid, Entry::Start)?;

        let sprint = Sprint {
            events: walker.into_events(),
            status: session.status(),
        };
        Ok((session, sprint))
    }

    /// Resume a waiting session with events from the caller
    ///
    /// If the waiting run's wait doesn't accept these events the session is
    /// left untouched and the sprint is empty. On error the session may have
    /// been partly advanced and must not be persisted.
    pub fn resume(
        &self,
        session: &mut Session,
        caller_events: Vec<Event>,
    ) -> Result<Sprint, EngineError> {
        let now = self.clock.now();

        let status = session.status();
        if status != SessionStatus::Waiting {
            return Err(EngineError::NotWaiting {
                session: session.uuid.clone(),
                status,
            });
        }

        let run = session
            .waiting_run()
            .ok_or_else(|| EngineError::NoWaitingRun(session.uuid.clone()))?;
        let flow = self
            .assets
            .flow(&run.flow.uuid)
            .map_err(|_| EngineError::MissingDependency(run.flow.uuid.clone()))?;

        if !run.flow.version_hash.is_empty() && run.flow.version_hash != flow.version_hash() {
            warn!(
                run_id = %run.uuid,
                flow_id = %flow.uuid,
                "flow has changed since the run started"
            );
        }

        let node_uuid = run.current_node().ok_or_else(|| {
            EngineError::InvalidState(format!("waiting run {} has no current step", run.uuid))
        })?;
        let node = flow.node(node_uuid).ok_or_else(|| EngineError::MissingNode {
            flow: flow.uuid.clone(),
            node: node_uuid.clone(),
        })?;
        let wait = node.wait.as_ref().ok_or_else(|| {
            EngineError::InvalidState(format!("run {} is waiting at a node without a wait", run.uuid))
        })?;

        let wait_event = run.current_step().and_then(Step::wait_event);
        let timed_out = match wait.resumption(wait_event, &caller_events, now) {
            Resumption::Rejected => {
                debug!(session_id = %session.uuid, events = caller_events.len(), "resume rejected");
                return Ok(Sprint::empty(SessionStatus::Waiting));
            }
            Resumption::Accepted { timed_out } => timed_out,
        };

        let run_uuid = run.uuid.clone();
        let run_index = session
            .run_index(&run_uuid)
            .ok_or_else(|| EngineError::UnknownRun(run_uuid.clone()))?;
        let mut walker = Walker::new(self, now);

        if session.wait_count() >= self.config.max_resumes_per_session {
            let text = format!(
                "reached maximum number of resumes per session ({})",
                self.config.max_resumes_per_session
            );
            walker.fail_run(session, run_index, text)?;
            return Ok(Sprint {
                events: walker.into_events(),
                status: session.status(),
            });
        }

        info!(session_id = %session.uuid, run_id = %run_uuid, timed_out, "resuming session");

        if timed_out {
            session.input = None;
        }
        for event in caller_events {
            if let Some(msg) = event.received_msg() {
                session.input = Some(msg.clone());
            }
            session.runs[run_index].record(event);
        }
        session.runs[run_index].set_status(RunStatus::Active, now)?;
        if timed_out {
            walker.record(session, run_index, EventKind::WaitTimedOut);
        }

        walker.continue_until_wait(session, run_uuid, Entry::Route { timed_out })?;

        Ok(Sprint {
            events: walker.into_events(),
            status: session.status(),
        })
    }

    /// Expire every run that hasn't finished
    pub fn expire(&self, session: &mut Session) -> Result<Sprint, EngineError> {
        let now = self.clock.now();
        for run in session.runs.iter_mut().rev() {
            if !run.status.is_terminal() {
                run.set_status(RunStatus::Expired, now)?;
            }
        }
        info!(session_id = %session.uuid, "session expired");
        Ok(Sprint::empty(session.status()))
    }
}

/* ===================== Builder ===================== */

/// Assembles an [`Engine`]
///
/// Anything left unset gets a default: built-in registry, template evaluator,
/// empty static assets, system clock and default config.
#[derive(Default)]
pub struct EngineBuilder {
    registry: Option<Arc<Registry>>,
    evaluator: Option<Arc<dyn Evaluator>>,
    assets: Option<Arc<dyn AssetResolver>>,
    clock: Option<Arc<dyn Clock>>,
    config: Option<EngineConfig>,
}

impl EngineBuilder {
    pub fn registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn evaluator(mut self, evaluator: Arc<dyn Evaluator>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    pub fn assets(mut self, assets: Arc<dyn AssetResolver>) -> Self {
        self.assets = Some(assets);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> Engine {
        Engine {
            registry: self
                .registry
                .unwrap_or_else(|| Arc::new(Registry::with_builtins())),
            evaluator: self
                .evaluator
                .unwrap_or_else(|| Arc::new(TemplateEvaluator)),
            assets: self
                .assets
                .unwrap_or_else(|| Arc::new(StaticAssets::new())),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            config: self.config.unwrap_or_default(),
        }
    }
}
