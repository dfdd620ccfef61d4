//! Core interpreter loop
//!
//! [`Walker::continue_until_wait`] walks a session's runs node by node until
//! one run suspends on a wait, or every run reachable from where it started
//! has finished.
//!
//! ## Visiting a node
//! 1. Open a step and run the node's actions in order
//! 2. If an action entered a sub-flow, switch to the child run
//! 3. Begin the node's wait, returning if it suspends
//! 4. Route: pick an exit, save the result, leave the step
//! 5. Follow the exit's destination, or finish the run and return to its parent

use super::scope::RunScope;
use super::Engine;
use crate::definition::{Flow, Node};
use crate::errors::{ActionError, EngineError, RoutingError};
use crate::events::{Event, EventKind};
use crate::ids::{NodeId, RunId};
use crate::routers::Route;
use crate::runs::{Run, RunStatus, Session};
use crate::waits::MsgWait;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tracing::{debug, info, warn};

/* ===================== Types ===================== */

/// Where to pick a run back up
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Entry {
    /// The flow's first node
    Start,
    /// A node the run is arriving at
    Arrive(NodeId),
    /// The route phase of the run's current step, after a wait or a child run
    Route { timed_out: bool },
}

/// How a node visit ended
enum Visit {
    Suspended,
    EnterChild(Arc<Flow>),
    Continue(Option<NodeId>),
    Failed(String),
}

/// State for a single start/resume call
pub(crate) struct Walker<'e> {
    engine: &'e Engine,
    rng: StdRng,
    events: Vec<Event>,
    steps: usize,
    now: DateTime<Utc>,
    skip_msg_wait: bool,
}

impl<'e> Walker<'e> {
    pub(crate) fn new(engine: &'e Engine, now: DateTime<Utc>) -> Self {
        let rng = match engine.config.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            engine,
            rng,
            events: Vec::new(),
            steps: 0,
            now,
            skip_msg_wait: false,
        }
    }

    /// Skip the first message wait reached, the trigger's message already answers it
    pub(crate) fn skip_first_msg_wait(mut self) -> Self {
        self.skip_msg_wait = true;
        self
    }

    pub(crate) fn into_events(self) -> Vec<Event> {
        self.events
    }

    /// Log an event on a run's current step
    pub(crate) fn record(&mut self, session: &mut Session, run_index: usize, kind: EventKind) {
        let event = session.runs[run_index].record(Event::new(kind, self.now));
        self.events.push(event);
    }

    /* ===================== Loop ===================== */

    pub(crate) fn continue_until_wait(
        &mut self,
        session: &mut Session,
        mut run_uuid: RunId,
        mut entry: Entry,
    ) -> Result<(), EngineError> {
        loop {
            let run_index = session
                .run_index(&run_uuid)
                .ok_or_else(|| EngineError::UnknownRun(run_uuid.clone()))?;
            let flow = self.flow_for(&session.runs[run_index])?;

            let visit = match entry {
                Entry::Start => match flow.first_node() {
                    Some(first) => self.visit_node(session, run_index, &flow, first.uuid.clone())?,
                    None => Visit::Continue(None),
                },
                Entry::Arrive(node) => self.visit_node(session, run_index, &flow, node)?,
                Entry::Route { timed_out } => self.route_node(session, run_index, &flow, timed_out)?,
            };

            match visit {
                Visit::Suspended => {
                    session.runs[run_index].set_status(RunStatus::Waiting, self.now)?;
                    debug!(run_id = %run_uuid, "run suspended");
                    return Ok(());
                }
                Visit::EnterChild(child_flow) => {
                    run_uuid = self.start_child(session, run_index, &child_flow)?;
                    entry = Entry::Start;
                }
                Visit::Continue(Some(destination)) => {
                    entry = Entry::Arrive(destination);
                }
                Visit::Continue(None) => {
                    session.runs[run_index].set_status(RunStatus::Completed, self.now)?;
                    debug!(run_id = %run_uuid, "run completed");

                    match self.exit_to_parent(session, run_index) {
                        Some(parent) => {
                            run_uuid = parent;
                            entry = Entry::Route { timed_out: false };
                        }
                        None => return Ok(()),
                    }
                }
                Visit::Failed(text) => {
                    self.fail_run(session, run_index, text)?;
                    return Ok(());
                }
            }
        }
    }

    fn flow_for(&self, run: &Run) -> Result<Arc<Flow>, EngineError> {
        self.engine
            .assets
            .flow(&run.flow.uuid)
            .map_err(|_| EngineError::MissingDependency(run.flow.uuid.clone()))
    }

    /* ===================== Node Phases ===================== */

    fn visit_node(
        &mut self,
        session: &mut Session,
        run_index: usize,
        flow: &Flow,
        node_uuid: NodeId,
    ) -> Result<Visit, EngineError> {
        let limit = self.engine.config.max_steps_per_sprint;
        if self.steps >= limit {
            // a child stopped before its first node still needs a step to log the failure on
            let run = &mut session.runs[run_index];
            if run.current_step().is_none() {
                run.open_step(node_uuid, self.now)?;
            }
            return Ok(Visit::Failed(format!(
                "reached maximum number of steps per sprint ({})",
                limit
            )));
        }
        self.steps += 1;

        let node = flow.node(&node_uuid).ok_or_else(|| EngineError::MissingNode {
            flow: flow.uuid.clone(),
            node: node_uuid.clone(),
        })?;
        session.runs[run_index].open_step(node_uuid, self.now)?;
        debug!(run_id = %session.runs[run_index].uuid, node_id = %node.uuid, "visiting node");

        let skip_wait = std::mem::take(&mut self.skip_msg_wait)
            && node.wait.as_ref().is_some_and(|w| w.kind() == MsgWait::KIND);

        let mut scope = RunScope::new(
            self.engine,
            session,
            run_index,
            flow,
            node,
            &mut self.rng,
            &mut self.events,
            self.now,
        );

        for action in &node.actions {
            if let Err(e) = action.execute(&mut scope) {
                if e.is_fatal() {
                    return Err(match e {
                        ActionError::MissingFlow(flow) => EngineError::MissingDependency(flow),
                        other => EngineError::InvalidState(other.to_string()),
                    });
                }
                scope.log_error(&e);
            }
            if let Some(child) = scope.take_child() {
                return Ok(Visit::EnterChild(child));
            }
        }

        if let Some(wait) = &node.wait {
            if skip_wait {
                debug!(node_id = %node.uuid, "trigger message answers the first wait");
            } else if wait.begin(&mut scope) {
                return Ok(Visit::Suspended);
            }
        }

        self.route_node(session, run_index, flow, false)
    }

    fn route_node(
        &mut self,
        session: &mut Session,
        run_index: usize,
        flow: &Flow,
        timed_out: bool,
    ) -> Result<Visit, EngineError> {
        let node = current_node(session, run_index, flow)?;
        let mut scope = RunScope::new(
            self.engine,
            session,
            run_index,
            flow,
            node,
            &mut self.rng,
            &mut self.events,
            self.now,
        );

        let route = match pick_route(&mut scope, node, timed_out) {
            Ok(route) => route,
            Err(e) => {
                scope.log_error(&e);
                None
            }
        };

        let Some(route) = route else {
            session.runs[run_index].leave_step(None, self.now)?;
            return Ok(Visit::Continue(None));
        };

        let exit = node.exit(&route.exit_uuid).ok_or_else(|| {
            EngineError::InvalidState(format!(
                "router chose exit {} which is not an exit of node {}",
                route.exit_uuid, node.uuid
            ))
        })?;

        if let (Some(router), Some(category_uuid)) = (&node.router, &route.category_uuid) {
            if let Some(result_name) = &router.base().result_name {
                let category = router.base().category(category_uuid).map(|c| c.name.clone());
                scope.save_result(result_name, route.matched.clone(), category, route.extra.clone());
            }
        }

        debug!(node_id = %node.uuid, exit_id = %exit.uuid, "leaving node");
        session.runs[run_index].leave_step(Some(exit.uuid.clone()), self.now)?;
        Ok(Visit::Continue(exit.destination_uuid.clone()))
    }

    /* ===================== Runs ===================== */

    fn start_child(
        &mut self,
        session: &mut Session,
        parent_index: usize,
        flow: &Flow,
    ) -> Result<RunId, EngineError> {
        let parent_uuid = session.runs[parent_index].uuid.clone();
        let child = Run::new(
            flow.reference(),
            session.party.uuid.clone(),
            Some(parent_uuid.clone()),
            self.now,
        );
        let child_uuid = child.uuid.clone();

        session.runs[parent_index].child_uuid = Some(child_uuid.clone());
        self.record(
            session,
            parent_index,
            EventKind::FlowEntered {
                flow: flow.reference(),
                run_uuid: child_uuid.clone(),
                parent_run_uuid: Some(parent_uuid),
            },
        );
        session.runs.push(child);

        info!(flow_id = %flow.uuid, run_id = %child_uuid, "entered sub-flow");
        Ok(child_uuid)
    }

    /// Hand control back to the parent of a finished run, if it has one
    fn exit_to_parent(&mut self, session: &mut Session, run_index: usize) -> Option<RunId> {
        let run = &session.runs[run_index];
        let parent_index = run
            .parent_uuid
            .as_ref()
            .and_then(|uuid| session.run_index(uuid))?;

        let kind = EventKind::FlowExited {
            flow: run.flow.clone(),
            run_uuid: run.uuid.clone(),
            status: run.status,
        };
        self.record(session, parent_index, kind);
        Some(session.runs[parent_index].uuid.clone())
    }

    /// Error a run, and every ancestor waiting on it
    pub(crate) fn fail_run(
        &mut self,
        session: &mut Session,
        run_index: usize,
        text: String,
    ) -> Result<(), EngineError> {
        let mut index = run_index;
        let mut text = text;

        loop {
            warn!(run_id = %session.runs[index].uuid, "run failed: {}", text);
            self.record(session, index, EventKind::Failure { text });
            session.runs[index].set_status(RunStatus::Errored, self.now)?;

            let failed = session.runs[index].uuid.clone();
            match self.exit_to_parent(session, index) {
                Some(parent) => {
                    index = session
                        .run_index(&parent)
                        .ok_or(EngineError::UnknownRun(parent))?;
                    text = format!("child run {} errored", failed);
                }
                None => return Ok(()),
            }
        }
    }
}

/* ===================== Helpers ===================== */

fn current_node<'f>(session: &Session, run_index: usize, flow: &'f Flow) -> Result<&'f Node, EngineError> {
    let run = &session.runs[run_index];
    let node_uuid = run.current_node().ok_or_else(|| {
        EngineError::InvalidState(format!("run {} has not visited any node", run.uuid))
    })?;
    flow.node(node_uuid).ok_or_else(|| EngineError::MissingNode {
        flow: flow.uuid.clone(),
        node: node_uuid.clone(),
    })
}

/// Choose how to leave a node
///
/// A wait that timed out routes to its timeout category. A node without a
/// router leaves by its only exit, if it has one.
fn pick_route(
    scope: &mut RunScope<'_>,
    node: &Node,
    timed_out: bool,
) -> Result<Option<Route>, RoutingError> {
    let timeout_category = node
        .wait
        .as_ref()
        .and_then(|w| w.timeout_category())
        .filter(|_| timed_out);

    match (&node.router, timeout_category) {
        (Some(router), Some(category)) => router.base().route_to_category(category, "", None).map(Some),
        (Some(router), None) => router.pick_route(scope, &node.exits).map(Some),
        (None, _) => Ok(node.exits.first().map(|exit| Route {
            exit_uuid: exit.uuid.clone(),
            category_uuid: None,
            matched: String::new(),
            extra: None,
        })),
    }
}
