//! The view of a session that actions, routers and waits work through
//!
//! A [`RunScope`] borrows the session mutably for the duration of one phase of
//! one node visit. Everything it logs lands on the run's current step and in
//! the sprint's outgoing events.

use super::Engine;
use crate::assets::AssetResolver;
use crate::config::EngineConfig;
use crate::definition::{Flow, Node};
use crate::errors::EvaluationError;
use crate::events::{Event, EventKind};
use crate::expressions::{context, truncate};
use crate::ids::NodeId;
use crate::party::Party;
use crate::routers::CaseTest;
use crate::runs::{Run, RunResult, Session};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

pub struct RunScope<'a> {
    engine: &'a Engine,
    session: &'a mut Session,
    run_index: usize,
    flow: &'a Flow,
    node: &'a Node,
    rng: &'a mut StdRng,
    events: &'a mut Vec<Event>,
    now: DateTime<Utc>,
    child: Option<Arc<Flow>>,
}

impl<'a> RunScope<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        engine: &'a Engine,
        session: &'a mut Session,
        run_index: usize,
        flow: &'a Flow,
        node: &'a Node,
        rng: &'a mut StdRng,
        events: &'a mut Vec<Event>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            engine,
            session,
            run_index,
            flow,
            node,
            rng,
            events,
            now,
            child: None,
        }
    }

    /* ===================== State ===================== */

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn flow(&self) -> &Flow {
        self.flow
    }

    pub fn node_uuid(&self) -> &NodeId {
        &self.node.uuid
    }

    pub fn run(&self) -> &Run {
        &self.session.runs[self.run_index]
    }

    pub fn party(&self) -> &Party {
        &self.session.party
    }

    pub fn party_mut(&mut self) -> &mut Party {
        &mut self.session.party
    }

    pub fn assets(&self) -> &'a dyn AssetResolver {
        self.engine.assets.as_ref()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.engine.config
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut *self.rng
    }

    pub fn case_test(&self, name: &str) -> Option<CaseTest> {
        self.engine.registry.case_test(name)
    }

    /* ===================== Events ===================== */

    pub fn log(&mut self, kind: EventKind) {
        let event = self.session.runs[self.run_index].record(Event::new(kind, self.now));
        self.events.push(event);
    }

    /// Record a recoverable problem as an `error` event
    pub fn log_error(&mut self, error: &dyn fmt::Display) {
        warn!(
            run_id = %self.run().uuid,
            node_id = %self.node.uuid,
            "{}", error
        );
        self.log(EventKind::Error {
            text: error.to_string(),
        });
    }

    /* ===================== Evaluation ===================== */

    pub fn context(&self) -> Value {
        context::build(&*self.session, self.run(), &self.node.uuid)
    }

    pub fn evaluate(&self, template: &str) -> Result<Value, EvaluationError> {
        self.engine.evaluator.evaluate(template, &self.context())
    }

    /// Render a template as text, logging any error and substituting empty text
    pub fn evaluate_text(&mut self, template: &str) -> String {
        let limit = self.config().max_template_chars;
        let context = self.context();
        match self.engine.evaluator.evaluate_text(template, &context) {
            Ok(text) => truncate(&text, limit),
            Err(e) => {
                self.log_error(&e);
                String::new()
            }
        }
    }

    /// Text of a flow item in the party's language, or `base` without a translation
    pub fn localize(&self, item_uuid: &str, property: &str, base: &[String]) -> Vec<String> {
        let language = self
            .session
            .party
            .language
            .as_deref()
            .filter(|lang| *lang != self.flow.language);
        self.flow
            .localization
            .resolve(language, item_uuid, property, base)
            .to_vec()
    }

    /* ===================== Results ===================== */

    pub fn save_result(
        &mut self,
        name: &str,
        value: String,
        category: Option<String>,
        extra: Option<Value>,
    ) {
        let value = truncate(&value, self.config().max_result_chars);
        let input = self.session.input.as_ref().map(|msg| msg.text.clone());

        let result = RunResult {
            name: name.to_string(),
            value: value.clone(),
            category: category.clone(),
            node_uuid: self.node.uuid.clone(),
            input,
            extra,
            created_on: self.now,
        };
        self.session.runs[self.run_index].save_result(result);

        self.log(EventKind::RunResultChanged {
            name: name.to_string(),
            value,
            category,
        });
    }

    /* ===================== Sub-flows ===================== */

    /// Ask the engine to start a child run once the current action returns
    pub fn enter_flow(&mut self, flow: Arc<Flow>) {
        self.child = Some(flow);
    }

    pub(crate) fn take_child(&mut self) -> Option<Arc<Flow>> {
        self.child.take()
    }
}
