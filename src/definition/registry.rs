//! Type registry
//!
//! Maps the `type` discriminator of actions, routers and waits to a factory,
//! and case test names to their implementation. A registry is an ordinary
//! value: whoever assembles the interpreter builds one and hands it to the
//! loader and the engine.

use crate::actions::{self, Action};
use crate::errors::DefinitionError;
use crate::routers::{self, cases, CaseTest, Router};
use crate::waits::{self, Wait};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

pub type ActionFactory = fn(Value) -> Result<Box<dyn Action>, serde_json::Error>;
pub type RouterFactory = fn(Value) -> Result<Box<dyn Router>, serde_json::Error>;
pub type WaitFactory = fn(Value) -> Result<Box<dyn Wait>, serde_json::Error>;

fn action<T: Action + DeserializeOwned + 'static>(
    value: Value,
) -> Result<Box<dyn Action>, serde_json::Error> {
    Ok(Box::new(serde_json::from_value::<T>(value)?))
}

fn router<T: Router + DeserializeOwned + 'static>(
    value: Value,
) -> Result<Box<dyn Router>, serde_json::Error> {
    Ok(Box::new(serde_json::from_value::<T>(value)?))
}

fn wait<T: Wait + DeserializeOwned + 'static>(
    value: Value,
) -> Result<Box<dyn Wait>, serde_json::Error> {
    Ok(Box::new(serde_json::from_value::<T>(value)?))
}

#[derive(Default)]
pub struct Registry {
    actions: HashMap<&'static str, ActionFactory>,
    routers: HashMap<&'static str, RouterFactory>,
    waits: HashMap<&'static str, WaitFactory>,
    tests: HashMap<&'static str, CaseTest>,
}

impl Registry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in action, router, wait and case test
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();

        registry.register_action(actions::SendMsg::KIND, action::<actions::SendMsg>);
        registry.register_action(actions::SetRunResult::KIND, action::<actions::SetRunResult>);
        registry.register_action(
            actions::SetContactField::KIND,
            action::<actions::SetContactField>,
        );
        registry.register_action(
            actions::AddContactGroups::KIND,
            action::<actions::AddContactGroups>,
        );
        registry.register_action(actions::EnterFlow::KIND, action::<actions::EnterFlow>);

        registry.register_router(routers::SwitchRouter::KIND, router::<routers::SwitchRouter>);
        registry.register_router(routers::RandomRouter::KIND, router::<routers::RandomRouter>);
        registry.register_router(routers::FirstRouter::KIND, router::<routers::FirstRouter>);
        registry.register_router(
            routers::RandomOnceRouter::KIND,
            router::<routers::RandomOnceRouter>,
        );

        registry.register_wait(waits::MsgWait::KIND, wait::<waits::MsgWait>);
        registry.register_wait(waits::TimeWait::KIND, wait::<waits::TimeWait>);
        registry.register_wait(waits::NoWait::KIND, wait::<waits::NoWait>);

        for &(name, test) in cases::BUILTIN_TESTS {
            registry.register_test(name, test);
        }

        registry
    }

    pub fn register_action(&mut self, kind: &'static str, factory: ActionFactory) {
        self.actions.insert(kind, factory);
    }

    pub fn register_router(&mut self, kind: &'static str, factory: RouterFactory) {
        self.routers.insert(kind, factory);
    }

    pub fn register_wait(&mut self, kind: &'static str, factory: WaitFactory) {
        self.waits.insert(kind, factory);
    }

    pub fn register_test(&mut self, name: &'static str, test: CaseTest) {
        self.tests.insert(name, test);
    }

    pub fn case_test(&self, name: &str) -> Option<CaseTest> {
        self.tests.get(name).copied()
    }

    pub fn has_case_test(&self, name: &str) -> bool {
        self.tests.contains_key(name)
    }

    pub fn decode_action(&self, value: Value) -> Result<Box<dyn Action>, DefinitionError> {
        let factory = lookup(&self.actions, "action", &value)?;
        Ok(factory(value)?)
    }

    pub fn decode_router(&self, value: Value) -> Result<Box<dyn Router>, DefinitionError> {
        let factory = lookup(&self.routers, "router", &value)?;
        Ok(factory(value)?)
    }

    pub fn decode_wait(&self, value: Value) -> Result<Box<dyn Wait>, DefinitionError> {
        let factory = lookup(&self.waits, "wait", &value)?;
        Ok(factory(value)?)
    }
}

fn lookup<F: Copy>(
    factories: &HashMap<&'static str, F>,
    category: &'static str,
    value: &Value,
) -> Result<F, DefinitionError> {
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| DefinitionError::MissingField {
            context: category.to_string(),
            field: "type",
        })?;

    factories
        .get(kind)
        .copied()
        .ok_or_else(|| DefinitionError::UnknownType {
            category,
            kind: kind.to_string(),
        })
}
