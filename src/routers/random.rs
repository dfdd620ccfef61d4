use super::{Route, Router, RouterBase};
use crate::definition::{tagged, Exit};
use crate::engine::RunScope;
use crate::errors::RoutingError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Splits traffic uniformly across every exit of the node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomRouter {
    #[serde(flatten)]
    pub base: RouterBase,
}

impl RandomRouter {
    pub const KIND: &'static str = "random";
}

impl Router for RandomRouter {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn base(&self) -> &RouterBase {
        &self.base
    }

    fn pick_route(&self, scope: &mut RunScope<'_>, exits: &[Exit]) -> Result<Route, RoutingError> {
        if exits.is_empty() {
            return Err(RoutingError::NoExits);
        }
        let index = scope.rng().gen_range(0..exits.len());
        Ok(self.base.route_to_exit(&exits[index], index.to_string()))
    }

    fn to_json(&self) -> Value {
        tagged(Self::KIND, self)
    }
}
