use super::{Route, Router, RouterBase};
use crate::definition::{tagged, Exit};
use crate::engine::RunScope;
use crate::errors::RoutingError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Always leaves by the node's first exit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirstRouter {
    #[serde(flatten)]
    pub base: RouterBase,
}

impl FirstRouter {
    pub const KIND: &'static str = "first";
}

impl Router for FirstRouter {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn base(&self) -> &RouterBase {
        &self.base
    }

    fn pick_route(&self, _scope: &mut RunScope<'_>, exits: &[Exit]) -> Result<Route, RoutingError> {
        let first = exits.first().ok_or(RoutingError::NoExits)?;
        Ok(self.base.route_to_exit(first, ""))
    }

    fn to_json(&self) -> Value {
        tagged(Self::KIND, self)
    }
}
