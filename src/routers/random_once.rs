use super::{Route, Router, RouterBase};
use crate::definition::{tagged, Exit};
use crate::engine::RunScope;
use crate::errors::RoutingError;
use crate::ids::CategoryId;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

/// Samples exits without replacement per run
///
/// Keeps no state of its own: the exits already taken are read back from the
/// run's path. Once every exit other than the default's has been taken, every
/// visit goes to the default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomOnceRouter {
    #[serde(flatten)]
    pub base: RouterBase,
    pub default_category_uuid: CategoryId,
}

impl RandomOnceRouter {
    pub const KIND: &'static str = "random_once";
}

impl Router for RandomOnceRouter {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn base(&self) -> &RouterBase {
        &self.base
    }

    fn pick_route(&self, scope: &mut RunScope<'_>, exits: &[Exit]) -> Result<Route, RoutingError> {
        let default = self
            .base
            .category(&self.default_category_uuid)
            .ok_or_else(|| RoutingError::UnknownCategory(self.default_category_uuid.to_string()))?;

        let node = scope.node_uuid().clone();
        let taken = scope.run().exits_taken_at(&node);
        let remaining: Vec<(usize, &Exit)> = exits
            .iter()
            .enumerate()
            .filter(|(_, e)| e.uuid != default.exit_uuid && !taken.contains(&&e.uuid))
            .collect();
        trace!(node = %node, taken = taken.len(), remaining = remaining.len(), "random once");

        match remaining.choose(scope.rng()) {
            Some((index, exit)) => Ok(self.base.route_to_exit(exit, index.to_string())),
            None => self
                .base
                .route_to_category(&self.default_category_uuid, default.name.clone(), None),
        }
    }

    fn validate(&self, exits: &[Exit]) -> Vec<String> {
        let mut problems = self.base.validate(exits);
        self.base
            .check_category(&self.default_category_uuid, "default", &mut problems);
        problems
    }

    fn to_json(&self) -> Value {
        tagged(Self::KIND, self)
    }
}
