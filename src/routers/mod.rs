//! Routers
//!
//! A router chooses one exit per visit to its node. Decision routers group
//! exits into named [`Category`]s so results read as human outcomes; the
//! engine saves the chosen category under the router's `result_name`.
//!
//! | type          | picks                                                  |
//! |---------------|--------------------------------------------------------|
//! | `switch`      | the first case whose test matches, else the default    |
//! | `random`      | any exit, uniformly                                    |
//! | `first`       | the first exit                                         |
//! | `random_once` | an exit this run hasn't taken here yet, else the default |

pub mod cases;
mod first;
mod random;
mod random_once;
mod switch;


use crate::assets::AssetRef;
use crate::definition::{Exit, Localization, TemplateField};
use crate::engine::RunScope;
use crate::errors::RoutingError;
use crate::ids::{CategoryId, ExitId, NodeId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

pub use cases::{CaseTest, TestMatch};
pub use first::FirstRouter;
pub use random::RandomRouter;
pub use random_once::RandomOnceRouter;
pub use switch::{Case, SwitchRouter};

/* ===================== Route ===================== */

/// The outcome of routing: which exit to leave by and why
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub exit_uuid: ExitId,
    pub category_uuid: Option<CategoryId>,
    /// The value that produced this route, saved as the result value
    pub matched: String,
    pub extra: Option<Value>,
}

/* ===================== Categories ===================== */

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub uuid: CategoryId,
    pub name: String,
    pub exit_uuid: ExitId,
}

/// Fields shared by every router
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouterBase {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_name: Option<String>,
}

impl RouterBase {
    pub fn category(&self, uuid: &CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| &c.uuid == uuid)
    }

    pub fn category_for_exit(&self, exit: &ExitId) -> Option<&Category> {
        self.categories.iter().find(|c| &c.exit_uuid == exit)
    }

    /// Check categories against the owning node's exits
    pub fn validate(&self, exits: &[Exit]) -> Vec<String> {
        let exit_ids: HashSet<_> = exits.iter().map(|e| &e.uuid).collect();
        let mut seen = HashSet::new();
        let mut problems = Vec::new();

        for category in &self.categories {
            if !seen.insert(&category.uuid) {
                problems.push(format!("category id {} is used more than once", category.uuid));
            }
            if !exit_ids.contains(&category.exit_uuid) {
                problems.push(format!(
                    "category '{}' uses exit {} which is not an exit of this node",
                    category.name, category.exit_uuid
                ));
            }
        }

        problems
    }

    /// Require a category to be declared, reporting it as a validation problem
    pub(crate) fn check_category(&self, uuid: &CategoryId, role: &str, problems: &mut Vec<String>) {
        if self.category(uuid).is_none() {
            problems.push(format!("{} references undefined category {}", role, uuid));
        }
    }

    pub fn route_to_category(
        &self,
        uuid: &CategoryId,
        matched: impl Into<String>,
        extra: Option<Value>,
    ) -> Result<Route, RoutingError> {
        let category = self
            .category(uuid)
            .ok_or_else(|| RoutingError::UnknownCategory(uuid.to_string()))?;
        Ok(Route {
            exit_uuid: category.exit_uuid.clone(),
            category_uuid: Some(category.uuid.clone()),
            matched: matched.into(),
            extra,
        })
    }

    /// Route through an exit directly, labelling it with its category if it has one
    pub fn route_to_exit(&self, exit: &Exit, matched: impl Into<String>) -> Route {
        Route {
            exit_uuid: exit.uuid.clone(),
            category_uuid: self.category_for_exit(&exit.uuid).map(|c| c.uuid.clone()),
            matched: matched.into(),
            extra: None,
        }
    }
}

/* ===================== Router ===================== */

pub trait Router: fmt::Debug + Send + Sync {
    fn kind(&self) -> &'static str;

    fn base(&self) -> &RouterBase;

    /// Choose an exit for this visit
    fn pick_route(&self, scope: &mut RunScope<'_>, exits: &[Exit]) -> Result<Route, RoutingError>;

    /// Problems with this router given its node's exits, empty when valid
    fn validate(&self, exits: &[Exit]) -> Vec<String> {
        self.base().validate(exits)
    }

    fn templates(&self, _node: &NodeId) -> Vec<TemplateField> {
        Vec::new()
    }

    /// Names of the case tests this router evaluates
    fn case_tests(&self) -> Vec<&str> {
        Vec::new()
    }

    /// Assets this router needs at run time, in any of the flow's languages
    fn dependencies(&self, _localization: &Localization) -> Vec<AssetRef> {
        Vec::new()
    }

    fn to_json(&self) -> Value;
}
