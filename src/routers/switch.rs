use super::{Route, Router, RouterBase};
use crate::assets::{AssetKind, AssetRef};
use crate::definition::{tagged, Exit, Localization, TemplateField};
use crate::engine::RunScope;
use crate::errors::RoutingError;
use crate::expressions::value_to_text;
use crate::ids::{CaseId, CategoryId, NodeId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// A test applied to the switch operand
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    pub uuid: CaseId,
    #[serde(rename = "type")]
    pub test: String,
    #[serde(default)]
    pub arguments: Vec<String>,
    pub category_uuid: CategoryId,
}

impl Case {
    /// Groups a `has_group` case tests membership of, one per set of arguments
    ///
    /// Translations may name a different group than the base arguments.
    pub fn dependencies(&self, localization: &Localization) -> Vec<AssetRef> {
        if self.test != "has_group" {
            return Vec::new();
        }

        let translated = localization
            .languages()
            .filter_map(|lang| localization.get(lang, self.uuid.as_str(), "arguments"));

        std::iter::once(self.arguments.as_slice())
            .chain(translated)
            .filter_map(group_ref)
            .collect()
    }
}

/// The group named by `has_group` arguments: its uuid, then optionally its name
fn group_ref(arguments: &[String]) -> Option<AssetRef> {
    let uuid = arguments.first()?;
    let name = match arguments {
        [_, name] => name.as_str(),
        _ => "",
    };
    Some(AssetRef::new(AssetKind::Group, uuid, name))
}

/// Evaluates its operand once, then tries each case in order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchRouter {
    #[serde(flatten)]
    pub base: RouterBase,
    pub operand: String,
    #[serde(default)]
    pub cases: Vec<Case>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_category_uuid: Option<CategoryId>,
}

impl SwitchRouter {
    pub const KIND: &'static str = "switch";
}

impl Router for SwitchRouter {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn base(&self) -> &RouterBase {
        &self.base
    }

    fn pick_route(&self, scope: &mut RunScope<'_>, _exits: &[Exit]) -> Result<Route, RoutingError> {
        let operand = match scope.evaluate(&self.operand) {
            Ok(value) => value,
            Err(e) => {
                scope.log_error(&e);
                Value::Null
            }
        };
        let operand = value_to_text(&operand);

        for case in &self.cases {
            let test = scope
                .case_test(&case.test)
                .ok_or_else(|| RoutingError::UnknownTest(case.test.clone()))?;

            let arguments: Vec<String> = scope
                .localize(case.uuid.as_str(), "arguments", &case.arguments)
                .iter()
                .map(|argument| scope.evaluate_text(argument))
                .collect();

            match test(&operand, &arguments, scope.party()) {
                Ok(Some(matched)) => {
                    debug!(case = %case.uuid, test = %case.test, "case matched");
                    return self.base.route_to_category(
                        &case.category_uuid,
                        matched.matched,
                        matched.extra,
                    );
                }
                Ok(None) => {}
                Err(message) => scope.log_error(&RoutingError::TestFailed {
                    test: case.test.clone(),
                    message,
                }),
            }
        }

        match &self.default_category_uuid {
            Some(default) => self.base.route_to_category(default, operand, None),
            None => Err(RoutingError::NoMatch),
        }
    }

    fn validate(&self, exits: &[Exit]) -> Vec<String> {
        let mut problems = self.base.validate(exits);
        for case in &self.cases {
            let role = format!("case {}", case.uuid);
            self.base.check_category(&case.category_uuid, &role, &mut problems);
        }
        if let Some(default) = &self.default_category_uuid {
            self.base.check_category(default, "default", &mut problems);
        }
        problems
    }

    fn templates(&self, node: &NodeId) -> Vec<TemplateField> {
        let mut templates = vec![TemplateField::new(node.as_str(), "operand", &self.operand)];
        for case in &self.cases {
            for argument in &case.arguments {
                templates.push(TemplateField::new(case.uuid.as_str(), "arguments", argument));
            }
        }
        templates
    }

    fn case_tests(&self) -> Vec<&str> {
        self.cases.iter().map(|c| c.test.as_str()).collect()
    }

    fn dependencies(&self, localization: &Localization) -> Vec<AssetRef> {
        self.cases
            .iter()
            .flat_map(|case| case.dependencies(localization))
            .collect()
    }

    fn to_json(&self) -> Value {
        tagged(Self::KIND, self)
    }
}
