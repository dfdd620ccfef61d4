use super::Action;
use crate::definition::{tagged, TemplateField};
use crate::engine::RunScope;
use crate::errors::ActionError;
use crate::ids::ActionId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Saves a named result on the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetRunResult {
    pub uuid: ActionId,
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl SetRunResult {
    pub const KIND: &'static str = "set_run_result";
}

impl Action for SetRunResult {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn uuid(&self) -> &ActionId {
        &self.uuid
    }

    fn execute(&self, scope: &mut RunScope<'_>) -> Result<(), ActionError> {
        if self.name.trim().is_empty() {
            return Err(ActionError::Invalid(
                "set_run_result: result name can't be empty".to_string(),
            ));
        }

        let value = scope.evaluate_text(&self.value);
        scope.save_result(&self.name, value, self.category.clone(), None);
        Ok(())
    }

    fn templates(&self) -> Vec<TemplateField> {
        vec![TemplateField::new(self.uuid.as_str(), "value", &self.value)]
    }

    fn to_json(&self) -> Value {
        tagged(Self::KIND, self)
    }
}
