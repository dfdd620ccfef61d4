use super::Action;
use crate::assets::{AssetKind, AssetRef};
use crate::definition::{tagged, TemplateField};
use crate::engine::RunScope;
use crate::errors::ActionError;
use crate::events::EventKind;
use crate::ids::ActionId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRef {
    pub key: String,
    #[serde(default)]
    pub name: String,
}

/// Updates one of the party's fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetContactField {
    pub uuid: ActionId,
    pub field: FieldRef,
    pub value: String,
}

impl SetContactField {
    pub const KIND: &'static str = "set_contact_field";
}

impl Action for SetContactField {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn uuid(&self) -> &ActionId {
        &self.uuid
    }

    fn execute(&self, scope: &mut RunScope<'_>) -> Result<(), ActionError> {
        scope
            .assets()
            .field(&self.field.key)
            .map_err(ActionError::MissingAsset)?;

        let value = scope.evaluate_text(&self.value);
        let value = value.trim().to_string();

        let fields = &mut scope.party_mut().fields;
        if fields.get(&self.field.key) == Some(&value) {
            return Ok(());
        }
        if value.is_empty() {
            fields.remove(&self.field.key);
        } else {
            fields.insert(self.field.key.clone(), value.clone());
        }

        scope.log(EventKind::ContactFieldChanged {
            field: self.field.key.clone(),
            value,
        });
        Ok(())
    }

    fn templates(&self) -> Vec<TemplateField> {
        vec![TemplateField::new(self.uuid.as_str(), "value", &self.value)]
    }

    fn dependencies(&self) -> Vec<AssetRef> {
        vec![AssetRef::new(AssetKind::Field, &self.field.key, &self.field.name)]
    }

    fn to_json(&self) -> Value {
        tagged(Self::KIND, self)
    }
}
