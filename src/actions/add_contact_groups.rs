use super::Action;
use crate::assets::{AssetKind, AssetRef};
use crate::definition::tagged;
use crate::engine::RunScope;
use crate::errors::ActionError;
use crate::events::EventKind;
use crate::ids::ActionId;
use crate::party::GroupRef;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Adds the party to groups it isn't already in
///
/// Groups the asset resolver can't find are reported and skipped; the rest
/// are still added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddContactGroups {
    pub uuid: ActionId,
    pub groups: Vec<GroupRef>,
}

impl AddContactGroups {
    pub const KIND: &'static str = "add_contact_groups";
}

impl Action for AddContactGroups {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn uuid(&self) -> &ActionId {
        &self.uuid
    }

    fn execute(&self, scope: &mut RunScope<'_>) -> Result<(), ActionError> {
        let mut added = Vec::new();

        for group in &self.groups {
            let resolved = match scope.assets().group(&group.uuid) {
                Ok(resolved) => resolved,
                Err(e) => {
                    scope.log_error(&ActionError::MissingAsset(e));
                    continue;
                }
            };

            let group = GroupRef {
                uuid: resolved.uuid,
                name: resolved.name,
            };
            if scope.party_mut().add_group(group.clone()) {
                added.push(group);
            }
        }

        if !added.is_empty() {
            scope.log(EventKind::ContactGroupsChanged {
                groups_added: added,
            });
        }
        Ok(())
    }

    fn dependencies(&self) -> Vec<AssetRef> {
        self.groups
            .iter()
            .map(|g| AssetRef::new(AssetKind::Group, &g.uuid, &g.name))
            .collect()
    }

    fn to_json(&self) -> Value {
        tagged(Self::KIND, self)
    }
}
