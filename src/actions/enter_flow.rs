use super::Action;
use crate::assets::{AssetKind, AssetRef};
use crate::definition::{tagged, FlowRef};
use crate::engine::RunScope;
use crate::errors::ActionError;
use crate::ids::ActionId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Starts a child run of another flow
///
/// The rest of the node's actions are skipped. When the child finishes, the
/// parent routes its node with `@child` available to the router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnterFlow {
    pub uuid: ActionId,
    pub flow: FlowRef,
}

impl EnterFlow {
    pub const KIND: &'static str = "enter_flow";
}

impl Action for EnterFlow {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn uuid(&self) -> &ActionId {
        &self.uuid
    }

    fn execute(&self, scope: &mut RunScope<'_>) -> Result<(), ActionError> {
        let flow = scope
            .assets()
            .flow(&self.flow.uuid)
            .map_err(|_| ActionError::MissingFlow(self.flow.uuid.clone()))?;
        scope.enter_flow(flow);
        Ok(())
    }

    fn dependencies(&self) -> Vec<AssetRef> {
        vec![AssetRef::new(
            AssetKind::Flow,
            self.flow.uuid.as_str(),
            &self.flow.name,
        )]
    }

    fn to_json(&self) -> Value {
        tagged(Self::KIND, self)
    }
}
