//! Actions
//!
//! Actions run in order each time a node is visited. They may change run and
//! party state and log events on the current step. A failing action logs an
//! `error` event and the node carries on; only a missing sub-flow is fatal.

mod add_contact_groups;
mod enter_flow;
mod send_msg;
mod set_contact_field;
mod set_run_result;


use crate::assets::AssetRef;
use crate::definition::TemplateField;
use crate::engine::RunScope;
use crate::errors::ActionError;
use crate::ids::ActionId;
use serde_json::Value;
use std::fmt;

pub use add_contact_groups::AddContactGroups;
pub use enter_flow::EnterFlow;
pub use send_msg::SendMsg;
pub use set_contact_field::{FieldRef, SetContactField};
pub use set_run_result::SetRunResult;

pub trait Action: fmt::Debug + Send + Sync {
    fn kind(&self) -> &'static str;

    fn uuid(&self) -> &ActionId;

    fn execute(&self, scope: &mut RunScope<'_>) -> Result<(), ActionError>;

    /// Fields holding templates, for inspection and localization tooling
    fn templates(&self) -> Vec<TemplateField> {
        Vec::new()
    }

    /// Assets this action needs at run time
    fn dependencies(&self) -> Vec<AssetRef> {
        Vec::new()
    }

    fn to_json(&self) -> Value;
}
