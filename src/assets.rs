//! Asset resolution
//!
//! Actions and routers look up referenced flows, groups, fields and channels
//! by identifier through an [`AssetResolver`]. The interpreter loop itself
//! never touches assets.

use crate::definition::{Flow, FlowLoader};
use crate::errors::{AssetError, DefinitionError};
use crate::ids::FlowId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Flow,
    Group,
    Field,
    Channel,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetKind::Flow => "flow",
            AssetKind::Group => "group",
            AssetKind::Field => "field",
            AssetKind::Channel => "channel",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub uuid: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub key: String,
    pub name: String,
    #[serde(default = "default_value_type")]
    pub value_type: String,
}

fn default_value_type() -> String {
    "text".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub uuid: String,
    pub name: String,
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Clone)]
pub enum Asset {
    Flow(Arc<Flow>),
    Group(Group),
    Field(Field),
    Channel(Channel),
}

/// A dependency on an asset, as declared by an action or router
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetRef {
    pub kind: AssetKind,
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

impl AssetRef {
    pub fn new(kind: AssetKind, id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            name: name.into(),
        }
    }
}

/* ===================== Resolver ===================== */

pub trait AssetResolver: Send + Sync {
    fn get(&self, kind: AssetKind, id: &str) -> Result<Asset, AssetError>;

    fn flow(&self, id: &FlowId) -> Result<Arc<Flow>, AssetError> {
        match self.get(AssetKind::Flow, id.as_str())? {
            Asset::Flow(flow) => Ok(flow),
            _ => Err(AssetError::NotFound {
                kind: AssetKind::Flow,
                id: id.to_string(),
            }),
        }
    }

    fn group(&self, id: &str) -> Result<Group, AssetError> {
        match self.get(AssetKind::Group, id)? {
            Asset::Group(group) => Ok(group),
            _ => Err(AssetError::NotFound {
                kind: AssetKind::Group,
                id: id.to_string(),
            }),
        }
    }

    fn field(&self, key: &str) -> Result<Field, AssetError> {
        match self.get(AssetKind::Field, key)? {
            Asset::Field(field) => Ok(field),
            _ => Err(AssetError::NotFound {
                kind: AssetKind::Field,
                id: key.to_string(),
            }),
        }
    }
}

/// In-memory assets, typically loaded once from a bundle file
#[derive(Debug, Default, Clone)]
pub struct StaticAssets {
    flows: HashMap<String, Arc<Flow>>,
    groups: HashMap<String, Group>,
    fields: HashMap<String, Field>,
    channels: HashMap<String, Channel>,
}

#[derive(Debug, Default, Deserialize)]
struct Bundle {
    #[serde(default)]
    flows: Vec<serde_json::Value>,
    #[serde(default)]
    groups: Vec<Group>,
    #[serde(default)]
    fields: Vec<Field>,
    #[serde(default)]
    channels: Vec<Channel>,
}

impl StaticAssets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a bundle of the form `{"flows": [...], "groups": [...], "fields": [...], "channels": [...]}`
    ///
    /// Every flow goes through the loader, so a bundle with one invalid flow
    /// fails as a whole.
    pub fn from_bundle(
        bundle: &serde_json::Value,
        loader: &FlowLoader,
    ) -> Result<Self, DefinitionError> {
        let bundle: Bundle = serde_json::from_value(bundle.clone())?;
        let mut assets = Self::new();
        for definition in &bundle.flows {
            assets = assets.with_flow(loader.load(definition)?);
        }
        for group in bundle.groups {
            assets = assets.with_group(group);
        }
        for field in bundle.fields {
            assets = assets.with_field(field);
        }
        for channel in bundle.channels {
            assets.channels.insert(channel.uuid.clone(), channel);
        }
        Ok(assets)
    }

    pub fn with_flow(mut self, flow: Flow) -> Self {
        self.flows.insert(flow.uuid.to_string(), Arc::new(flow));
        self
    }

    pub fn with_group(mut self, group: Group) -> Self {
        self.groups.insert(group.uuid.clone(), group);
        self
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.insert(field.key.clone(), field);
        self
    }
}

impl AssetResolver for StaticAssets {
    fn get(&self, kind: AssetKind, id: &str) -> Result<Asset, AssetError> {
        let found = match kind {
            AssetKind::Flow => self.flows.get(id).cloned().map(Asset::Flow),
            AssetKind::Group => self.groups.get(id).cloned().map(Asset::Group),
            AssetKind::Field => self.fields.get(id).cloned().map(Asset::Field),
            AssetKind::Channel => self.channels.get(id).cloned().map(Asset::Channel),
        };
        found.ok_or_else(|| AssetError::NotFound {
            kind,
            id: id.to_string(),
        })
    }
}
