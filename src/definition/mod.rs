//! Flow definitions
//!
//! A [`Flow`] is an immutable graph of [`Node`]s. It is only ever built by the
//! [`FlowLoader`], which migrates the raw JSON, decodes every action, router
//! and wait through an explicit [`Registry`], and rejects the definition if
//! graph validation finds any error.

pub mod inspect;
pub mod localization;
pub mod registry;
pub mod validator;


use crate::actions::Action;
use crate::errors::DefinitionError;
use crate::ids::{ExitId, FlowId, NodeId};
use crate::migrations::{Migrator, SpecVersionGate};
use crate::routers::Router;
use crate::waits::Wait;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

pub use inspect::{Inspection, Issue, IssueKind, TemplateField};
pub use localization::Localization;
pub use registry::Registry;
pub use validator::{Severity, ValidationError, Validator};

/* ===================== Graph ===================== */

/// A directed edge out of a node. No destination means the flow ends here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exit {
    pub uuid: ExitId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_uuid: Option<NodeId>,
}

#[derive(Debug)]
pub struct Node {
    pub uuid: NodeId,
    pub actions: Vec<Box<dyn Action>>,
    pub router: Option<Box<dyn Router>>,
    pub wait: Option<Box<dyn Wait>>,
    pub exits: Vec<Exit>,
}

impl Node {
    pub fn exit(&self, uuid: &ExitId) -> Option<&Exit> {
        self.exits.iter().find(|e| &e.uuid == uuid)
    }

    pub fn to_json(&self) -> Value {
        let mut node = Map::new();
        node.insert("uuid".into(), json!(self.uuid));
        node.insert(
            "actions".into(),
            Value::Array(self.actions.iter().map(|a| a.to_json()).collect()),
        );
        if let Some(router) = &self.router {
            node.insert("router".into(), router.to_json());
        }
        if let Some(wait) = &self.wait {
            node.insert("wait".into(), wait.to_json());
        }
        node.insert("exits".into(), json!(self.exits));
        Value::Object(node)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.to_json() == other.to_json()
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/* ===================== Flow ===================== */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowType {
    #[default]
    Messaging,
    MessagingBackground,
    Voice,
}

impl FlowType {
    /// Minutes a waiting run may sit idle before its caller should expire it
    pub fn default_expire_after_minutes(self) -> u32 {
        match self {
            FlowType::Voice => 5,
            FlowType::Messaging | FlowType::MessagingBackground => 60 * 24 * 3,
        }
    }
}

/// A reference to a flow, snapshotting the version a run was started against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowRef {
    pub uuid: FlowId,
    pub name: String,
    #[serde(default)]
    pub revision: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version_hash: String,
}

impl FlowRef {
    pub fn new(uuid: impl Into<FlowId>, name: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            name: name.into(),
            revision: 0,
            version_hash: String::new(),
        }
    }
}

#[derive(Debug)]
pub struct Flow {
    pub uuid: FlowId,
    pub name: String,
    pub spec_version: String,
    pub language: String,
    pub flow_type: FlowType,
    pub revision: u32,
    pub expire_after_minutes: u32,
    pub localization: Localization,
    pub nodes: Vec<Node>,
    node_index: HashMap<NodeId, usize>,
    version_hash: String,
}

impl Flow {
    pub fn node(&self, uuid: &NodeId) -> Option<&Node> {
        self.node_index.get(uuid).map(|&i| &self.nodes[i])
    }

    pub fn first_node(&self) -> Option<&Node> {
        self.nodes.first()
    }

    /// SHA-256 of the flow's canonical JSON
    pub fn version_hash(&self) -> &str {
        &self.version_hash
    }

    pub fn reference(&self) -> FlowRef {
        FlowRef {
            uuid: self.uuid.clone(),
            name: self.name.clone(),
            revision: self.revision,
            version_hash: self.version_hash.clone(),
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "uuid": self.uuid,
            "name": self.name,
            "spec_version": self.spec_version,
            "language": self.language,
            "type": self.flow_type,
            "revision": self.revision,
            "expire_after_minutes": self.expire_after_minutes,
            "localization": self.localization,
            "nodes": self.nodes.iter().map(Node::to_json).collect::<Vec<_>>(),
        })
    }
}

impl PartialEq for Flow {
    fn eq(&self, other: &Self) -> bool {
        self.to_json() == other.to_json()
    }
}

impl Serialize for Flow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Serialize an action, router or wait along with its `type` discriminator
pub(crate) fn tagged<T: Serialize>(kind: &str, value: &T) -> Value {
    let mut json = serde_json::to_value(value).unwrap_or_else(|_| Value::Object(Map::new()));
    if let Value::Object(map) = &mut json {
        map.insert("type".into(), Value::String(kind.to_string()));
    }
    json
}

fn hash_definition(definition: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(definition.to_string().as_bytes());
    format!("{:x}", hasher.finalize())
}

/* ===================== Loader ===================== */

#[derive(Deserialize)]
struct FlowEnvelope {
    uuid: FlowId,
    #[serde(default)]
    name: String,
    spec_version: String,
    #[serde(default = "default_language")]
    language: String,
    #[serde(default, rename = "type")]
    flow_type: FlowType,
    #[serde(default)]
    revision: u32,
    #[serde(default)]
    expire_after_minutes: Option<u32>,
    #[serde(default)]
    localization: Localization,
    #[serde(default)]
    nodes: Vec<NodeEnvelope>,
}

fn default_language() -> String {
    "eng".to_string()
}

#[derive(Deserialize)]
struct NodeEnvelope {
    uuid: NodeId,
    #[serde(default)]
    actions: Vec<Value>,
    #[serde(default)]
    router: Option<Value>,
    #[serde(default)]
    wait: Option<Value>,
    #[serde(default)]
    exits: Vec<Exit>,
}

/// Turns raw definitions into validated flows
pub struct FlowLoader {
    registry: Arc<Registry>,
    migrator: Arc<dyn Migrator>,
    validator: Validator,
}

impl FlowLoader {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            migrator: Arc::new(SpecVersionGate),
            validator: Validator::new(),
        }
    }

    pub fn with_migrator(mut self, migrator: Arc<dyn Migrator>) -> Self {
        self.migrator = migrator;
        self
    }

    pub fn load_str(&self, definition: &str) -> Result<Flow, DefinitionError> {
        let value: Value = serde_json::from_str(definition)?;
        self.load(&value)
    }

    /// Migrate, decode and validate a definition
    pub fn load(&self, definition: &Value) -> Result<Flow, DefinitionError> {
        let mut flow = self.decode(definition)?;

        let (errors, warnings): (Vec<_>, Vec<_>) = self
            .validator
            .validate(&flow)
            .into_iter()
            .partition(ValidationError::is_error);

        for warning in &warnings {
            warn!(flow_id = %flow.uuid, rule = warning.rule_id, "{}", warning);
        }
        if !errors.is_empty() {
            return Err(DefinitionError::Invalid {
                flow: flow.uuid,
                errors,
            });
        }

        flow.version_hash = hash_definition(&flow.to_json());
        debug!(flow_id = %flow.uuid, nodes = flow.nodes.len(), "loaded flow");
        Ok(flow)
    }

    /// Migrate and decode a definition without validating its graph
    pub(crate) fn decode(&self, definition: &Value) -> Result<Flow, DefinitionError> {
        let normalized = self.migrator.normalize(definition.clone())?;
        let envelope: FlowEnvelope = serde_json::from_value(normalized)?;

        let nodes = envelope
            .nodes
            .into_iter()
            .map(|node| self.decode_node(node))
            .collect::<Result<Vec<_>, _>>()?;

        let node_index = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.uuid.clone(), i))
            .collect();

        Ok(Flow {
            uuid: envelope.uuid,
            name: envelope.name,
            spec_version: envelope.spec_version,
            language: envelope.language,
            flow_type: envelope.flow_type,
            revision: envelope.revision,
            expire_after_minutes: envelope
                .expire_after_minutes
                .unwrap_or_else(|| envelope.flow_type.default_expire_after_minutes()),
            localization: envelope.localization,
            nodes,
            node_index,
            version_hash: String::new(),
        })
    }

    fn decode_node(&self, node: NodeEnvelope) -> Result<Node, DefinitionError> {
        let actions = node
            .actions
            .into_iter()
            .map(|a| self.registry.decode_action(a))
            .collect::<Result<Vec<_>, _>>()?;
        let router = node
            .router
            .map(|r| self.registry.decode_router(r))
            .transpose()?;
        let wait = node
            .wait
            .map(|w| self.registry.decode_wait(w))
            .transpose()?;

        Ok(Node {
            uuid: node.uuid,
            actions,
            router,
            wait,
            exits: node.exits,
        })
    }
}
