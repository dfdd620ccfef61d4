//! The party a session runs for, and the messages exchanged with it

use crate::ids::{MsgId, PartyId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A reference to a group, as carried on a party or an action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRef {
    pub uuid: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Party {
    pub uuid: PartyId,
    #[serde(default)]
    pub name: String,
    /// ISO 639-3 language code, used for localized text lookups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    #[serde(default)]
    pub groups: Vec<GroupRef>,
}

impl Party {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uuid: PartyId::generate(),
            name: name.into(),
            language: None,
            fields: BTreeMap::new(),
            groups: Vec::new(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn in_group(&self, uuid: &str) -> bool {
        self.groups.iter().any(|g| g.uuid == uuid)
    }

    /// Add a group, returning false if the party was already a member
    pub fn add_group(&mut self, group: GroupRef) -> bool {
        if self.in_group(&group.uuid) {
            return false;
        }
        self.groups.push(group);
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Msg {
    pub uuid: MsgId,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quick_replies: Vec<String>,
}

impl Msg {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            uuid: MsgId::generate(),
            text: text.into(),
            attachments: Vec::new(),
            quick_replies: Vec::new(),
        }
    }
}
