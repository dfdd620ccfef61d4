//! Localized text
//!
//! `language -> item uuid -> property -> [translations]`. Properties are
//! arrays so that multi-valued fields such as quick replies translate as a
//! unit.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

type ItemTranslations = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Localization(BTreeMap<String, BTreeMap<String, ItemTranslations>>);

impl Localization {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn get(&self, language: &str, item_uuid: &str, property: &str) -> Option<&[String]> {
        self.0
            .get(language)?
            .get(item_uuid)?
            .get(property)
            .map(Vec::as_slice)
    }

    pub fn set(
        &mut self,
        language: impl Into<String>,
        item_uuid: impl Into<String>,
        property: impl Into<String>,
        values: Vec<String>,
    ) {
        self.0
            .entry(language.into())
            .or_default()
            .entry(item_uuid.into())
            .or_default()
            .insert(property.into(), values);
    }

    /// Translated values for `language`, falling back to `base` when there is no
    /// non-empty translation
    pub fn resolve<'a>(
        &'a self,
        language: Option<&str>,
        item_uuid: &str,
        property: &str,
        base: &'a [String],
    ) -> &'a [String] {
        language
            .and_then(|lang| self.get(lang, item_uuid, property))
            .filter(|values| !values.is_empty())
            .unwrap_or(base)
    }
}
