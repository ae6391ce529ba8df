//! Audit events recorded on every entity mutation.

use crate::types::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    Created,
    Updated,
    Archived,
    Restored,
}

/// Who initiated a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventSource {
    Cli,
    Notion,
}

/// One entry of an entity's history. `fields` holds only what the
/// mutation changed, keyed by field name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    pub source: EventSource,
    pub entity_version: u32,
    pub timestamp: Timestamp,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, serde_json::Value>,
}

/// Field changes accumulated by a mutating method before the event is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldChanges(BTreeMap<String, serde_json::Value>);

impl FieldChanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record<T: Serialize>(&mut self, field: &'static str, value: &T) {
        let value = serde_json::to_value(value).unwrap_or(serde_json::Value::Null);
        self.0.insert(field.to_string(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub(crate) fn into_inner(self) -> BTreeMap<String, serde_json::Value> {
        self.0
    }
}
