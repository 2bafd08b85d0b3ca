use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::{StoreError, StoreResult};

/// Members consumed by the summary itself rather than copied into `fields`.
const RESERVED: [&str; 5] = ["title", "name", "description", "tags", "labels"];

/// What the store knows about an object without reading its body: display
/// name, description, labels, and top-level scalar fields.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ObjectSummary {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, Value>,
}

impl ObjectSummary {
    /// Build a summary from a body. Bodies that are not a JSON object give
    /// an empty summary.
    pub fn extract(body: &[u8]) -> Self {
        let Ok(Value::Object(members)) = serde_json::from_slice::<Value>(body) else {
            return Self::default();
        };

        let text = |key: &str| {
            members
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        let mut labels = BTreeMap::new();
        if let Some(Value::Array(tags)) = members.get("tags") {
            for tag in tags.iter().filter_map(Value::as_str) {
                labels.insert(tag.to_string(), String::new());
            }
        }
        if let Some(Value::Object(map)) = members.get("labels") {
            for (key, value) in map {
                if let Some(value) = value.as_str() {
                    labels.insert(key.clone(), value.to_string());
                }
            }
        }

        let fields = members
            .iter()
            .filter(|(key, value)| {
                !RESERVED.contains(&key.as_str())
                    && matches!(value, Value::Bool(_) | Value::Number(_) | Value::String(_))
            })
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Self {
            name: text("title").or_else(|| text("name")).unwrap_or_default(),
            description: text("description").unwrap_or_default(),
            labels,
            fields,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
            && self.description.is_empty()
            && self.labels.is_empty()
            && self.fields.is_empty()
    }

    /// JSON text for the `summary` wire field; empty when there is nothing
    /// to say.
    pub fn to_json(&self) -> StoreResult<Vec<u8>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }
        serde_json::to_vec(self).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// JSON text for a search hit's `fields`; empty when there are none.
    pub fn fields_json(&self) -> StoreResult<Vec<u8>> {
        if self.fields.is_empty() {
            return Ok(Vec::new());
        }
        serde_json::to_vec(&self.fields).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Case-insensitive match of `needle` against the name and description.
    pub fn matches_text(&self, needle_lower: &str) -> bool {
        self.name.to_lowercase().contains(needle_lower)
            || self.description.to_lowercase().contains(needle_lower)
    }
}
