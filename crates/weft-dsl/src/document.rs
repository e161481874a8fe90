use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::DslError;
use crate::step::Step;

/// The persisted payload of one workflow: identity plus its step list.
///
/// Loading is tolerant by contract: `id` and `name` may be absent (the
/// caller supplies or generates them), and a missing or non-list `steps`
/// field is treated as an empty workflow. Steps may arrive in either flat
/// (marker-delimited) or nested shape; the document does not normalize,
/// that is the hierarchy module's job.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FlowDocument {
    /// Stable workflow identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Human-readable workflow name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// The workflow's steps, flat or nested
    #[serde(default, deserialize_with = "steps_or_empty")]
    pub steps: Vec<Step>,
}

/// Accept a missing, `null`, or non-array `steps` field as an empty list.
fn steps_or_empty<'de, D>(deserializer: D) -> Result<Vec<Step>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(serde::de::Error::custom))
            .collect(),
        _ => Ok(Vec::new()),
    }
}

impl FlowDocument {
    /// Create an empty document with the given name
    pub fn named(name: &str) -> Self {
        FlowDocument {
            id: None,
            name: Some(name.to_string()),
            steps: Vec::new(),
        }
    }

    /// Parse a workflow document from a JSON string
    pub fn from_json_str(text: &str) -> Result<FlowDocument, DslError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parse a workflow document from a YAML string
    pub fn from_yaml_str(text: &str) -> Result<FlowDocument, DslError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Serialize the document to a JSON string
    pub fn to_json_string(&self) -> Result<String, DslError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
