//! Backing JSON document: resource names mapped to collections or singular values.

use std::path::Path;

use serde_json::{Map, Value};

use crate::shared::DatasetError;

/// The dataset as loaded at startup.
///
/// Array values are collections (`books`, `authors`, ...); any other value
/// is a singular resource (`profile`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    resources: Map<String, Value>,
}

impl Dataset {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self, DatasetError> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, DatasetError> {
        match value {
            Value::Object(resources) => Ok(Self { resources }),
            _ => Err(DatasetError::NotAnObject),
        }
    }

    /// Resource names in document order.
    pub fn resource_names(&self) -> Vec<&str> {
        self.resources.keys().map(String::as_str).collect()
    }

    /// Names of array-valued resources only.
    pub fn collection_names(&self) -> Vec<&str> {
        self.resources
            .iter()
            .filter(|(_, value)| value.is_array())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn into_resources(self) -> Map<String, Value> {
        self.resources
    }
}
