#![deny(missing_docs)]

//! # Specification Extensions
//!
//! `x-` prefixed properties carried by most OpenAPI objects. Extensions are
//! always written last within their owning object.

use crate::error::{OasError, OasResult};
use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Required prefix for extension keys.
pub const EXTENSION_PREFIX: &str = "x-";

/// Ordered map of specification extensions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extensions(IndexMap<String, Value>);

impl Extensions {
    /// Creates an empty extension map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an extension, rejecting keys that lack the `x-` prefix.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> OasResult<Option<Value>> {
        let key = key.into();
        if !key.starts_with(EXTENSION_PREFIX) {
            return Err(OasError::InvalidExtension(key));
        }
        Ok(self.0.insert(key, value))
    }

    /// Builder form of [`Extensions::insert`].
    pub fn with(mut self, key: impl Into<String>, value: Value) -> OasResult<Self> {
        self.insert(key, value)?;
        Ok(self)
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Removes an extension, preserving the order of the rest.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Iterates over extensions in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Number of extensions.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no extensions are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Collects every `x-` entry of a node map. Other keys are ignored.
    pub(crate) fn from_node(map: &Map<String, Value>) -> Self {
        Self(
            map.iter()
                .filter(|(key, _)| key.starts_with(EXTENSION_PREFIX))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rejects_unprefixed_key() {
        let mut ext = Extensions::new();
        let err = ext.insert("vendor", json!(1)).unwrap_err();
        assert!(matches!(err, OasError::InvalidExtension(k) if k == "vendor"));
        assert!(ext.is_empty());
    }

    #[test]
    fn test_keeps_insertion_order() {
        let ext = Extensions::new()
            .with("x-b", json!(1))
            .unwrap()
            .with("x-a", json!(2))
            .unwrap();
        let keys: Vec<_> = ext.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["x-b", "x-a"]);
    }

    #[test]
    fn test_from_node_filters_keys() {
        let node = json!({"x-one": true, "description": "d"});
        let ext = Extensions::from_node(node.as_object().unwrap());
        assert_eq!(ext.len(), 1);
        assert_eq!(ext.get("x-one"), Some(&json!(true)));
    }
}
