#![deny(missing_docs)]

//! # Value Writer
//!
//! An [`OpenApiWriter`] that assembles a `serde_json::Value` tree.

use super::{OpenApiWriter, WriterSettings};
use crate::error::OasResult;
use serde_json::{Map, Value};

enum Frame {
    Object {
        map: Map<String, Value>,
        pending: Option<String>,
    },
    Array(Vec<Value>),
}

/// Builds a JSON tree from writer calls.
pub struct ValueWriter {
    settings: WriterSettings,
    stack: Vec<Frame>,
    root: Option<Value>,
}

impl ValueWriter {
    /// Creates a writer with the given settings.
    pub fn new(settings: WriterSettings) -> Self {
        Self {
            settings,
            stack: Vec::new(),
            root: None,
        }
    }

    /// Consumes the writer, returning the finished tree (`null` if nothing was written).
    pub fn into_value(self) -> Value {
        self.root.unwrap_or(Value::Null)
    }

    /// Renders the finished tree as pretty JSON.
    pub fn into_json_string(self) -> OasResult<String> {
        Ok(serde_json::to_string_pretty(&self.into_value())?)
    }

    /// Renders the finished tree as YAML.
    pub fn into_yaml_string(self) -> OasResult<String> {
        Ok(serde_yaml::to_string(&self.into_value())?)
    }

    fn emit(&mut self, value: Value) {
        match self.stack.last_mut() {
            None => self.root = Some(value),
            Some(Frame::Array(items)) => items.push(value),
            Some(Frame::Object { map, pending }) => match pending.take() {
                Some(name) => {
                    map.insert(name, value);
                }
                None => tracing::warn!("value written into an object without a property name; dropped"),
            },
        }
    }
}

impl Default for ValueWriter {
    fn default() -> Self {
        Self::new(WriterSettings::default())
    }
}

impl OpenApiWriter for ValueWriter {
    fn settings(&self) -> &WriterSettings {
        &self.settings
    }

    fn write_start_object(&mut self) {
        self.stack.push(Frame::Object {
            map: Map::new(),
            pending: None,
        });
    }

    fn write_end_object(&mut self) {
        match self.stack.pop() {
            Some(Frame::Object { map, .. }) => self.emit(Value::Object(map)),
            Some(other) => {
                tracing::warn!("write_end_object called while an array is open");
                self.stack.push(other);
            }
            None => tracing::warn!("write_end_object called with no open object"),
        }
    }

    fn write_start_array(&mut self) {
        self.stack.push(Frame::Array(Vec::new()));
    }

    fn write_end_array(&mut self) {
        match self.stack.pop() {
            Some(Frame::Array(items)) => self.emit(Value::Array(items)),
            Some(other) => {
                tracing::warn!("write_end_array called while an object is open");
                self.stack.push(other);
            }
            None => tracing::warn!("write_end_array called with no open array"),
        }
    }

    fn write_property_name(&mut self, name: &str) {
        match self.stack.last_mut() {
            Some(Frame::Object { pending, .. }) => *pending = Some(name.to_string()),
            _ => tracing::warn!(name, "property name written outside of an object"),
        }
    }

    fn write_value(&mut self, value: Value) {
        self.emit(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builds_nested_tree() {
        let mut writer = ValueWriter::default();
        writer.write_start_object();
        writer.write_property("type", "object");
        writer.write_property_name("required");
        writer.write_start_array();
        writer.write_value("id".into());
        writer.write_end_array();
        writer.write_property_name("properties");
        writer.write_start_object();
        writer.write_end_object();
        writer.write_end_object();

        assert_eq!(
            writer.into_value(),
            json!({"type": "object", "required": ["id"], "properties": {}})
        );
    }

    #[test]
    fn test_preserves_property_order() {
        let mut writer = ValueWriter::default();
        writer.write_start_object();
        writer.write_property("b", 1);
        writer.write_property("a", 2);
        writer.write_end_object();
        let value = writer.into_value();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn test_yaml_rendering() {
        let mut writer = ValueWriter::default();
        writer.write_start_object();
        writer.write_property("swagger", "2.0");
        writer.write_end_object();
        let yaml = writer.into_yaml_string().unwrap();
        assert!(yaml.contains("swagger: '2.0'") || yaml.contains("swagger: \"2.0\""));
    }
}
