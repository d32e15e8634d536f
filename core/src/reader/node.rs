#![deny(missing_docs)]

//! # Node Access
//!
//! Typed accessors over the generic `serde_json::Value` tree, and the
//! [`ParsingContext`] that collects diagnostics while a document is read.

use crate::document::DocumentId;
use crate::extensions::Extensions;
use crate::reference::pointer::child_pointer;
use crate::reference::{RefOr, ReferenceDescriptor, ReferenceType};
use crate::version::SpecVersion;
use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::fmt;

/// A problem found while reading, located by JSON pointer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Location of the offending node (`#/paths/~1pets/get`).
    pub pointer: String,
    /// What was wrong.
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.pointer, self.message)
    }
}

/// State shared by every reader function for one document.
pub(crate) struct ParsingContext {
    pub(crate) version: SpecVersion,
    pub(crate) document: DocumentId,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl ParsingContext {
    pub(crate) fn new(version: SpecVersion, document: DocumentId) -> Self {
        Self {
            version,
            document,
            diagnostics: Vec::new(),
        }
    }

    /// Records a diagnostic.
    pub(crate) fn report(&mut self, pointer: &str, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(pointer, message = %message, "OpenAPI read diagnostic");
        self.diagnostics.push(Diagnostic {
            pointer: pointer.to_string(),
            message,
        });
    }

    /// Parses a `$ref` string and adopts the descriptor into the document being read.
    pub(crate) fn reference(
        &mut self,
        raw: &str,
        kind: ReferenceType,
        pointer: &str,
    ) -> Option<ReferenceDescriptor> {
        match ReferenceDescriptor::parse(raw, kind) {
            Ok(descriptor) => {
                descriptor.ensure_host_document_is_set(self.document);
                Some(descriptor)
            }
            Err(err) => {
                self.report(pointer, err.to_string());
                None
            }
        }
    }

    /// Reads a reference-bearing slot: a `$ref` object becomes a reference,
    /// anything else is read as an inline body.
    pub(crate) fn ref_or<T>(
        &mut self,
        node: &Value,
        kind: ReferenceType,
        pointer: &str,
        read: impl FnOnce(&mut Self, &Map<String, Value>, &str) -> T,
    ) -> Option<RefOr<T>> {
        let Some(map) = node.as_object() else {
            self.report(pointer, "expected an object");
            return None;
        };
        if let Some(raw) = as_string(map, "$ref") {
            if let Some(descriptor) = self.reference(&raw, kind, pointer) {
                return Some(RefOr::Ref(descriptor));
            }
        }
        Some(RefOr::Item(read(self, map, pointer)))
    }

    /// Reads every entry of an object-valued property as a reference-bearing slot.
    pub(crate) fn ref_or_map<T>(
        &mut self,
        map: &Map<String, Value>,
        key: &str,
        kind: ReferenceType,
        pointer: &str,
        mut read: impl FnMut(&mut Self, &Map<String, Value>, &str) -> T,
    ) -> indexmap::IndexMap<String, RefOr<T>> {
        let mut out = indexmap::IndexMap::new();
        let Some(entries) = child_map(self, map, key, pointer) else {
            return out;
        };
        let section = child_pointer(pointer, key);
        for (name, node) in entries {
            let entry_pointer = child_pointer(&section, name);
            if let Some(entry) = self.ref_or(node, kind, &entry_pointer, &mut read) {
                out.insert(name.clone(), entry);
            }
        }
        out
    }
}

/// Returns the property `key` of an object node.
pub(crate) fn try_get_property<'v>(map: &'v Map<String, Value>, key: &str) -> Option<&'v Value> {
    map.get(key)
}

/// String property.
pub(crate) fn as_string(map: &Map<String, Value>, key: &str) -> Option<String> {
    try_get_property(map, key)
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Boolean property; absent means `false`.
pub(crate) fn as_bool(map: &Map<String, Value>, key: &str) -> bool {
    try_get_property(map, key)
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// Optional boolean property.
pub(crate) fn as_opt_bool(map: &Map<String, Value>, key: &str) -> Option<bool> {
    try_get_property(map, key).and_then(Value::as_bool)
}

/// Numeric property.
pub(crate) fn as_number(map: &Map<String, Value>, key: &str) -> Option<Number> {
    match try_get_property(map, key) {
        Some(Value::Number(n)) => Some(n.clone()),
        _ => None,
    }
}

/// Non-negative integer property.
pub(crate) fn as_u64(map: &Map<String, Value>, key: &str) -> Option<u64> {
    try_get_property(map, key).and_then(Value::as_u64)
}

/// Object-valued property; a non-object value is reported.
pub(crate) fn child_map<'v>(
    ctx: &mut ParsingContext,
    map: &'v Map<String, Value>,
    key: &str,
    pointer: &str,
) -> Option<&'v Map<String, Value>> {
    let value = try_get_property(map, key)?;
    match value.as_object() {
        Some(child) => Some(child),
        None => {
            ctx.report(&child_pointer(pointer, key), "expected an object");
            None
        }
    }
}

/// Array-valued property; a non-array value is reported.
pub(crate) fn child_array<'v>(
    ctx: &mut ParsingContext,
    map: &'v Map<String, Value>,
    key: &str,
    pointer: &str,
) -> Option<&'v Vec<Value>> {
    let value = try_get_property(map, key)?;
    match value.as_array() {
        Some(items) => Some(items),
        None => {
            ctx.report(&child_pointer(pointer, key), "expected an array");
            None
        }
    }
}

/// Array of strings; non-string members are skipped.
pub(crate) fn string_list(ctx: &mut ParsingContext, map: &Map<String, Value>, key: &str, pointer: &str) -> Vec<String> {
    child_array(ctx, map, key, pointer)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// String-to-string map.
pub(crate) fn string_map(
    ctx: &mut ParsingContext,
    map: &Map<String, Value>,
    key: &str,
    pointer: &str,
) -> indexmap::IndexMap<String, String> {
    child_map(ctx, map, key, pointer)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

/// Extensions of an object node.
pub(crate) fn extensions(map: &Map<String, Value>) -> Extensions {
    Extensions::from_node(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accessors() {
        let node = json!({"name": "id", "required": true, "max": 3, "tags": ["a", 1, "b"]});
        let map = node.as_object().unwrap();
        let mut ctx = ParsingContext::new(SpecVersion::OpenApi3_0, DocumentId::next());

        assert_eq!(as_string(map, "name").as_deref(), Some("id"));
        assert!(as_bool(map, "required"));
        assert!(!as_bool(map, "missing"));
        assert_eq!(as_u64(map, "max"), Some(3));
        assert_eq!(string_list(&mut ctx, map, "tags", "#"), vec!["a", "b"]);
        assert!(child_map(&mut ctx, map, "name", "#").is_none());
        assert_eq!(ctx.diagnostics[0].pointer, "#/name");
        assert_eq!(
            serde_json::to_value(&ctx.diagnostics[0]).unwrap(),
            json!({"pointer": "#/name", "message": "expected an object"})
        );
    }

    #[test]
    fn test_reference_adopts_host() {
        let document = DocumentId::next();
        let mut ctx = ParsingContext::new(SpecVersion::OpenApi3_0, document);
        let descriptor = ctx
            .reference("#/components/schemas/Pet", ReferenceType::Schema, "#")
            .unwrap();
        assert_eq!(descriptor.host_document(), Some(document));

        assert!(ctx.reference("", ReferenceType::Schema, "#/x").is_none());
        assert_eq!(ctx.diagnostics.len(), 1);
    }
}
