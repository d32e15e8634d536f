#![deny(missing_docs)]

//! # Media Type Object
//!
//! One entry of a 3.x `content` map. Media types have no 2.0 counterpart of
//! their own: their owners (responses, request bodies) flatten them.

use super::example::Example;
use super::header::Header;
use super::schema::write::write_schema;
use super::schema::Schema;
use super::write_ref_map;
use crate::error::OasResult;
use crate::extensions::Extensions;
use crate::reference::RefOr;
use crate::serialize::{OpenApiSerializable, WriteContext};
use crate::version::SpecVersion;
use crate::writer::OpenApiWriter;
use indexmap::IndexMap;
use serde_json::Value;

/// Content-type scoped payload description.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaType {
    /// Payload schema.
    pub schema: Option<RefOr<Schema>>,
    /// Literal example.
    pub example: Option<Value>,
    /// Named examples.
    pub examples: IndexMap<String, RefOr<Example>>,
    /// Per-property encoding for form and multipart payloads.
    pub encoding: IndexMap<String, Encoding>,
    /// Specification extensions.
    pub extensions: Extensions,
}

impl MediaType {
    /// A media type with the given payload schema.
    pub fn with_schema(schema: impl Into<RefOr<Schema>>) -> Self {
        Self {
            schema: Some(schema.into()),
            ..Self::default()
        }
    }
}

/// Encoding of a single form property.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Encoding {
    /// Content type of the property.
    pub content_type: Option<String>,
    /// Extra multipart headers.
    pub headers: IndexMap<String, RefOr<Header>>,
    /// Serialization style.
    pub style: Option<String>,
    /// `explode`.
    pub explode: Option<bool>,
    /// `allowReserved`.
    pub allow_reserved: bool,
    /// Specification extensions.
    pub extensions: Extensions,
}

impl OpenApiSerializable for Encoding {
    fn serialize<W: OpenApiWriter>(
        &self,
        w: &mut W,
        ctx: &mut WriteContext<'_>,
        version: SpecVersion,
    ) -> OasResult<()> {
        w.write_start_object();
        w.write_optional_property("contentType", self.content_type.as_deref());
        write_ref_map(w, "headers", &self.headers, ctx, version)?;
        w.write_optional_property("style", self.style.as_deref());
        w.write_optional_property("explode", self.explode);
        w.write_flag("allowReserved", self.allow_reserved);
        w.write_extensions(&self.extensions);
        w.write_end_object();
        Ok(())
    }
}

impl OpenApiSerializable for MediaType {
    fn serialize<W: OpenApiWriter>(
        &self,
        w: &mut W,
        ctx: &mut WriteContext<'_>,
        version: SpecVersion,
    ) -> OasResult<()> {
        w.write_start_object();
        w.write_optional_object("schema", self.schema.as_ref(), |w, s| {
            write_schema(s, w, ctx, version, false)
        })?;
        w.write_optional_property("example", self.example.clone());
        write_ref_map(w, "examples", &self.examples, ctx, version)?;
        w.write_optional_map("encoding", &self.encoding, |w, _, e| e.serialize(w, ctx, version))?;
        w.write_extensions(&self.extensions);
        w.write_end_object();
        Ok(())
    }
}

/// Distinct content-type keys, compared case-insensitively, first spelling kept.
pub(crate) fn distinct_content_types<'a>(keys: impl IntoIterator<Item = &'a String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for key in keys {
        if !seen.iter().any(|existing| existing.eq_ignore_ascii_case(key)) {
            seen.push(key.clone());
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_content_types_ignores_case() {
        let keys = vec![
            "application/json".to_string(),
            "Application/JSON".to_string(),
            "text/plain".to_string(),
        ];
        assert_eq!(
            distinct_content_types(&keys),
            vec!["application/json".to_string(), "text/plain".to_string()]
        );
    }
}
