#![deny(missing_docs)]

//! # Header Object

use super::example::Example;
use super::media_type::MediaType;
use super::schema::write::{write_items_properties, write_schema};
use super::schema::Schema;
use super::write_ref_map;
use crate::document::OpenApiDocument;
use crate::error::OasResult;
use crate::extensions::Extensions;
use crate::reference::resolver::lookup_in;
use crate::reference::{Component, Lookup, RefOr, ReferenceType};
use crate::serialize::{OpenApiSerializable, WriteContext};
use crate::version::SpecVersion;
use crate::writer::OpenApiWriter;
use indexmap::IndexMap;
use serde_json::Value;

/// A response (or encoding) header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    /// Description.
    pub description: Option<String>,
    /// Whether the header is mandatory.
    pub required: bool,
    /// Deprecation marker.
    pub deprecated: bool,
    /// `explode` (3.x).
    pub explode: Option<bool>,
    /// Value schema.
    pub schema: Option<RefOr<Schema>>,
    /// Literal example.
    pub example: Option<Value>,
    /// Named examples (3.x).
    pub examples: IndexMap<String, RefOr<Example>>,
    /// Complex serialization (3.x).
    pub content: IndexMap<String, MediaType>,
    /// Specification extensions.
    pub extensions: Extensions,
}

impl Header {
    /// A header with the given value schema.
    pub fn with_schema(schema: impl Into<RefOr<Schema>>) -> Self {
        Self {
            schema: Some(schema.into()),
            ..Self::default()
        }
    }
}

impl Component for Header {
    const KIND: ReferenceType = ReferenceType::Header;

    fn lookup<'d>(doc: &'d OpenApiDocument, id: &str) -> Option<Lookup<'d, Self>> {
        lookup_in(&doc.components.headers, id)
    }
}

impl OpenApiSerializable for Header {
    fn serialize<W: OpenApiWriter>(
        &self,
        w: &mut W,
        ctx: &mut WriteContext<'_>,
        version: SpecVersion,
    ) -> OasResult<()> {
        w.write_start_object();
        w.write_optional_property("description", self.description.as_deref());
        if version.is_v2() {
            match self.schema.as_ref().map(|schema| schema.effective(&ctx.resolver())) {
                Some(Ok(schema)) => write_items_properties(schema, w, ctx)?,
                Some(Err(error)) => tracing::debug!(%error, "header schema unresolvable; primitive keywords dropped"),
                None => {}
            }
        } else {
            w.write_flag("required", self.required);
            w.write_flag("deprecated", self.deprecated);
            w.write_optional_property("explode", self.explode);
            w.write_optional_object("schema", self.schema.as_ref(), |w, s| {
                write_schema(s, w, ctx, version, false)
            })?;
            w.write_optional_property("example", self.example.clone());
            write_ref_map(w, "examples", &self.examples, ctx, version)?;
            w.write_optional_map("content", &self.content, |w, _, media| media.serialize(w, ctx, version))?;
        }
        w.write_extensions(&self.extensions);
        w.write_end_object();
        Ok(())
    }
}
