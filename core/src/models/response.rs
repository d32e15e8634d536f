#![deny(missing_docs)]

//! # Response Object
//!
//! 2.0 responses carry a single `schema`, mime-keyed `examples` and flat
//! headers; they are taken from the first `content` entry. Links are 3.x only.

use super::header::Header;
use super::link::Link;
use super::media_type::{distinct_content_types, MediaType};
use super::schema::write::write_schema;
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

/// A single response of an operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    /// Description (required on the wire).
    pub description: String,
    /// Response headers.
    pub headers: IndexMap<String, RefOr<Header>>,
    /// Payload per content type.
    pub content: IndexMap<String, MediaType>,
    /// Follow-up links (3.x).
    pub links: IndexMap<String, RefOr<Link>>,
    /// Specification extensions.
    pub extensions: Extensions,
}

impl Response {
    /// A response with a description and no content.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    /// Adds a content entry.
    pub fn with_content(mut self, content_type: impl Into<String>, media: MediaType) -> Self {
        self.content.insert(content_type.into(), media);
        self
    }

    /// Distinct content types, compared case-insensitively.
    pub fn content_types(&self) -> Vec<String> {
        distinct_content_types(self.content.keys())
    }

    fn write_v2<W: OpenApiWriter>(&self, w: &mut W, ctx: &mut WriteContext<'_>) -> OasResult<()> {
        let version = SpecVersion::OpenApi2_0;
        w.write_start_object();
        w.write_property("description", self.description.as_str());
        if let Some((content_type, media)) = self.content.first() {
            w.write_optional_object("schema", media.schema.as_ref(), |w, s| {
                write_schema(s, w, ctx, version, false)
            })?;
            let example = match &media.example {
                Some(example) => Some(example.clone()),
                None => match media.examples.values().next() {
                    Some(example) => match example.effective(&ctx.resolver()) {
                        Ok(example) => example.value.clone(),
                        Err(error) => {
                            tracing::debug!(%error, "example unresolvable; dropped");
                            None
                        }
                    },
                    None => None,
                },
            };
            if let Some(example) = example {
                w.write_property_name("examples");
                w.write_start_object();
                w.write_property(content_type, example);
                w.write_end_object();
            }
        }
        write_ref_map(w, "headers", &self.headers, ctx, version)?;
        if !self.links.is_empty() {
            tracing::debug!("response links dropped");
        }
        w.write_extensions(&self.extensions);
        w.write_end_object();
        Ok(())
    }
}

impl Component for Response {
    const KIND: ReferenceType = ReferenceType::Response;

    fn lookup<'d>(doc: &'d OpenApiDocument, id: &str) -> Option<Lookup<'d, Self>> {
        lookup_in(&doc.components.responses, id)
    }
}

impl OpenApiSerializable for Response {
    fn serialize<W: OpenApiWriter>(
        &self,
        w: &mut W,
        ctx: &mut WriteContext<'_>,
        version: SpecVersion,
    ) -> OasResult<()> {
        if version.is_v2() {
            return self.write_v2(w, ctx);
        }
        w.write_start_object();
        w.write_property("description", self.description.as_str());
        write_ref_map(w, "headers", &self.headers, ctx, version)?;
        w.write_optional_map("content", &self.content, |w, _, media| media.serialize(w, ctx, version))?;
        write_ref_map(w, "links", &self.links, ctx, version)?;
        w.write_extensions(&self.extensions);
        w.write_end_object();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Schema, SchemaType};
    use crate::reference::ReferenceResolver;
    use crate::serialize::serialize_to_value;
    use crate::writer::WriterSettings;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_v2_uses_first_content_entry() {
        let response = Response::new("A pet")
            .with_content(
                "application/json",
                MediaType {
                    example: Some(json!({"id": 1})),
                    ..MediaType::with_schema(Schema::of_type(SchemaType::OBJECT))
                },
            )
            .with_content("application/xml", MediaType::with_schema(Schema::of_type(SchemaType::STRING)));

        let v2 = serialize_to_value(
            &response,
            ReferenceResolver::default(),
            SpecVersion::OpenApi2_0,
            WriterSettings::default(),
        )
        .unwrap();
        assert_eq!(
            v2,
            json!({
                "description": "A pet",
                "schema": {"type": "object"},
                "examples": {"application/json": {"id": 1}}
            })
        );
    }
}
