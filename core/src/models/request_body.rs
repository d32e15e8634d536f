#![deny(missing_docs)]

//! # Request Body Object
//!
//! 3.x only. Going to 2.0 a request body turns into parameters: form payloads
//! become one `formData` parameter per schema property, anything else becomes
//! a single `body` parameter named by the `x-bodyName` extension.

use super::media_type::{distinct_content_types, MediaType};
use super::schema::write::{write_items_properties, write_schema};
use super::schema::{Schema, SchemaType};
use crate::document::OpenApiDocument;
use crate::error::OasResult;
use crate::extensions::Extensions;
use crate::reference::resolver::lookup_in;
use crate::reference::{Component, Lookup, ReferenceType};
use crate::serialize::{OpenApiSerializable, WriteContext};
use crate::version::SpecVersion;
use crate::writer::OpenApiWriter;
use indexmap::IndexMap;
use tracing::debug;

/// Extension carrying the 2.0 body parameter name.
pub const BODY_NAME_EXTENSION: &str = "x-bodyName";

/// Name of a 2.0 body parameter when `x-bodyName` is absent.
pub const DEFAULT_BODY_NAME: &str = "body";

/// Content types that 2.0 expresses as `formData` parameters.
pub const FORM_CONTENT_TYPES: [&str; 2] = ["application/x-www-form-urlencoded", "multipart/form-data"];

/// A request payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestBody {
    /// Description.
    pub description: Option<String>,
    /// Payload per content type.
    pub content: IndexMap<String, MediaType>,
    /// Whether the body is mandatory.
    pub required: bool,
    /// Specification extensions.
    pub extensions: Extensions,
}

impl RequestBody {
    /// A body with one content entry.
    pub fn with_content(content_type: impl Into<String>, media: MediaType) -> Self {
        let mut body = Self::default();
        body.content.insert(content_type.into(), media);
        body
    }

    /// Distinct content types, compared case-insensitively.
    pub fn content_types(&self) -> Vec<String> {
        distinct_content_types(self.content.keys())
    }

    /// The first content entry with a form content type.
    pub fn form_content(&self) -> Option<&MediaType> {
        self.content
            .iter()
            .find(|(key, _)| FORM_CONTENT_TYPES.iter().any(|form| form.eq_ignore_ascii_case(key)))
            .map(|(_, media)| media)
    }

    /// The 2.0 body parameter name.
    pub fn body_name(&self) -> &str {
        self.extensions
            .get(BODY_NAME_EXTENSION)
            .and_then(|v| v.as_str())
            .unwrap_or(DEFAULT_BODY_NAME)
    }

    /// Writes the single 2.0 `in: body` parameter.
    pub(crate) fn write_v2_body_parameter<W: OpenApiWriter>(
        &self,
        w: &mut W,
        ctx: &mut WriteContext<'_>,
    ) -> OasResult<()> {
        w.write_start_object();
        w.write_property("name", self.body_name());
        w.write_property("in", "body");
        w.write_optional_property("description", self.description.as_deref());
        w.write_flag("required", self.required);
        let schema = self.content.values().next().and_then(|media| media.schema.as_ref());
        match schema {
            Some(schema) => {
                w.write_property_name("schema");
                write_schema(schema, w, ctx, SpecVersion::OpenApi2_0, false)?;
            }
            None => {
                w.write_property_name("schema");
                w.write_start_object();
                w.write_end_object();
            }
        }
        for (key, value) in self.extensions.iter() {
            if key != BODY_NAME_EXTENSION {
                w.write_property(key, value.clone());
            }
        }
        w.write_end_object();
        Ok(())
    }

    /// Writes one 2.0 `in: formData` parameter per property of the form schema.
    ///
    /// Binary and base64 strings become `type: file`.
    pub(crate) fn write_v2_form_parameters<W: OpenApiWriter>(
        &self,
        w: &mut W,
        ctx: &mut WriteContext<'_>,
    ) -> OasResult<()> {
        let resolver = ctx.resolver();
        let Some(schema) = self.form_content().and_then(|media| media.schema.as_ref()) else {
            return Ok(());
        };
        let schema = match schema.effective(&resolver) {
            Ok(schema) => schema,
            Err(error) => {
                debug!(%error, "form schema unresolvable; no formData parameters");
                return Ok(());
            }
        };
        for (name, property) in &schema.properties {
            w.write_start_object();
            w.write_property("name", name.as_str());
            w.write_property("in", "formData");
            match property.effective(&resolver) {
                Ok(property) => {
                    w.write_optional_property("description", property.description.as_deref());
                    w.write_flag("required", schema.required.contains(name));
                    if is_file(property) {
                        w.write_property("type", "file");
                    } else {
                        write_items_properties(property, w, ctx)?;
                    }
                    w.write_extensions(&property.extensions);
                }
                Err(error) => {
                    debug!(property = %name, %error, "form property unresolvable; keywords dropped");
                    w.write_flag("required", schema.required.contains(name));
                }
            }
            w.write_end_object();
        }
        Ok(())
    }
}

fn is_file(schema: &Schema) -> bool {
    schema
        .schema_type
        .is_some_and(|t| t.without_null() == SchemaType::STRING)
        && matches!(schema.format.as_deref(), Some("binary") | Some("base64"))
}

impl Component for RequestBody {
    const KIND: ReferenceType = ReferenceType::RequestBody;

    fn lookup<'d>(doc: &'d OpenApiDocument, id: &str) -> Option<Lookup<'d, Self>> {
        lookup_in(&doc.components.request_bodies, id)
    }
}

impl OpenApiSerializable for RequestBody {
    /// Writes nothing for 2.0; operations split the body into parameters.
    fn serialize<W: OpenApiWriter>(
        &self,
        w: &mut W,
        ctx: &mut WriteContext<'_>,
        version: SpecVersion,
    ) -> OasResult<()> {
        if version.is_v2() {
            debug!("request body has no 2.0 object form; skipped");
            return Ok(());
        }
        w.write_start_object();
        w.write_optional_property("description", self.description.as_deref());
        w.write_optional_map("content", &self.content, |w, _, media| media.serialize(w, ctx, version))?;
        w.write_flag("required", self.required);
        w.write_extensions(&self.extensions);
        w.write_end_object();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::ReferenceResolver;
    use crate::writer::{ValueWriter, WriterSettings};
    use serde_json::{json, Value};

    fn v2_form_parameters(body: &RequestBody) -> Value {
        let mut writer = ValueWriter::new(WriterSettings::default());
        let mut ctx = WriteContext::new(ReferenceResolver::default());
        writer.write_start_array();
        body.write_v2_form_parameters(&mut writer, &mut ctx).unwrap();
        writer.write_end_array();
        writer.into_value()
    }

    #[test]
    fn test_form_split_rewrites_binary_to_file() {
        let form = Schema::of_type(SchemaType::OBJECT)
            .with_property("file", Schema::of_type(SchemaType::STRING).with_format("binary"))
            .with_property("name", Schema::of_type(SchemaType::STRING));
        let body = RequestBody::with_content("multipart/form-data", MediaType::with_schema(form));

        assert_eq!(
            v2_form_parameters(&body),
            json!([
                {"name": "file", "in": "formData", "type": "file"},
                {"name": "name", "in": "formData", "type": "string"}
            ])
        );
    }

    #[test]
    fn test_body_name_defaults() {
        let mut body = RequestBody::default();
        assert_eq!(body.body_name(), "body");
        body.extensions
            .insert(BODY_NAME_EXTENSION, json!("pet"))
            .unwrap();
        assert_eq!(body.body_name(), "pet");
    }
}
