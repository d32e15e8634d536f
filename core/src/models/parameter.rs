#![deny(missing_docs)]

//! # Parameter Object
//!
//! 3.x parameters describe their value with a `schema` (or `content`); 2.0
//! non-body parameters carry the primitive keywords inline and spell the
//! serialization style as `collectionFormat`.

use super::example::Example;
use super::media_type::MediaType;
use super::schema::write::{write_items_properties, write_schema};
use super::schema::{Schema, SchemaType};
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
use std::fmt;

/// Where a parameter travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterLocation {
    /// Query string.
    Query,
    /// Request header.
    Header,
    /// Templated path segment.
    Path,
    /// Cookie (3.x only).
    Cookie,
}

impl ParameterLocation {
    /// Wire name of the location.
    pub fn as_str(self) -> &'static str {
        match self {
            ParameterLocation::Query => "query",
            ParameterLocation::Header => "header",
            ParameterLocation::Path => "path",
            ParameterLocation::Cookie => "cookie",
        }
    }

    /// Parses a wire name.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "query" => Some(ParameterLocation::Query),
            "header" => Some(ParameterLocation::Header),
            "path" => Some(ParameterLocation::Path),
            "cookie" => Some(ParameterLocation::Cookie),
            _ => None,
        }
    }

    /// Style applied when none is given.
    pub fn default_style(self) -> ParameterStyle {
        match self {
            ParameterLocation::Query | ParameterLocation::Cookie => ParameterStyle::Form,
            ParameterLocation::Header | ParameterLocation::Path => ParameterStyle::Simple,
        }
    }
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 3.x serialization style of a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterStyle {
    /// `;name=value`
    Matrix,
    /// `.value`
    Label,
    /// `name=value&...`
    Form,
    /// `a,b,c`
    Simple,
    /// `a b c`
    SpaceDelimited,
    /// `a|b|c`
    PipeDelimited,
    /// `name[key]=value`
    DeepObject,
}

impl ParameterStyle {
    /// Wire name of the style.
    pub fn as_str(self) -> &'static str {
        match self {
            ParameterStyle::Matrix => "matrix",
            ParameterStyle::Label => "label",
            ParameterStyle::Form => "form",
            ParameterStyle::Simple => "simple",
            ParameterStyle::SpaceDelimited => "spaceDelimited",
            ParameterStyle::PipeDelimited => "pipeDelimited",
            ParameterStyle::DeepObject => "deepObject",
        }
    }

    /// Parses a wire name.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "matrix" => Some(ParameterStyle::Matrix),
            "label" => Some(ParameterStyle::Label),
            "form" => Some(ParameterStyle::Form),
            "simple" => Some(ParameterStyle::Simple),
            "spaceDelimited" => Some(ParameterStyle::SpaceDelimited),
            "pipeDelimited" => Some(ParameterStyle::PipeDelimited),
            "deepObject" => Some(ParameterStyle::DeepObject),
            _ => None,
        }
    }
}

/// A single operation parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Parameter name (case-sensitive except for headers).
    pub name: String,
    /// Where the parameter travels.
    pub location: ParameterLocation,
    /// Description.
    pub description: Option<String>,
    /// Whether the parameter is mandatory. Always true for path parameters.
    pub required: bool,
    /// Deprecation marker (3.x).
    pub deprecated: bool,
    /// Whether an empty value is allowed.
    pub allow_empty_value: bool,
    /// Serialization style; location default when absent.
    pub style: Option<ParameterStyle>,
    /// Whether arrays and objects expand into separate values.
    pub explode: Option<bool>,
    /// Whether reserved characters pass through unencoded (3.x).
    pub allow_reserved: bool,
    /// Value schema.
    pub schema: Option<RefOr<Schema>>,
    /// Literal example (3.x).
    pub example: Option<Value>,
    /// Named examples (3.x).
    pub examples: IndexMap<String, RefOr<Example>>,
    /// Complex serialization (3.x, at most one entry).
    pub content: IndexMap<String, MediaType>,
    /// Specification extensions.
    pub extensions: Extensions,
}

impl Parameter {
    /// Creates a parameter; path parameters start out required.
    pub fn new(name: impl Into<String>, location: ParameterLocation) -> Self {
        Self {
            name: name.into(),
            location,
            description: None,
            required: location == ParameterLocation::Path,
            deprecated: false,
            allow_empty_value: false,
            style: None,
            explode: None,
            allow_reserved: false,
            schema: None,
            example: None,
            examples: IndexMap::new(),
            content: IndexMap::new(),
            extensions: Extensions::new(),
        }
    }

    /// Sets the value schema.
    pub fn with_schema(mut self, schema: impl Into<RefOr<Schema>>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Effective style.
    pub fn effective_style(&self) -> ParameterStyle {
        self.style.unwrap_or_else(|| self.location.default_style())
    }

    /// Effective `explode` (true only for `form` when unset).
    pub fn effective_explode(&self) -> bool {
        self.explode
            .unwrap_or(self.effective_style() == ParameterStyle::Form)
    }

    /// The 2.0 `collectionFormat` matching the style, if 2.0 has one.
    pub fn collection_format(&self) -> Option<&'static str> {
        match self.effective_style() {
            ParameterStyle::Form if self.effective_explode() => Some("multi"),
            ParameterStyle::Form | ParameterStyle::Simple => Some("csv"),
            ParameterStyle::SpaceDelimited => Some("ssv"),
            ParameterStyle::PipeDelimited => Some("pipes"),
            ParameterStyle::Matrix | ParameterStyle::Label | ParameterStyle::DeepObject => None,
        }
    }

    fn write_v3<W: OpenApiWriter>(
        &self,
        w: &mut W,
        ctx: &mut WriteContext<'_>,
        version: SpecVersion,
    ) -> OasResult<()> {
        w.write_start_object();
        w.write_property("name", self.name.as_str());
        w.write_property("in", self.location.as_str());
        w.write_optional_property("description", self.description.as_deref());
        w.write_flag("required", self.required);
        w.write_flag("deprecated", self.deprecated);
        w.write_flag("allowEmptyValue", self.allow_empty_value);
        w.write_optional_property("style", self.style.map(ParameterStyle::as_str));
        w.write_optional_property("explode", self.explode);
        w.write_flag("allowReserved", self.allow_reserved);
        w.write_optional_object("schema", self.schema.as_ref(), |w, s| {
            write_schema(s, w, ctx, version, false)
        })?;
        w.write_optional_property("example", self.example.clone());
        write_ref_map(w, "examples", &self.examples, ctx, version)?;
        w.write_optional_map("content", &self.content, |w, _, media| media.serialize(w, ctx, version))?;
        w.write_extensions(&self.extensions);
        w.write_end_object();
        Ok(())
    }

    fn write_v2<W: OpenApiWriter>(&self, w: &mut W, ctx: &mut WriteContext<'_>) -> OasResult<()> {
        w.write_start_object();
        w.write_property("name", self.name.as_str());
        w.write_property("in", self.location.as_str());
        w.write_optional_property("description", self.description.as_deref());
        w.write_flag("required", self.required);
        w.write_flag("allowEmptyValue", self.allow_empty_value);
        match self.v2_schema().map(|schema| schema.effective(&ctx.resolver())) {
            Some(Ok(schema)) => {
                let is_array = schema
                    .schema_type
                    .is_some_and(|t| t.contains(SchemaType::ARRAY));
                write_items_properties(schema, w, ctx)?;
                if is_array {
                    match self.collection_format() {
                        Some(format) => w.write_property("collectionFormat", format),
                        None => tracing::debug!(parameter = %self.name, "style has no collectionFormat; dropped"),
                    }
                }
            }
            Some(Err(error)) => {
                tracing::debug!(parameter = %self.name, %error, "schema unresolvable; primitive keywords dropped");
            }
            None => w.write_property("type", "string"),
        }
        w.write_extensions(&self.extensions);
        w.write_end_object();
        Ok(())
    }

    /// The schema occurrence, falling back to the first `content` entry.
    fn v2_schema(&self) -> Option<&RefOr<Schema>> {
        self.schema
            .as_ref()
            .or_else(|| self.content.values().next().and_then(|m| m.schema.as_ref()))
    }
}

impl Component for Parameter {
    const KIND: ReferenceType = ReferenceType::Parameter;

    fn lookup<'d>(doc: &'d OpenApiDocument, id: &str) -> Option<Lookup<'d, Self>> {
        lookup_in(&doc.components.parameters, id)
    }
}

impl OpenApiSerializable for Parameter {
    fn serialize<W: OpenApiWriter>(
        &self,
        writer: &mut W,
        ctx: &mut WriteContext<'_>,
        version: SpecVersion,
    ) -> OasResult<()> {
        match version {
            SpecVersion::OpenApi2_0 => self.write_v2(writer, ctx),
            SpecVersion::OpenApi3_0 | SpecVersion::OpenApi3_1 => self.write_v3(writer, ctx, version),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::ReferenceResolver;
    use crate::serialize::serialize_to_value;
    use crate::writer::WriterSettings;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn array_param(style: Option<ParameterStyle>, explode: Option<bool>) -> Parameter {
        Parameter {
            style,
            explode,
            ..Parameter::new("ids", ParameterLocation::Query).with_schema(
                Schema::of_type(SchemaType::ARRAY).with_items(Schema::of_type(SchemaType::INTEGER)),
            )
        }
    }

    #[test]
    fn test_collection_format_mapping() {
        assert_eq!(array_param(None, None).collection_format(), Some("multi"));
        assert_eq!(array_param(Some(ParameterStyle::Form), Some(false)).collection_format(), Some("csv"));
        assert_eq!(array_param(Some(ParameterStyle::SpaceDelimited), None).collection_format(), Some("ssv"));
        assert_eq!(array_param(Some(ParameterStyle::PipeDelimited), None).collection_format(), Some("pipes"));
        assert_eq!(array_param(Some(ParameterStyle::DeepObject), None).collection_format(), None);

        let header = Parameter::new("X-Ids", ParameterLocation::Header);
        assert_eq!(header.collection_format(), Some("csv"));
    }

    #[test]
    fn test_path_parameter_required() {
        assert!(Parameter::new("id", ParameterLocation::Path).required);
        assert!(!Parameter::new("q", ParameterLocation::Query).required);
    }

    #[test]
    fn test_v2_inline_keywords() {
        let value = serialize_to_value(
            &array_param(None, None),
            ReferenceResolver::default(),
            SpecVersion::OpenApi2_0,
            WriterSettings::default(),
        )
        .unwrap();
        assert_eq!(
            value,
            json!({
                "name": "ids",
                "in": "query",
                "type": "array",
                "items": {"type": "integer"},
                "collectionFormat": "multi"
            })
        );
    }

    #[test]
    fn test_v3_schema_object() {
        let param = Parameter::new("limit", ParameterLocation::Query)
            .with_schema(Schema::of_type(SchemaType::INTEGER).with_format("int32"));
        let value = serialize_to_value(
            &param,
            ReferenceResolver::default(),
            SpecVersion::OpenApi3_0,
            WriterSettings::default(),
        )
        .unwrap();
        assert_eq!(
            value,
            json!({
                "name": "limit",
                "in": "query",
                "schema": {"type": "integer", "format": "int32"}
            })
        );
    }
}
