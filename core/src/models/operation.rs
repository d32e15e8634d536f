#![deny(missing_docs)]

//! # Operation Object
//!
//! The 2.0 form of an operation has no request body. It is rebuilt from
//! parameters:
//!
//! - a form payload (`application/x-www-form-urlencoded` or
//!   `multipart/form-data`) becomes one `formData` parameter per property;
//! - any other payload becomes a single `body` parameter named by `x-bodyName`;
//! - `consumes` lists the body's content types and `produces` the content types
//!   of every response, each compared case-insensitively.

use super::callback::Callback;
use super::media_type::distinct_content_types;
use super::parameter::{Parameter, ParameterLocation};
use super::request_body::RequestBody;
use super::response::Response;
use super::security::{write_security, SecurityRequirement};
use super::write_ref_map;
use crate::document::{ExternalDocs, Server};
use crate::error::OasResult;
use crate::extensions::Extensions;
use crate::reference::{Component, RefOr, ReferenceDescriptor, ReferenceResolver, ReferenceType};
use crate::serialize::{OpenApiSerializable, WriteContext};
use crate::version::SpecVersion;
use crate::writer::{OpenApiWriter, WriterSettings};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

/// A single API operation on a path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Operation {
    /// Tag references, written by name.
    pub tags: Vec<ReferenceDescriptor>,
    /// Short summary.
    pub summary: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Further documentation.
    pub external_docs: Option<ExternalDocs>,
    /// Unique operation identifier.
    pub operation_id: Option<String>,
    /// Non-body parameters.
    pub parameters: Vec<RefOr<Parameter>>,
    /// Request payload.
    pub request_body: Option<RefOr<RequestBody>>,
    /// Responses keyed by status code or `default`.
    pub responses: IndexMap<String, RefOr<Response>>,
    /// Callbacks (3.x).
    pub callbacks: IndexMap<String, RefOr<Callback>>,
    /// Deprecation marker.
    pub deprecated: bool,
    /// Security override; `Some(vec![])` removes document-level security.
    pub security: Option<Vec<SecurityRequirement>>,
    /// Server override (3.x).
    pub servers: Vec<Server>,
    /// Specification extensions.
    pub extensions: Extensions,
}

impl Operation {
    /// Adds a tag reference by name.
    pub fn with_tag(mut self, name: impl Into<String>) -> OasResult<Self> {
        self.tags.push(ReferenceDescriptor::local(ReferenceType::Tag, name)?);
        Ok(self)
    }

    /// Adds a response.
    pub fn with_response(mut self, status: impl Into<String>, response: impl Into<RefOr<Response>>) -> Self {
        self.responses.insert(status.into(), response.into());
        self
    }

    fn write_tags<W: OpenApiWriter>(&self, w: &mut W, version: SpecVersion) -> OasResult<()> {
        w.write_optional_collection("tags", &self.tags, |w, tag| {
            tag.serialize(w, version);
            Ok(())
        })
    }

    fn write_v3<W: OpenApiWriter>(
        &self,
        w: &mut W,
        ctx: &mut WriteContext<'_>,
        version: SpecVersion,
    ) -> OasResult<()> {
        w.write_start_object();
        self.write_tags(w, version)?;
        w.write_optional_property("summary", self.summary.as_deref());
        w.write_optional_property("description", self.description.as_deref());
        w.write_optional_object("externalDocs", self.external_docs.as_ref(), |w, d| d.serialize(w, ctx, version))?;
        w.write_optional_property("operationId", self.operation_id.as_deref());
        w.write_optional_collection("parameters", &self.parameters, |w, p| p.serialize(w, ctx, version))?;
        w.write_optional_object("requestBody", self.request_body.as_ref(), |w, b| b.serialize(w, ctx, version))?;
        write_ref_map(w, "responses", &self.responses, ctx, version)?;
        write_ref_map(w, "callbacks", &self.callbacks, ctx, version)?;
        w.write_flag("deprecated", self.deprecated);
        write_security(w, self.security.as_ref(), ctx, version)?;
        w.write_optional_collection("servers", &self.servers, |w, s| s.serialize(w, ctx, version))?;
        w.write_extensions(&self.extensions);
        w.write_end_object();
        Ok(())
    }

    fn write_v2<W: OpenApiWriter>(&self, w: &mut W, ctx: &mut WriteContext<'_>) -> OasResult<()> {
        let version = SpecVersion::OpenApi2_0;
        let resolver = ctx.resolver();
        let request_body = match &self.request_body {
            Some(body) => effective_for_v2(body, &resolver, w.settings())?,
            None => None,
        };
        let mut response_types = Vec::new();
        for response in self.responses.values() {
            if let Some(response) = effective_for_v2(response, &resolver, w.settings())? {
                response_types.extend(response.content.keys().cloned());
            }
        }
        let parameters = v2_parameters(&self.parameters, &resolver);

        w.write_start_object();
        self.write_tags(w, version)?;
        w.write_optional_property("summary", self.summary.as_deref());
        w.write_optional_property("description", self.description.as_deref());
        w.write_optional_object("externalDocs", self.external_docs.as_ref(), |w, d| d.serialize(w, ctx, version))?;
        w.write_optional_property("operationId", self.operation_id.as_deref());
        if let Some(body) = request_body {
            write_string_list(w, "consumes", &body.content_types());
        }
        write_string_list(w, "produces", &distinct_content_types(&response_types));

        if !parameters.is_empty() || self.request_body.is_some() {
            w.write_property_name("parameters");
            w.write_start_array();
            for parameter in parameters {
                parameter.serialize(w, ctx, version)?;
            }
            match (&self.request_body, request_body) {
                (Some(occurrence), Some(body)) => write_v2_request_body(w, occurrence, body, ctx)?,
                (Some(RefOr::Ref(reference)), None) => reference.serialize(w, version),
                _ => {}
            }
            w.write_end_array();
        }

        write_ref_map(w, "responses", &self.responses, ctx, version)?;
        if !self.callbacks.is_empty() || !self.servers.is_empty() {
            debug!(operation = ?self.operation_id, "callbacks/servers dropped");
        }
        w.write_flag("deprecated", self.deprecated);
        write_security(w, self.security.as_ref(), ctx, version)?;
        w.write_extensions(&self.extensions);
        w.write_end_object();
        Ok(())
    }
}

/// The effective value of an occurrence the 2.0 form has to look inside.
///
/// A reference that cannot be resolved is only an error when the writer was
/// asked to inline it. Otherwise it is written as a `$ref` and yields `None`.
fn effective_for_v2<'s, T: Component>(
    occurrence: &'s RefOr<T>,
    resolver: &ReferenceResolver<'s>,
    settings: &WriterSettings,
) -> OasResult<Option<&'s T>> {
    match occurrence.effective(resolver) {
        Ok(item) => Ok(Some(item)),
        Err(error) => match occurrence {
            RefOr::Ref(reference) if !settings.should_inline_reference(reference) => {
                debug!(reference = reference.reference_v3(), %error, "unresolvable reference kept as $ref");
                Ok(None)
            }
            _ => Err(error.into()),
        },
    }
}

/// The parameters 2.0 can carry. Cookie parameters are dropped, including
/// references whose target is one.
pub(crate) fn v2_parameters<'p>(
    parameters: &'p [RefOr<Parameter>],
    resolver: &ReferenceResolver<'_>,
) -> Vec<&'p RefOr<Parameter>> {
    parameters
        .iter()
        .filter(|parameter| match parameter.effective(resolver) {
            Ok(item) if item.location == ParameterLocation::Cookie => {
                debug!(parameter = %item.name, "cookie parameter dropped");
                false
            }
            _ => true,
        })
        .collect()
}

/// Writes the parameters standing in for a request body.
///
/// A referenced non-form body stays a `$ref` into `#/parameters` unless the
/// writer inlines it.
fn write_v2_request_body<W: OpenApiWriter>(
    w: &mut W,
    occurrence: &RefOr<RequestBody>,
    body: &RequestBody,
    ctx: &mut WriteContext<'_>,
) -> OasResult<()> {
    if body.form_content().is_some() {
        return body.write_v2_form_parameters(w, ctx);
    }
    match occurrence {
        RefOr::Ref(reference) if !w.settings().should_inline_reference(reference) => {
            reference.serialize(w, SpecVersion::OpenApi2_0);
            Ok(())
        }
        _ => body.write_v2_body_parameter(w, ctx),
    }
}

fn write_string_list<W: OpenApiWriter>(w: &mut W, name: &str, values: &[String]) {
    if values.is_empty() {
        return;
    }
    w.write_property(
        name,
        Value::Array(values.iter().map(|v| Value::from(v.as_str())).collect()),
    );
}

impl OpenApiSerializable for Operation {
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
    use crate::models::{MediaType, Schema, SchemaType};
    use crate::models::request_body::BODY_NAME_EXTENSION;
    use crate::serialize::serialize_to_value;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn v2(operation: &Operation) -> Value {
        serialize_to_value(
            operation,
            ReferenceResolver::default(),
            SpecVersion::OpenApi2_0,
            WriterSettings::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_body_parameter_named_from_extension() {
        let mut body = RequestBody::with_content(
            "application/json",
            MediaType::with_schema(Schema::of_type(SchemaType::OBJECT)),
        );
        body.content.insert(
            "Application/JSON".into(),
            MediaType::with_schema(Schema::of_type(SchemaType::OBJECT)),
        );
        body.required = true;
        body.extensions.insert(BODY_NAME_EXTENSION, json!("pet")).unwrap();
        body.extensions.insert("x-audit", json!(true)).unwrap();

        let operation = Operation {
            request_body: Some(body.into()),
            ..Operation::default()
        }
        .with_response("200", Response::new("ok").with_content("application/xml", MediaType::default()))
        .with_response("404", Response::new("missing"));

        let value = v2(&operation);
        assert_eq!(value["consumes"], json!(["application/json"]));
        assert_eq!(value["produces"], json!(["application/xml"]));
        assert_eq!(
            value["parameters"],
            json!([{
                "name": "pet",
                "in": "body",
                "required": true,
                "schema": {"type": "object"},
                "x-audit": true
            }])
        );
    }

    #[test]
    fn test_referenced_body_stays_a_parameter_ref() {
        let mut doc = crate::document::OpenApiDocument::new("Refs", "1.0");
        doc.components.request_bodies.insert(
            "NewPet".into(),
            RequestBody::with_content("application/json", MediaType::default()).into(),
        );
        let operation = Operation {
            request_body: Some(RefOr::local_ref(ReferenceType::RequestBody, "NewPet").unwrap()),
            ..Operation::default()
        };
        let value = serialize_to_value(
            &operation,
            ReferenceResolver::new(Some(&doc)),
            SpecVersion::OpenApi2_0,
            WriterSettings::default(),
        )
        .unwrap();
        assert_eq!(value["parameters"], json!([{"$ref": "#/parameters/NewPet"}]));
    }

    #[test]
    fn test_cookie_parameters_dropped_in_v2() {
        let operation = Operation {
            parameters: vec![
                Parameter::new("session", ParameterLocation::Cookie).into(),
                Parameter::new("q", ParameterLocation::Query)
                    .with_schema(Schema::of_type(SchemaType::STRING))
                    .into(),
            ],
            ..Operation::default()
        };
        assert_eq!(
            v2(&operation)["parameters"],
            json!([{"name": "q", "in": "query", "type": "string"}])
        );
    }

    #[test]
    fn test_cookie_only_operation_has_no_parameters() {
        let operation = Operation {
            parameters: vec![Parameter::new("session", ParameterLocation::Cookie).into()],
            ..Operation::default()
        };
        assert!(v2(&operation).get("parameters").is_none());
    }

    #[test]
    fn test_tags_written_by_name() {
        let operation = Operation::default().with_tag("pets").unwrap();
        let value = serialize_to_value(
            &operation,
            ReferenceResolver::default(),
            SpecVersion::OpenApi3_1,
            WriterSettings::default(),
        )
        .unwrap();
        assert_eq!(value["tags"], json!(["pets"]));
    }
}
