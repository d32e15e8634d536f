#![deny(missing_docs)]

//! # Components
//!
//! Reusable definitions. 3.x writes them under `components`; 2.0 spreads the
//! representable ones over `definitions`, `parameters`, `responses` and
//! `securityDefinitions` at the document root.

use super::callback::Callback;
use super::example::Example;
use super::header::Header;
use super::link::Link;
use super::parameter::{Parameter, ParameterLocation};
use super::path_item::PathItem;
use super::request_body::RequestBody;
use super::response::Response;
use super::schema::Schema;
use super::security::SecurityScheme;
use super::write_ref_map;
use crate::error::OasResult;
use crate::extensions::Extensions;
use crate::reference::RefOr;
use crate::serialize::{OpenApiSerializable, WriteContext};
use crate::version::SpecVersion;
use crate::writer::OpenApiWriter;
use indexmap::IndexMap;
use tracing::debug;

/// The reusable component maps of a document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Components {
    /// `schemas` (`definitions` in 2.0).
    pub schemas: IndexMap<String, RefOr<Schema>>,
    /// `responses`.
    pub responses: IndexMap<String, RefOr<Response>>,
    /// `parameters`.
    pub parameters: IndexMap<String, RefOr<Parameter>>,
    /// `examples` (3.x).
    pub examples: IndexMap<String, RefOr<Example>>,
    /// `requestBodies` (body parameters in 2.0).
    pub request_bodies: IndexMap<String, RefOr<RequestBody>>,
    /// `headers` (3.x).
    pub headers: IndexMap<String, RefOr<Header>>,
    /// `securitySchemes` (`securityDefinitions` in 2.0).
    pub security_schemes: IndexMap<String, RefOr<SecurityScheme>>,
    /// `links` (3.x).
    pub links: IndexMap<String, RefOr<Link>>,
    /// `callbacks` (3.x).
    pub callbacks: IndexMap<String, RefOr<Callback>>,
    /// `pathItems` (3.1).
    pub path_items: IndexMap<String, RefOr<PathItem>>,
    /// Specification extensions.
    pub extensions: Extensions,
}

impl Components {
    /// Whether every map is empty.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
            && self.responses.is_empty()
            && self.parameters.is_empty()
            && self.examples.is_empty()
            && self.request_bodies.is_empty()
            && self.headers.is_empty()
            && self.security_schemes.is_empty()
            && self.links.is_empty()
            && self.callbacks.is_empty()
            && self.path_items.is_empty()
            && self.extensions.is_empty()
    }

    /// Writes the root-level 2.0 collections into the open document object.
    pub(crate) fn write_v2_sections<W: OpenApiWriter>(
        &self,
        w: &mut W,
        ctx: &mut WriteContext<'_>,
    ) -> OasResult<()> {
        let version = SpecVersion::OpenApi2_0;
        write_ref_map(w, "definitions", &self.schemas, ctx, version)?;

        let resolver = ctx.resolver();
        let parameters: IndexMap<&String, &RefOr<Parameter>> = self
            .parameters
            .iter()
            .filter(|(name, parameter)| match parameter.effective(&resolver) {
                Ok(item) if item.location == ParameterLocation::Cookie => {
                    debug!(name = %name, "cookie parameter component dropped");
                    false
                }
                _ => true,
            })
            .collect();
        let bodies: IndexMap<&String, &RefOr<RequestBody>> = self
            .request_bodies
            .iter()
            .filter(|(name, body)| match body.effective(&resolver) {
                Ok(item) if item.form_content().is_some() => {
                    debug!(name = %name, "form request body component has no 2.0 parameter form");
                    false
                }
                _ => true,
            })
            .collect();
        if !parameters.is_empty() || !bodies.is_empty() {
            w.write_property_name("parameters");
            w.write_start_object();
            for (name, parameter) in parameters {
                w.write_property_name(name);
                parameter.serialize(w, ctx, version)?;
            }
            for (name, body) in bodies {
                w.write_property_name(name);
                match body {
                    RefOr::Item(body) => body.write_v2_body_parameter(w, ctx)?,
                    RefOr::Ref(reference) => match resolver.resolve::<RequestBody>(reference) {
                        Ok(target) if w.settings().should_inline_reference(reference) => {
                            target.write_v2_body_parameter(w, ctx)?
                        }
                        _ => reference.serialize(w, version),
                    },
                }
            }
            w.write_end_object();
        }

        write_ref_map(w, "responses", &self.responses, ctx, version)?;

        let schemes: IndexMap<&String, &RefOr<SecurityScheme>> = self
            .security_schemes
            .iter()
            .filter(|(name, scheme)| match scheme.effective(&resolver) {
                Ok(scheme) if scheme.is_v2_representable() => true,
                Ok(_) => {
                    debug!(name = %name, "security scheme has no 2.0 form");
                    false
                }
                Err(error) => {
                    debug!(name = %name, %error, "security scheme unresolvable; dropped");
                    false
                }
            })
            .collect();
        write_security_schemes(w, "securityDefinitions", schemes, ctx, version)?;
        Ok(())
    }
}

impl OpenApiSerializable for Components {
    fn serialize<W: OpenApiWriter>(
        &self,
        w: &mut W,
        ctx: &mut WriteContext<'_>,
        version: SpecVersion,
    ) -> OasResult<()> {
        w.write_start_object();
        write_ref_map(w, "schemas", &self.schemas, ctx, version)?;
        write_ref_map(w, "responses", &self.responses, ctx, version)?;
        write_ref_map(w, "parameters", &self.parameters, ctx, version)?;
        write_ref_map(w, "examples", &self.examples, ctx, version)?;
        write_ref_map(w, "requestBodies", &self.request_bodies, ctx, version)?;
        write_ref_map(w, "headers", &self.headers, ctx, version)?;
        write_security_schemes(w, "securitySchemes", self.security_schemes.iter().collect(), ctx, version)?;
        write_ref_map(w, "links", &self.links, ctx, version)?;
        write_ref_map(w, "callbacks", &self.callbacks, ctx, version)?;
        if version == SpecVersion::OpenApi3_1 {
            write_ref_map(w, "pathItems", &self.path_items, ctx, version)?;
        } else if !self.path_items.is_empty() {
            debug!(%version, "pathItems components dropped");
        }
        w.write_extensions(&self.extensions);
        w.write_end_object();
        Ok(())
    }
}

/// Security schemes have no `$ref` object form (their references render as
/// bare names), so referenced entries are written as their effective body.
fn write_security_schemes<W: OpenApiWriter>(
    w: &mut W,
    name: &str,
    schemes: IndexMap<&String, &RefOr<SecurityScheme>>,
    ctx: &mut WriteContext<'_>,
    version: SpecVersion,
) -> OasResult<()> {
    if schemes.is_empty() {
        return Ok(());
    }
    let resolver = ctx.resolver();
    w.write_property_name(name);
    w.write_start_object();
    for (key, scheme) in schemes {
        w.write_property_name(key);
        scheme.effective(&resolver)?.serialize(w, ctx, version)?;
    }
    w.write_end_object();
    Ok(())
}
