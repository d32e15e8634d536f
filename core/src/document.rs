#![deny(missing_docs)]

//! # Document
//!
//! The top-level OpenAPI document: the host context every reference resolves
//! against. Each document carries a process-unique [`DocumentId`] that
//! descriptors record (once) as their host identity.

use crate::error::OasResult;
use crate::extensions::Extensions;
use crate::models::security::write_security;
use crate::models::{write_ref_map, Components, PathItem, SecurityRequirement, Tag};
use crate::reference::{RefOr, ReferenceResolver};
use crate::registry::DocumentRegistry;
use crate::serialize::{serialize_to_value, OpenApiSerializable, WriteContext};
use crate::version::SpecVersion;
use crate::writer::{OpenApiWriter, WriterSettings};
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use url::Url;

static NEXT_DOCUMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of an [`OpenApiDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(u64);

impl DocumentId {
    pub(crate) fn next() -> Self {
        DocumentId(NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// API metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Info {
    /// API title.
    pub title: String,
    /// API version (not the OpenAPI version).
    pub version: String,
    /// Description.
    pub description: Option<String>,
    /// Terms of service URL.
    pub terms_of_service: Option<String>,
    /// Specification extensions.
    pub extensions: Extensions,
}

impl OpenApiSerializable for Info {
    fn serialize<W: OpenApiWriter>(
        &self,
        w: &mut W,
        _ctx: &mut WriteContext<'_>,
        _version: SpecVersion,
    ) -> OasResult<()> {
        w.write_start_object();
        w.write_property("title", self.title.as_str());
        w.write_optional_property("description", self.description.as_deref());
        w.write_optional_property("termsOfService", self.terms_of_service.as_deref());
        w.write_property("version", self.version.as_str());
        w.write_extensions(&self.extensions);
        w.write_end_object();
        Ok(())
    }
}

/// A server the API is reachable at.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Server {
    /// Server URL, possibly relative.
    pub url: String,
    /// Description.
    pub description: Option<String>,
    /// Specification extensions.
    pub extensions: Extensions,
}

impl Server {
    /// A server at `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

impl OpenApiSerializable for Server {
    fn serialize<W: OpenApiWriter>(
        &self,
        w: &mut W,
        _ctx: &mut WriteContext<'_>,
        _version: SpecVersion,
    ) -> OasResult<()> {
        w.write_start_object();
        w.write_property("url", self.url.as_str());
        w.write_optional_property("description", self.description.as_deref());
        w.write_extensions(&self.extensions);
        w.write_end_object();
        Ok(())
    }
}

/// Link to further documentation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExternalDocs {
    /// Target URL.
    pub url: String,
    /// Description.
    pub description: Option<String>,
    /// Specification extensions.
    pub extensions: Extensions,
}

impl OpenApiSerializable for ExternalDocs {
    fn serialize<W: OpenApiWriter>(
        &self,
        w: &mut W,
        _ctx: &mut WriteContext<'_>,
        _version: SpecVersion,
    ) -> OasResult<()> {
        w.write_start_object();
        w.write_optional_property("description", self.description.as_deref());
        w.write_property("url", self.url.as_str());
        w.write_extensions(&self.extensions);
        w.write_end_object();
        Ok(())
    }
}

/// An OpenAPI document.
///
/// Not `Clone`: its identity is what references adopt.
#[derive(Debug)]
pub struct OpenApiDocument {
    id: DocumentId,
    base_uri: Option<Url>,
    /// API metadata.
    pub info: Info,
    /// Servers.
    pub servers: Vec<Server>,
    /// Paths keyed by template.
    pub paths: IndexMap<String, RefOr<PathItem>>,
    /// Webhooks (3.1).
    pub webhooks: IndexMap<String, RefOr<PathItem>>,
    /// Reusable components.
    pub components: Components,
    /// Document-wide security requirements.
    pub security: Option<Vec<SecurityRequirement>>,
    /// Tag definitions.
    pub tags: Vec<Tag>,
    /// Further documentation.
    pub external_docs: Option<ExternalDocs>,
    /// Specification extensions.
    pub extensions: Extensions,
}

impl OpenApiDocument {
    /// Creates an empty document with a fresh identity.
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: DocumentId::next(),
            base_uri: None,
            info: Info {
                title: title.into(),
                version: version.into(),
                ..Info::default()
            },
            servers: Vec::new(),
            paths: IndexMap::new(),
            webhooks: IndexMap::new(),
            components: Components::default(),
            security: None,
            tags: Vec::new(),
            external_docs: None,
            extensions: Extensions::new(),
        }
    }

    /// Identity used as the host of adopted references.
    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// Retrieval URI, used as the base of relative external references.
    pub fn base_uri(&self) -> Option<&Url> {
        self.base_uri.as_ref()
    }

    /// Sets the retrieval URI.
    pub fn set_base_uri(&mut self, base_uri: Option<Url>) {
        self.base_uri = base_uri;
    }

    /// A resolver hosted on this document.
    pub fn resolver(&self) -> ReferenceResolver<'_> {
        ReferenceResolver::new(Some(self))
    }

    /// Serializes the document into a JSON tree.
    pub fn to_value(&self, version: SpecVersion, settings: WriterSettings) -> OasResult<Value> {
        serialize_to_value(self, self.resolver(), version, settings)
    }

    /// Serializes the document, resolving external references through `registry`.
    pub fn to_value_with_registry(
        &self,
        registry: &DocumentRegistry,
        version: SpecVersion,
        settings: WriterSettings,
    ) -> OasResult<Value> {
        serialize_to_value(self, self.resolver().with_registry(registry), version, settings)
    }

    /// Serializes the document as pretty JSON text.
    pub fn to_json_string(&self, version: SpecVersion, settings: WriterSettings) -> OasResult<String> {
        Ok(serde_json::to_string_pretty(&self.to_value(version, settings)?)?)
    }

    /// Serializes the document as YAML text.
    pub fn to_yaml_string(&self, version: SpecVersion, settings: WriterSettings) -> OasResult<String> {
        Ok(serde_yaml::to_string(&self.to_value(version, settings)?)?)
    }

    /// `paths` is required in every version, so it is written even when empty.
    fn write_paths<W: OpenApiWriter>(
        &self,
        w: &mut W,
        ctx: &mut WriteContext<'_>,
        version: SpecVersion,
    ) -> OasResult<()> {
        w.write_property_name("paths");
        w.write_start_object();
        for (path, item) in &self.paths {
            w.write_property_name(path);
            item.serialize(w, ctx, version)?;
        }
        w.write_end_object();
        Ok(())
    }

    fn write_v2<W: OpenApiWriter>(&self, w: &mut W, ctx: &mut WriteContext<'_>) -> OasResult<()> {
        let version = SpecVersion::OpenApi2_0;
        w.write_start_object();
        w.write_property("swagger", version.version_string());
        w.write_property_name("info");
        self.info.serialize(w, ctx, version)?;
        write_v2_host(w, &self.servers);
        self.write_paths(w, ctx, version)?;
        self.components.write_v2_sections(w, ctx)?;
        write_security(w, self.security.as_ref(), ctx, version)?;
        w.write_optional_collection("tags", &self.tags, |w, t| t.serialize(w, ctx, version))?;
        w.write_optional_object("externalDocs", self.external_docs.as_ref(), |w, d| d.serialize(w, ctx, version))?;
        if !self.webhooks.is_empty() {
            tracing::debug!("webhooks dropped");
        }
        w.write_extensions(&self.extensions);
        w.write_end_object();
        Ok(())
    }

    fn write_v3<W: OpenApiWriter>(
        &self,
        w: &mut W,
        ctx: &mut WriteContext<'_>,
        version: SpecVersion,
    ) -> OasResult<()> {
        w.write_start_object();
        w.write_property("openapi", version.version_string());
        w.write_property_name("info");
        self.info.serialize(w, ctx, version)?;
        w.write_optional_collection("servers", &self.servers, |w, s| s.serialize(w, ctx, version))?;
        self.write_paths(w, ctx, version)?;
        if version == SpecVersion::OpenApi3_1 {
            write_ref_map(w, "webhooks", &self.webhooks, ctx, version)?;
        } else if !self.webhooks.is_empty() {
            tracing::debug!(%version, "webhooks dropped");
        }
        if !self.components.is_empty() {
            w.write_property_name("components");
            self.components.serialize(w, ctx, version)?;
        }
        write_security(w, self.security.as_ref(), ctx, version)?;
        w.write_optional_collection("tags", &self.tags, |w, t| t.serialize(w, ctx, version))?;
        w.write_optional_object("externalDocs", self.external_docs.as_ref(), |w, d| d.serialize(w, ctx, version))?;
        w.write_extensions(&self.extensions);
        w.write_end_object();
        Ok(())
    }
}

impl OpenApiSerializable for OpenApiDocument {
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

/// Derives `host`, `basePath` and `schemes` from the server list.
///
/// Host and path come from the first server; schemes are collected from every
/// absolute server URL on the same host.
fn write_v2_host<W: OpenApiWriter>(w: &mut W, servers: &[Server]) {
    let Some(first) = servers.first() else {
        return;
    };
    let Ok(url) = Url::parse(&first.url) else {
        if first.url.starts_with('/') {
            let base_path = first.url.trim_end_matches('/');
            w.write_property("basePath", if base_path.is_empty() { "/" } else { base_path });
        } else {
            tracing::debug!(url = %first.url, "server URL has no 2.0 form");
        }
        return;
    };

    if let Some(host) = url.host_str() {
        let host = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        w.write_property("host", host);
    }
    let path = url.path().trim_end_matches('/');
    if !path.is_empty() {
        w.write_property("basePath", path);
    }

    let mut schemes: Vec<String> = Vec::new();
    for server in servers {
        if let Ok(other) = Url::parse(&server.url) {
            if other.host_str() == url.host_str() && !schemes.iter().any(|s| s == other.scheme()) {
                schemes.push(other.scheme().to_string());
            }
        }
    }
    if !schemes.is_empty() {
        w.write_property(
            "schemes",
            Value::Array(schemes.into_iter().map(Value::from).collect()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Operation, OperationType, Response, Schema, SchemaType, SecurityScheme};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn petstore() -> OpenApiDocument {
        let mut doc = OpenApiDocument::new("Petstore", "1.0.0");
        doc.servers.push(Server::new("https://petstore.example.com/v1"));
        doc.servers.push(Server::new("http://petstore.example.com/v1"));
        doc.components
            .schemas
            .insert("Pet".into(), Schema::of_type(SchemaType::OBJECT).into());
        doc.components
            .security_schemes
            .insert("bearer".into(), SecurityScheme::http("bearer").into());
        doc.paths.insert(
            "/pets".into(),
            PathItem::default()
                .with_operation(
                    OperationType::Get,
                    Operation::default().with_response("200", Response::new("ok")),
                )
                .into(),
        );
        doc
    }

    #[test]
    fn test_document_ids_are_unique() {
        let a = OpenApiDocument::new("A", "1");
        let b = OpenApiDocument::new("B", "1");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_v2_root_layout() {
        let value = petstore()
            .to_value(SpecVersion::OpenApi2_0, WriterSettings::default())
            .unwrap();
        assert_eq!(value["swagger"], json!("2.0"));
        assert_eq!(value["host"], json!("petstore.example.com"));
        assert_eq!(value["basePath"], json!("/v1"));
        assert_eq!(value["schemes"], json!(["https", "http"]));
        assert_eq!(value["definitions"], json!({"Pet": {"type": "object"}}));
        assert!(value.get("securityDefinitions").is_none());
        assert!(value.get("components").is_none());
    }

    #[test]
    fn test_v3_root_layout() {
        let value = petstore()
            .to_value(SpecVersion::OpenApi3_1, WriterSettings::default())
            .unwrap();
        assert_eq!(value["openapi"], json!("3.1.1"));
        assert_eq!(value["servers"][0], json!({"url": "https://petstore.example.com/v1"}));
        assert_eq!(
            value["components"]["securitySchemes"]["bearer"],
            json!({"type": "http", "scheme": "bearer"})
        );
        assert_eq!(
            value["paths"]["/pets"]["get"]["responses"]["200"],
            json!({"description": "ok"})
        );
    }

    #[test]
    fn test_yaml_output() {
        let yaml = petstore()
            .to_yaml_string(SpecVersion::OpenApi3_0, WriterSettings::default())
            .unwrap();
        assert!(yaml.contains("openapi: 3.0.4"));
        assert!(yaml.contains("title: Petstore"));
    }
}
