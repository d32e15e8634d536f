#![deny(missing_docs)]

//! # Security
//!
//! - **SecurityScheme**: how a client authenticates. 2.0 only knows `basic`,
//!   `apiKey` and single-flow `oauth2`; other schemes have no 2.0 form.
//! - **OAuthFlows**: 3.x flow set, collapsed to one flow in 2.0.
//! - **SecurityRequirement**: scheme references with their required scopes.

use crate::document::OpenApiDocument;
use crate::error::OasResult;
use crate::extensions::Extensions;
use crate::reference::resolver::lookup_in;
use crate::reference::{Component, Lookup, ReferenceDescriptor, ReferenceResolver, ReferenceType};
use crate::serialize::{OpenApiSerializable, WriteContext};
use crate::version::SpecVersion;
use crate::writer::OpenApiWriter;
use indexmap::IndexMap;
use serde_json::Value;

/// Kind of security scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SecuritySchemeType {
    /// API key in a header, query parameter or cookie.
    #[default]
    ApiKey,
    /// HTTP authentication (`basic`, `bearer`, ...).
    Http,
    /// OAuth 2.0.
    OAuth2,
    /// OpenID Connect discovery (3.x).
    OpenIdConnect,
    /// Mutual TLS (3.1).
    MutualTls,
}

impl SecuritySchemeType {
    /// 3.x wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            SecuritySchemeType::ApiKey => "apiKey",
            SecuritySchemeType::Http => "http",
            SecuritySchemeType::OAuth2 => "oauth2",
            SecuritySchemeType::OpenIdConnect => "openIdConnect",
            SecuritySchemeType::MutualTls => "mutualTLS",
        }
    }

    /// Parses a 3.x wire name.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "apiKey" => Some(SecuritySchemeType::ApiKey),
            "http" => Some(SecuritySchemeType::Http),
            "oauth2" => Some(SecuritySchemeType::OAuth2),
            "openIdConnect" => Some(SecuritySchemeType::OpenIdConnect),
            "mutualTLS" => Some(SecuritySchemeType::MutualTls),
            _ => None,
        }
    }
}

/// Where an API key travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiKeyLocation {
    /// Query string.
    Query,
    /// Request header.
    Header,
    /// Cookie (3.x).
    Cookie,
}

impl ApiKeyLocation {
    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            ApiKeyLocation::Query => "query",
            ApiKeyLocation::Header => "header",
            ApiKeyLocation::Cookie => "cookie",
        }
    }

    /// Parses a wire name.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "query" => Some(ApiKeyLocation::Query),
            "header" => Some(ApiKeyLocation::Header),
            "cookie" => Some(ApiKeyLocation::Cookie),
            _ => None,
        }
    }
}

/// A single OAuth flow.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OAuthFlow {
    /// Authorization endpoint.
    pub authorization_url: Option<String>,
    /// Token endpoint.
    pub token_url: Option<String>,
    /// Refresh endpoint (3.x).
    pub refresh_url: Option<String>,
    /// Scope name to description.
    pub scopes: IndexMap<String, String>,
    /// Specification extensions.
    pub extensions: Extensions,
}

impl OAuthFlow {
    fn write_urls<W: OpenApiWriter>(&self, w: &mut W) {
        w.write_optional_property("authorizationUrl", self.authorization_url.as_deref());
        w.write_optional_property("tokenUrl", self.token_url.as_deref());
    }

    fn write_scopes<W: OpenApiWriter>(&self, w: &mut W) {
        w.write_property_name("scopes");
        w.write_start_object();
        for (scope, description) in &self.scopes {
            w.write_property(scope, description.as_str());
        }
        w.write_end_object();
    }
}

impl OpenApiSerializable for OAuthFlow {
    fn serialize<W: OpenApiWriter>(
        &self,
        w: &mut W,
        _ctx: &mut WriteContext<'_>,
        _version: SpecVersion,
    ) -> OasResult<()> {
        w.write_start_object();
        self.write_urls(w);
        w.write_optional_property("refreshUrl", self.refresh_url.as_deref());
        self.write_scopes(w);
        w.write_extensions(&self.extensions);
        w.write_end_object();
        Ok(())
    }
}

/// The set of configured OAuth flows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OAuthFlows {
    /// Implicit flow.
    pub implicit: Option<OAuthFlow>,
    /// Resource owner password flow.
    pub password: Option<OAuthFlow>,
    /// Client credentials flow (`application` in 2.0).
    pub client_credentials: Option<OAuthFlow>,
    /// Authorization code flow (`accessCode` in 2.0).
    pub authorization_code: Option<OAuthFlow>,
    /// Specification extensions.
    pub extensions: Extensions,
}

impl OAuthFlows {
    /// The first configured flow with its 2.0 `flow` name.
    pub fn first_v2_flow(&self) -> Option<(&'static str, &OAuthFlow)> {
        [
            ("implicit", self.implicit.as_ref()),
            ("password", self.password.as_ref()),
            ("application", self.client_credentials.as_ref()),
            ("accessCode", self.authorization_code.as_ref()),
        ]
        .into_iter()
        .find_map(|(name, flow)| flow.map(|flow| (name, flow)))
    }
}

impl OpenApiSerializable for OAuthFlows {
    fn serialize<W: OpenApiWriter>(
        &self,
        w: &mut W,
        ctx: &mut WriteContext<'_>,
        version: SpecVersion,
    ) -> OasResult<()> {
        if version.is_v2() {
            tracing::debug!("OAuth flows object has no 2.0 form; skipped");
            return Ok(());
        }
        w.write_start_object();
        w.write_optional_object("implicit", self.implicit.as_ref(), |w, f| f.serialize(w, ctx, version))?;
        w.write_optional_object("password", self.password.as_ref(), |w, f| f.serialize(w, ctx, version))?;
        w.write_optional_object("clientCredentials", self.client_credentials.as_ref(), |w, f| {
            f.serialize(w, ctx, version)
        })?;
        w.write_optional_object("authorizationCode", self.authorization_code.as_ref(), |w, f| {
            f.serialize(w, ctx, version)
        })?;
        w.write_extensions(&self.extensions);
        w.write_end_object();
        Ok(())
    }
}

/// An authentication scheme.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SecurityScheme {
    /// Scheme kind.
    pub scheme_type: SecuritySchemeType,
    /// Description.
    pub description: Option<String>,
    /// API key name.
    pub name: Option<String>,
    /// API key location.
    pub location: Option<ApiKeyLocation>,
    /// HTTP authorization scheme (`basic`, `bearer`, ...).
    pub scheme: Option<String>,
    /// Bearer token format hint.
    pub bearer_format: Option<String>,
    /// OAuth flows.
    pub flows: Option<OAuthFlows>,
    /// OpenID Connect discovery URL.
    pub open_id_connect_url: Option<String>,
    /// Specification extensions.
    pub extensions: Extensions,
}

impl SecurityScheme {
    /// An API key scheme.
    pub fn api_key(name: impl Into<String>, location: ApiKeyLocation) -> Self {
        Self {
            scheme_type: SecuritySchemeType::ApiKey,
            name: Some(name.into()),
            location: Some(location),
            ..Self::default()
        }
    }

    /// An HTTP scheme such as `basic` or `bearer`.
    pub fn http(scheme: impl Into<String>) -> Self {
        Self {
            scheme_type: SecuritySchemeType::Http,
            scheme: Some(scheme.into()),
            ..Self::default()
        }
    }

    /// Whether 2.0 `securityDefinitions` can hold this scheme.
    pub fn is_v2_representable(&self) -> bool {
        match self.scheme_type {
            SecuritySchemeType::ApiKey => self.location != Some(ApiKeyLocation::Cookie),
            SecuritySchemeType::Http => self
                .scheme
                .as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case("basic")),
            SecuritySchemeType::OAuth2 => self
                .flows
                .as_ref()
                .is_some_and(|flows| flows.first_v2_flow().is_some()),
            SecuritySchemeType::OpenIdConnect | SecuritySchemeType::MutualTls => false,
        }
    }

    fn write_v2<W: OpenApiWriter>(&self, w: &mut W) -> OasResult<()> {
        w.write_start_object();
        match self.scheme_type {
            SecuritySchemeType::ApiKey => {
                w.write_property("type", "apiKey");
                w.write_optional_property("description", self.description.as_deref());
                w.write_optional_property("name", self.name.as_deref());
                w.write_optional_property("in", self.location.map(ApiKeyLocation::as_str));
            }
            SecuritySchemeType::Http => {
                if self.is_v2_representable() {
                    w.write_property("type", "basic");
                } else {
                    tracing::debug!(scheme = ?self.scheme, "http scheme has no 2.0 form");
                }
                w.write_optional_property("description", self.description.as_deref());
            }
            SecuritySchemeType::OAuth2 => {
                w.write_property("type", "oauth2");
                w.write_optional_property("description", self.description.as_deref());
                if let Some((flow_name, flow)) = self.flows.as_ref().and_then(OAuthFlows::first_v2_flow) {
                    w.write_property("flow", flow_name);
                    flow.write_urls(w);
                    flow.write_scopes(w);
                }
            }
            SecuritySchemeType::OpenIdConnect | SecuritySchemeType::MutualTls => {
                tracing::debug!(scheme = self.scheme_type.as_str(), "security scheme has no 2.0 form");
            }
        }
        w.write_extensions(&self.extensions);
        w.write_end_object();
        Ok(())
    }
}

impl Component for SecurityScheme {
    const KIND: ReferenceType = ReferenceType::SecurityScheme;

    fn lookup<'d>(doc: &'d OpenApiDocument, id: &str) -> Option<Lookup<'d, Self>> {
        lookup_in(&doc.components.security_schemes, id)
    }
}

impl OpenApiSerializable for SecurityScheme {
    fn serialize<W: OpenApiWriter>(
        &self,
        w: &mut W,
        ctx: &mut WriteContext<'_>,
        version: SpecVersion,
    ) -> OasResult<()> {
        if version.is_v2() {
            return self.write_v2(w);
        }
        w.write_start_object();
        w.write_property("type", self.scheme_type.as_str());
        w.write_optional_property("description", self.description.as_deref());
        w.write_optional_property("name", self.name.as_deref());
        w.write_optional_property("in", self.location.map(ApiKeyLocation::as_str));
        w.write_optional_property("scheme", self.scheme.as_deref());
        w.write_optional_property("bearerFormat", self.bearer_format.as_deref());
        w.write_optional_object("flows", self.flows.as_ref(), |w, flows| flows.serialize(w, ctx, version))?;
        w.write_optional_property("openIdConnectUrl", self.open_id_connect_url.as_deref());
        w.write_extensions(&self.extensions);
        w.write_end_object();
        Ok(())
    }
}

/// Alternative-free set of schemes that must all be satisfied.
///
/// Keys are [`ReferenceType::SecurityScheme`] descriptors, written by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SecurityRequirement(Vec<(ReferenceDescriptor, Vec<String>)>);

impl SecurityRequirement {
    /// An empty requirement (`{}`, i.e. anonymous access).
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a scheme by name with its required scopes.
    pub fn with(mut self, scheme: impl Into<String>, scopes: Vec<String>) -> OasResult<Self> {
        self.insert(ReferenceDescriptor::local(ReferenceType::SecurityScheme, scheme)?, scopes);
        Ok(self)
    }

    /// Adds a scheme reference with its required scopes.
    pub fn insert(&mut self, scheme: ReferenceDescriptor, scopes: Vec<String>) {
        self.0.push((scheme, scopes));
    }

    /// Iterates over scheme references and scopes.
    pub fn iter(&self) -> impl Iterator<Item = (&ReferenceDescriptor, &[String])> {
        self.0.iter().map(|(scheme, scopes)| (scheme, scopes.as_slice()))
    }

    /// Whether no schemes are listed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether every listed scheme has a 2.0 form. Schemes that cannot be
    /// resolved count as representable.
    fn is_v2_representable(&self, resolver: &ReferenceResolver<'_>) -> bool {
        self.0.iter().all(|(scheme, _)| {
            resolver
                .resolve::<SecurityScheme>(scheme)
                .map_or(true, SecurityScheme::is_v2_representable)
        })
    }
}

impl OpenApiSerializable for SecurityRequirement {
    fn serialize<W: OpenApiWriter>(
        &self,
        w: &mut W,
        _ctx: &mut WriteContext<'_>,
        version: SpecVersion,
    ) -> OasResult<()> {
        w.write_start_object();
        for (scheme, scopes) in &self.0 {
            scheme.serialize(w, version);
            w.write_value(Value::Array(scopes.iter().map(|s| Value::from(s.as_str())).collect()));
        }
        w.write_end_object();
        Ok(())
    }
}

/// Writes `name: [requirement, ...]` when `requirements` is present.
pub(crate) fn write_security<W: OpenApiWriter>(
    w: &mut W,
    requirements: Option<&Vec<SecurityRequirement>>,
    ctx: &mut WriteContext<'_>,
    version: SpecVersion,
) -> OasResult<()> {
    let Some(requirements) = requirements else {
        return Ok(());
    };
    let resolver = ctx.resolver();
    let kept: Vec<&SecurityRequirement> = requirements
        .iter()
        .filter(|requirement| {
            let keep = !version.is_v2() || requirement.is_v2_representable(&resolver);
            if !keep {
                tracing::debug!("security requirement names a scheme with no 2.0 form; dropped");
            }
            keep
        })
        .collect();
    if kept.is_empty() && !requirements.is_empty() {
        return Ok(());
    }
    w.write_property_name("security");
    w.write_start_array();
    for requirement in kept {
        requirement.serialize(w, ctx, version)?;
    }
    w.write_end_array();
    Ok(())
}
