#![deny(missing_docs)]

//! # References
//!
//! - **ReferenceType**: what kind of reusable component a `$ref` targets.
//! - **ReferenceDescriptor**: an immutable pointer to a component, rendered lazily
//!   into the `$ref` syntax of each wire format.
//! - **RefOr**: the tagged union every reference-bearing slot holds.
//! - **resolver**: effective-value lookup against a host document.
//! - **pointer**: JSON Pointer helpers, including relative pointer rebasing.

pub mod pointer;
pub mod resolver;

use crate::document::DocumentId;
use crate::error::{OasError, OasResult};
use crate::version::SpecVersion;
use crate::writer::OpenApiWriter;
use pointer::{decode_pointer_segment, encode_pointer_segment, pointer_segments};
use std::cell::OnceCell;
use std::fmt;
use url::Url;

pub use resolver::{Component, Lookup, ReferenceResolver};

/// The kind of reusable component a reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceType {
    /// `components/schemas` (`definitions` in 2.0).
    Schema,
    /// `components/responses`.
    Response,
    /// `components/parameters`.
    Parameter,
    /// `components/examples` (no 2.0 collection).
    Example,
    /// `components/requestBodies` (2.0 body parameters).
    RequestBody,
    /// `components/headers`.
    Header,
    /// `components/securitySchemes` (`securityDefinitions` in 2.0).
    SecurityScheme,
    /// `components/links` (no 2.0 collection).
    Link,
    /// `components/callbacks` (no 2.0 collection).
    Callback,
    /// Root-level `tags`, referenced by name.
    Tag,
    /// `components/pathItems` (3.1 only).
    PathItem,
}

impl ReferenceType {
    /// Every reference kind, in component-section order.
    pub const ALL: [ReferenceType; 11] = [
        ReferenceType::Schema,
        ReferenceType::Response,
        ReferenceType::Parameter,
        ReferenceType::Example,
        ReferenceType::RequestBody,
        ReferenceType::Header,
        ReferenceType::SecurityScheme,
        ReferenceType::Link,
        ReferenceType::Callback,
        ReferenceType::Tag,
        ReferenceType::PathItem,
    ];

    /// The plural collection name used by 3.x (`#/components/{name}/...`).
    pub fn components_name(self) -> &'static str {
        match self {
            ReferenceType::Schema => "schemas",
            ReferenceType::Response => "responses",
            ReferenceType::Parameter => "parameters",
            ReferenceType::Example => "examples",
            ReferenceType::RequestBody => "requestBodies",
            ReferenceType::Header => "headers",
            ReferenceType::SecurityScheme => "securitySchemes",
            ReferenceType::Link => "links",
            ReferenceType::Callback => "callbacks",
            ReferenceType::Tag => "tags",
            ReferenceType::PathItem => "pathItems",
        }
    }

    /// The 2.0 root collection name, or `None` when 2.0 has no such collection.
    pub fn v2_name(self) -> Option<&'static str> {
        match self {
            ReferenceType::Schema => Some("definitions"),
            ReferenceType::Parameter | ReferenceType::RequestBody => Some("parameters"),
            ReferenceType::Response => Some("responses"),
            ReferenceType::Header => Some("headers"),
            ReferenceType::Tag => Some("tags"),
            ReferenceType::SecurityScheme => Some("securityDefinitions"),
            ReferenceType::Example
            | ReferenceType::Link
            | ReferenceType::Callback
            | ReferenceType::PathItem => None,
        }
    }

    /// Inverse of [`ReferenceType::components_name`].
    pub fn from_components_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.components_name() == name)
    }

    /// Kinds written as bare names rather than `$ref` pointers.
    fn is_name_only(self) -> bool {
        matches!(self, ReferenceType::Tag | ReferenceType::SecurityScheme)
    }
}

impl fmt::Display for ReferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.components_name())
    }
}

/// Whether an identifier is already an absolute `http(s)` URL.
pub(crate) fn is_absolute_url(value: &str) -> bool {
    Url::parse(value).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

/// Immutable description of a pointer to a reusable component.
///
/// The rendered `$ref` strings are memoized on first access. The host document
/// identity is a non-owning, set-once tag: it is never re-assigned and never
/// consulted for ownership, and it does not affect the rendered strings.
#[derive(Debug, Clone)]
pub struct ReferenceDescriptor {
    kind: ReferenceType,
    id: Option<String>,
    external_resource: Option<String>,
    is_fragment: bool,
    host_document: OnceCell<DocumentId>,
    rendered_v3: OnceCell<String>,
    rendered_v2: OnceCell<Option<String>>,
}

impl ReferenceDescriptor {
    /// Creates a descriptor.
    ///
    /// Fails with [`OasError::InvalidArgument`] when both `id` and
    /// `external_resource` are empty.
    pub fn new(
        kind: ReferenceType,
        id: Option<String>,
        external_resource: Option<String>,
    ) -> OasResult<Self> {
        let id = id.filter(|s| !s.is_empty());
        let external_resource = external_resource.filter(|s| !s.is_empty());
        if id.is_none() && external_resource.is_none() {
            return Err(OasError::InvalidArgument(format!(
                "a {} reference needs an identifier or an external resource",
                kind
            )));
        }
        Ok(Self {
            kind,
            id,
            external_resource,
            is_fragment: false,
            host_document: OnceCell::new(),
            rendered_v3: OnceCell::new(),
            rendered_v2: OnceCell::new(),
        })
    }

    /// Shorthand for a reference to a component of the current document.
    pub fn local(kind: ReferenceType, id: impl Into<String>) -> OasResult<Self> {
        Self::new(kind, Some(id.into()), None)
    }

    /// Shorthand for a reference into another document.
    pub fn external(
        kind: ReferenceType,
        external_resource: impl Into<String>,
        id: Option<String>,
    ) -> OasResult<Self> {
        Self::new(kind, id, Some(external_resource.into()))
    }

    /// Marks the identifier as a raw fragment (`resource#fragment`) rather than a component name.
    pub fn with_fragment(mut self, is_fragment: bool) -> Self {
        self.is_fragment = is_fragment;
        self.rendered_v3 = OnceCell::new();
        self.rendered_v2 = OnceCell::new();
        self
    }

    /// Target kind.
    pub fn kind(&self) -> ReferenceType {
        self.kind
    }

    /// Component identifier (or full pointer for deep local references).
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// External document, when the reference leaves the current document.
    pub fn external_resource(&self) -> Option<&str> {
        self.external_resource.as_deref()
    }

    /// Whether the identifier is a raw fragment of the external resource.
    pub fn is_fragment(&self) -> bool {
        self.is_fragment
    }

    /// Whether the reference points into another document.
    pub fn is_external(&self) -> bool {
        self.external_resource.is_some()
    }

    /// Whether the reference points into the current document.
    pub fn is_local(&self) -> bool {
        !self.is_external()
    }

    /// Host document the descriptor was adopted into, if any.
    pub fn host_document(&self) -> Option<DocumentId> {
        self.host_document.get().copied()
    }

    /// Adopts the descriptor into `host`. No-op once a host has been set.
    pub fn ensure_host_document_is_set(&self, host: DocumentId) {
        if self.host_document.set(host).is_err() {
            tracing::trace!(kind = %self.kind, "host document already set; keeping first host");
        }
    }

    /// The 3.x `$ref` string.
    pub fn reference_v3(&self) -> &str {
        self.rendered_v3.get_or_init(|| self.render_v3())
    }

    /// The 2.0 `$ref` string, or `None` when 2.0 cannot represent the target kind.
    pub fn reference_v2(&self) -> Option<&str> {
        self.rendered_v2
            .get_or_init(|| self.render_v2())
            .as_deref()
    }

    /// Rendered string for `version`.
    pub fn reference_for(&self, version: SpecVersion) -> Option<&str> {
        match version {
            SpecVersion::OpenApi2_0 => self.reference_v2(),
            SpecVersion::OpenApi3_0 | SpecVersion::OpenApi3_1 => Some(self.reference_v3()),
        }
    }

    /// Renders an external reference in 3.x syntax.
    pub fn render_external_v3(&self) -> String {
        let resource = self.external_resource.as_deref().unwrap_or_default();
        let Some(id) = self.id.as_deref() else {
            return resource.to_string();
        };
        if self.is_fragment {
            format!("{}#{}", resource, id)
        } else if is_absolute_url(id) {
            id.to_string()
        } else {
            format!(
                "{}#/components/{}/{}",
                resource,
                self.kind.components_name(),
                encode_pointer_segment(id)
            )
        }
    }

    fn render_v3(&self) -> String {
        if self.is_external() {
            return self.render_external_v3();
        }
        let id = self.id.as_deref().unwrap_or_default();
        if self.kind.is_name_only() || is_absolute_url(id) || id.starts_with("#/") {
            return id.to_string();
        }
        format!(
            "#/components/{}/{}",
            self.kind.components_name(),
            encode_pointer_segment(id)
        )
    }

    fn render_v2(&self) -> Option<String> {
        if let Some(resource) = self.external_resource.as_deref() {
            let Some(id) = self.id.as_deref() else {
                return Some(resource.to_string());
            };
            if self.is_fragment {
                return Some(format!("{}#{}", resource, id));
            }
            return self
                .kind
                .v2_name()
                .map(|name| format!("{}#/{}/{}", resource, name, encode_pointer_segment(id)));
        }

        let id = self.id.as_deref().unwrap_or_default();
        if self.kind.is_name_only() || is_absolute_url(id) {
            return Some(id.to_string());
        }
        let v2_name = self.kind.v2_name()?;
        let deep_prefix = format!("#/components/{}/", self.kind.components_name());
        match id.strip_prefix(deep_prefix.as_str()) {
            Some(rest) => Some(format!("#/{}/{}", v2_name, rest)),
            None if id.starts_with("#/") => Some(id.to_string()),
            None => Some(format!("#/{}/{}", v2_name, encode_pointer_segment(id))),
        }
    }

    /// Parses a raw `$ref` string found in a slot that expects `kind`.
    ///
    /// Accepts 3.x component pointers, 2.0 collection pointers, bare names (tags,
    /// security schemes), deep local pointers (kept verbatim as the identifier)
    /// and external `resource#fragment` forms.
    pub fn parse(reference: &str, kind: ReferenceType) -> OasResult<Self> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(OasError::InvalidArgument(format!(
                "empty $ref for a {} reference",
                kind
            )));
        }

        match reference.split_once('#') {
            None if kind.is_name_only() || !looks_like_resource(reference) => {
                Self::local(kind, reference)
            }
            None => Self::external(kind, reference, None),
            Some(("", fragment)) => match component_name(fragment, kind) {
                Some(name) => Self::local(kind, name),
                None => Self::local(kind, reference),
            },
            Some((resource, fragment)) => match component_name(fragment, kind) {
                Some(name) => Self::external(kind, resource, Some(name)),
                None if fragment.is_empty() => Self::external(kind, resource, None),
                None => Ok(Self::external(kind, resource, Some(fragment.to_string()))?
                    .with_fragment(true)),
            },
        }
    }

    /// Writes the reference for `version`.
    ///
    /// Tags are written as a bare scalar name, security schemes as a property
    /// name, everything else as a `{"$ref": ...}` object. A kind with no 2.0
    /// collection writes an empty object in 2.0.
    pub fn serialize<W: OpenApiWriter>(&self, writer: &mut W, version: SpecVersion) {
        let rendered = self.reference_for(version);
        match self.kind {
            ReferenceType::Tag => writer.write_value(rendered.unwrap_or_default().into()),
            ReferenceType::SecurityScheme => {
                writer.write_property_name(rendered.unwrap_or_default())
            }
            _ => {
                if rendered.is_none() {
                    tracing::debug!(kind = %self.kind, %version, "reference has no representation; writing empty object");
                }
                writer.write_start_object();
                writer.write_optional_property("$ref", rendered);
                writer.write_end_object();
            }
        }
    }
}

impl PartialEq for ReferenceDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.id == other.id
            && self.external_resource == other.external_resource
            && self.is_fragment == other.is_fragment
    }
}

impl Eq for ReferenceDescriptor {}

fn looks_like_resource(reference: &str) -> bool {
    is_absolute_url(reference) || reference.contains('/') || reference.contains('.')
}

/// Extracts `{name}` from `/components/{kind}/{name}` or `/{v2 collection}/{name}`.
fn component_name(fragment: &str, kind: ReferenceType) -> Option<String> {
    let segments = pointer_segments(fragment);
    match segments.as_slice() {
        ["components", section, name] if *section == kind.components_name() => {
            Some(decode_pointer_segment(name))
        }
        [section, name] if Some(*section) == kind.v2_name() => Some(decode_pointer_segment(name)),
        _ => None,
    }
}

/// Either a reference to a reusable component or an inline body.
///
/// A reference is terminal for its occurrence: no body fields exist alongside it.
#[derive(Debug, Clone, PartialEq)]
pub enum RefOr<T> {
    /// A `$ref` to a component.
    Ref(ReferenceDescriptor),
    /// An inline body.
    Item(T),
}

impl<T> RefOr<T> {
    /// Builds a local reference occurrence.
    pub fn local_ref(kind: ReferenceType, id: impl Into<String>) -> OasResult<Self> {
        Ok(RefOr::Ref(ReferenceDescriptor::local(kind, id)?))
    }

    /// The inline body, if this occurrence is not a reference.
    pub fn as_item(&self) -> Option<&T> {
        match self {
            RefOr::Item(item) => Some(item),
            RefOr::Ref(_) => None,
        }
    }

    /// Mutable access to the inline body.
    pub fn as_item_mut(&mut self) -> Option<&mut T> {
        match self {
            RefOr::Item(item) => Some(item),
            RefOr::Ref(_) => None,
        }
    }

    /// The reference descriptor, if this occurrence is a reference.
    pub fn as_reference(&self) -> Option<&ReferenceDescriptor> {
        match self {
            RefOr::Ref(reference) => Some(reference),
            RefOr::Item(_) => None,
        }
    }

    /// Whether this occurrence is a reference.
    pub fn is_reference(&self) -> bool {
        matches!(self, RefOr::Ref(_))
    }
}

impl<T: Component> RefOr<T> {
    /// Returns the effective (dereferenced) body.
    pub fn effective<'s>(
        &'s self,
        resolver: &ReferenceResolver<'s>,
    ) -> Result<&'s T, crate::error::ResolutionError> {
        match self {
            RefOr::Item(item) => Ok(item),
            RefOr::Ref(reference) => resolver.resolve::<T>(reference),
        }
    }
}

impl<T> From<T> for RefOr<T> {
    fn from(item: T) -> Self {
        RefOr::Item(item)
    }
}
