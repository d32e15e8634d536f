#![deny(missing_docs)]

//! # Reference Resolution
//!
//! Looks up the effective target of a [`ReferenceDescriptor`] inside a host
//! document (or, for external references, inside a document held by a
//! [`DocumentRegistry`]). Chains of component-to-component references are
//! followed with an in-progress set so loops end in
//! [`ResolutionError::CircularReference`] instead of unbounded recursion.

use super::{ReferenceDescriptor, ReferenceType, RefOr};
use crate::document::{DocumentId, OpenApiDocument};
use crate::error::ResolutionError;
use crate::registry::DocumentRegistry;
use indexmap::IndexMap;
use std::collections::HashSet;

/// Upper bound on the number of hops followed for a single resolution.
pub const MAX_RESOLUTION_DEPTH: usize = 64;

/// Outcome of looking an identifier up in one document.
pub enum Lookup<'d, T> {
    /// The identifier names a concrete body.
    Found(&'d T),
    /// The identifier names another reference that must be followed.
    Forward(&'d ReferenceDescriptor),
}

/// A model type that can be stored as a reusable component and referenced.
pub trait Component: Sized {
    /// The reference kind used to address this component.
    const KIND: ReferenceType;

    /// Finds `id` in `doc`.
    fn lookup<'d>(doc: &'d OpenApiDocument, id: &str) -> Option<Lookup<'d, Self>>;
}

/// Looks `id` up in a component map.
pub(crate) fn lookup_in<'d, T>(map: &'d IndexMap<String, RefOr<T>>, id: &str) -> Option<Lookup<'d, T>> {
    map.get(id).map(|entry| match entry {
        RefOr::Item(item) => Lookup::Found(item),
        RefOr::Ref(reference) => Lookup::Forward(reference),
    })
}

/// Resolves references against an explicit context.
///
/// The host document is passed in rather than read from the descriptor; a
/// descriptor's stored host identity is only used as a fallback through the
/// registry.
#[derive(Clone, Copy, Default)]
pub struct ReferenceResolver<'a> {
    host: Option<&'a OpenApiDocument>,
    registry: Option<&'a DocumentRegistry>,
}

impl<'a> ReferenceResolver<'a> {
    /// Creates a resolver for `host`.
    pub fn new(host: Option<&'a OpenApiDocument>) -> Self {
        Self {
            host,
            registry: None,
        }
    }

    /// Adds a registry used for external references and host lookup by identity.
    pub fn with_registry(mut self, registry: &'a DocumentRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// The explicit host document, if any.
    pub fn host(&self) -> Option<&'a OpenApiDocument> {
        self.host
    }

    /// Returns the effective component `descriptor` points at.
    pub fn resolve<T: Component>(
        &self,
        descriptor: &ReferenceDescriptor,
    ) -> Result<&'a T, ResolutionError> {
        let host = self.host_for(descriptor)?;
        let mut in_progress = HashSet::new();
        self.resolve_in(descriptor, host, &mut in_progress)
    }

    fn host_for(&self, descriptor: &ReferenceDescriptor) -> Result<&'a OpenApiDocument, ResolutionError> {
        if let Some(host) = self.host {
            return Ok(host);
        }
        descriptor
            .host_document()
            .and_then(|id| self.registry.and_then(|registry| registry.get_by_id(id)))
            .ok_or(ResolutionError::NoHostDocument)
    }

    fn resolve_in<T: Component>(
        &self,
        descriptor: &ReferenceDescriptor,
        current: &'a OpenApiDocument,
        in_progress: &mut HashSet<(DocumentId, String)>,
    ) -> Result<&'a T, ResolutionError> {
        let doc = match descriptor.external_resource() {
            Some(resource) => self.external_document(resource, current)?,
            None => current,
        };

        let id = descriptor
            .id()
            .ok_or_else(|| ResolutionError::MissingReference {
                kind: T::KIND,
                id: descriptor.external_resource().unwrap_or_default().to_string(),
            })?;

        if !in_progress.insert((doc.id(), id.to_string())) || in_progress.len() > MAX_RESOLUTION_DEPTH {
            tracing::debug!(kind = %T::KIND, id, "reference chain loops back on itself");
            return Err(ResolutionError::CircularReference {
                kind: T::KIND,
                id: id.to_string(),
            });
        }

        match T::lookup(doc, id) {
            Some(Lookup::Found(target)) => Ok(target),
            Some(Lookup::Forward(next)) => {
                tracing::trace!(kind = %T::KIND, from = id, to = next.reference_v3(), "following reference chain");
                self.resolve_in(next, doc, in_progress)
            }
            None => Err(ResolutionError::MissingReference {
                kind: T::KIND,
                id: id.to_string(),
            }),
        }
    }

    fn external_document(
        &self,
        resource: &str,
        current: &'a OpenApiDocument,
    ) -> Result<&'a OpenApiDocument, ResolutionError> {
        let registry = self
            .registry
            .ok_or_else(|| ResolutionError::ExternalDocumentNotFound(resource.to_string()))?;
        registry
            .resolve_document(resource, current.base_uri())
            .ok_or_else(|| ResolutionError::ExternalDocumentNotFound(resource.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Parameter, ParameterLocation, Schema, SchemaType};

    fn doc_with_chain() -> OpenApiDocument {
        let mut doc = OpenApiDocument::new("Chains", "1.0");
        let schemas = &mut doc.components.schemas;
        schemas.insert("Pet".into(), Schema::of_type(SchemaType::OBJECT).into());
        schemas.insert("Alias".into(), RefOr::local_ref(ReferenceType::Schema, "Pet").unwrap());
        schemas.insert("A".into(), RefOr::local_ref(ReferenceType::Schema, "B").unwrap());
        schemas.insert("B".into(), RefOr::local_ref(ReferenceType::Schema, "C").unwrap());
        schemas.insert("C".into(), RefOr::local_ref(ReferenceType::Schema, "A").unwrap());
        schemas.insert("Self".into(), RefOr::local_ref(ReferenceType::Schema, "Self").unwrap());
        doc
    }

    #[test]
    fn test_resolves_direct_and_chained() {
        let doc = doc_with_chain();
        let resolver = ReferenceResolver::new(Some(&doc));

        let pet = ReferenceDescriptor::local(ReferenceType::Schema, "Pet").unwrap();
        let resolved: &Schema = resolver.resolve(&pet).unwrap();
        assert_eq!(resolved.schema_type, Some(SchemaType::OBJECT));

        let alias = ReferenceDescriptor::local(ReferenceType::Schema, "Alias").unwrap();
        let via_alias: &Schema = resolver.resolve(&alias).unwrap();
        assert!(std::ptr::eq(resolved, via_alias));
    }

    #[test]
    fn test_detects_cycles() {
        let doc = doc_with_chain();
        let resolver = ReferenceResolver::new(Some(&doc));

        for id in ["A", "Self"] {
            let descriptor = ReferenceDescriptor::local(ReferenceType::Schema, id).unwrap();
            let err = resolver.resolve::<Schema>(&descriptor).unwrap_err();
            assert!(matches!(err, ResolutionError::CircularReference { .. }), "{}", id);
        }
    }

    #[test]
    fn test_missing_reference() {
        let doc = doc_with_chain();
        let resolver = ReferenceResolver::new(Some(&doc));
        let descriptor = ReferenceDescriptor::local(ReferenceType::Schema, "Nope").unwrap();
        assert_eq!(
            resolver.resolve::<Schema>(&descriptor).unwrap_err(),
            ResolutionError::MissingReference {
                kind: ReferenceType::Schema,
                id: "Nope".into()
            }
        );
    }

    #[test]
    fn test_kind_selects_component_map() {
        let mut doc = OpenApiDocument::new("Kinds", "1.0");
        doc.components
            .parameters
            .insert("Limit".into(), Parameter::new("limit", ParameterLocation::Query).into());
        let resolver = ReferenceResolver::new(Some(&doc));

        let as_param = ReferenceDescriptor::local(ReferenceType::Parameter, "Limit").unwrap();
        assert_eq!(resolver.resolve::<Parameter>(&as_param).unwrap().name, "limit");

        let as_schema = ReferenceDescriptor::local(ReferenceType::Schema, "Limit").unwrap();
        assert!(resolver.resolve::<Schema>(&as_schema).is_err());
    }

    #[test]
    fn test_requires_host_document() {
        let descriptor = ReferenceDescriptor::local(ReferenceType::Schema, "Pet").unwrap();
        let resolver = ReferenceResolver::new(None);
        assert_eq!(
            resolver.resolve::<Schema>(&descriptor).unwrap_err(),
            ResolutionError::NoHostDocument
        );
    }

    #[test]
    fn test_falls_back_to_registered_host() {
        let doc = doc_with_chain();
        let descriptor = ReferenceDescriptor::local(ReferenceType::Schema, "Pet").unwrap();
        descriptor.ensure_host_document_is_set(doc.id());

        let mut registry = DocumentRegistry::new();
        registry.register("https://example.com/chains.yaml", doc).unwrap();

        let resolver = ReferenceResolver::new(None).with_registry(&registry);
        assert!(resolver.resolve::<Schema>(&descriptor).is_ok());
    }
}
