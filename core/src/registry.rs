#![deny(missing_docs)]

//! # Document Registry
//!
//! Stores externally supplied OpenAPI documents for multi-document reference
//! resolution. No network or file access is performed: callers fetch and
//! register documents themselves.

use crate::document::{DocumentId, OpenApiDocument};
use crate::error::{OasError, OasResult};
use crate::reader::{read_document, Diagnostic, ReaderSettings};
use std::collections::HashMap;
use url::Url;

const DUMMY_BASE: &str = "http://example.invalid/";

/// Registry of documents keyed by retrieval URI and by identity.
#[derive(Default)]
pub struct DocumentRegistry {
    docs: Vec<OpenApiDocument>,
    index: HashMap<String, usize>,
    by_id: HashMap<DocumentId, usize>,
}

impl DocumentRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an already-built document under `retrieval_uri`.
    ///
    /// The document's base URI is set to the retrieval URI when it has none.
    pub fn register(&mut self, retrieval_uri: &str, mut doc: OpenApiDocument) -> OasResult<DocumentId> {
        if doc.base_uri().is_none() {
            doc.set_base_uri(parse_base_url(retrieval_uri));
        }

        let mut aliases = vec![retrieval_uri.to_string()];
        if let Some(base) = doc.base_uri() {
            let base = base.to_string();
            if base != retrieval_uri {
                aliases.push(base);
            }
        }

        for alias in &aliases {
            if let Some(existing) = self.index.get(alias) {
                return Err(OasError::InvalidArgument(format!(
                    "Document registry URI collision for '{}': already registered as document {}",
                    alias,
                    self.docs[*existing].id()
                )));
            }
        }

        let idx = self.docs.len();
        let id = doc.id();
        self.docs.push(doc);
        for alias in aliases {
            self.index.insert(alias, idx);
        }
        self.by_id.insert(id, idx);
        tracing::debug!(uri = retrieval_uri, document = %id, "registered document");
        Ok(id)
    }

    /// Parses JSON or YAML text and registers the resulting document.
    ///
    /// Returns the identity of the registered document and the reader's diagnostics.
    pub fn register_text(
        &mut self,
        retrieval_uri: &str,
        text: &str,
    ) -> OasResult<(DocumentId, Vec<Diagnostic>)> {
        let settings = ReaderSettings {
            base_uri: Some(retrieval_uri.to_string()),
        };
        let result = read_document(text, &settings)?;
        let id = self.register(retrieval_uri, result.document)?;
        Ok((id, result.diagnostics))
    }

    /// Returns a registered document by any known URI.
    pub fn get(&self, uri: &str) -> Option<&OpenApiDocument> {
        self.index.get(uri).and_then(|idx| self.docs.get(*idx))
    }

    /// Returns a registered document by identity.
    pub fn get_by_id(&self, id: DocumentId) -> Option<&OpenApiDocument> {
        self.by_id.get(&id).and_then(|idx| self.docs.get(*idx))
    }

    /// Finds the document an external `$ref` resource names, relative to `base`.
    pub fn resolve_document(&self, resource: &str, base: Option<&Url>) -> Option<&OpenApiDocument> {
        if let Some(doc) = self.get(resource) {
            return Some(doc);
        }
        let uri = resolve_doc_uri(resource, base)?;
        self.get(&uri)
    }

    /// Number of registered documents.
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

/// Parses a base URI, anchoring relative paths on a placeholder host.
pub(crate) fn parse_base_url(base_str: &str) -> Option<Url> {
    if let Ok(url) = Url::parse(base_str) {
        return Some(url);
    }
    let dummy = Url::parse(DUMMY_BASE).ok()?;
    dummy.join(base_str).ok()
}

fn resolve_doc_uri(doc: &str, base: Option<&Url>) -> Option<String> {
    if let Ok(url) = Url::parse(doc) {
        return Some(url.to_string());
    }
    let base = base?;
    base.join(doc).ok().map(|u| u.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Schema;
    use crate::reference::{ReferenceDescriptor, ReferenceResolver, ReferenceType};

    fn common_doc() -> OpenApiDocument {
        let mut doc = OpenApiDocument::new("Common", "1.0");
        doc.components.schemas.insert(
            "Error".into(),
            Schema {
                title: Some("Error".into()),
                ..Schema::default()
            }
            .into(),
        );
        doc
    }

    #[test]
    fn test_rejects_uri_collision() {
        let mut registry = DocumentRegistry::new();
        registry.register("https://example.com/common.yaml", common_doc()).unwrap();
        let err = registry
            .register("https://example.com/common.yaml", common_doc())
            .unwrap_err();
        assert!(matches!(err, OasError::InvalidArgument(_)));
    }

    #[test]
    fn test_resolves_relative_external_reference() {
        let mut registry = DocumentRegistry::new();
        registry.register("https://example.com/api/common.yaml", common_doc()).unwrap();

        let mut host = OpenApiDocument::new("Host", "1.0");
        host.set_base_uri(Url::parse("https://example.com/api/openapi.yaml").ok());

        let reference = ReferenceDescriptor::parse(
            "common.yaml#/components/schemas/Error",
            ReferenceType::Schema,
        )
        .unwrap();
        let resolver = ReferenceResolver::new(Some(&host)).with_registry(&registry);
        let schema: &Schema = resolver.resolve(&reference).unwrap();
        assert_eq!(schema.title.as_deref(), Some("Error"));
    }

    #[test]
    fn test_register_text_reads_yaml() {
        let yaml = r#"
openapi: 3.0.3
info: {title: Remote, version: "1"}
paths: {}
components:
  schemas:
    Pet:
      type: object
"#;
        let mut registry = DocumentRegistry::new();
        let (id, diagnostics) = registry.register_text("https://example.com/pets.yaml", yaml).unwrap();
        assert!(diagnostics.is_empty());
        let doc = registry.get_by_id(id).unwrap();
        assert!(doc.components.schemas.contains_key("Pet"));
        assert!(registry.get("https://example.com/pets.yaml").is_some());
    }
}
