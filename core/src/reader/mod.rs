#![deny(missing_docs)]

//! # Document Reader
//!
//! Parses JSON or YAML text into an [`OpenApiDocument`], whatever version it
//! was written in.
//!
//! - **node**: typed access over the generic node tree, plus diagnostics.
//! - **schema**: schema bodies, folded into the canonical (3.1-shaped) form.
//! - **v3**: 3.0 and 3.1 objects.
//! - **v2**: 2.0 objects, upgraded while reading.
//!
//! Malformed but recoverable input produces a [`Diagnostic`] instead of an
//! error; only unparsable text or a non-object root fails.

mod node;
mod schema;
mod v2;
mod v3;

use crate::document::OpenApiDocument;
use crate::error::{OasError, OasResult};
use crate::registry::parse_base_url;
use crate::version::SpecVersion;
use node::{as_string, ParsingContext};
use serde_json::{Map, Value};

pub use node::Diagnostic;

/// Reader configuration.
#[derive(Debug, Clone, Default)]
pub struct ReaderSettings {
    /// Retrieval URI of the text, used as the document's base URI.
    pub base_uri: Option<String>,
}

/// A document plus everything the reader had to say about it.
#[derive(Debug)]
pub struct ReadResult {
    /// The parsed document.
    pub document: OpenApiDocument,
    /// Version the text was written in.
    pub version: SpecVersion,
    /// Recoverable problems, in reading order.
    pub diagnostics: Vec<Diagnostic>,
}

/// Parses JSON or YAML text into a document.
pub fn read_document(text: &str, settings: &ReaderSettings) -> OasResult<ReadResult> {
    let root: Value = if text.trim_start().starts_with('{') {
        serde_json::from_str(text)?
    } else {
        serde_yaml::from_str(text)?
    };
    read_value(&root, settings)
}

/// Builds a document from an already parsed node tree.
pub fn read_value(root: &Value, settings: &ReaderSettings) -> OasResult<ReadResult> {
    let Some(root) = root.as_object() else {
        return Err(OasError::InvalidArgument(
            "an OpenAPI document must be an object".to_string(),
        ));
    };

    let mut document = OpenApiDocument::new("", "");
    if let Some(base_uri) = settings.base_uri.as_deref() {
        document.set_base_uri(parse_base_url(base_uri));
    }

    let mut diagnostics = Vec::new();
    let version = detect_version(root, &mut diagnostics);
    let mut ctx = ParsingContext::new(version, document.id());
    ctx.diagnostics = diagnostics;
    match version {
        SpecVersion::OpenApi2_0 => v2::read_v2(&mut ctx, root, &mut document),
        SpecVersion::OpenApi3_0 | SpecVersion::OpenApi3_1 => v3::read_v3(&mut ctx, root, &mut document),
    }

    tracing::debug!(
        %version,
        document = %document.id(),
        diagnostics = ctx.diagnostics.len(),
        "read OpenAPI document"
    );
    Ok(ReadResult {
        document,
        version,
        diagnostics: ctx.diagnostics,
    })
}

/// Detects the version from `swagger` / `openapi`, falling back to the closest match.
fn detect_version(root: &Map<String, Value>, diagnostics: &mut Vec<Diagnostic>) -> SpecVersion {
    let (raw, is_swagger) = match (as_string(root, "swagger"), as_string(root, "openapi")) {
        (Some(raw), _) => (raw, true),
        (None, Some(raw)) => (raw, false),
        (None, None) => {
            report(diagnostics, "no 'openapi' or 'swagger' version field; reading as 3.0".to_string());
            return SpecVersion::OpenApi3_0;
        }
    };
    if let Some(version) = SpecVersion::from_version_string(&raw, is_swagger) {
        return version;
    }
    let fallback = if is_swagger {
        SpecVersion::OpenApi2_0
    } else if raw.trim().starts_with("3.1") {
        SpecVersion::OpenApi3_1
    } else {
        SpecVersion::OpenApi3_0
    };
    report(
        diagnostics,
        format!("unsupported version '{}'; reading as {}", raw, fallback),
    );
    fallback
}

fn report(diagnostics: &mut Vec<Diagnostic>, message: String) {
    tracing::warn!(message = %message, "OpenAPI version mismatch");
    diagnostics.push(Diagnostic {
        pointer: "#".to_string(),
        message,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_reads_yaml_and_json() {
        let yaml = r#"
openapi: 3.1.0
info:
  title: Pets
  version: "1.0"
paths: {}
"#;
        let result = read_document(yaml, &ReaderSettings::default()).unwrap();
        assert_eq!(result.version, SpecVersion::OpenApi3_1);
        assert_eq!(result.document.info.title, "Pets");
        assert!(result.diagnostics.is_empty());

        let json = r#"{"swagger": "2.0", "info": {"title": "Old", "version": "1"}, "paths": {}}"#;
        let result = read_document(json, &ReaderSettings::default()).unwrap();
        assert_eq!(result.version, SpecVersion::OpenApi2_0);
    }

    #[test]
    fn test_version_mismatch_is_diagnosed() {
        let json = r#"{"openapi": "4.0.0", "info": {"title": "Next", "version": "1"}, "paths": {}}"#;
        let result = read_document(json, &ReaderSettings::default()).unwrap();
        assert_eq!(result.version, SpecVersion::OpenApi3_0);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].pointer, "#");
    }

    #[test]
    fn test_non_object_root_fails() {
        let err = read_document("[1, 2]", &ReaderSettings::default()).unwrap_err();
        assert!(matches!(err, OasError::InvalidArgument(_)));
        assert!(matches!(
            read_document("{not json", &ReaderSettings::default()),
            Err(OasError::Json(_))
        ));
    }

    #[test]
    fn test_base_uri_applied() {
        let settings = ReaderSettings {
            base_uri: Some("https://example.com/specs/pets.yaml".to_string()),
        };
        let result = read_document(
            r#"{"openapi": "3.0.3", "info": {"title": "t", "version": "1"}, "paths": {}}"#,
            &settings,
        )
        .unwrap();
        assert_eq!(
            result.document.base_uri().map(|u| u.as_str()),
            Some("https://example.com/specs/pets.yaml")
        );
    }
}
