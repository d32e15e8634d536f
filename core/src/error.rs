//! # Error Handling
//!
//! Provides the unified `OasError` enum used across the crate, plus the
//! `ResolutionError` surfaced by reference lookups.

use crate::reference::ReferenceType;
use derive_more::{Display, From};

/// Failures raised while looking up the effective target of a `$ref`.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ResolutionError {
    /// No component of the given kind and identifier exists in the target document.
    #[display("Missing reference: {kind}/{id}")]
    MissingReference {
        /// Target kind of the reference.
        kind: ReferenceType,
        /// Identifier that failed to resolve.
        id: String,
    },

    /// Neither an explicit host document nor a registered host was available.
    #[display("No host document available to resolve the reference against")]
    NoHostDocument,

    /// A chain of references loops back on itself (or nests pathologically deep).
    #[display("Unsupported circular reference: {kind}/{id}")]
    CircularReference {
        /// Target kind of the reference.
        kind: ReferenceType,
        /// Identifier where the loop was detected.
        id: String,
    },

    /// An external reference points at a document the registry does not hold.
    #[display("External document not found: {_0}")]
    ExternalDocumentNotFound(String),
}

impl std::error::Error for ResolutionError {}

/// The crate-wide error enum.
///
/// Lossy downgrades are not represented here: they are dropped silently
/// (and logged at `debug`) while the rest of the object is written.
#[derive(Debug, Display, From)]
pub enum OasError {
    /// A caller handed in arguments that can never be valid.
    #[from(ignore)]
    #[display("Invalid argument: {_0}")]
    InvalidArgument(String),

    /// A reference could not be resolved.
    #[display("Resolution Error: {_0}")]
    Resolution(ResolutionError),

    /// A schema graph loops back on itself while being written inline.
    #[from(ignore)]
    #[display("Circular schema serialization unsupported: {_0}")]
    CircularSchema(String),

    /// Specification extensions must be keyed with the `x-` prefix.
    #[from(ignore)]
    #[display("Invalid extension key '{_0}': extensions must start with 'x-'")]
    InvalidExtension(String),

    /// Wrapper for JSON text errors.
    #[display("JSON Error: {_0}")]
    Json(serde_json::Error),

    /// Wrapper for YAML text errors.
    #[display("YAML Error: {_0}")]
    Yaml(serde_yaml::Error),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for OasError {}

/// Helper type alias for Result using OasError.
pub type OasResult<T> = Result<T, OasError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_conversion() {
        let err: OasError = ResolutionError::NoHostDocument.into();
        assert!(matches!(err, OasError::Resolution(ResolutionError::NoHostDocument)));
    }

    #[test]
    fn test_missing_reference_display() {
        let err = ResolutionError::MissingReference {
            kind: ReferenceType::Schema,
            id: "Pet".into(),
        };
        assert_eq!(err.to_string(), "Missing reference: schemas/Pet");
    }

    #[test]
    fn test_invalid_extension_display() {
        let err = OasError::InvalidExtension("vendor".into());
        assert_eq!(
            format!("{}", err),
            "Invalid extension key 'vendor': extensions must start with 'x-'"
        );
    }
}
