#![deny(missing_docs)]

//! # Specification Versions
//!
//! The three wire formats the model can be written to and read from.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Which OpenAPI wire format a read or write targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecVersion {
    /// Swagger / OpenAPI 2.0.
    OpenApi2_0,
    /// OpenAPI 3.0.x.
    OpenApi3_0,
    /// OpenAPI 3.1.x (JSON Schema 2020-12 dialect).
    OpenApi3_1,
}

impl SpecVersion {
    /// The version string emitted in the `swagger` / `openapi` root field.
    pub fn version_string(self) -> &'static str {
        match self {
            SpecVersion::OpenApi2_0 => "2.0",
            SpecVersion::OpenApi3_0 => "3.0.4",
            SpecVersion::OpenApi3_1 => "3.1.1",
        }
    }

    /// Whether this is the Swagger 2.0 format.
    pub fn is_v2(self) -> bool {
        self == SpecVersion::OpenApi2_0
    }

    /// Matches a raw `swagger` / `openapi` field value against the supported versions.
    ///
    /// `swagger` must be exactly `2.0`; `openapi` must be `3.0.x` or `3.1.x`.
    pub fn from_version_string(raw: &str, is_swagger_field: bool) -> Option<Self> {
        let (v2, v30, v31) = version_patterns();
        let raw = raw.trim();
        if is_swagger_field {
            return v2.is_match(raw).then_some(SpecVersion::OpenApi2_0);
        }
        if v30.is_match(raw) {
            Some(SpecVersion::OpenApi3_0)
        } else if v31.is_match(raw) {
            Some(SpecVersion::OpenApi3_1)
        } else {
            None
        }
    }
}

impl fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.version_string())
    }
}

fn version_patterns() -> &'static (Regex, Regex, Regex) {
    static PATTERNS: OnceLock<(Regex, Regex, Regex)> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        (
            Regex::new(r"^2\.0$").expect("Invalid regex"),
            Regex::new(r"^3\.0\.\d+(-.+)?$").expect("Invalid regex"),
            Regex::new(r"^3\.1\.\d+(-.+)?$").expect("Invalid regex"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_versions() {
        assert_eq!(
            SpecVersion::from_version_string("2.0", true),
            Some(SpecVersion::OpenApi2_0)
        );
        assert_eq!(
            SpecVersion::from_version_string("3.0.3", false),
            Some(SpecVersion::OpenApi3_0)
        );
        assert_eq!(
            SpecVersion::from_version_string("3.1.0", false),
            Some(SpecVersion::OpenApi3_1)
        );
    }

    #[test]
    fn test_rejects_malformed_versions() {
        assert_eq!(SpecVersion::from_version_string("3.1", false), None);
        assert_eq!(SpecVersion::from_version_string("2.0.1", true), None);
        assert_eq!(SpecVersion::from_version_string("4.0.0", false), None);
    }
}
