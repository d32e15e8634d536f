#![deny(missing_docs)]

//! # JSON Pointer Helpers
//!
//! Segment encoding/decoding and the rebasing of JSON Schema 2020-12 relative
//! `$ref`s (e.g. `#/properties/b`) onto the absolute location of the node
//! that contains them.

use percent_encoding::percent_decode_str;

/// Decodes a JSON Pointer segment (handles `~1`, `~0` and percent encoding).
pub fn decode_pointer_segment(segment: &str) -> String {
    let decoded = segment.replace("~1", "/").replace("~0", "~");
    percent_decode_str(&decoded)
        .decode_utf8_lossy()
        .into_owned()
}

/// Encodes a raw key as a JSON Pointer segment of a URI fragment.
///
/// `%` is escaped as well, since [`decode_pointer_segment`] percent-decodes.
pub fn encode_pointer_segment(segment: &str) -> String {
    segment
        .replace('%', "%25")
        .replace('~', "~0")
        .replace('/', "~1")
}

/// Appends an encoded segment to a pointer (`#/a` + `b/c` -> `#/a/b~1c`).
pub fn child_pointer(parent: &str, segment: &str) -> String {
    format!(
        "{}/{}",
        parent.trim_end_matches('/'),
        encode_pointer_segment(segment)
    )
}

/// Splits `#/a/b/c` (or `/a/b/c`) into raw, still-encoded segments.
pub(crate) fn pointer_segments(pointer: &str) -> Vec<&str> {
    pointer
        .trim_start_matches('#')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect()
}

/// Rebases a relative pointer found at `node_location` onto an absolute pointer.
///
/// 1. The first contiguous occurrence (left to right) of the relative segments
///    inside the node's segments wins; the result ends at that occurrence.
/// 2. Otherwise, below `#/components/schemas/{name}` the relative segments are
///    appended to the owning component schema.
/// 3. Otherwise the node's trailing N segments (N = relative length) are
///    replaced by the relative segments.
pub fn resolve_relative_pointer(node_location: &str, relative_ref: &str) -> String {
    let node = pointer_segments(node_location);
    let relative = pointer_segments(relative_ref);

    if relative.is_empty() {
        return join_pointer(&node);
    }

    if relative.len() <= node.len() {
        for start in 0..=(node.len() - relative.len()) {
            if node[start..start + relative.len()] == relative[..] {
                return join_pointer(&node[..start + relative.len()]);
            }
        }
    }

    let base: &[&str] = if node.len() >= 3 && node[0] == "components" && node[1] == "schemas" {
        &node[..3]
    } else {
        &node[..node.len().saturating_sub(relative.len())]
    };

    let mut rebased: Vec<&str> = base.to_vec();
    rebased.extend(relative.iter().copied());
    join_pointer(&rebased)
}

fn join_pointer(segments: &[&str]) -> String {
    format!("#/{}", segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_pointer_segment_percent_encoding() {
        let encoded = "User%20Profile~1details";
        assert_eq!(decode_pointer_segment(encoded), "User Profile/details");
    }

    #[test]
    fn test_encode_inverts_decode() {
        for raw in ["a/b", "~0", "100%", "x~1/%2F"] {
            assert_eq!(decode_pointer_segment(&encode_pointer_segment(raw)), raw);
        }
    }

    #[test]
    fn test_child_pointer_escapes() {
        assert_eq!(child_pointer("#/paths", "/pets/{id}"), "#/paths/~1pets~1{id}");
    }

    #[test]
    fn test_relative_pointer_matching_occurrence() {
        let resolved = resolve_relative_pointer(
            "#/components/schemas/Foo/properties/bar",
            "#/properties/bar",
        );
        assert_eq!(resolved, "#/components/schemas/Foo/properties/bar");
    }

    #[test]
    fn test_relative_pointer_first_occurrence_wins() {
        let resolved = resolve_relative_pointer(
            "#/components/schemas/Foo/properties/a/properties/a/items",
            "#/properties/a",
        );
        assert_eq!(resolved, "#/components/schemas/Foo/properties/a");
    }

    #[test]
    fn test_relative_pointer_component_schema_fallback() {
        let resolved = resolve_relative_pointer(
            "#/components/schemas/Foo/properties/bar",
            "#/properties/baz",
        );
        assert_eq!(resolved, "#/components/schemas/Foo/properties/baz");
    }

    #[test]
    fn test_relative_pointer_trailing_fallback() {
        let resolved = resolve_relative_pointer(
            "#/paths/~1pets/get/responses/200/content/application~1json/schema/properties/a",
            "#/properties/b",
        );
        assert_eq!(
            resolved,
            "#/paths/~1pets/get/responses/200/content/application~1json/schema/properties/b"
        );
    }
}
