#![deny(missing_docs)]

//! # Tag Object
//!
//! Operations refer to tags by name through a [`ReferenceType::Tag`]
//! descriptor; the tag bodies live in the document's root `tags` list.

use crate::document::{ExternalDocs, OpenApiDocument};
use crate::error::OasResult;
use crate::extensions::Extensions;
use crate::reference::{Component, Lookup, ReferenceType};
use crate::serialize::{OpenApiSerializable, WriteContext};
use crate::version::SpecVersion;
use crate::writer::OpenApiWriter;

/// Metadata for a group of operations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tag {
    /// Unique name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Further documentation.
    pub external_docs: Option<ExternalDocs>,
    /// Specification extensions.
    pub extensions: Extensions,
}

impl Tag {
    /// A tag with just a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Component for Tag {
    const KIND: ReferenceType = ReferenceType::Tag;

    fn lookup<'d>(doc: &'d OpenApiDocument, id: &str) -> Option<Lookup<'d, Self>> {
        doc.tags.iter().find(|tag| tag.name == id).map(Lookup::Found)
    }
}

impl OpenApiSerializable for Tag {
    fn serialize<W: OpenApiWriter>(
        &self,
        w: &mut W,
        ctx: &mut WriteContext<'_>,
        version: SpecVersion,
    ) -> OasResult<()> {
        w.write_start_object();
        w.write_property("name", self.name.as_str());
        w.write_optional_property("description", self.description.as_deref());
        w.write_optional_object("externalDocs", self.external_docs.as_ref(), |w, docs| {
            docs.serialize(w, ctx, version)
        })?;
        w.write_extensions(&self.extensions);
        w.write_end_object();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{RefOr, ReferenceDescriptor, ReferenceResolver};
    use crate::serialize::serialize_to_value;
    use crate::writer::WriterSettings;
    use serde_json::json;

    #[test]
    fn test_tag_reference_is_written_by_name_even_when_inlining() {
        let mut doc = OpenApiDocument::new("Tags", "1.0");
        doc.tags.push(Tag {
            description: Some("Pet operations".into()),
            ..Tag::new("pets")
        });
        let occurrence: RefOr<Tag> = RefOr::local_ref(ReferenceType::Tag, "pets").unwrap();

        let value = serialize_to_value(
            &occurrence,
            ReferenceResolver::new(Some(&doc)),
            SpecVersion::OpenApi3_0,
            WriterSettings::inline_local(),
        )
        .unwrap();
        assert_eq!(value, json!("pets"));
    }

    #[test]
    fn test_tag_resolves_by_name() {
        let mut doc = OpenApiDocument::new("Tags", "1.0");
        doc.tags.push(Tag::new("store"));
        let descriptor = ReferenceDescriptor::local(ReferenceType::Tag, "store").unwrap();
        let tag: &Tag = ReferenceResolver::new(Some(&doc)).resolve(&descriptor).unwrap();
        assert_eq!(tag.name, "store");
    }
}
