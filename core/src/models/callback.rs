#![deny(missing_docs)]

//! # Callback Object

use super::path_item::PathItem;
use crate::document::OpenApiDocument;
use crate::error::OasResult;
use crate::extensions::Extensions;
use crate::reference::resolver::lookup_in;
use crate::reference::{Component, Lookup, RefOr, ReferenceType};
use crate::serialize::{OpenApiSerializable, WriteContext};
use crate::version::SpecVersion;
use crate::writer::OpenApiWriter;
use indexmap::IndexMap;

/// Out-of-band requests keyed by runtime expression (3.x only).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Callback {
    /// Path items keyed by runtime expression, e.g. `{$request.body#/url}`.
    pub expressions: IndexMap<String, RefOr<PathItem>>,
    /// Specification extensions.
    pub extensions: Extensions,
}

impl Component for Callback {
    const KIND: ReferenceType = ReferenceType::Callback;

    fn lookup<'d>(doc: &'d OpenApiDocument, id: &str) -> Option<Lookup<'d, Self>> {
        lookup_in(&doc.components.callbacks, id)
    }
}

impl OpenApiSerializable for Callback {
    fn serialize<W: OpenApiWriter>(
        &self,
        w: &mut W,
        ctx: &mut WriteContext<'_>,
        version: SpecVersion,
    ) -> OasResult<()> {
        if version.is_v2() {
            tracing::debug!("callback has no 2.0 form; skipped");
            return Ok(());
        }
        w.write_start_object();
        for (expression, path_item) in &self.expressions {
            w.write_property_name(expression);
            path_item.serialize(w, ctx, version)?;
        }
        w.write_extensions(&self.extensions);
        w.write_end_object();
        Ok(())
    }
}
