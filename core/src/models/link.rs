#![deny(missing_docs)]

//! # Link Object
//!
//! 3.x only: a 2.0 document has nowhere to put links, so they write nothing.

use super::write_value_map;
use crate::document::{OpenApiDocument, Server};
use crate::error::OasResult;
use crate::extensions::Extensions;
use crate::reference::resolver::lookup_in;
use crate::reference::{Component, Lookup, ReferenceType};
use crate::serialize::{OpenApiSerializable, WriteContext};
use crate::version::SpecVersion;
use crate::writer::OpenApiWriter;
use indexmap::IndexMap;
use serde_json::Value;

/// A design-time link from a response to another operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Link {
    /// Relative or absolute reference to the target operation.
    pub operation_ref: Option<String>,
    /// `operationId` of the target operation.
    pub operation_id: Option<String>,
    /// Parameter values (literals or runtime expressions).
    pub parameters: IndexMap<String, Value>,
    /// Request body value for the target operation.
    pub request_body: Option<Value>,
    /// Description.
    pub description: Option<String>,
    /// Server override for the target operation.
    pub server: Option<Server>,
    /// Specification extensions.
    pub extensions: Extensions,
}

impl Component for Link {
    const KIND: ReferenceType = ReferenceType::Link;

    fn lookup<'d>(doc: &'d OpenApiDocument, id: &str) -> Option<Lookup<'d, Self>> {
        lookup_in(&doc.components.links, id)
    }
}

impl OpenApiSerializable for Link {
    fn serialize<W: OpenApiWriter>(
        &self,
        w: &mut W,
        ctx: &mut WriteContext<'_>,
        version: SpecVersion,
    ) -> OasResult<()> {
        if version.is_v2() {
            tracing::debug!("link has no 2.0 form; skipped");
            return Ok(());
        }
        w.write_start_object();
        w.write_optional_property("operationRef", self.operation_ref.as_deref());
        w.write_optional_property("operationId", self.operation_id.as_deref());
        write_value_map(w, "parameters", &self.parameters)?;
        w.write_optional_property("requestBody", self.request_body.clone());
        w.write_optional_property("description", self.description.as_deref());
        w.write_optional_object("server", self.server.as_ref(), |w, s| s.serialize(w, ctx, version))?;
        w.write_extensions(&self.extensions);
        w.write_end_object();
        Ok(())
    }
}
