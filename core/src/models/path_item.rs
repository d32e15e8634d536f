#![deny(missing_docs)]

//! # Path Item Object

use super::operation::{v2_parameters, Operation};
use super::parameter::Parameter;
use crate::document::{OpenApiDocument, Server};
use crate::error::OasResult;
use crate::extensions::Extensions;
use crate::reference::resolver::lookup_in;
use crate::reference::{Component, Lookup, RefOr, ReferenceType};
use crate::serialize::{OpenApiSerializable, WriteContext};
use crate::version::SpecVersion;
use crate::writer::OpenApiWriter;
use indexmap::IndexMap;
use std::fmt;

/// HTTP method of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    /// GET
    Get,
    /// PUT
    Put,
    /// POST
    Post,
    /// DELETE
    Delete,
    /// OPTIONS
    Options,
    /// HEAD
    Head,
    /// PATCH
    Patch,
    /// TRACE (3.x)
    Trace,
}

impl OperationType {
    /// Every method, in output order.
    pub const ALL: [OperationType; 8] = [
        OperationType::Get,
        OperationType::Put,
        OperationType::Post,
        OperationType::Delete,
        OperationType::Options,
        OperationType::Head,
        OperationType::Patch,
        OperationType::Trace,
    ];

    /// Lower-case key used in path items.
    pub fn as_str(self) -> &'static str {
        match self {
            OperationType::Get => "get",
            OperationType::Put => "put",
            OperationType::Post => "post",
            OperationType::Delete => "delete",
            OperationType::Options => "options",
            OperationType::Head => "head",
            OperationType::Patch => "patch",
            OperationType::Trace => "trace",
        }
    }

    /// Parses a path item key.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == value)
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Operations available on a single path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathItem {
    /// Summary (3.x).
    pub summary: Option<String>,
    /// Description (3.x).
    pub description: Option<String>,
    /// Operations keyed by method.
    pub operations: IndexMap<OperationType, Operation>,
    /// Server override (3.x).
    pub servers: Vec<Server>,
    /// Parameters shared by every operation.
    pub parameters: Vec<RefOr<Parameter>>,
    /// Specification extensions.
    pub extensions: Extensions,
}

impl PathItem {
    /// Adds an operation.
    pub fn with_operation(mut self, method: OperationType, operation: Operation) -> Self {
        self.operations.insert(method, operation);
        self
    }
}

impl Component for PathItem {
    const KIND: ReferenceType = ReferenceType::PathItem;

    fn lookup<'d>(doc: &'d OpenApiDocument, id: &str) -> Option<Lookup<'d, Self>> {
        lookup_in(&doc.components.path_items, id)
    }
}

impl OpenApiSerializable for PathItem {
    fn serialize<W: OpenApiWriter>(
        &self,
        w: &mut W,
        ctx: &mut WriteContext<'_>,
        version: SpecVersion,
    ) -> OasResult<()> {
        let v2 = version.is_v2();
        w.write_start_object();
        if !v2 {
            w.write_optional_property("summary", self.summary.as_deref());
            w.write_optional_property("description", self.description.as_deref());
        }
        for (method, operation) in &self.operations {
            if v2 && *method == OperationType::Trace {
                tracing::debug!("trace operation dropped");
                continue;
            }
            w.write_property_name(method.as_str());
            operation.serialize(w, ctx, version)?;
        }
        if v2 {
            let parameters = v2_parameters(&self.parameters, &ctx.resolver());
            w.write_optional_collection("parameters", &parameters, |w, p| p.serialize(w, ctx, version))?;
        } else {
            w.write_optional_collection("servers", &self.servers, |w, s| s.serialize(w, ctx, version))?;
            w.write_optional_collection("parameters", &self.parameters, |w, p| p.serialize(w, ctx, version))?;
        }
        w.write_extensions(&self.extensions);
        w.write_end_object();
        Ok(())
    }
}
