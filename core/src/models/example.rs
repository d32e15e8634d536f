#![deny(missing_docs)]

//! # Example Object

use crate::document::OpenApiDocument;
use crate::error::OasResult;
use crate::extensions::Extensions;
use crate::reference::resolver::lookup_in;
use crate::reference::{Component, Lookup, ReferenceType};
use crate::serialize::{OpenApiSerializable, WriteContext};
use crate::version::SpecVersion;
use crate::writer::OpenApiWriter;
use serde_json::Value;

/// A named example value (3.x).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Example {
    /// Short summary.
    pub summary: Option<String>,
    /// Long description.
    pub description: Option<String>,
    /// Embedded literal value.
    pub value: Option<Value>,
    /// URL of an externally hosted value.
    pub external_value: Option<String>,
    /// Specification extensions.
    pub extensions: Extensions,
}

impl Example {
    /// An example carrying a literal value.
    pub fn of_value(value: Value) -> Self {
        Self {
            value: Some(value),
            ..Self::default()
        }
    }
}

impl Component for Example {
    const KIND: ReferenceType = ReferenceType::Example;

    fn lookup<'d>(doc: &'d OpenApiDocument, id: &str) -> Option<Lookup<'d, Self>> {
        lookup_in(&doc.components.examples, id)
    }
}

impl OpenApiSerializable for Example {
    /// 2.0 has no example object; only the literal value is written.
    fn serialize<W: OpenApiWriter>(
        &self,
        writer: &mut W,
        _ctx: &mut WriteContext<'_>,
        version: SpecVersion,
    ) -> OasResult<()> {
        if version.is_v2() {
            writer.write_value(self.value.clone().unwrap_or(Value::Null));
            return Ok(());
        }
        writer.write_start_object();
        writer.write_optional_property("summary", self.summary.as_deref());
        writer.write_optional_property("description", self.description.as_deref());
        writer.write_optional_property("value", self.value.clone());
        writer.write_optional_property("externalValue", self.external_value.as_deref());
        writer.write_extensions(&self.extensions);
        writer.write_end_object();
        Ok(())
    }
}
