#![deny(missing_docs)]

//! # Object Model
//!
//! The reference-bearing OpenAPI objects and their per-version output.
//!
//! - **schema**: JSON-Schema-shaped bodies and type-union translation.
//! - **parameter** / **header**: primitive-typed inputs, flattened inline in 2.0.
//! - **media_type** / **request_body** / **response**: content maps, reduced to a
//!   single schema in 2.0.
//! - **example** / **link** / **callback**: 3.x-only objects.
//! - **security**: schemes, OAuth flows and requirements.
//! - **tag**: named groupings, always referenced by name.
//! - **path_item** / **operation**: the operation tree, including the 2.0
//!   request-body split.
//! - **components**: the reusable component maps.

pub mod callback;
pub mod components;
pub mod example;
pub mod header;
pub mod link;
pub mod media_type;
pub mod operation;
pub mod parameter;
pub mod path_item;
pub mod request_body;
pub mod response;
pub mod schema;
pub mod security;
pub mod tag;

pub use callback::Callback;
pub use components::Components;
pub use example::Example;
pub use header::Header;
pub use link::Link;
pub use media_type::{Encoding, MediaType};
pub use operation::Operation;
pub use parameter::{Parameter, ParameterLocation, ParameterStyle};
pub use path_item::{OperationType, PathItem};
pub use request_body::RequestBody;
pub use response::Response;
pub use schema::{Discriminator, Schema, SchemaType};
pub use security::{
    ApiKeyLocation, OAuthFlow, OAuthFlows, SecurityRequirement, SecurityScheme, SecuritySchemeType,
};
pub use tag::Tag;

use crate::error::OasResult;
use crate::reference::RefOr;
use crate::serialize::{OpenApiSerializable, WriteContext};
use crate::version::SpecVersion;
use crate::writer::OpenApiWriter;
use indexmap::IndexMap;
use serde_json::Value;

/// Writes a map of reference-bearing entries.
pub(crate) fn write_ref_map<T, W>(
    w: &mut W,
    name: &str,
    map: &IndexMap<String, RefOr<T>>,
    ctx: &mut WriteContext<'_>,
    version: SpecVersion,
) -> OasResult<()>
where
    T: crate::reference::Component + OpenApiSerializable + 'static,
    W: OpenApiWriter,
{
    w.write_optional_map(name, map, |w, _, entry| entry.serialize(w, ctx, version))
}

/// Writes a map of raw JSON values.
pub(crate) fn write_value_map<W: OpenApiWriter>(w: &mut W, name: &str, map: &IndexMap<String, Value>) -> OasResult<()> {
    w.write_optional_map(name, map, |w, _, value| {
        w.write_value(value.clone());
        Ok(())
    })
}
