#![deny(missing_docs)]

//! # OAS Model
//!
//! An OpenAPI object model that reads 2.0, 3.0 and 3.1 documents and writes
//! any of them back out in any of the three formats.
//!
//! - **reference**: `$ref` descriptors, JSON pointer helpers and effective-value resolution.
//! - **models**: the reusable objects (schemas, parameters, responses, ...).
//! - **serialize** / **writer**: version-dispatched output through a streaming writer.
//! - **reader**: JSON/YAML input with located diagnostics.
//! - **registry**: externally supplied documents for multi-document references.

/// Shared error types.
pub mod error;

/// Specification version detection and naming.
pub mod version;

/// `x-` specification extensions.
pub mod extensions;

/// References, resolution and JSON pointers.
pub mod reference;

/// Output abstraction and settings.
pub mod writer;

/// Version-dispatched serialization.
pub mod serialize;

/// OpenAPI objects.
pub mod models;

/// The document root.
pub mod document;

/// Document registry for external references.
pub mod registry;

/// JSON/YAML reader.
pub mod reader;

pub use document::{DocumentId, ExternalDocs, Info, OpenApiDocument, Server};
pub use error::{OasError, OasResult, ResolutionError};
pub use extensions::Extensions;
pub use reader::{read_document, read_value, Diagnostic, ReadResult, ReaderSettings};
pub use reference::pointer::resolve_relative_pointer;
pub use reference::{RefOr, ReferenceDescriptor, ReferenceResolver, ReferenceType};
pub use registry::DocumentRegistry;
pub use serialize::{serialize_to_value, OpenApiSerializable, WriteContext};
pub use version::SpecVersion;
pub use writer::{CyclePolicy, OpenApiWriter, ValueWriter, WriterSettings};
