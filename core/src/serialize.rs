#![deny(missing_docs)]

//! # Versioned Serialization
//!
//! Every model object renders itself for a chosen [`SpecVersion`] through an
//! [`OpenApiWriter`]. Reference occurrences either emit their `$ref` or, when
//! the writer's settings ask for inlining, are replaced by the effective body
//! fetched through the [`ReferenceResolver`] carried by the [`WriteContext`].

use crate::error::{OasError, OasResult};
use crate::reference::{Component, RefOr, ReferenceDescriptor, ReferenceResolver, ReferenceType};
use crate::version::SpecVersion;
use crate::writer::{CyclePolicy, OpenApiWriter, ValueWriter, WriterSettings};
use serde_json::Value;

/// Context threaded through a single write pass.
///
/// Carries the resolution context and the identities of the objects currently
/// being written, used to stop recursive inlining.
pub struct WriteContext<'a> {
    resolver: ReferenceResolver<'a>,
    in_progress: Vec<*const ()>,
}

impl<'a> WriteContext<'a> {
    /// Creates a context around `resolver`.
    pub fn new(resolver: ReferenceResolver<'a>) -> Self {
        Self {
            resolver,
            in_progress: Vec::new(),
        }
    }

    /// The resolver for this pass.
    pub fn resolver(&self) -> ReferenceResolver<'a> {
        self.resolver
    }

    pub(crate) fn is_in_progress<T>(&self, item: &T) -> bool {
        let identity = item as *const T as *const ();
        self.in_progress.contains(&identity)
    }

    pub(crate) fn enter<T>(&mut self, item: &T) {
        self.in_progress.push(item as *const T as *const ());
    }

    pub(crate) fn leave(&mut self) {
        self.in_progress.pop();
    }
}

/// An object that can be written in any supported wire format.
pub trait OpenApiSerializable {
    /// Writes `self` for `version`.
    fn serialize<W: OpenApiWriter>(
        &self,
        writer: &mut W,
        ctx: &mut WriteContext<'_>,
        version: SpecVersion,
    ) -> OasResult<()>;
}

impl<T: Component + OpenApiSerializable + 'static> OpenApiSerializable for RefOr<T> {
    fn serialize<W: OpenApiWriter>(
        &self,
        writer: &mut W,
        ctx: &mut WriteContext<'_>,
        version: SpecVersion,
    ) -> OasResult<()> {
        match self {
            RefOr::Item(item) => item.serialize(writer, ctx, version),
            RefOr::Ref(reference) => {
                serialize_reference(reference, writer, ctx, version, |target: &T, w, ctx| {
                    target.serialize(w, ctx, version)
                })
            }
        }
    }
}

/// Writes a reference occurrence, inlining the effective target when configured.
///
/// Tags are never inlined: they are always written by name. An inlined target
/// that is already being written is a cycle, handled per [`CyclePolicy`].
pub(crate) fn serialize_reference<'a, T, W, F>(
    reference: &ReferenceDescriptor,
    writer: &mut W,
    ctx: &mut WriteContext<'a>,
    version: SpecVersion,
    write_target: F,
) -> OasResult<()>
where
    T: Component + 'a,
    W: OpenApiWriter,
    F: FnOnce(&T, &mut W, &mut WriteContext<'a>) -> OasResult<()>,
{
    if T::KIND == ReferenceType::Tag || !writer.settings().should_inline_reference(reference) {
        reference.serialize(writer, version);
        return Ok(());
    }

    let target: &'a T = ctx.resolver().resolve(reference)?;
    if ctx.is_in_progress(target) {
        return match writer.settings().cycle_policy {
            CyclePolicy::Fail => Err(OasError::CircularSchema(reference.reference_v3().to_string())),
            CyclePolicy::EmitReference => {
                tracing::debug!(reference = reference.reference_v3(), "recursive occurrence kept as $ref");
                reference.serialize(writer, version);
                Ok(())
            }
        };
    }

    tracing::trace!(reference = reference.reference_v3(), %version, "inlining reference");
    ctx.enter(target);
    let result = write_target(target, writer, ctx);
    ctx.leave();
    result
}

/// Serializes `item` into a JSON tree.
pub fn serialize_to_value<S: OpenApiSerializable>(
    item: &S,
    resolver: ReferenceResolver<'_>,
    version: SpecVersion,
    settings: WriterSettings,
) -> OasResult<Value> {
    let mut writer = ValueWriter::new(settings);
    let mut ctx = WriteContext::new(resolver);
    item.serialize(&mut writer, &mut ctx, version)?;
    Ok(writer.into_value())
}
