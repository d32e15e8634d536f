#![deny(missing_docs)]

//! # Writer Abstraction
//!
//! The model never produces bytes itself: it drives an [`OpenApiWriter`]
//! (start/end object, property names, values) and consults the writer's
//! [`WriterSettings`] for the reference-inlining policy.
//!
//! - **value**: [`ValueWriter`], which builds a `serde_json::Value` tree that can
//!   be rendered as JSON or YAML text.

pub mod value;

use crate::error::OasResult;
use crate::extensions::Extensions;
use crate::reference::ReferenceDescriptor;
use indexmap::IndexMap;
use serde_json::Value;

pub use value::ValueWriter;

/// What to do when inlining references meets a schema already being written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CyclePolicy {
    /// Abort with [`crate::OasError::CircularSchema`].
    #[default]
    Fail,
    /// Keep the nested occurrence as a `$ref` and continue.
    EmitReference,
}

/// Writer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriterSettings {
    /// Substitute local `$ref`s with their effective bodies.
    pub inline_local_references: bool,
    /// Substitute external `$ref`s with their effective bodies.
    pub inline_external_references: bool,
    /// Behaviour when inlining hits a recursive schema.
    pub cycle_policy: CyclePolicy,
}

impl WriterSettings {
    /// Settings that inline every local reference.
    pub fn inline_local() -> Self {
        Self {
            inline_local_references: true,
            ..Self::default()
        }
    }

    /// Sets the cycle policy.
    pub fn with_cycle_policy(mut self, policy: CyclePolicy) -> Self {
        self.cycle_policy = policy;
        self
    }

    /// Whether `reference` should be replaced by its effective body.
    pub fn should_inline_reference(&self, reference: &ReferenceDescriptor) -> bool {
        (reference.is_local() && self.inline_local_references)
            || (reference.is_external() && self.inline_external_references)
    }
}

/// Streaming sink for OpenAPI output.
pub trait OpenApiWriter {
    /// Active configuration.
    fn settings(&self) -> &WriterSettings;

    /// Opens an object.
    fn write_start_object(&mut self);

    /// Closes the innermost object.
    fn write_end_object(&mut self);

    /// Opens an array.
    fn write_start_array(&mut self);

    /// Closes the innermost array.
    fn write_end_array(&mut self);

    /// Names the next value written into the current object.
    fn write_property_name(&mut self, name: &str);

    /// Writes a value (scalar or an already-built JSON tree).
    fn write_value(&mut self, value: Value);

    /// Writes `null`.
    fn write_null(&mut self) {
        self.write_value(Value::Null);
    }

    /// Writes `name: value`.
    fn write_property<V: Into<Value>>(&mut self, name: &str, value: V)
    where
        Self: Sized,
    {
        self.write_property_name(name);
        self.write_value(value.into());
    }

    /// Writes `name: value` when `value` is present.
    fn write_optional_property<V: Into<Value>>(&mut self, name: &str, value: Option<V>)
    where
        Self: Sized,
    {
        if let Some(value) = value {
            self.write_property(name, value);
        }
    }

    /// Writes `name: true` when `flag` is set.
    fn write_flag(&mut self, name: &str, flag: bool)
    where
        Self: Sized,
    {
        if flag {
            self.write_property(name, true);
        }
    }

    /// Writes `name` followed by whatever `write` emits, when `value` is present.
    fn write_optional_object<T, F>(&mut self, name: &str, value: Option<&T>, write: F) -> OasResult<()>
    where
        Self: Sized,
        F: FnOnce(&mut Self, &T) -> OasResult<()>,
    {
        if let Some(value) = value {
            self.write_property_name(name);
            write(self, value)?;
        }
        Ok(())
    }

    /// Writes a non-empty map as `name: { key: <write>, ... }`.
    fn write_optional_map<T, F>(
        &mut self,
        name: &str,
        map: &IndexMap<String, T>,
        mut write: F,
    ) -> OasResult<()>
    where
        Self: Sized,
        F: FnMut(&mut Self, &str, &T) -> OasResult<()>,
    {
        if map.is_empty() {
            return Ok(());
        }
        self.write_property_name(name);
        self.write_start_object();
        for (key, value) in map {
            self.write_property_name(key);
            write(self, key, value)?;
        }
        self.write_end_object();
        Ok(())
    }

    /// Writes a non-empty sequence as `name: [<write>, ...]`.
    fn write_optional_collection<T, F>(&mut self, name: &str, items: &[T], mut write: F) -> OasResult<()>
    where
        Self: Sized,
        F: FnMut(&mut Self, &T) -> OasResult<()>,
    {
        if items.is_empty() {
            return Ok(());
        }
        self.write_property_name(name);
        self.write_start_array();
        for item in items {
            write(self, item)?;
        }
        self.write_end_array();
        Ok(())
    }

    /// Writes every extension. Callers invoke this last within an object.
    fn write_extensions(&mut self, extensions: &Extensions)
    where
        Self: Sized,
    {
        for (key, value) in extensions.iter() {
            self.write_property(key, value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::ReferenceType;

    #[test]
    fn test_should_inline_reference() {
        let local = ReferenceDescriptor::local(ReferenceType::Schema, "Pet").unwrap();
        let external =
            ReferenceDescriptor::external(ReferenceType::Schema, "pets.yaml", Some("Pet".into()))
                .unwrap();

        let defaults = WriterSettings::default();
        assert!(!defaults.should_inline_reference(&local));
        assert!(!defaults.should_inline_reference(&external));

        let inline = WriterSettings::inline_local();
        assert!(inline.should_inline_reference(&local));
        assert!(!inline.should_inline_reference(&external));
    }
}
