#![deny(missing_docs)]

//! # Schema Output
//!
//! Writes a [`Schema`] occurrence for a target version.
//!
//! - 3.1 writes type unions as arrays and numeric exclusive bounds.
//! - 3.0 keeps one non-null type plus `nullable`, and boolean exclusive flags.
//! - 2.0 additionally drops composition keywords it lacks, writes
//!   `x-nullable`, collapses the discriminator to its property name and
//!   suppresses `readOnly` on required properties.
//!
//! Anything a target version cannot express is dropped and logged at `debug`.

use super::{Discriminator, Schema, SchemaType};
use crate::error::{OasError, OasResult};
use crate::reference::RefOr;
use crate::serialize::{serialize_reference, OpenApiSerializable, WriteContext};
use crate::version::SpecVersion;
use crate::writer::{CyclePolicy, OpenApiWriter};
use serde_json::{Number, Value};
use tracing::debug;

const V2_NULLABLE_EXTENSION: &str = "x-nullable";

impl OpenApiSerializable for Schema {
    fn serialize<W: OpenApiWriter>(
        &self,
        writer: &mut W,
        ctx: &mut WriteContext<'_>,
        version: SpecVersion,
    ) -> OasResult<()> {
        write_body(self, writer, ctx, version, false)
    }
}

/// Writes a schema occurrence.
///
/// `suppress_read_only` is set when the occurrence is a property listed in its
/// parent's `required` set and the target is 2.0.
pub(crate) fn write_schema<W: OpenApiWriter>(
    schema: &RefOr<Schema>,
    writer: &mut W,
    ctx: &mut WriteContext<'_>,
    version: SpecVersion,
    suppress_read_only: bool,
) -> OasResult<()> {
    match schema {
        RefOr::Item(body) => write_body(body, writer, ctx, version, suppress_read_only),
        RefOr::Ref(reference) => {
            serialize_reference(reference, writer, ctx, version, |target: &Schema, w, ctx| {
                write_body(target, w, ctx, version, suppress_read_only)
            })
        }
    }
}

fn write_body<W: OpenApiWriter>(
    schema: &Schema,
    writer: &mut W,
    ctx: &mut WriteContext<'_>,
    version: SpecVersion,
    suppress_read_only: bool,
) -> OasResult<()> {
    ctx.enter(schema);
    let result = match version {
        SpecVersion::OpenApi2_0 => write_v2(schema, writer, ctx, suppress_read_only),
        SpecVersion::OpenApi3_0 | SpecVersion::OpenApi3_1 => write_v3(schema, writer, ctx, version),
    };
    ctx.leave();
    result
}

fn write_v3<W: OpenApiWriter>(
    schema: &Schema,
    w: &mut W,
    ctx: &mut WriteContext<'_>,
    version: SpecVersion,
) -> OasResult<()> {
    let v31 = version == SpecVersion::OpenApi3_1;
    w.write_start_object();

    if v31 {
        w.write_optional_property("$id", schema.id.as_deref());
        w.write_optional_property("$schema", schema.schema_dialect.as_deref());
        w.write_optional_property("$comment", schema.comment.as_deref());
    }
    w.write_optional_property("title", schema.title.as_deref());
    w.write_optional_property("multipleOf", schema.multiple_of.clone());
    if v31 {
        w.write_optional_property("maximum", schema.maximum.clone());
        w.write_optional_property("exclusiveMaximum", schema.exclusive_maximum.clone());
        w.write_optional_property("minimum", schema.minimum.clone());
        w.write_optional_property("exclusiveMinimum", schema.exclusive_minimum.clone());
    } else {
        write_flagged_bound(w, "maximum", "exclusiveMaximum", &schema.maximum, &schema.exclusive_maximum);
        write_flagged_bound(w, "minimum", "exclusiveMinimum", &schema.minimum, &schema.exclusive_minimum);
    }
    write_size_constraints(schema, w);
    write_required(schema, w)?;
    write_enum(schema, w, version)?;
    if v31 {
        w.write_optional_property("const", schema.const_value.clone());
        write_type_union(schema, w);
    } else {
        write_single_type(schema, w, version);
    }

    w.write_optional_collection("allOf", &schema.all_of, |w, s| write_schema(s, w, ctx, version, false))?;
    w.write_optional_collection("anyOf", &schema.any_of, |w, s| write_schema(s, w, ctx, version, false))?;
    w.write_optional_collection("oneOf", &schema.one_of, |w, s| write_schema(s, w, ctx, version, false))?;
    w.write_optional_object("not", schema.not.as_deref(), |w, s| write_schema(s, w, ctx, version, false))?;
    w.write_optional_object("items", schema.items.as_deref(), |w, s| write_schema(s, w, ctx, version, false))?;
    w.write_optional_map("properties", &schema.properties, |w, _, s| {
        write_schema(s, w, ctx, version, false)
    })?;
    if v31 {
        w.write_optional_map("patternProperties", &schema.pattern_properties, |w, _, s| {
            write_schema(s, w, ctx, version, false)
        })?;
    } else if !schema.pattern_properties.is_empty() {
        debug!(%version, "patternProperties dropped");
    }
    write_additional_properties(schema, w, ctx, version)?;

    w.write_optional_property("description", schema.description.as_deref());
    w.write_optional_property("format", schema.format.as_deref());
    w.write_optional_property("default", schema.default.clone());
    if !v31 {
        w.write_flag("nullable", schema.is_nullable());
    }
    w.write_optional_object("discriminator", schema.discriminator.as_ref(), |w, d| {
        d.serialize(w, ctx, version)
    })?;
    w.write_flag("readOnly", schema.read_only);
    w.write_flag("writeOnly", schema.write_only);
    w.write_optional_property("example", schema.example.clone());
    if v31 {
        w.write_optional_collection("examples", &schema.examples, |w, e| {
            w.write_value(e.clone());
            Ok(())
        })?;
        w.write_optional_map("$defs", &schema.defs, |w, _, s| write_schema(s, w, ctx, version, false))?;
    } else if !schema.examples.is_empty() || !schema.defs.is_empty() {
        debug!(%version, "examples/$defs dropped");
    }
    w.write_flag("deprecated", schema.deprecated);

    w.write_extensions(&schema.extensions);
    w.write_end_object();
    Ok(())
}

fn write_v2<W: OpenApiWriter>(
    schema: &Schema,
    w: &mut W,
    ctx: &mut WriteContext<'_>,
    suppress_read_only: bool,
) -> OasResult<()> {
    let version = SpecVersion::OpenApi2_0;
    w.write_start_object();

    w.write_optional_property("title", schema.title.as_deref());
    w.write_optional_property("multipleOf", schema.multiple_of.clone());
    write_flagged_bound(w, "maximum", "exclusiveMaximum", &schema.maximum, &schema.exclusive_maximum);
    write_flagged_bound(w, "minimum", "exclusiveMinimum", &schema.minimum, &schema.exclusive_minimum);
    write_size_constraints(schema, w);
    write_required(schema, w)?;
    write_enum(schema, w, version)?;
    write_single_type(schema, w, version);

    w.write_optional_collection("allOf", &schema.all_of, |w, s| write_schema(s, w, ctx, version, false))?;
    w.write_optional_object("items", schema.items.as_deref(), |w, s| write_schema(s, w, ctx, version, false))?;
    w.write_optional_map("properties", &schema.properties, |w, name, s| {
        write_schema(s, w, ctx, version, schema.required.contains(name))
    })?;
    write_additional_properties(schema, w, ctx, version)?;

    w.write_optional_property("description", schema.description.as_deref());
    w.write_optional_property("format", schema.format.as_deref());
    w.write_optional_property("default", schema.default.clone());
    w.write_optional_object("discriminator", schema.discriminator.as_ref(), |w, d| {
        d.serialize(w, ctx, version)
    })?;
    if suppress_read_only && schema.read_only {
        debug!("readOnly dropped on a required property");
    } else {
        w.write_flag("readOnly", schema.read_only);
    }
    w.write_optional_property("example", schema.example.clone());

    if !schema.any_of.is_empty() || !schema.one_of.is_empty() || schema.not.is_some() {
        debug!("anyOf/oneOf/not dropped");
    }
    if schema.write_only || schema.deprecated {
        debug!("writeOnly/deprecated dropped");
    }

    if schema.is_nullable() && !schema.extensions.contains_key(V2_NULLABLE_EXTENSION) {
        w.write_property(V2_NULLABLE_EXTENSION, true);
    }
    w.write_extensions(&schema.extensions);
    w.write_end_object();
    Ok(())
}

/// Writes the primitive keywords a 2.0 non-body parameter, header or `items`
/// object carries inline. Writes into the currently open object; the caller
/// writes extensions.
pub(crate) fn write_items_properties<W: OpenApiWriter>(
    schema: &Schema,
    w: &mut W,
    ctx: &mut WriteContext<'_>,
) -> OasResult<()> {
    ctx.enter(schema);
    let result = write_primitive_keywords(schema, w, ctx);
    ctx.leave();
    result
}

fn write_primitive_keywords<W: OpenApiWriter>(
    schema: &Schema,
    w: &mut W,
    ctx: &mut WriteContext<'_>,
) -> OasResult<()> {
    write_single_type(schema, w, SpecVersion::OpenApi2_0);
    w.write_optional_property("format", schema.format.as_deref());
    if let Some(items) = schema.items.as_deref() {
        w.write_property_name("items");
        write_items_object(items, w, ctx)?;
    }
    w.write_optional_property("default", schema.default.clone());
    write_flagged_bound(w, "maximum", "exclusiveMaximum", &schema.maximum, &schema.exclusive_maximum);
    write_flagged_bound(w, "minimum", "exclusiveMinimum", &schema.minimum, &schema.exclusive_minimum);
    write_size_constraints(schema, w);
    write_enum(schema, w, SpecVersion::OpenApi2_0)?;
    w.write_optional_property("multipleOf", schema.multiple_of.clone());
    if schema.is_nullable() && !schema.extensions.contains_key(V2_NULLABLE_EXTENSION) {
        w.write_property(V2_NULLABLE_EXTENSION, true);
    }
    Ok(())
}

/// A 2.0 `items` object. A referenced target is written through; one that
/// is already being written follows the cycle policy, and one that cannot be
/// resolved stays a `$ref`.
fn write_items_object<W: OpenApiWriter>(
    items: &RefOr<Schema>,
    w: &mut W,
    ctx: &mut WriteContext<'_>,
) -> OasResult<()> {
    let target = match items {
        RefOr::Item(item) => item,
        RefOr::Ref(reference) => match ctx.resolver().resolve::<Schema>(reference) {
            Ok(target) if ctx.is_in_progress(target) => {
                return match w.settings().cycle_policy {
                    CyclePolicy::Fail => Err(OasError::CircularSchema(reference.reference_v3().to_string())),
                    CyclePolicy::EmitReference => {
                        debug!(reference = reference.reference_v3(), "recursive items kept as $ref");
                        reference.serialize(w, SpecVersion::OpenApi2_0);
                        Ok(())
                    }
                };
            }
            Ok(target) => target,
            Err(error) => {
                debug!(reference = reference.reference_v3(), %error, "items target unresolvable; kept as $ref");
                reference.serialize(w, SpecVersion::OpenApi2_0);
                return Ok(());
            }
        },
    };
    w.write_start_object();
    write_items_properties(target, w, ctx)?;
    w.write_extensions(&target.extensions);
    w.write_end_object();
    Ok(())
}

/// Boolean-flag form of an exclusive bound (3.0 and 2.0).
fn write_flagged_bound<W: OpenApiWriter>(
    w: &mut W,
    name: &str,
    exclusive_name: &str,
    inclusive: &Option<Number>,
    exclusive: &Option<Number>,
) {
    match (inclusive, exclusive) {
        (inclusive, Some(boundary)) => {
            if inclusive.is_some() {
                debug!(keyword = name, "inclusive bound dropped in favour of the exclusive one");
            }
            w.write_property(name, boundary.clone());
            w.write_property(exclusive_name, true);
        }
        (Some(boundary), None) => w.write_property(name, boundary.clone()),
        (None, None) => {}
    }
}

fn write_size_constraints<W: OpenApiWriter>(schema: &Schema, w: &mut W) {
    w.write_optional_property("maxLength", schema.max_length);
    w.write_optional_property("minLength", schema.min_length);
    w.write_optional_property("pattern", schema.pattern.as_deref());
    w.write_optional_property("maxItems", schema.max_items);
    w.write_optional_property("minItems", schema.min_items);
    w.write_optional_property("uniqueItems", schema.unique_items);
    w.write_optional_property("maxProperties", schema.max_properties);
    w.write_optional_property("minProperties", schema.min_properties);
}

fn write_required<W: OpenApiWriter>(schema: &Schema, w: &mut W) -> OasResult<()> {
    let required: Vec<&String> = schema.required.iter().collect();
    w.write_optional_collection("required", &required, |w, name| {
        w.write_value(Value::from(name.as_str()));
        Ok(())
    })
}

/// `enum`, with `const` standing in as a one-value enum below 3.1.
fn write_enum<W: OpenApiWriter>(schema: &Schema, w: &mut W, version: SpecVersion) -> OasResult<()> {
    let downgraded_const;
    let values = match (&schema.const_value, version) {
        (Some(value), SpecVersion::OpenApi2_0 | SpecVersion::OpenApi3_0) if schema.enum_values.is_empty() => {
            downgraded_const = [value.clone()];
            &downgraded_const[..]
        }
        _ => &schema.enum_values[..],
    };
    w.write_optional_collection("enum", values, |w, v| {
        w.write_value(v.clone());
        Ok(())
    })
}

/// 3.1 `type`: a scalar for one member, otherwise an array with `null` last.
fn write_type_union<W: OpenApiWriter>(schema: &Schema, w: &mut W) {
    let Some(mut types) = schema.schema_type else {
        if schema.nullable {
            debug!("untyped nullable schema has no 3.1 form; dropped");
        }
        return;
    };
    if schema.nullable {
        types |= SchemaType::NULL;
    }
    match types.identifiers().as_slice() {
        [] => {}
        [single] => w.write_property("type", *single),
        many => w.write_property(
            "type",
            Value::Array(many.iter().map(|name| Value::from(*name)).collect()),
        ),
    }
}

/// 3.0/2.0 `type`: only written when exactly one non-null member remains.
fn write_single_type<W: OpenApiWriter>(schema: &Schema, w: &mut W, version: SpecVersion) {
    let Some(types) = schema.schema_type else {
        return;
    };
    match types.without_null().single_identifier() {
        Some(name) => w.write_property("type", name),
        None => debug!(%version, types = ?types, "type union cannot be expressed; dropped"),
    }
}

fn write_additional_properties<W: OpenApiWriter>(
    schema: &Schema,
    w: &mut W,
    ctx: &mut WriteContext<'_>,
    version: SpecVersion,
) -> OasResult<()> {
    if !schema.additional_properties_allowed {
        w.write_property("additionalProperties", false);
        return Ok(());
    }
    w.write_optional_object(
        "additionalProperties",
        schema.additional_properties.as_deref(),
        |w, s| write_schema(s, w, ctx, version, false),
    )
}

impl OpenApiSerializable for Discriminator {
    fn serialize<W: OpenApiWriter>(
        &self,
        writer: &mut W,
        _ctx: &mut WriteContext<'_>,
        version: SpecVersion,
    ) -> OasResult<()> {
        if version.is_v2() {
            if !self.mapping.is_empty() {
                debug!("discriminator mapping dropped");
            }
            writer.write_value(Value::from(self.property_name.as_str()));
            return Ok(());
        }
        writer.write_start_object();
        writer.write_property("propertyName", self.property_name.as_str());
        writer.write_optional_map("mapping", &self.mapping, |w, _, target| {
            w.write_value(Value::from(target.as_str()));
            Ok(())
        })?;
        if version == SpecVersion::OpenApi3_1 {
            writer.write_extensions(&self.extensions);
        }
        writer.write_end_object();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::OpenApiDocument;
    use crate::reference::{ReferenceResolver, ReferenceType};
    use crate::serialize::serialize_to_value;
    use crate::writer::WriterSettings;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn write(schema: &Schema, version: SpecVersion) -> Value {
        serialize_to_value(schema, ReferenceResolver::default(), version, WriterSettings::default())
            .unwrap()
    }

    #[test]
    fn test_nullable_string_per_version() {
        let schema = Schema::of_type(SchemaType::STRING | SchemaType::NULL);
        assert_eq!(write(&schema, SpecVersion::OpenApi3_1), json!({"type": ["string", "null"]}));
        assert_eq!(
            write(&schema, SpecVersion::OpenApi3_0),
            json!({"type": "string", "nullable": true})
        );
        assert_eq!(
            write(&schema, SpecVersion::OpenApi2_0),
            json!({"type": "string", "x-nullable": true})
        );
    }

    #[test]
    fn test_legacy_nullable_flag_becomes_union() {
        let schema = Schema {
            nullable: true,
            ..Schema::of_type(SchemaType::INTEGER)
        };
        assert_eq!(write(&schema, SpecVersion::OpenApi3_1), json!({"type": ["integer", "null"]}));
    }

    #[test]
    fn test_wide_union_drops_type_below_31() {
        let schema = Schema::of_type(SchemaType::STRING | SchemaType::INTEGER | SchemaType::NULL);
        assert_eq!(write(&schema, SpecVersion::OpenApi3_0), json!({"nullable": true}));
        assert_eq!(
            write(&schema, SpecVersion::OpenApi3_1),
            json!({"type": ["integer", "string", "null"]})
        );

        let null_only = Schema::of_type(SchemaType::NULL);
        assert_eq!(write(&null_only, SpecVersion::OpenApi3_0), json!({"nullable": true}));
        assert_eq!(write(&null_only, SpecVersion::OpenApi3_1), json!({"type": "null"}));
    }

    #[test]
    fn test_exclusive_bounds() {
        let schema = Schema {
            exclusive_minimum: Some(Number::from(10)),
            maximum: Some(Number::from(20)),
            ..Schema::of_type(SchemaType::INTEGER)
        };
        assert_eq!(
            write(&schema, SpecVersion::OpenApi3_1),
            json!({"maximum": 20, "exclusiveMinimum": 10, "type": "integer"})
        );
        assert_eq!(
            write(&schema, SpecVersion::OpenApi3_0),
            json!({"maximum": 20, "minimum": 10, "exclusiveMinimum": true, "type": "integer"})
        );
    }

    #[test]
    fn test_additional_properties_false_wins() {
        let schema = Schema {
            additional_properties_allowed: false,
            additional_properties: Some(Box::new(Schema::of_type(SchemaType::STRING).into())),
            ..Schema::of_type(SchemaType::OBJECT)
        };
        assert_eq!(
            write(&schema, SpecVersion::OpenApi3_0),
            json!({"type": "object", "additionalProperties": false})
        );

        let open = Schema {
            additional_properties: Some(Box::new(Schema::of_type(SchemaType::STRING).into())),
            ..Schema::of_type(SchemaType::OBJECT)
        };
        assert_eq!(
            write(&open, SpecVersion::OpenApi3_0),
            json!({"type": "object", "additionalProperties": {"type": "string"}})
        );
        assert_eq!(write(&Schema::of_type(SchemaType::OBJECT), SpecVersion::OpenApi3_0), json!({"type": "object"}));
    }

    #[test]
    fn test_required_read_only_suppressed_in_v2() {
        let parent = Schema::of_type(SchemaType::OBJECT)
            .with_required("name")
            .with_property(
                "name",
                Schema {
                    read_only: true,
                    ..Schema::of_type(SchemaType::STRING)
                },
            )
            .with_property(
                "id",
                Schema {
                    read_only: true,
                    ..Schema::of_type(SchemaType::INTEGER)
                },
            );

        let v2 = write(&parent, SpecVersion::OpenApi2_0);
        assert_eq!(v2["properties"]["name"], json!({"type": "string"}));
        assert_eq!(v2["properties"]["id"], json!({"type": "integer", "readOnly": true}));

        let v3 = write(&parent, SpecVersion::OpenApi3_0);
        assert_eq!(v3["properties"]["name"], json!({"type": "string", "readOnly": true}));
    }

    #[test]
    fn test_discriminator_per_version() {
        let mut discriminator = Discriminator::new("kind");
        discriminator
            .mapping
            .insert("cat".into(), "#/components/schemas/Cat".into());
        let schema = Schema {
            discriminator: Some(discriminator),
            ..Schema::of_type(SchemaType::OBJECT)
        };
        assert_eq!(
            write(&schema, SpecVersion::OpenApi3_0)["discriminator"],
            json!({"propertyName": "kind", "mapping": {"cat": "#/components/schemas/Cat"}})
        );
        assert_eq!(write(&schema, SpecVersion::OpenApi2_0)["discriminator"], json!("kind"));
    }

    #[test]
    fn test_v2_drops_unsupported_keywords() {
        let schema = Schema {
            one_of: vec![Schema::of_type(SchemaType::STRING).into()],
            write_only: true,
            const_value: Some(json!("fixed")),
            ..Schema::of_type(SchemaType::STRING)
        };
        assert_eq!(
            write(&schema, SpecVersion::OpenApi2_0),
            json!({"enum": ["fixed"], "type": "string"})
        );
    }

    #[test]
    fn test_extensions_written_last() {
        let mut schema = Schema::of_type(SchemaType::STRING);
        schema.extensions.insert("x-order", json!(1)).unwrap();
        schema.description = Some("Name".into());
        let value = write(&schema, SpecVersion::OpenApi3_0);
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.last().map(String::as_str), Some("x-order"));
    }

    #[test]
    fn test_reference_written_or_inlined() {
        let mut doc = OpenApiDocument::new("Refs", "1.0");
        doc.components
            .schemas
            .insert("Name".into(), Schema::of_type(SchemaType::STRING).into());
        let holder = Schema::of_type(SchemaType::OBJECT)
            .with_property("name", RefOr::local_ref(ReferenceType::Schema, "Name").unwrap());
        let resolver = ReferenceResolver::new(Some(&doc));

        let plain = serialize_to_value(&holder, resolver, SpecVersion::OpenApi2_0, WriterSettings::default())
            .unwrap();
        assert_eq!(plain["properties"]["name"], json!({"$ref": "#/definitions/Name"}));

        let inlined =
            serialize_to_value(&holder, resolver, SpecVersion::OpenApi3_0, WriterSettings::inline_local())
                .unwrap();
        assert_eq!(inlined["properties"]["name"], json!({"type": "string"}));
    }
}
