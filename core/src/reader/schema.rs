#![deny(missing_docs)]

//! # Schema Reader
//!
//! Builds [`Schema`] bodies from every dialect into the canonical model:
//! nullability becomes a `null` union member, boolean exclusive bounds become
//! numeric ones, and 2.0 `type: file` becomes a binary string.

use super::node::{
    as_number, as_opt_bool, as_string, as_u64, child_array, child_map, extensions, string_map,
    try_get_property, ParsingContext,
};
use crate::models::{Discriminator, Schema, SchemaType};
use crate::reference::pointer::{child_pointer, pointer_segments, resolve_relative_pointer};
use crate::reference::{RefOr, ReferenceType};
use crate::version::SpecVersion;
use indexmap::IndexMap;
use serde_json::{Map, Value};

/// First pointer segments that already address the document root.
const ROOT_SECTIONS: [&str; 4] = ["components", "paths", "webhooks", "definitions"];

/// Keywords a 2.0 non-body parameter, header or `items` object shares with schemas.
const PRIMITIVE_KEYWORDS: [&str; 17] = [
    "type",
    "format",
    "items",
    "default",
    "maximum",
    "exclusiveMaximum",
    "minimum",
    "exclusiveMinimum",
    "maxLength",
    "minLength",
    "pattern",
    "maxItems",
    "minItems",
    "uniqueItems",
    "enum",
    "multipleOf",
    "x-nullable",
];

/// Reads a schema occurrence located at `pointer`.
pub(crate) fn read_schema(ctx: &mut ParsingContext, node: &Value, pointer: &str) -> RefOr<Schema> {
    match node {
        Value::Bool(true) => RefOr::Item(Schema::default()),
        Value::Bool(false) => RefOr::Item(Schema {
            not: Some(Box::new(RefOr::Item(Schema::default()))),
            ..Schema::default()
        }),
        Value::Object(map) => {
            if let Some(raw) = as_string(map, "$ref") {
                let target = schema_ref_target(ctx.version, &raw, pointer);
                if let Some(descriptor) = ctx.reference(&target, ReferenceType::Schema, pointer) {
                    return RefOr::Ref(descriptor);
                }
            }
            RefOr::Item(read_schema_body(ctx, map, pointer))
        }
        _ => {
            ctx.report(pointer, "expected a schema object");
            RefOr::Item(Schema::default())
        }
    }
}

/// Reads the primitive keywords a 2.0 parameter or header carries inline.
pub(crate) fn read_primitive_keywords(ctx: &mut ParsingContext, map: &Map<String, Value>, pointer: &str) -> Schema {
    let primitive: Map<String, Value> = map
        .iter()
        .filter(|(key, _)| PRIMITIVE_KEYWORDS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    read_schema_body(ctx, &primitive, pointer)
}

/// Normalizes a schema `$ref` into a document-absolute pointer.
fn schema_ref_target(version: SpecVersion, raw: &str, pointer: &str) -> String {
    let Some(fragment) = raw.strip_prefix('#') else {
        return raw.to_string();
    };
    let segments = pointer_segments(fragment);
    match (version, segments.as_slice()) {
        (SpecVersion::OpenApi2_0, ["definitions", name, rest @ ..]) if !rest.is_empty() => {
            format!("#/components/schemas/{}/{}", name, rest.join("/"))
        }
        (SpecVersion::OpenApi3_1, [first, ..]) if !ROOT_SECTIONS.contains(first) => {
            let rebased = resolve_relative_pointer(pointer, raw);
            tracing::trace!(from = raw, to = %rebased, "rebased relative schema reference");
            rebased
        }
        _ => raw.to_string(),
    }
}

fn read_schema_body(ctx: &mut ParsingContext, map: &Map<String, Value>, pointer: &str) -> Schema {
    let mut schema = Schema {
        id: as_string(map, "$id"),
        schema_dialect: as_string(map, "$schema"),
        comment: as_string(map, "$comment"),
        title: as_string(map, "title"),
        format: as_string(map, "format"),
        description: as_string(map, "description"),
        maximum: as_number(map, "maximum"),
        minimum: as_number(map, "minimum"),
        multiple_of: as_number(map, "multipleOf"),
        max_length: as_u64(map, "maxLength"),
        min_length: as_u64(map, "minLength"),
        pattern: as_string(map, "pattern"),
        max_items: as_u64(map, "maxItems"),
        min_items: as_u64(map, "minItems"),
        unique_items: as_opt_bool(map, "uniqueItems"),
        max_properties: as_u64(map, "maxProperties"),
        min_properties: as_u64(map, "minProperties"),
        const_value: try_get_property(map, "const").cloned(),
        default: try_get_property(map, "default").cloned(),
        read_only: as_opt_bool(map, "readOnly").unwrap_or(false),
        write_only: as_opt_bool(map, "writeOnly").unwrap_or(false),
        deprecated: as_opt_bool(map, "deprecated").unwrap_or(false),
        example: try_get_property(map, "example").cloned(),
        extensions: extensions(map),
        ..Schema::default()
    };

    read_type(ctx, map, pointer, &mut schema);
    read_exclusive_bounds(map, &mut schema);

    if let Some(required) = child_array(ctx, map, "required", pointer) {
        schema.required = required
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect();
    }
    if let Some(values) = child_array(ctx, map, "enum", pointer) {
        schema.enum_values = values.clone();
    }
    if let Some(examples) = try_get_property(map, "examples") {
        match examples {
            Value::Array(values) => schema.examples = values.clone(),
            _ => ctx.report(&child_pointer(pointer, "examples"), "expected an array"),
        }
    }

    schema.defs = read_schema_map(ctx, map, "$defs", pointer);
    schema.properties = read_schema_map(ctx, map, "properties", pointer);
    schema.pattern_properties = read_schema_map(ctx, map, "patternProperties", pointer);
    schema.all_of = read_schema_list(ctx, map, "allOf", pointer);
    schema.any_of = read_schema_list(ctx, map, "anyOf", pointer);
    schema.one_of = read_schema_list(ctx, map, "oneOf", pointer);

    if let Some(items) = try_get_property(map, "items") {
        let items_pointer = child_pointer(pointer, "items");
        if items.is_array() {
            ctx.report(&items_pointer, "tuple-form items are not supported");
        } else {
            schema.items = Some(Box::new(read_schema(ctx, items, &items_pointer)));
        }
    }
    if let Some(not) = try_get_property(map, "not") {
        schema.not = Some(Box::new(read_schema(ctx, not, &child_pointer(pointer, "not"))));
    }
    match try_get_property(map, "additionalProperties") {
        Some(Value::Bool(allowed)) => schema.additional_properties_allowed = *allowed,
        Some(node) => {
            let node_pointer = child_pointer(pointer, "additionalProperties");
            schema.additional_properties = Some(Box::new(read_schema(ctx, node, &node_pointer)));
        }
        None => {}
    }

    schema.discriminator = read_discriminator(ctx, map, pointer);
    schema
}

/// Folds `type`, `nullable` and `x-nullable` into the type union.
fn read_type(ctx: &mut ParsingContext, map: &Map<String, Value>, pointer: &str, schema: &mut Schema) {
    let type_pointer = child_pointer(pointer, "type");
    let mut union = SchemaType::empty();
    let mut declared = false;
    let names: Vec<&str> = match try_get_property(map, "type") {
        Some(Value::String(name)) => vec![name.as_str()],
        Some(Value::Array(names)) => names.iter().filter_map(Value::as_str).collect(),
        Some(_) => {
            ctx.report(&type_pointer, "expected a string or an array of strings");
            Vec::new()
        }
        None => Vec::new(),
    };
    for name in names {
        declared = true;
        match SchemaType::from_identifier(name) {
            Some(member) => union |= member,
            None if name == "file" => {
                union |= SchemaType::STRING;
                if schema.format.is_none() {
                    schema.format = Some("binary".to_string());
                }
            }
            None => ctx.report(&type_pointer, format!("unknown type '{}'", name)),
        }
    }

    let nullable = as_opt_bool(map, "nullable").unwrap_or(false)
        || as_opt_bool(map, "x-nullable").unwrap_or(false);
    schema.extensions.remove("x-nullable");
    if declared && !union.is_empty() {
        if nullable {
            union |= SchemaType::NULL;
        }
        schema.schema_type = Some(union);
    } else {
        schema.nullable = nullable;
    }
}

/// Boolean exclusive flags move the matching bound into its exclusive slot.
fn read_exclusive_bounds(map: &Map<String, Value>, schema: &mut Schema) {
    match try_get_property(map, "exclusiveMaximum") {
        Some(Value::Bool(true)) => schema.exclusive_maximum = schema.maximum.take(),
        Some(Value::Number(n)) => schema.exclusive_maximum = Some(n.clone()),
        _ => {}
    }
    match try_get_property(map, "exclusiveMinimum") {
        Some(Value::Bool(true)) => schema.exclusive_minimum = schema.minimum.take(),
        Some(Value::Number(n)) => schema.exclusive_minimum = Some(n.clone()),
        _ => {}
    }
}

fn read_discriminator(ctx: &mut ParsingContext, map: &Map<String, Value>, pointer: &str) -> Option<Discriminator> {
    match try_get_property(map, "discriminator")? {
        Value::String(property) => Some(Discriminator::new(property.as_str())),
        Value::Object(node) => {
            let node_pointer = child_pointer(pointer, "discriminator");
            let Some(property_name) = as_string(node, "propertyName") else {
                ctx.report(&node_pointer, "discriminator requires propertyName");
                return None;
            };
            Some(Discriminator {
                property_name,
                mapping: string_map(ctx, node, "mapping", &node_pointer),
                extensions: extensions(node),
            })
        }
        _ => {
            ctx.report(&child_pointer(pointer, "discriminator"), "expected a string or an object");
            None
        }
    }
}

fn read_schema_map(
    ctx: &mut ParsingContext,
    map: &Map<String, Value>,
    key: &str,
    pointer: &str,
) -> IndexMap<String, RefOr<Schema>> {
    let Some(entries) = child_map(ctx, map, key, pointer) else {
        return IndexMap::new();
    };
    let section = child_pointer(pointer, key);
    entries
        .iter()
        .map(|(name, node)| {
            let schema = read_schema(ctx, node, &child_pointer(&section, name));
            (name.clone(), schema)
        })
        .collect()
}

fn read_schema_list(ctx: &mut ParsingContext, map: &Map<String, Value>, key: &str, pointer: &str) -> Vec<RefOr<Schema>> {
    let Some(items) = child_array(ctx, map, key, pointer) else {
        return Vec::new();
    };
    let section = child_pointer(pointer, key);
    items
        .iter()
        .enumerate()
        .map(|(idx, node)| read_schema(ctx, node, &child_pointer(&section, &idx.to_string())))
        .collect()
}
