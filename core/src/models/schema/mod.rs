#![deny(missing_docs)]

//! # Schema Model
//!
//! The JSON-Schema-shaped object model. A schema occurrence is always a
//! [`RefOr<Schema>`]: either a reference or an inline body, never both.
//!
//! - **write**: version translation on output (type unions vs `nullable`,
//!   numeric vs boolean exclusive bounds, 2.0 keyword suppression).

pub mod write;

use crate::document::OpenApiDocument;
use crate::extensions::Extensions;
use crate::reference::pointer::{decode_pointer_segment, pointer_segments};
use crate::reference::resolver::lookup_in;
use crate::reference::{Component, Lookup, RefOr, ReferenceType};
use bitflags::bitflags;
use indexmap::{IndexMap, IndexSet};
use serde_json::{Number, Value};

bitflags! {
    /// A JSON Schema `type` union.
    ///
    /// 3.1 writes unions as arrays; 3.0 and 2.0 can only carry one non-null
    /// member plus a nullability flag.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SchemaType: u8 {
        /// `null`
        const NULL = 1 << 0;
        /// `boolean`
        const BOOLEAN = 1 << 1;
        /// `integer`
        const INTEGER = 1 << 2;
        /// `number`
        const NUMBER = 1 << 3;
        /// `string`
        const STRING = 1 << 4;
        /// `object`
        const OBJECT = 1 << 5;
        /// `array`
        const ARRAY = 1 << 6;
    }
}

/// Output order of union members; `null` always last.
const TYPE_IDENTIFIERS: [(SchemaType, &str); 7] = [
    (SchemaType::BOOLEAN, "boolean"),
    (SchemaType::INTEGER, "integer"),
    (SchemaType::NUMBER, "number"),
    (SchemaType::STRING, "string"),
    (SchemaType::OBJECT, "object"),
    (SchemaType::ARRAY, "array"),
    (SchemaType::NULL, "null"),
];

impl SchemaType {
    /// Parses a single type identifier.
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        TYPE_IDENTIFIERS
            .iter()
            .find(|(_, name)| *name == identifier)
            .map(|(flag, _)| *flag)
    }

    /// Member identifiers in output order.
    pub fn identifiers(self) -> Vec<&'static str> {
        TYPE_IDENTIFIERS
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }

    /// The identifier when exactly one member is set.
    pub fn single_identifier(self) -> Option<&'static str> {
        match self.identifiers().as_slice() {
            [single] => Some(single),
            _ => None,
        }
    }

    /// The union with `null` removed.
    pub fn without_null(self) -> Self {
        self.difference(SchemaType::NULL)
    }
}

/// Polymorphism hint for `oneOf`/`anyOf`/`allOf` hierarchies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Discriminator {
    /// Property whose value selects the concrete schema.
    pub property_name: String,
    /// Value to schema-reference mapping (3.x only).
    pub mapping: IndexMap<String, String>,
    /// Specification extensions (written in 3.1 only).
    pub extensions: Extensions,
}

impl Discriminator {
    /// Creates a discriminator on `property_name`.
    pub fn new(property_name: impl Into<String>) -> Self {
        Self {
            property_name: property_name.into(),
            ..Self::default()
        }
    }
}

/// An inline schema body.
///
/// Exclusive bounds are held in their numeric (3.1) form; the boolean
/// 3.0/2.0 form is produced on output. `nullable` is the legacy flag for
/// schemas without a `type`; a typed nullable schema carries
/// [`SchemaType::NULL`] in its union instead.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    /// `$id` (3.1).
    pub id: Option<String>,
    /// `$schema` dialect (3.1).
    pub schema_dialect: Option<String>,
    /// `$comment` (3.1).
    pub comment: Option<String>,
    /// `$defs` (3.1).
    pub defs: IndexMap<String, RefOr<Schema>>,
    /// `title`.
    pub title: Option<String>,
    /// `type` union.
    pub schema_type: Option<SchemaType>,
    /// `format`.
    pub format: Option<String>,
    /// `description`.
    pub description: Option<String>,
    /// Inclusive upper bound.
    pub maximum: Option<Number>,
    /// Exclusive upper bound.
    pub exclusive_maximum: Option<Number>,
    /// Inclusive lower bound.
    pub minimum: Option<Number>,
    /// Exclusive lower bound.
    pub exclusive_minimum: Option<Number>,
    /// `multipleOf`.
    pub multiple_of: Option<Number>,
    /// `maxLength`.
    pub max_length: Option<u64>,
    /// `minLength`.
    pub min_length: Option<u64>,
    /// `pattern`.
    pub pattern: Option<String>,
    /// `maxItems`.
    pub max_items: Option<u64>,
    /// `minItems`.
    pub min_items: Option<u64>,
    /// `uniqueItems`.
    pub unique_items: Option<bool>,
    /// `maxProperties`.
    pub max_properties: Option<u64>,
    /// `minProperties`.
    pub min_properties: Option<u64>,
    /// `required` property names.
    pub required: IndexSet<String>,
    /// `enum`.
    pub enum_values: Vec<Value>,
    /// `const` (3.1; written as a one-value `enum` below 3.1).
    pub const_value: Option<Value>,
    /// `default`.
    pub default: Option<Value>,
    /// `items`.
    pub items: Option<Box<RefOr<Schema>>>,
    /// `properties`.
    pub properties: IndexMap<String, RefOr<Schema>>,
    /// `patternProperties` (3.1).
    pub pattern_properties: IndexMap<String, RefOr<Schema>>,
    /// `additionalProperties` sub-schema.
    pub additional_properties: Option<Box<RefOr<Schema>>>,
    /// `additionalProperties: false` when unset. Takes precedence over the sub-schema.
    pub additional_properties_allowed: bool,
    /// `allOf`.
    pub all_of: Vec<RefOr<Schema>>,
    /// `anyOf` (3.x).
    pub any_of: Vec<RefOr<Schema>>,
    /// `oneOf` (3.x).
    pub one_of: Vec<RefOr<Schema>>,
    /// `not` (3.x).
    pub not: Option<Box<RefOr<Schema>>>,
    /// `discriminator`.
    pub discriminator: Option<Discriminator>,
    /// Legacy nullability for untyped schemas.
    pub nullable: bool,
    /// `readOnly`.
    pub read_only: bool,
    /// `writeOnly` (3.x).
    pub write_only: bool,
    /// `deprecated` (3.x).
    pub deprecated: bool,
    /// `example`.
    pub example: Option<Value>,
    /// `examples` (3.1).
    pub examples: Vec<Value>,
    /// Specification extensions.
    pub extensions: Extensions,
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            id: None,
            schema_dialect: None,
            comment: None,
            defs: IndexMap::new(),
            title: None,
            schema_type: None,
            format: None,
            description: None,
            maximum: None,
            exclusive_maximum: None,
            minimum: None,
            exclusive_minimum: None,
            multiple_of: None,
            max_length: None,
            min_length: None,
            pattern: None,
            max_items: None,
            min_items: None,
            unique_items: None,
            max_properties: None,
            min_properties: None,
            required: IndexSet::new(),
            enum_values: Vec::new(),
            const_value: None,
            default: None,
            items: None,
            properties: IndexMap::new(),
            pattern_properties: IndexMap::new(),
            additional_properties: None,
            additional_properties_allowed: true,
            all_of: Vec::new(),
            any_of: Vec::new(),
            one_of: Vec::new(),
            not: None,
            discriminator: None,
            nullable: false,
            read_only: false,
            write_only: false,
            deprecated: false,
            example: None,
            examples: Vec::new(),
            extensions: Extensions::new(),
        }
    }
}

impl Schema {
    /// A schema of the given type union.
    pub fn of_type(schema_type: SchemaType) -> Self {
        Self {
            schema_type: Some(schema_type),
            ..Self::default()
        }
    }

    /// Sets `format`.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Adds a property.
    pub fn with_property(mut self, name: impl Into<String>, schema: impl Into<RefOr<Schema>>) -> Self {
        self.properties.insert(name.into(), schema.into());
        self
    }

    /// Marks a property name as required.
    pub fn with_required(mut self, name: impl Into<String>) -> Self {
        self.required.insert(name.into());
        self
    }

    /// Sets `items`.
    pub fn with_items(mut self, items: impl Into<RefOr<Schema>>) -> Self {
        self.items = Some(Box::new(items.into()));
        self
    }

    /// Whether `null` is an accepted instance.
    pub fn is_nullable(&self) -> bool {
        self.nullable
            || self
                .schema_type
                .is_some_and(|t| t.contains(SchemaType::NULL))
    }

    /// Follows one pointer step below this body, returning the child and the segments consumed.
    fn child<'s>(&'s self, segments: &[&str]) -> Option<(&'s RefOr<Schema>, usize)> {
        let indexed = |list: &'s [RefOr<Schema>], idx: &str| -> Option<(&'s RefOr<Schema>, usize)> {
            idx.parse::<usize>().ok().and_then(|i| list.get(i)).map(|s| (s, 2))
        };
        match segments {
            ["properties", name, ..] => self
                .properties
                .get(decode_pointer_segment(name).as_str())
                .map(|s| (s, 2)),
            ["patternProperties", name, ..] => self
                .pattern_properties
                .get(decode_pointer_segment(name).as_str())
                .map(|s| (s, 2)),
            ["$defs", name, ..] => self
                .defs
                .get(decode_pointer_segment(name).as_str())
                .map(|s| (s, 2)),
            ["allOf", idx, ..] => indexed(&self.all_of, idx),
            ["anyOf", idx, ..] => indexed(&self.any_of, idx),
            ["oneOf", idx, ..] => indexed(&self.one_of, idx),
            ["items", ..] => self.items.as_deref().map(|s| (s, 1)),
            ["not", ..] => self.not.as_deref().map(|s| (s, 1)),
            ["additionalProperties", ..] => self.additional_properties.as_deref().map(|s| (s, 1)),
            _ => None,
        }
    }
}

/// Walks JSON Pointer segments down from a schema occurrence.
///
/// Stops (returning `None`) if an intermediate occurrence is itself a reference.
pub(crate) fn walk_schema<'s>(start: &'s RefOr<Schema>, segments: &[&str]) -> Option<&'s RefOr<Schema>> {
    let mut current = start;
    let mut rest = segments;
    while !rest.is_empty() {
        let (next, consumed) = current.as_item()?.child(rest)?;
        current = next;
        rest = &rest[consumed..];
    }
    Some(current)
}

impl Component for Schema {
    const KIND: ReferenceType = ReferenceType::Schema;

    fn lookup<'d>(doc: &'d OpenApiDocument, id: &str) -> Option<Lookup<'d, Self>> {
        if !id.starts_with("#/") {
            return lookup_in(&doc.components.schemas, id);
        }
        let segments = pointer_segments(id);
        let ["components", "schemas", name, rest @ ..] = segments.as_slice() else {
            return None;
        };
        let root = doc.components.schemas.get(decode_pointer_segment(name).as_str())?;
        Some(match walk_schema(root, rest)? {
            RefOr::Item(schema) => Lookup::Found(schema),
            RefOr::Ref(reference) => Lookup::Forward(reference),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{ReferenceDescriptor, ReferenceResolver};

    #[test]
    fn test_type_identifiers_order() {
        let union = SchemaType::NULL | SchemaType::STRING;
        assert_eq!(union.identifiers(), vec!["string", "null"]);
        assert_eq!(union.single_identifier(), None);
        assert_eq!(union.without_null().single_identifier(), Some("string"));
        assert_eq!(SchemaType::from_identifier("integer"), Some(SchemaType::INTEGER));
        assert_eq!(SchemaType::from_identifier("file"), None);
    }

    #[test]
    fn test_defaults_allow_additional_properties() {
        assert!(Schema::default().additional_properties_allowed);
    }

    #[test]
    fn test_is_nullable() {
        assert!(Schema::of_type(SchemaType::STRING | SchemaType::NULL).is_nullable());
        assert!(Schema {
            nullable: true,
            ..Schema::default()
        }
        .is_nullable());
        assert!(!Schema::of_type(SchemaType::STRING).is_nullable());
    }

    #[test]
    fn test_resolves_deep_pointer() {
        let mut doc = OpenApiDocument::new("Deep", "1.0");
        let pet = Schema::of_type(SchemaType::OBJECT).with_property(
            "tags",
            Schema::of_type(SchemaType::ARRAY).with_items(Schema::of_type(SchemaType::STRING)),
        );
        doc.components.schemas.insert("Pet".into(), pet.into());

        let reference = ReferenceDescriptor::local(
            ReferenceType::Schema,
            "#/components/schemas/Pet/properties/tags/items",
        )
        .unwrap();
        let resolver = ReferenceResolver::new(Some(&doc));
        let target: &Schema = resolver.resolve(&reference).unwrap();
        assert_eq!(target.schema_type, Some(SchemaType::STRING));
    }
}
