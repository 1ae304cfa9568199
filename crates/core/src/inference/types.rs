//! Inferred type model for document collections

use std::fmt;

use bson::Bson;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::formats::Format;
use super::path;

/// Inferred structural type of a field across all sampled observations
///
/// Invariants maintained by the unifier:
/// - a `Union` has at least two members, never contains `Union`, `Optional`
///   or `Null`, and keeps its members in canonical order
/// - an `Optional` never wraps `Optional`, `Null` or `Unknown`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TypeDescriptor {
    /// Field never observed
    Unknown,
    /// Only null values observed
    Null,
    /// Boolean
    Boolean,
    /// Whole numbers (int32/int64)
    Integer,
    /// Floating point (also the widening of integer + float)
    Float,
    /// String with an optional detected format
    String {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<Format>,
    },
    /// BSON date or timestamp
    Date,
    /// Reference-like identifier (ObjectId, DBPointer)
    Reference,
    /// Array with the element type unified across all instances
    Array { items: Box<TypeDescriptor> },
    /// Embedded document
    Object { fields: IndexMap<String, ObjectField> },
    /// Genuinely heterogeneous values
    Union { variants: Vec<TypeDescriptor> },
    /// Value that is sometimes null
    Optional { inner: Box<TypeDescriptor> },
}

/// A key of an embedded document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectField {
    /// Unified type of the key's present values
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
    /// Whether every observed object carried the key
    pub required: bool,
}

impl TypeDescriptor {
    /// Plain string without a detected format
    pub fn string() -> Self {
        TypeDescriptor::String { format: None }
    }

    /// Array of the given element type
    pub fn array_of(items: TypeDescriptor) -> Self {
        TypeDescriptor::Array {
            items: Box::new(items),
        }
    }

    /// Sometimes-null wrapper, collapsing where the invariants require it
    pub fn optional(inner: TypeDescriptor) -> Self {
        match inner {
            TypeDescriptor::Unknown | TypeDescriptor::Null => TypeDescriptor::Null,
            TypeDescriptor::Optional { .. } => inner,
            other => TypeDescriptor::Optional {
                inner: Box::new(other),
            },
        }
    }

    /// Whether null was observed alongside other values
    pub fn is_optional(&self) -> bool {
        matches!(self, TypeDescriptor::Optional { .. })
    }

    /// The descriptor without its `Optional` wrapper
    pub fn non_null(&self) -> &TypeDescriptor {
        match self {
            TypeDescriptor::Optional { inner } => inner,
            other => other,
        }
    }

    /// Whether values of this type can act as a foreign key
    pub fn is_reference_compatible(&self) -> bool {
        matches!(
            self.non_null(),
            TypeDescriptor::Reference | TypeDescriptor::String { .. } | TypeDescriptor::Integer
        )
    }

    /// Keys of the embedded document, looking through `Optional`
    pub fn object_fields(&self) -> Option<&IndexMap<String, ObjectField>> {
        match self.non_null() {
            TypeDescriptor::Object { fields } => Some(fields),
            _ => None,
        }
    }

    /// Element type of an array, looking through `Optional`
    pub fn array_items(&self) -> Option<&TypeDescriptor> {
        match self.non_null() {
            TypeDescriptor::Array { items } => Some(items),
            _ => None,
        }
    }

    /// Position of this kind inside a union
    pub(crate) fn rank(&self) -> u8 {
        match self {
            TypeDescriptor::Unknown => 0,
            TypeDescriptor::Null => 1,
            TypeDescriptor::Boolean => 2,
            TypeDescriptor::Integer => 3,
            TypeDescriptor::Float => 4,
            TypeDescriptor::String { .. } => 5,
            TypeDescriptor::Date => 6,
            TypeDescriptor::Reference => 7,
            TypeDescriptor::Array { .. } => 8,
            TypeDescriptor::Object { .. } => 9,
            TypeDescriptor::Union { .. } => 10,
            TypeDescriptor::Optional { .. } => 11,
        }
    }

    /// Compact identifier-safe type name used in diagrams
    ///
    /// `int`, `string`, `objectId`, `string[]`, `mixed`, ... Nullability is
    /// dropped; arrays keep their element name.
    pub fn short_name(&self) -> String {
        match self {
            TypeDescriptor::Unknown => "unknown".to_string(),
            TypeDescriptor::Null => "null".to_string(),
            TypeDescriptor::Boolean => "bool".to_string(),
            TypeDescriptor::Integer => "int".to_string(),
            TypeDescriptor::Float => "float".to_string(),
            TypeDescriptor::String { .. } => "string".to_string(),
            TypeDescriptor::Date => "date".to_string(),
            TypeDescriptor::Reference => "objectId".to_string(),
            TypeDescriptor::Array { items } => match items.as_ref() {
                TypeDescriptor::Unknown => "array".to_string(),
                items => format!("{}[]", items.short_name()),
            },
            TypeDescriptor::Object { .. } => "object".to_string(),
            TypeDescriptor::Union { .. } => "mixed".to_string(),
            TypeDescriptor::Optional { inner } => inner.short_name(),
        }
    }

    /// Drop embedded keys whose full path is rejected by `keep`
    ///
    /// `base` is the path of the field this descriptor belongs to.
    pub fn retain_paths(&mut self, base: &str, keep: &dyn Fn(&str) -> bool) {
        match self {
            TypeDescriptor::Object { fields } => {
                fields.retain(|key, _| keep(&path::join(Some(base), key)));
                for (key, field) in fields.iter_mut() {
                    field.ty.retain_paths(&path::join(Some(base), key), keep);
                }
            }
            TypeDescriptor::Array { items } => items.retain_paths(&path::elements(base), keep),
            TypeDescriptor::Optional { inner } => inner.retain_paths(base, keep),
            TypeDescriptor::Union { variants } => {
                for variant in variants.iter_mut() {
                    variant.retain_paths(base, keep);
                }
            }
            _ => {}
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::String { format: Some(format) } => write!(f, "string({format})"),
            TypeDescriptor::Array { items } => write!(f, "array<{items}>"),
            TypeDescriptor::Object { fields } => {
                let keys: Vec<&str> = fields.keys().map(String::as_str).collect();
                write!(f, "object{{{}}}", keys.join(", "))
            }
            TypeDescriptor::Union { variants } => {
                let names: Vec<String> = variants.iter().map(ToString::to_string).collect();
                write!(f, "{}", names.join(" | "))
            }
            TypeDescriptor::Optional { inner } => match inner.as_ref() {
                TypeDescriptor::Union { .. } => write!(f, "({inner})?"),
                _ => write!(f, "{inner}?"),
            },
            other => f.write_str(&other.short_name()),
        }
    }
}

/// Inferred schema of one field path in a collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSchema {
    /// Full field path (`address.city`, `items[].sku`)
    pub path: String,
    /// Unified type of all present values
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
    /// Number of values observed at this path
    pub occurrences: usize,
    /// Whether the field was present in every enclosing document
    pub required: bool,
    /// Distinct identifier-like sample values
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

impl FieldSchema {
    /// The last key of the path
    pub fn name(&self) -> &str {
        path::last_segment(&self.path)
    }

    /// Whether this is a top-level field
    pub fn is_top_level(&self) -> bool {
        path::parent(&self.path).is_none()
    }
}

/// Inferred schema of a whole collection
///
/// Built once by the schema builder and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSchema {
    name: String,
    fields: IndexMap<String, FieldSchema>,
    sample_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    identifiers: Vec<String>,
}

impl CollectionSchema {
    pub(crate) fn new(
        name: impl Into<String>,
        fields: IndexMap<String, FieldSchema>,
        sample_count: usize,
        identifiers: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            fields,
            sample_count,
            identifiers,
        }
    }

    /// Collection name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in first-seen order
    pub fn fields(&self) -> impl Iterator<Item = &FieldSchema> {
        self.fields.values()
    }

    /// Look up a field by path
    pub fn field(&self, path: &str) -> Option<&FieldSchema> {
        self.fields.get(path)
    }

    /// Field paths in first-seen order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Number of field paths
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no field survived sampling and filtering
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of documents the schema was inferred from
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Sampled `_id` values in canonical string form
    pub fn identifiers(&self) -> &[String] {
        &self.identifiers
    }
}

/// Canonical string form of an identifier-like value
///
/// Used to compare reference values against `_id` values across
/// collections. Returns `None` for values that cannot identify a document.
pub fn identifier_key(value: &Bson) -> Option<String> {
    match value {
        Bson::ObjectId(oid) => Some(oid.to_hex()),
        Bson::String(s) if !s.is_empty() => Some(s.clone()),
        Bson::Int32(n) => Some(n.to_string()),
        Bson::Int64(n) => Some(n.to_string()),
        _ => None,
    }
}
