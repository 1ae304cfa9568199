//! Type unification
//!
//! Reduces every value observed for one field into a single
//! [`TypeDescriptor`]. Observations are folded into a [`Shape`] accumulator
//! that records which kinds were seen; the accumulator is then turned into a
//! descriptor in one pass, so the result does not depend on observation
//! order.
//!
//! Rules:
//! - more than one distinct non-null kind yields a `Union`
//! - integers and floats together widen to `Float`
//! - null next to other kinds yields `Optional`, null alone yields `Null`
//! - no observations yields `Unknown`
//! - array elements are unified across every array instance
//! - embedded documents are unified key by key; a missing key marks the key
//!   as not required without adding null to its type

use bson::{Bson, Document};
use indexmap::IndexMap;

use super::formats::{Format, detect_format};
use super::types::{ObjectField, TypeDescriptor};

/// Unifies raw observations into type descriptors
#[derive(Debug, Clone, Copy)]
pub struct TypeUnifier {
    detect_formats: bool,
}

impl Default for TypeUnifier {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeUnifier {
    /// Create a unifier with string format detection enabled
    pub fn new() -> Self {
        Self {
            detect_formats: true,
        }
    }

    /// Enable or disable string format detection
    pub fn with_format_detection(mut self, detect: bool) -> Self {
        self.detect_formats = detect;
        self
    }

    /// Unify a sequence of observed values
    pub fn unify<'a, I>(&self, observations: I) -> TypeDescriptor
    where
        I: IntoIterator<Item = &'a Bson>,
    {
        let mut shape = Shape::default();
        for value in observations {
            shape.observe(value, self.detect_formats);
        }
        shape.finish()
    }
}

/// Unify observed values with format detection enabled
pub fn unify<'a, I>(observations: I) -> TypeDescriptor
where
    I: IntoIterator<Item = &'a Bson>,
{
    TypeUnifier::new().unify(observations)
}

/// Unify already inferred descriptors
///
/// Unions are flattened and `Optional` wrappers are lifted, so the result
/// satisfies the same invariants as [`unify`].
pub fn unify_types<'a, I>(types: I) -> TypeDescriptor
where
    I: IntoIterator<Item = &'a TypeDescriptor>,
{
    let mut shape = Shape::default();
    for ty in types {
        shape.absorb(ty);
    }
    shape.finish()
}

impl TypeDescriptor {
    /// Unify this descriptor with another one
    pub fn merge(&self, other: &TypeDescriptor) -> TypeDescriptor {
        unify_types([self, other])
    }
}

/// Accumulated kinds seen for one field
#[derive(Debug, Clone, Default)]
struct Shape {
    null: bool,
    boolean: bool,
    integer: bool,
    float: bool,
    /// `Some(format)` once a string was seen; the format survives only while
    /// every string agrees on it
    string: Option<Option<Format>>,
    date: bool,
    reference: bool,
    array: Option<Box<Shape>>,
    object: Option<ObjectShape>,
}

#[derive(Debug, Clone, Default)]
struct ObjectShape {
    observations: usize,
    keys: IndexMap<String, KeyShape>,
}

#[derive(Debug, Clone)]
struct KeyShape {
    shape: Shape,
    always_present: bool,
}

impl Shape {
    fn observe(&mut self, value: &Bson, detect_formats: bool) {
        match value {
            Bson::Null | Bson::Undefined => self.null = true,
            Bson::Boolean(_) => self.boolean = true,
            Bson::Int32(_) | Bson::Int64(_) => self.integer = true,
            Bson::Double(_) | Bson::Decimal128(_) => self.float = true,
            Bson::String(s) | Bson::Symbol(s) => {
                let format = if detect_formats {
                    detect_format(s)
                } else {
                    None
                };
                self.observe_string(format);
            }
            Bson::DateTime(_) | Bson::Timestamp(_) => self.date = true,
            Bson::ObjectId(_) | Bson::DbPointer(_) => self.reference = true,
            Bson::Array(items) => {
                let elements = self.array.get_or_insert_with(Default::default);
                for item in items {
                    elements.observe(item, detect_formats);
                }
            }
            Bson::Document(doc) => self
                .object
                .get_or_insert_with(Default::default)
                .observe(doc, detect_formats),
            Bson::JavaScriptCode(_)
            | Bson::JavaScriptCodeWithScope(_)
            | Bson::RegularExpression(_)
            | Bson::Binary(_)
            | Bson::MaxKey
            | Bson::MinKey => self.observe_string(None),
        }
    }

    fn absorb(&mut self, ty: &TypeDescriptor) {
        match ty {
            TypeDescriptor::Unknown => {}
            TypeDescriptor::Null => self.null = true,
            TypeDescriptor::Boolean => self.boolean = true,
            TypeDescriptor::Integer => self.integer = true,
            TypeDescriptor::Float => self.float = true,
            TypeDescriptor::String { format } => self.observe_string(*format),
            TypeDescriptor::Date => self.date = true,
            TypeDescriptor::Reference => self.reference = true,
            TypeDescriptor::Array { items } => self
                .array
                .get_or_insert_with(Default::default)
                .absorb(items),
            TypeDescriptor::Object { fields } => self
                .object
                .get_or_insert_with(Default::default)
                .absorb(fields),
            TypeDescriptor::Union { variants } => {
                for variant in variants {
                    self.absorb(variant);
                }
            }
            TypeDescriptor::Optional { inner } => {
                self.null = true;
                self.absorb(inner);
            }
        }
    }

    fn observe_string(&mut self, format: Option<Format>) {
        self.string = Some(match self.string {
            None => format,
            Some(seen) if seen == format => seen,
            Some(_) => None,
        });
    }

    fn finish(&self) -> TypeDescriptor {
        let mut members = Vec::new();

        if self.boolean {
            members.push(TypeDescriptor::Boolean);
        }
        // Numeric drift widens instead of forming a union
        if self.float {
            members.push(TypeDescriptor::Float);
        } else if self.integer {
            members.push(TypeDescriptor::Integer);
        }
        if let Some(format) = self.string {
            members.push(TypeDescriptor::String { format });
        }
        if self.date {
            members.push(TypeDescriptor::Date);
        }
        if self.reference {
            members.push(TypeDescriptor::Reference);
        }
        if let Some(elements) = &self.array {
            members.push(TypeDescriptor::array_of(elements.finish()));
        }
        if let Some(object) = &self.object {
            members.push(object.finish());
        }
        debug_assert!(members.windows(2).all(|w| w[0].rank() < w[1].rank()));

        let present = match members.len() {
            0 => None,
            1 => members.pop(),
            _ => Some(TypeDescriptor::Union { variants: members }),
        };

        match (present, self.null) {
            (None, false) => TypeDescriptor::Unknown,
            (None, true) => TypeDescriptor::Null,
            (Some(ty), false) => ty,
            (Some(ty), true) => TypeDescriptor::optional(ty),
        }
    }
}

impl ObjectShape {
    fn observe(&mut self, doc: &Document, detect_formats: bool) {
        let first = self.observations == 0;
        self.observations += 1;

        for (key, shape) in self.keys.iter_mut() {
            if !doc.contains_key(key) {
                shape.always_present = false;
            }
        }

        for (key, value) in doc {
            self.keys
                .entry(key.clone())
                .or_insert_with(|| KeyShape {
                    shape: Shape::default(),
                    always_present: first,
                })
                .shape
                .observe(value, detect_formats);
        }
    }

    fn absorb(&mut self, fields: &IndexMap<String, ObjectField>) {
        let first = self.observations == 0;
        self.observations += 1;

        for (key, shape) in self.keys.iter_mut() {
            if !fields.contains_key(key) {
                shape.always_present = false;
            }
        }

        for (key, field) in fields {
            let entry = self.keys.entry(key.clone()).or_insert_with(|| KeyShape {
                shape: Shape::default(),
                always_present: first,
            });
            entry.always_present &= field.required;
            entry.shape.absorb(&field.ty);
        }
    }

    fn finish(&self) -> TypeDescriptor {
        let fields = self
            .keys
            .iter()
            .map(|(key, shape)| {
                (
                    key.clone(),
                    ObjectField {
                        ty: shape.shape.finish(),
                        required: shape.always_present,
                    },
                )
            })
            .collect();
        TypeDescriptor::Object { fields }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::oid::ObjectId;
    use bson::{DateTime, bson, doc};

    fn union(variants: Vec<TypeDescriptor>) -> TypeDescriptor {
        TypeDescriptor::Union { variants }
    }

    #[test]
    fn test_same_integers() {
        let values = [Bson::Int32(1), Bson::Int32(2)];
        assert_eq!(unify(&values), TypeDescriptor::Integer);
    }

    #[test]
    fn test_integer_float_widens() {
        let values = [Bson::Int32(1), Bson::Double(2.5)];
        assert_eq!(unify(&values), TypeDescriptor::Float);

        let values = [Bson::Int64(1), Bson::Double(2.5), Bson::String("x".into())];
        assert_eq!(
            unify(&values),
            union(vec![TypeDescriptor::Float, TypeDescriptor::string()])
        );
    }

    #[test]
    fn test_null_makes_optional_not_union() {
        let values = [
            Bson::String("a".into()),
            Bson::Null,
            Bson::String("b".into()),
        ];
        assert_eq!(
            unify(&values),
            TypeDescriptor::optional(TypeDescriptor::string())
        );
    }

    #[test]
    fn test_only_null() {
        assert_eq!(unify(&[Bson::Null, Bson::Null]), TypeDescriptor::Null);
    }

    #[test]
    fn test_no_observations_is_unknown() {
        let values: [Bson; 0] = [];
        assert_eq!(unify(&values), TypeDescriptor::Unknown);
    }

    #[test]
    fn test_union_canonical_order() {
        let a = [
            Bson::Boolean(true),
            Bson::String("x".into()),
            Bson::Int32(1),
            Bson::String("y".into()),
        ];
        let b = [Bson::String("x".into()), Bson::Int32(1), Bson::Boolean(false)];
        let expected = union(vec![
            TypeDescriptor::Boolean,
            TypeDescriptor::Integer,
            TypeDescriptor::string(),
        ]);
        assert_eq!(unify(&a), expected);
        assert_eq!(unify(&b), expected);
    }

    #[test]
    fn test_union_members_sorted_by_rank() {
        let values = [
            Bson::Document(doc! {}),
            bson!([1]),
            Bson::ObjectId(ObjectId::new()),
            Bson::DateTime(DateTime::now()),
            Bson::String("s".into()),
            Bson::Double(1.0),
            Bson::Boolean(true),
        ];
        let TypeDescriptor::Union { variants } = unify(&values) else {
            panic!("expected a union");
        };
        assert_eq!(variants.len(), 7);
        assert!(variants.windows(2).all(|w| w[0].rank() < w[1].rank()));
    }

    #[test]
    fn test_optional_union() {
        let values = [Bson::Int32(1), Bson::String("a".into()), Bson::Null];
        assert_eq!(
            unify(&values),
            TypeDescriptor::optional(union(vec![
                TypeDescriptor::Integer,
                TypeDescriptor::string()
            ]))
        );
    }

    #[test]
    fn test_reference_and_date() {
        let values = [Bson::ObjectId(ObjectId::new())];
        assert_eq!(unify(&values), TypeDescriptor::Reference);

        let values = [Bson::DateTime(DateTime::now())];
        assert_eq!(unify(&values), TypeDescriptor::Date);
    }

    #[test]
    fn test_arrays_unify_elements_across_instances() {
        let values = [bson!([1, 2]), bson!([2.5])];
        assert_eq!(
            unify(&values),
            TypeDescriptor::array_of(TypeDescriptor::Float)
        );

        let values = [bson!([1, "a"])];
        assert_eq!(
            unify(&values),
            TypeDescriptor::array_of(union(vec![
                TypeDescriptor::Integer,
                TypeDescriptor::string()
            ]))
        );
    }

    #[test]
    fn test_empty_arrays() {
        let values = [bson!([]), bson!([])];
        assert_eq!(
            unify(&values),
            TypeDescriptor::array_of(TypeDescriptor::Unknown)
        );

        // Empty instances do not pollute the element type
        let values = [bson!([]), bson!(["a"])];
        assert_eq!(
            unify(&values),
            TypeDescriptor::array_of(TypeDescriptor::string())
        );
    }

    #[test]
    fn test_nested_arrays() {
        let values = [bson!([[1], [2]]), bson!([[3.5]])];
        assert_eq!(
            unify(&values),
            TypeDescriptor::array_of(TypeDescriptor::array_of(TypeDescriptor::Float))
        );
    }

    #[test]
    fn test_objects_unify_per_key() {
        let values = [
            Bson::Document(doc! { "a": 1, "c": null }),
            Bson::Document(doc! { "a": 2, "b": "x", "c": 3 }),
        ];
        let ty = unify(&values);
        let fields = ty.object_fields().expect("object");

        assert_eq!(fields["a"].ty, TypeDescriptor::Integer);
        assert!(fields["a"].required);
        assert_eq!(fields["b"].ty, TypeDescriptor::string());
        assert!(!fields["b"].required);
        assert_eq!(
            fields["c"].ty,
            TypeDescriptor::optional(TypeDescriptor::Integer)
        );
        assert!(fields["c"].required);
        assert_eq!(fields.keys().collect::<Vec<_>>(), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_missing_key_does_not_add_null() {
        let values = [
            Bson::Document(doc! { "a": 1 }),
            Bson::Document(doc! {}),
        ];
        let ty = unify(&values);
        let fields = ty.object_fields().unwrap();
        assert_eq!(fields["a"].ty, TypeDescriptor::Integer);
        assert!(!fields["a"].required);
    }

    #[test]
    fn test_string_formats() {
        let values = [
            Bson::String("a@example.com".into()),
            Bson::String("b@example.org".into()),
        ];
        assert_eq!(
            unify(&values),
            TypeDescriptor::String {
                format: Some(Format::Email)
            }
        );

        let values = [
            Bson::String("a@example.com".into()),
            Bson::String("plain".into()),
        ];
        assert_eq!(unify(&values), TypeDescriptor::string());

        let values = [Bson::String("a@example.com".into())];
        assert_eq!(
            TypeUnifier::new().with_format_detection(false).unify(&values),
            TypeDescriptor::string()
        );
    }

    #[test]
    fn test_unify_types_flattens_unions() {
        let left = union(vec![TypeDescriptor::Integer, TypeDescriptor::string()]);
        let right = TypeDescriptor::optional(union(vec![
            TypeDescriptor::Boolean,
            TypeDescriptor::Float,
        ]));
        let merged = left.merge(&right);

        assert_eq!(
            merged,
            TypeDescriptor::optional(union(vec![
                TypeDescriptor::Boolean,
                TypeDescriptor::Float,
                TypeDescriptor::string(),
            ]))
        );
        assert_eq!(merged, right.merge(&left));
    }

    #[test]
    fn test_unify_types_unknown_is_absorbed() {
        assert_eq!(
            TypeDescriptor::Unknown.merge(&TypeDescriptor::Date),
            TypeDescriptor::Date
        );
        assert_eq!(
            unify_types(std::iter::empty::<&TypeDescriptor>()),
            TypeDescriptor::Unknown
        );
    }

    #[test]
    fn test_unify_types_objects_track_required() {
        let a = unify(&[Bson::Document(doc! { "x": 1 })]);
        let b = unify(&[Bson::Document(doc! { "x": 2, "y": true })]);
        let merged = a.merge(&b);
        let fields = merged.object_fields().unwrap();
        assert!(fields["x"].required);
        assert!(!fields["y"].required);
    }
}
