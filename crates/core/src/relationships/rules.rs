//! Relationship heuristics
//!
//! Each rule looks at one field and proposes the collections it may refer
//! to. The detector runs the rules in order and keeps the first proposal.

use crate::inference::{FieldSchema, TypeDescriptor, path};

use super::naming::{CollectionIndex, reference_stem};
use super::types::{Cardinality, MatchPattern};

/// Targets proposed by a rule for one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Resolved collections, best first
    pub targets: Vec<String>,
    /// One or many references per document
    pub cardinality: Cardinality,
    /// Field shape that matched
    pub pattern: MatchPattern,
}

/// A relationship heuristic
pub trait RelationshipRule: Send + Sync {
    /// Rule name used in logs
    fn name(&self) -> &'static str;

    /// Propose targets for `field`, or `None` when the rule does not apply
    /// or no target collection resolves
    fn evaluate(&self, field: &FieldSchema, index: &CollectionIndex) -> Option<Candidate>;
}

/// Cardinality implied by where the value sits and whether it is an array
fn cardinality_of(field: &FieldSchema, is_array: bool) -> Cardinality {
    if is_array || field.path.contains(path::ARRAY_MARKER) {
        Cardinality::Many
    } else {
        Cardinality::One
    }
}

/// `<name>_id`, `<name>Id`, `<name>ID`, `<name>_ids`, `<name>Ids`
#[derive(Debug, Clone, Copy, Default)]
pub struct NamingConventionRule;

impl RelationshipRule for NamingConventionRule {
    fn name(&self) -> &'static str {
        "naming-convention"
    }

    fn evaluate(&self, field: &FieldSchema, index: &CollectionIndex) -> Option<Candidate> {
        let stem = reference_stem(field.name())?;

        let is_array = match field.ty.array_items() {
            Some(items) if items.is_reference_compatible() => true,
            Some(_) => return None,
            None if field.ty.is_reference_compatible() => false,
            None => return None,
        };

        let targets = index.resolve(stem);
        if targets.is_empty() {
            return None;
        }

        Some(Candidate {
            targets,
            cardinality: cardinality_of(field, is_array),
            pattern: MatchPattern::IdSuffix,
        })
    }
}

/// Embedded documents that carry their own `_id` or `id`
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedIdRule;

impl EmbeddedIdRule {
    fn has_id_key(ty: &TypeDescriptor) -> bool {
        ty.object_fields()
            .is_some_and(|fields| fields.contains_key("_id") || fields.contains_key("id"))
    }
}

impl RelationshipRule for EmbeddedIdRule {
    fn name(&self) -> &'static str {
        "embedded-id"
    }

    fn evaluate(&self, field: &FieldSchema, index: &CollectionIndex) -> Option<Candidate> {
        let is_array = match field.ty.array_items() {
            Some(items) if Self::has_id_key(items) => true,
            Some(_) => return None,
            None if Self::has_id_key(&field.ty) => false,
            None => return None,
        };

        let targets = index.resolve(field.name());
        if targets.is_empty() {
            return None;
        }

        Some(Candidate {
            targets,
            cardinality: cardinality_of(field, is_array),
            pattern: MatchPattern::EmbeddedId,
        })
    }
}
