//! Relationship model

use serde::{Deserialize, Serialize};

/// How confident the detector is about the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationshipKind {
    /// Target chosen from the field name alone
    NamingConvention,
    /// Target chosen because sampled values match the target's `_id`s
    ValueOverlap,
}

impl std::fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelationshipKind::NamingConvention => write!(f, "naming-convention"),
            RelationshipKind::ValueOverlap => write!(f, "value-overlap"),
        }
    }
}

/// How many target documents one source document points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Cardinality {
    /// A single reference
    One,
    /// An array of references, or references inside array elements
    Many,
}

/// Which field shape matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchPattern {
    /// `<name>_id`, `<name>Id`, `<name>_ids`, ...
    IdSuffix,
    /// Embedded document carrying an `_id` or `id` key
    EmbeddedId,
}

/// A detected reference from a field to another collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    /// Collection holding the reference
    pub source_collection: String,
    /// Path of the referencing field
    pub source_field: String,
    /// Referenced collection
    pub target_collection: String,
    /// Confidence of the target choice
    pub kind: RelationshipKind,
    /// One or many targets per source document
    pub cardinality: Cardinality,
    /// Rule that matched the field
    pub pattern: MatchPattern,
    /// Share of sampled values found among the target's `_id`s
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlap: Option<f64>,
}

impl Relationship {
    /// `source.field -> target`
    pub fn describe(&self) -> String {
        format!(
            "{}.{} -> {}",
            self.source_collection, self.source_field, self.target_collection
        )
    }

    /// Whether source and target are the same collection
    pub fn is_self_reference(&self) -> bool {
        self.source_collection == self.target_collection
    }
}
