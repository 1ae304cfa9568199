//! Value-overlap scoring between reference values and target identifiers

use std::collections::HashSet;

use crate::inference::{CollectionSchema, FieldSchema};

/// Share of `examples` found in `identifiers`, between 0.0 and 1.0
pub fn overlap_ratio(examples: &[String], identifiers: &[String]) -> f64 {
    if examples.is_empty() || identifiers.is_empty() {
        return 0.0;
    }
    let ids: HashSet<&str> = identifiers.iter().map(String::as_str).collect();
    let hits = examples.iter().filter(|e| ids.contains(e.as_str())).count();
    hits as f64 / examples.len() as f64
}

/// The target whose identifiers overlap the field's values most
///
/// Ties go to the earlier target. Returns `None` when nothing overlaps.
pub fn best_overlap<'a>(
    field: &FieldSchema,
    targets: impl IntoIterator<Item = &'a CollectionSchema>,
) -> Option<(&'a str, f64)> {
    let mut best: Option<(&'a str, f64)> = None;
    for target in targets {
        let ratio = overlap_ratio(&field.examples, target.identifiers());
        if ratio > 0.0 && best.is_none_or(|(_, current)| ratio > current) {
            best = Some((target.name(), ratio));
        }
    }
    best
}
