//! Cross-collection relationship detection

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use crate::inference::{CollectionSchema, FieldSchema};

use super::naming::CollectionIndex;
use super::overlap::best_overlap;
use super::rules::{Candidate, EmbeddedIdRule, NamingConventionRule, RelationshipRule};
use super::types::{Relationship, RelationshipKind};

/// Runs an ordered chain of [`RelationshipRule`]s over every field
///
/// The first rule that proposes a target wins for a field. When several
/// collections resolve, the first one is used unless the value-overlap pass
/// is enabled and a candidate's sampled `_id`s match the field's values.
pub struct RelationshipDetector {
    rules: Vec<Box<dyn RelationshipRule>>,
    value_overlap: bool,
}

impl Default for RelationshipDetector {
    fn default() -> Self {
        Self::empty()
            .with_rule(NamingConventionRule)
            .with_rule(EmbeddedIdRule)
    }
}

impl RelationshipDetector {
    /// Detector with the built-in rules
    pub fn new() -> Self {
        Self::default()
    }

    /// Detector without any rule
    pub fn empty() -> Self {
        Self {
            rules: Vec::new(),
            value_overlap: false,
        }
    }

    /// Append a rule to the chain
    pub fn with_rule(mut self, rule: impl RelationshipRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Enable or disable the value-overlap pass
    pub fn with_value_overlap(mut self, enabled: bool) -> Self {
        self.value_overlap = enabled;
        self
    }

    /// Names of the configured rules, in evaluation order
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Detect relationships between `schemas`
    ///
    /// Output follows schema order, then field order. The same
    /// (source, field, target) triple is never reported twice.
    pub fn detect(&self, schemas: &[CollectionSchema]) -> Vec<Relationship> {
        let index = CollectionIndex::new(schemas.iter().map(CollectionSchema::name));
        let by_name: HashMap<&str, &CollectionSchema> =
            schemas.iter().map(|schema| (schema.name(), schema)).collect();

        let mut seen = HashSet::new();
        let mut relationships = Vec::new();

        for schema in schemas {
            for field in schema.fields() {
                let Some((rule, candidate)) = self
                    .rules
                    .iter()
                    .find_map(|rule| rule.evaluate(field, &index).map(|c| (rule.name(), c)))
                else {
                    continue;
                };

                let relationship = self.choose(schema, field, candidate, &by_name);
                let key = (
                    relationship.source_collection.clone(),
                    relationship.source_field.clone(),
                    relationship.target_collection.clone(),
                );
                if !seen.insert(key) {
                    continue;
                }

                debug!(
                    rule,
                    relationship = %relationship.describe(),
                    kind = %relationship.kind,
                    "Detected relationship"
                );
                relationships.push(relationship);
            }
        }

        info!(
            collections = schemas.len(),
            relationships = relationships.len(),
            "Relationship detection complete"
        );
        relationships
    }

    fn choose(
        &self,
        schema: &CollectionSchema,
        field: &FieldSchema,
        candidate: Candidate,
        by_name: &HashMap<&str, &CollectionSchema>,
    ) -> Relationship {
        let Candidate {
            targets,
            cardinality,
            pattern,
        } = candidate;

        let overlap = if self.value_overlap && targets.len() > 1 {
            best_overlap(
                field,
                targets.iter().filter_map(|t| by_name.get(t.as_str()).copied()),
            )
        } else {
            None
        };

        let (target, kind, ratio) = match overlap {
            Some((target, ratio)) => (
                target.to_string(),
                RelationshipKind::ValueOverlap,
                Some(ratio),
            ),
            None => (
                targets.into_iter().next().unwrap_or_default(),
                RelationshipKind::NamingConvention,
                None,
            ),
        };

        Relationship {
            source_collection: schema.name().to_string(),
            source_field: field.path.clone(),
            target_collection: target,
            kind,
            cardinality,
            pattern,
            overlap: ratio,
        }
    }
}
