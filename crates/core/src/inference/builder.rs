//! Collection schema builder
//!
//! Flattens sampled documents into field paths, applies the include/exclude
//! filter and unifies the observations of every retained path.

use std::collections::HashMap;

use bson::{Bson, Document};
use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use super::config::InferenceConfig;
use super::filter::FieldFilter;
use super::path;
use super::types::{CollectionSchema, FieldSchema, TypeDescriptor, identifier_key};
use super::unify::TypeUnifier;

/// Container key of top-level fields
const ROOT: &str = "";

/// Builds [`CollectionSchema`]s from sampled documents
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    config: InferenceConfig,
}

/// Observations of one field path
struct PathStats<'a> {
    observations: Vec<&'a Bson>,
    /// Path of the enclosing document (`""` for top-level fields)
    container: String,
}

/// Walk state for one collection
#[derive(Default)]
struct Flattened<'a> {
    paths: IndexMap<String, PathStats<'a>>,
    /// Number of documents observed at each container path
    containers: HashMap<String, usize>,
    identifiers: IndexSet<String>,
}

impl<'a> Flattened<'a> {
    fn observe(&mut self, path: String, container: &str, value: &'a Bson) {
        self.paths
            .entry(path)
            .or_insert_with(|| PathStats {
                observations: Vec::new(),
                container: container.to_string(),
            })
            .observations
            .push(value);
    }

    fn container_count(&self, container: &str) -> usize {
        self.containers.get(container).copied().unwrap_or(0)
    }
}

impl SchemaBuilder {
    /// Create a builder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder with custom configuration
    pub fn with_config(config: InferenceConfig) -> Self {
        Self { config }
    }

    /// The builder's configuration
    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Build the schema of one collection
    ///
    /// Field order is the first-seen order of paths across `documents`, so
    /// the same input always yields the same schema.
    pub fn build(
        &self,
        name: &str,
        documents: &[Document],
        filter: &FieldFilter,
    ) -> CollectionSchema {
        let mut flat = Flattened::default();
        for doc in documents {
            self.walk_document(None, doc, &mut flat);
        }

        let unifier = TypeUnifier::new().with_format_detection(self.config.detect_formats);
        let keep = |p: &str| filter.allows(p);
        let mut fields = IndexMap::new();

        for (field_path, stats) in &flat.paths {
            if !filter.allows(field_path) {
                continue;
            }

            let mut ty = unifier.unify(stats.observations.iter().copied());
            ty.retain_paths(field_path, &keep);

            let required = stats.observations.len() == flat.container_count(&stats.container);
            let examples = self.collect_examples(&ty, &stats.observations);

            fields.insert(
                field_path.clone(),
                FieldSchema {
                    path: field_path.clone(),
                    ty,
                    occurrences: stats.observations.len(),
                    required,
                    examples,
                },
            );
        }

        debug!(
            collection = name,
            documents = documents.len(),
            paths = flat.paths.len(),
            fields = fields.len(),
            "Built collection schema"
        );

        CollectionSchema::new(
            name,
            fields,
            documents.len(),
            flat.identifiers.into_iter().collect(),
        )
    }

    fn walk_document<'a>(&self, prefix: Option<&str>, doc: &'a Document, flat: &mut Flattened<'a>) {
        let container = prefix.unwrap_or(ROOT);
        *flat.containers.entry(container.to_string()).or_default() += 1;

        for (key, value) in doc {
            if prefix.is_none() && key == "_id" {
                if let Some(id) = identifier_key(value) {
                    flat.identifiers.insert(id);
                }
                if !self.config.include_id {
                    continue;
                }
            }

            let field_path = path::join(prefix, key);
            flat.observe(field_path.clone(), container, value);

            match value {
                Bson::Document(inner) => self.walk_document(Some(&field_path), inner, flat),
                Bson::Array(items) => {
                    self.walk_array(&path::elements(&field_path), items, flat)
                }
                _ => {}
            }
        }
    }

    fn walk_array<'a>(&self, elements_path: &str, items: &'a [Bson], flat: &mut Flattened<'a>) {
        for item in items {
            match item {
                Bson::Document(inner) => self.walk_document(Some(elements_path), inner, flat),
                Bson::Array(nested) => {
                    self.walk_array(&path::elements(elements_path), nested, flat)
                }
                _ => {}
            }
        }
    }

    /// Distinct identifier-like values, used to check references by value
    fn collect_examples(&self, ty: &TypeDescriptor, observations: &[&Bson]) -> Vec<String> {
        let reference_like = ty.is_reference_compatible()
            || ty
                .array_items()
                .is_some_and(TypeDescriptor::is_reference_compatible);
        if !reference_like || self.config.max_examples == 0 {
            return Vec::new();
        }

        let mut examples = IndexSet::new();
        let values = observations.iter().flat_map(|value| match value {
            Bson::Array(items) => items.iter().collect::<Vec<_>>(),
            other => vec![*other],
        });
        for value in values {
            if examples.len() >= self.config.max_examples {
                break;
            }
            if let Some(key) = identifier_key(value) {
                examples.insert(key);
            }
        }
        examples.into_iter().collect()
    }
}
