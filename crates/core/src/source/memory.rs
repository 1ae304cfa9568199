//! In-memory document source

use async_trait::async_trait;
use bson::Document;
use indexmap::IndexMap;

use super::{DocumentSource, SourceError, SourceResult};

/// Collections held in memory, listed in insertion order
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    collections: IndexMap<String, Vec<Document>>,
}

impl MemorySource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a collection
    pub fn with_collection(mut self, name: impl Into<String>, documents: Vec<Document>) -> Self {
        self.insert(name, documents);
        self
    }

    /// Add or replace a collection
    pub fn insert(&mut self, name: impl Into<String>, documents: Vec<Document>) {
        self.collections.insert(name.into(), documents);
    }
}

#[async_trait]
impl DocumentSource for MemorySource {
    async fn list_collections(&self) -> SourceResult<Vec<String>> {
        Ok(self.collections.keys().cloned().collect())
    }

    async fn sample(&self, collection: &str, limit: usize) -> SourceResult<Vec<Document>> {
        let documents = self
            .collections
            .get(collection)
            .ok_or_else(|| SourceError::unavailable(collection, "collection not found"))?;
        Ok(documents.iter().take(limit).cloned().collect())
    }
}
