//! Directory of JSON exports
//!
//! Each collection is one file: `<name>.json` holding an array of documents
//! or `<name>.jsonl` holding one document per line. A collection with both
//! files is ambiguous and cannot be sampled. Values are read as
//! MongoDB relaxed Extended JSON, so `{"$oid": "..."}` becomes an ObjectId and
//! `{"$date": "..."}` a DateTime.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bson::{Bson, Document};
use serde_json::Value;
use tracing::debug;

use super::{DocumentSource, SourceError, SourceResult};

const EXTENSIONS: [&str; 2] = ["json", "jsonl"];

/// Reads collections from JSON files in a directory
#[derive(Debug, Clone)]
pub struct JsonDirSource {
    root: PathBuf,
}

impl JsonDirSource {
    /// Create a source over `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory the collections are read from
    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn locate(&self, collection: &str) -> SourceResult<PathBuf> {
        if collection.is_empty() || collection.contains(['/', '\\']) || collection.starts_with('.')
        {
            return Err(SourceError::unavailable(collection, "invalid collection name"));
        }

        let mut found = Vec::new();
        for ext in EXTENSIONS {
            let candidate = self.root.join(format!("{collection}.{ext}"));
            if tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
                found.push(candidate);
            }
        }

        match found.len() {
            0 => Err(SourceError::unavailable(collection, "collection not found")),
            1 => Ok(found.remove(0)),
            _ => Err(SourceError::unavailable(
                collection,
                format!("ambiguous: both {collection}.json and {collection}.jsonl exist"),
            )),
        }
    }
}

#[async_trait]
impl DocumentSource for JsonDirSource {
    async fn list_collections(&self) -> SourceResult<Vec<String>> {
        let mut entries = tokio::fs::read_dir(&self.root).await.map_err(|e| {
            SourceError::ListFailed(format!("{}: {e}", self.root.display()))
        })?;

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| SourceError::ListFailed(e.to_string()))?
        {
            let path = entry.path();
            let is_collection = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| EXTENSIONS.contains(&ext));
            if !is_collection {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }

        names.sort();
        names.dedup();
        Ok(names)
    }

    async fn sample(&self, collection: &str, limit: usize) -> SourceResult<Vec<Document>> {
        let path = self.locate(collection).await?;
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| SourceError::Io {
                path: path.clone(),
                source,
            })?;

        let documents = if path.extension().is_some_and(|ext| ext == "jsonl") {
            parse_lines(collection, &content, limit)?
        } else {
            parse_array(collection, &content, limit)?
        };

        debug!(
            collection,
            path = %path.display(),
            documents = documents.len(),
            "Read collection sample"
        );
        Ok(documents)
    }
}

fn parse_array(collection: &str, content: &str, limit: usize) -> SourceResult<Vec<Document>> {
    let value: Value = serde_json::from_str(content).map_err(|e| SourceError::Parse {
        collection: collection.to_string(),
        message: e.to_string(),
    })?;

    match value {
        Value::Array(values) => values
            .into_iter()
            .take(limit)
            .map(|value| to_document(collection, value))
            .collect(),
        Value::Object(_) => std::iter::once(value)
            .take(limit)
            .map(|value| to_document(collection, value))
            .collect(),
        other => Err(SourceError::Parse {
            collection: collection.to_string(),
            message: format!("expected an array of documents, found {}", json_kind(&other)),
        }),
    }
}

fn parse_lines(collection: &str, content: &str, limit: usize) -> SourceResult<Vec<Document>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .take(limit)
        .map(|(idx, line)| {
            let value: Value = serde_json::from_str(line).map_err(|e| SourceError::Parse {
                collection: collection.to_string(),
                message: format!("line {}: {e}", idx + 1),
            })?;
            to_document(collection, value)
        })
        .collect()
}

fn to_document(collection: &str, value: Value) -> SourceResult<Document> {
    let kind = json_kind(&value);
    match Bson::try_from(value) {
        Ok(Bson::Document(doc)) => Ok(doc),
        Ok(_) => Err(SourceError::Parse {
            collection: collection.to_string(),
            message: format!("expected a document, found {kind}"),
        }),
        Err(e) => Err(SourceError::Parse {
            collection: collection.to_string(),
            message: e.to_string(),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
