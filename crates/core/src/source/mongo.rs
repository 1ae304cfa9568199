//! MongoDB document source
//!
//! Samples with the `$sample` aggregation stage. Requires the `mongodb`
//! feature; without it every operation fails with a hint to rebuild.
//!
//! # Example
//!
//! ```ignore
//! use docschema_core::source::{MongoSource, Sampler};
//!
//! let source = MongoSource::connect("mongodb://localhost:27017", "shop").await?;
//! let docs = Sampler::new(&source).with_sample_size(50).sample("orders").await?;
//! ```

use async_trait::async_trait;
use bson::Document;

use super::{DocumentSource, SourceError, SourceResult};

/// MongoDB database sampled through the official driver
#[derive(Debug, Clone)]
pub struct MongoSource {
    /// Connection string with credentials removed
    display_uri: String,
    /// Database to sample
    database: String,
    #[cfg(feature = "mongodb")]
    client: mongodb::Client,
}

impl MongoSource {
    /// Connect to a deployment
    #[cfg(feature = "mongodb")]
    pub async fn connect(uri: &str, database: impl Into<String>) -> SourceResult<Self> {
        let display_uri = redact_uri(uri);
        let client = mongodb::Client::with_uri_str(uri).await.map_err(|e| {
            SourceError::ListFailed(format!("failed to connect to {display_uri}: {e}"))
        })?;

        tracing::info!(uri = %display_uri, "Connected to MongoDB");

        Ok(Self {
            display_uri,
            database: database.into(),
            client,
        })
    }

    /// Connect to a deployment (stub for when feature is disabled)
    #[cfg(not(feature = "mongodb"))]
    pub async fn connect(uri: &str, database: impl Into<String>) -> SourceResult<Self> {
        let _ = (uri, database);
        Err(SourceError::ListFailed(
            "MongoDB support not available. Rebuild with --features mongodb".to_string(),
        ))
    }

    /// Name of the sampled database
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Connection string safe for logs
    pub fn display_uri(&self) -> &str {
        &self.display_uri
    }
}

#[cfg(feature = "mongodb")]
#[async_trait]
impl DocumentSource for MongoSource {
    async fn list_collections(&self) -> SourceResult<Vec<String>> {
        let mut names = self
            .client
            .database(&self.database)
            .list_collection_names()
            .await
            .map_err(|e| SourceError::ListFailed(e.to_string()))?;

        names.retain(|name| !name.starts_with("system."));
        names.sort();
        Ok(names)
    }

    async fn sample(&self, collection: &str, limit: usize) -> SourceResult<Vec<Document>> {
        use futures::TryStreamExt;

        let coll = self
            .client
            .database(&self.database)
            .collection::<Document>(collection);

        let size = i64::try_from(limit).unwrap_or(i64::MAX);
        let pipeline = vec![bson::doc! { "$sample": { "size": size } }];
        let cursor = coll
            .aggregate(pipeline)
            .await
            .map_err(|e| SourceError::unavailable(collection, e.to_string()))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| SourceError::unavailable(collection, e.to_string()))
    }
}

#[cfg(not(feature = "mongodb"))]
#[async_trait]
impl DocumentSource for MongoSource {
    async fn list_collections(&self) -> SourceResult<Vec<String>> {
        Err(SourceError::ListFailed(
            "MongoDB support not available. Rebuild with --features mongodb".to_string(),
        ))
    }

    async fn sample(&self, collection: &str, _limit: usize) -> SourceResult<Vec<Document>> {
        Err(SourceError::unavailable(
            collection,
            "MongoDB support not available",
        ))
    }
}

/// Strip the password from a connection string
pub fn redact_uri(uri: &str) -> String {
    let Some((scheme, rest)) = uri.split_once("://") else {
        return uri.to_string();
    };
    let authority_end = rest.find('/').unwrap_or(rest.len());
    match rest[..authority_end].rfind('@') {
        Some(at) => {
            let user = rest[..at].split(':').next().unwrap_or_default();
            format!("{scheme}://{user}:***@{}", &rest[at + 1..])
        }
        None => uri.to_string(),
    }
}
