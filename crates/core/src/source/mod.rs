//! Document sources
//!
//! A [`DocumentSource`] lists collections and hands out raw documents. The
//! [`Sampler`] wraps a source with the configured sample size and timeout so
//! the rest of the pipeline sees a bounded, order-stable sample or a
//! per-collection `Unavailable` error.
//!
//! # Feature Flags
//!
//! - `mongodb`: Enable [`MongoSource`] for sampling a live deployment

pub mod error;
pub mod json_dir;
pub mod memory;
pub mod mongo;
pub mod sampler;

use async_trait::async_trait;
use bson::Document;

pub use error::{SourceError, SourceResult};
pub use json_dir::JsonDirSource;
pub use memory::MemorySource;
pub use mongo::MongoSource;
pub use sampler::Sampler;

/// Database layer collaborator
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Names of the collections available for sampling
    async fn list_collections(&self) -> SourceResult<Vec<String>>;

    /// Up to `limit` documents of a collection
    ///
    /// Implementations choose the sampling strategy; the order of the
    /// returned documents is kept as-is.
    async fn sample(&self, collection: &str, limit: usize) -> SourceResult<Vec<Document>>;
}
