//! Error types for document sources

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while listing or sampling collections
#[derive(Error, Debug)]
pub enum SourceError {
    /// A single collection could not be read
    #[error("Collection '{collection}' unavailable: {reason}")]
    Unavailable { collection: String, reason: String },

    /// Sampling did not finish in time
    #[error("Sampling '{collection}' timed out after {seconds} seconds")]
    Timeout { collection: String, seconds: u64 },

    /// Collection names could not be listed
    #[error("Failed to list collections: {0}")]
    ListFailed(String),

    /// IO error with path context
    #[error("IO error with {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A document could not be decoded
    #[error("Failed to parse documents of '{collection}': {message}")]
    Parse { collection: String, message: String },
}

/// Result type for document source operations
pub type SourceResult<T> = Result<T, SourceError>;

impl SourceError {
    /// Create an unavailable error for a collection
    pub fn unavailable(collection: impl Into<String>, reason: impl Into<String>) -> Self {
        SourceError::Unavailable {
            collection: collection.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error only affects one collection
    ///
    /// Such errors skip the collection instead of aborting a run.
    pub fn is_unavailable(&self) -> bool {
        !matches!(self, SourceError::ListFailed(_))
    }

    /// Convert any per-collection failure into `Unavailable`
    pub fn into_unavailable(self, collection: &str) -> Self {
        match self {
            SourceError::Unavailable { .. } => self,
            other => SourceError::unavailable(collection, other.to_string()),
        }
    }

    /// The reason reported for a skipped collection
    pub fn reason(&self) -> String {
        match self {
            SourceError::Unavailable { reason, .. } => reason.clone(),
            other => other.to_string(),
        }
    }
}
