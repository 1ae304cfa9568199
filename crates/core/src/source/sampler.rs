//! Bounded sampling with a timeout

use std::time::Duration;

use bson::Document;
use tracing::{debug, warn};

use super::{DocumentSource, SourceError, SourceResult};

/// Default number of documents sampled per collection
pub const DEFAULT_SAMPLE_SIZE: usize = 100;

/// Default time allowed for sampling one collection
pub const DEFAULT_SAMPLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Samples collections from a [`DocumentSource`]
pub struct Sampler<'a> {
    source: &'a dyn DocumentSource,
    sample_size: usize,
    timeout: Duration,
}

impl<'a> Sampler<'a> {
    /// Create a sampler with default size and timeout
    pub fn new(source: &'a dyn DocumentSource) -> Self {
        Self {
            source,
            sample_size: DEFAULT_SAMPLE_SIZE,
            timeout: DEFAULT_SAMPLE_TIMEOUT,
        }
    }

    /// Set the sample size (values below 1 are raised to 1)
    pub fn with_sample_size(mut self, size: usize) -> Self {
        self.sample_size = size.max(1);
        self
    }

    /// Set the per-collection timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configured sample size
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// List the source's collections
    pub async fn list_collections(&self) -> SourceResult<Vec<String>> {
        match tokio::time::timeout(self.timeout, self.source.list_collections()).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::ListFailed(format!(
                "timed out after {} seconds",
                self.timeout.as_secs()
            ))),
        }
    }

    /// Sample one collection
    ///
    /// Returns at most `sample_size` documents in source order. Every failure,
    /// including the timeout, is reported as [`SourceError::Unavailable`].
    pub async fn sample(&self, collection: &str) -> SourceResult<Vec<Document>> {
        let outcome =
            tokio::time::timeout(self.timeout, self.source.sample(collection, self.sample_size))
                .await;

        let result = match outcome {
            Ok(result) => result,
            Err(_) => Err(SourceError::Timeout {
                collection: collection.to_string(),
                seconds: self.timeout.as_secs(),
            }),
        };

        match result {
            Ok(mut documents) => {
                if documents.len() > self.sample_size {
                    debug!(
                        collection,
                        delivered = documents.len(),
                        limit = self.sample_size,
                        "Source over-delivered, truncating sample"
                    );
                    documents.truncate(self.sample_size);
                }
                Ok(documents)
            }
            Err(e) => {
                let err = e.into_unavailable(collection);
                warn!(collection, error = %err, "Collection unavailable");
                Err(err)
            }
        }
    }
}
