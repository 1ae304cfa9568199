//! Error types for generator runs
//!
//! Only failures that stop the whole run are errors here. A collection
//! that cannot be sampled or a diagram that cannot be rendered is recorded
//! in the [`RunReport`](super::RunReport) instead.

use std::path::PathBuf;
use thiserror::Error;

use crate::llm::LlmError;
use crate::source::SourceError;

/// Errors that abort a generator run
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Configuration failed validation
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Configuration file could not be read
    #[error("Failed to read configuration {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid YAML for this schema
    #[error("Failed to parse configuration {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The document source could not be listed or opened
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Output could not be written
    #[error("IO error with {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configured renderer could not be constructed
    #[error("Renderer error: {0}")]
    Renderer(#[from] LlmError),
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

impl PipelineError {
    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Get a user-friendly error message for CLI output
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::ConfigError(msg) => {
                format!("Configuration error: {msg}\n\nHint: Check your configuration file.")
            }
            PipelineError::ConfigRead { path, .. } => {
                format!(
                    "{self}\n\nHint: Check that {} exists and is readable.",
                    path.display()
                )
            }
            PipelineError::Source(SourceError::ListFailed(msg)) => {
                format!(
                    "Cannot list collections: {msg}\n\n\
                    Hint: Check mongodb.uri (or MONGODB_URI) and that the server is reachable."
                )
            }
            PipelineError::Renderer(err) => err.user_message(),
            _ => self.to_string(),
        }
    }
}
