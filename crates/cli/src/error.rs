//! CLI error type

use docschema_core::pipeline::PipelineError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Pipeline(#[from] PipelineError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to write output: {0}")]
    Output(String),

    /// The run finished but left collections or diagrams out
    #[error("Run incomplete: {skipped} collection(s) skipped, {failed} diagram(s) failed")]
    Incomplete { skipped: usize, failed: usize },
}

impl CliError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Incomplete { .. } => 2,
            _ => 1,
        }
    }

    /// Message shown to the user, with hints where available
    pub fn user_message(&self) -> String {
        match self {
            CliError::Pipeline(err) => err.user_message(),
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Output(err.to_string())
    }
}
