//! Error types for diagram rendering

use thiserror::Error;

/// Failure of a single render call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The renderer could not be reached or timed out
    #[error("Renderer unavailable: {0}")]
    Unavailable(String),

    /// The renderer answered with something that is not a usable diagram
    #[error("Renderer returned an invalid diagram: {0}")]
    Invalid(String),

    /// The renderer refused the request; repeating it cannot succeed
    #[error("Renderer rejected the request: {0}")]
    Rejected(String),
}

/// Outcome of rendering after the retry policy ran
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiagramError {
    /// Unreachable after retrying, or rejected outright
    #[error("Diagram renderer unavailable after {attempts} attempt(s): {message}")]
    RenderUnavailable { attempts: u32, message: String },

    /// Still invalid after retrying with a simplified diagram
    #[error("Diagram renderer output invalid after {attempts} attempt(s): {message}")]
    RenderInvalid { attempts: u32, message: String },
}

/// Result type for diagram assembly
pub type DiagramResult<T> = Result<T, DiagramError>;

impl DiagramError {
    /// Final error for the last failed render call
    pub fn after(attempts: u32, err: RenderError) -> Self {
        match err {
            RenderError::Unavailable(message) | RenderError::Rejected(message) => {
                DiagramError::RenderUnavailable { attempts, message }
            }
            RenderError::Invalid(message) => DiagramError::RenderInvalid { attempts, message },
        }
    }

    /// Number of render calls made
    pub fn attempts(&self) -> u32 {
        match self {
            DiagramError::RenderUnavailable { attempts, .. }
            | DiagramError::RenderInvalid { attempts, .. } => *attempts,
        }
    }
}
