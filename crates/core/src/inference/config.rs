//! Configuration for schema inference

use serde::{Deserialize, Serialize};

/// Configuration for the schema builder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceConfig {
    /// Enable format detection (date, uuid, email, etc.)
    pub detect_formats: bool,

    /// Emit the top-level `_id` as a regular field
    ///
    /// Its values are collected as collection identifiers either way.
    pub include_id: bool,

    /// Maximum number of identifier-like examples kept per field
    pub max_examples: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            detect_formats: true,
            include_id: false,
            max_examples: 20,
        }
    }
}

impl InferenceConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for custom configuration
    pub fn builder() -> InferenceConfigBuilder {
        InferenceConfigBuilder::default()
    }
}

/// Builder for InferenceConfig
#[derive(Debug, Default)]
pub struct InferenceConfigBuilder {
    config: InferenceConfig,
}

impl InferenceConfigBuilder {
    /// Enable or disable format detection
    pub fn detect_formats(mut self, detect: bool) -> Self {
        self.config.detect_formats = detect;
        self
    }

    /// Emit or skip the top-level `_id` field
    pub fn include_id(mut self, include: bool) -> Self {
        self.config.include_id = include;
        self
    }

    /// Set the maximum number of examples per field
    pub fn max_examples(mut self, max: usize) -> Self {
        self.config.max_examples = max;
        self
    }

    /// Build the configuration
    pub fn build(self) -> InferenceConfig {
        self.config
    }
}
