//! Generator configuration types

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::{PipelineError, PipelineResult};
use crate::diagram::OutputFormat;
use crate::inference::{FieldFilter, InferenceConfig};

/// Environment variable consulted when no MongoDB URI is configured
pub const MONGODB_URI_VAR: &str = "MONGODB_URI";

/// URI used when neither the configuration nor the environment names one
pub const DEFAULT_MONGODB_URI: &str = "mongodb://localhost:27017";

/// Main generator configuration
///
/// Every key has a default, so an empty YAML document is a valid
/// configuration for the local renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub mongodb: MongoConfig,
    pub source: SourceConfig,
    pub schema: SchemaConfig,
    pub relationships: RelationshipConfig,
    pub renderer: RendererConfig,
    pub output: OutputConfig,
    /// Run everything except writing files
    #[serde(skip)]
    pub dry_run: bool,
}

impl GeneratorConfig {
    /// Create a config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a YAML configuration file
    pub fn load(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| PipelineError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text).map_err(|source| PipelineError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse a YAML configuration
    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Read documents from a directory of JSON files
    pub fn with_json_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.source.kind = SourceKind::JsonDir;
        self.source.path = Some(path.into());
        self
    }

    /// Set the output directory
    pub fn with_output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output.directory = path.into();
        self
    }

    /// Set the output format
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.output.format = format;
        self
    }

    /// Set the number of documents sampled per collection
    pub fn with_sample_size(mut self, size: usize) -> Self {
        self.schema.sample_size = size;
        self
    }

    /// Enable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.schema.sample_size == 0 {
            return Err("schema.sample_size must be greater than 0".to_string());
        }

        if self.output.directory.as_os_str().is_empty() {
            return Err("output.directory must not be empty".to_string());
        }

        match self.source.kind {
            SourceKind::Mongodb if self.mongodb.database.trim().is_empty() => {
                return Err("mongodb.database is required for the mongodb source".to_string());
            }
            SourceKind::JsonDir if self.source.path.is_none() => {
                return Err("source.path is required for the json-dir source".to_string());
            }
            _ => {}
        }

        if self.source.timeout_secs == 0 || self.renderer.timeout_secs == 0 {
            return Err("timeouts must be at least one second".to_string());
        }

        if self.renderer.kind == RendererKind::Ollama && self.renderer.url.trim().is_empty() {
            return Err("renderer.url is required for the ollama renderer".to_string());
        }

        Ok(())
    }

    /// Field filter built from the include and exclude lists
    pub fn field_filter(&self) -> FieldFilter {
        FieldFilter::from_lists(
            self.schema.include_fields.clone(),
            self.schema.exclude_fields.clone(),
        )
    }

    /// Options for the schema builder
    pub fn inference_config(&self) -> InferenceConfig {
        InferenceConfig::builder()
            .detect_formats(self.schema.detect_formats)
            .include_id(self.schema.include_id)
            .max_examples(self.schema.max_examples)
            .build()
    }

    /// Check whether a collection passes the collection filters
    pub fn wants_collection(&self, name: &str) -> bool {
        let included =
            self.schema.collections.is_empty() || self.schema.collections.iter().any(|c| c == name);
        included && !self.schema.exclude_collections.iter().any(|c| c == name)
    }
}

/// MongoDB connection settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MongoConfig {
    /// Connection string; falls back to `MONGODB_URI`
    pub uri: Option<String>,
    /// Database to sample
    pub database: String,
}

impl MongoConfig {
    /// Connection string from the config, the environment, or the default
    pub fn resolved_uri(&self) -> String {
        self.uri
            .clone()
            .or_else(|| std::env::var(MONGODB_URI_VAR).ok())
            .filter(|uri| !uri.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MONGODB_URI.to_string())
    }
}

/// Where documents come from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    #[default]
    Mongodb,
    /// Directory of `<collection>.json` / `<collection>.jsonl` files
    JsonDir,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,
    pub path: Option<PathBuf>,
    /// Time allowed for sampling one collection
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Mongodb,
            path: None,
            timeout_secs: 30,
        }
    }
}

impl SourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Sampling and inference settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    pub sample_size: usize,
    pub include_fields: Vec<String>,
    pub exclude_fields: Vec<String>,
    pub include_id: bool,
    /// Only these collections, when non-empty
    pub collections: Vec<String>,
    pub exclude_collections: Vec<String>,
    pub detect_formats: bool,
    pub max_examples: usize,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            sample_size: 100,
            include_fields: Vec::new(),
            exclude_fields: Vec::new(),
            include_id: false,
            collections: Vec::new(),
            exclude_collections: Vec::new(),
            detect_formats: true,
            max_examples: 20,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationshipConfig {
    /// Break ambiguous matches by comparing sampled values
    pub value_overlap: bool,
}

/// Which renderer draws the diagram
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    #[default]
    Local,
    Anthropic,
    Ollama,
}

impl std::fmt::Display for RendererKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RendererKind::Local => write!(f, "local"),
            RendererKind::Anthropic => write!(f, "anthropic"),
            RendererKind::Ollama => write!(f, "ollama"),
        }
    }
}

impl std::str::FromStr for RendererKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "ollama" => Ok(Self::Ollama),
            _ => Err(format!("Unknown renderer: {s}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub kind: RendererKind,
    pub model: String,
    /// Ollama endpoint
    pub url: String,
    pub timeout_secs: u64,
    pub retry_backoff_ms: u64,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            kind: RendererKind::Local,
            model: crate::llm::DEFAULT_ANTHROPIC_MODEL.to_string(),
            url: crate::llm::DEFAULT_OLLAMA_URL.to_string(),
            timeout_secs: 120,
            retry_backoff_ms: 500,
        }
    }
}

impl RendererConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

/// One diagram for the database or one per collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Granularity {
    #[default]
    Unified,
    PerCollection,
}

impl std::str::FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unified" => Ok(Self::Unified),
            "per-collection" | "per_collection" | "collection" => Ok(Self::PerCollection),
            _ => Err(format!(
                "Unknown granularity '{s}', expected 'unified' or 'per-collection'"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub directory: PathBuf,
    pub granularity: Granularity,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Md,
            directory: PathBuf::from("output"),
            granularity: Granularity::Unified,
        }
    }
}
