//! CLI command implementations

pub mod generate;
pub mod infer;
pub mod relationships;

use std::path::PathBuf;

use clap::Args;
use docschema_core::pipeline::GeneratorConfig;

use crate::error::CliError;

pub use generate::GenerateArgs;
pub use infer::InferArgs;
pub use relationships::RelationshipsArgs;

/// Where documents come from and how many to sample
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Configuration file (YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Read collections from a directory of .json/.jsonl files instead of MongoDB
    #[arg(long, conflicts_with_all = ["uri", "database"])]
    pub input_dir: Option<PathBuf>,

    /// MongoDB connection string (default: $MONGODB_URI)
    #[arg(long)]
    pub uri: Option<String>,

    /// MongoDB database to sample
    #[arg(short, long)]
    pub database: Option<String>,

    /// Documents sampled per collection
    #[arg(short = 'n', long)]
    pub sample_size: Option<usize>,

    /// Only these collections (repeatable)
    #[arg(long = "collection")]
    pub collections: Vec<String>,

    /// Skip these collections (repeatable)
    #[arg(long = "exclude-collection")]
    pub exclude_collections: Vec<String>,

    /// Keep only these field paths, their children and ancestors (repeatable)
    #[arg(long = "include-field")]
    pub include_fields: Vec<String>,

    /// Drop these field paths and their children (repeatable)
    #[arg(long = "exclude-field")]
    pub exclude_fields: Vec<String>,
}

impl SourceArgs {
    /// Load the configuration file, if any, and apply the overrides
    pub fn load_config(&self) -> Result<GeneratorConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => GeneratorConfig::load(path)?,
            None => GeneratorConfig::default(),
        };

        if let Some(dir) = &self.input_dir {
            config = config.with_json_dir(dir);
        }
        if let Some(uri) = &self.uri {
            config.mongodb.uri = Some(uri.clone());
        }
        if let Some(database) = &self.database {
            config.mongodb.database = database.clone();
        }
        if let Some(size) = self.sample_size {
            config = config.with_sample_size(size);
        }
        if !self.collections.is_empty() {
            config.schema.collections = self.collections.clone();
        }
        config
            .schema
            .exclude_collections
            .extend(self.exclude_collections.iter().cloned());
        config
            .schema
            .include_fields
            .extend(self.include_fields.iter().cloned());
        config
            .schema
            .exclude_fields
            .extend(self.exclude_fields.iter().cloned());

        Ok(config)
    }
}
