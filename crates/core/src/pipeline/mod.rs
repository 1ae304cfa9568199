//! End-to-end schema generation
//!
//! This module ties the pieces together:
//! - List and sample collections from a [`DocumentSource`](crate::source::DocumentSource)
//! - Build one [`CollectionSchema`](crate::inference::CollectionSchema) per collection
//! - Detect relationships across all schemas
//! - Render and write the diagram file(s)
//!
//! # Example
//!
//! ```rust,ignore
//! use docschema_core::pipeline::{GeneratorConfig, SchemaGenerator};
//!
//! let config = GeneratorConfig::load("docschema.yaml")?;
//! let generator = SchemaGenerator::from_config(config).await?;
//! let report = generator.run().await?;
//!
//! for skipped in &report.skipped {
//!     eprintln!("{}: {}", skipped.collection, skipped.reason);
//! }
//! ```
//!
//! # Partial success
//!
//! A collection that cannot be sampled is skipped and the run continues;
//! a diagram that cannot be rendered after the retry is recorded as
//! failed. Only configuration problems, listing collections and writing
//! output abort a run.
//!
//! # Dry Run
//!
//! With `dry_run` set everything runs, including rendering, but no files
//! are written. The report lists the files that would have been written.

mod config;
mod error;
mod executor;
mod report;

pub use config::{
    DEFAULT_MONGODB_URI, GeneratorConfig, Granularity, MONGODB_URI_VAR, MongoConfig, OutputConfig,
    RelationshipConfig, RendererConfig, RendererKind, SchemaConfig, SourceConfig, SourceKind,
};
pub use error::{PipelineError, PipelineResult};
pub use executor::{SchemaGenerator, UNIFIED_FILE_STEM, renderer_from_config, source_from_config};
pub use report::{FailedDiagram, RunReport, SkippedCollection};

/// Run a generator with the given configuration
///
/// This is a convenience function for simple runs.
pub async fn generate(config: GeneratorConfig) -> PipelineResult<RunReport> {
    let generator = SchemaGenerator::from_config(config).await?;
    generator.run().await
}
