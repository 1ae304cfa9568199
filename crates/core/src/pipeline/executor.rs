//! Generator run: sample, infer, relate, render, write

use std::path::PathBuf;
use std::time::Instant;

use chrono::Utc;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use super::config::{GeneratorConfig, Granularity, RendererKind, SourceKind};
use super::error::{PipelineError, PipelineResult};
use super::report::{FailedDiagram, RunReport, SkippedCollection};
use crate::diagram::{DiagramAssembler, DiagramRenderer, DiagramSpec, MermaidRenderer, NameScope};
use crate::inference::{CollectionSchema, SchemaBuilder};
use crate::llm::{
    AnthropicClient, DEFAULT_ANTHROPIC_MODEL, DEFAULT_OLLAMA_MODEL, LlmError, LlmRenderer,
    OllamaClient,
};
use crate::relationships::{Relationship, RelationshipDetector};
use crate::source::{DocumentSource, JsonDirSource, MongoSource, Sampler, SourceError};

/// File name of the single diagram written in unified mode
pub const UNIFIED_FILE_STEM: &str = "unified_database_schema";

/// Drives one generator run over a document source
pub struct SchemaGenerator {
    config: GeneratorConfig,
    source: Box<dyn DocumentSource>,
    renderer: Box<dyn DiagramRenderer>,
}

impl SchemaGenerator {
    /// Create a generator with explicit collaborators
    pub fn new(
        config: GeneratorConfig,
        source: Box<dyn DocumentSource>,
        renderer: Box<dyn DiagramRenderer>,
    ) -> PipelineResult<Self> {
        config.validate().map_err(PipelineError::ConfigError)?;
        Ok(Self {
            config,
            source,
            renderer,
        })
    }

    /// Create a generator whose source and renderer follow the configuration
    pub async fn from_config(config: GeneratorConfig) -> PipelineResult<Self> {
        config.validate().map_err(PipelineError::ConfigError)?;
        let renderer = renderer_from_config(&config)?;
        let source = source_from_config(&config).await?;
        Self::new(config, source, renderer)
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Run the generator
    ///
    /// Collections that cannot be sampled and diagrams that cannot be
    /// rendered are recorded in the report. Only listing collections and
    /// writing output can fail the run.
    pub async fn run(&self) -> PipelineResult<RunReport> {
        let run_id = Uuid::new_v4().to_string();
        let span = info_span!("generate", run_id = %run_id, dry_run = self.config.dry_run);
        self.execute(run_id).instrument(span).await
    }

    async fn execute(&self, run_id: String) -> PipelineResult<RunReport> {
        let started_at = Utc::now();
        let start = Instant::now();

        info!(
            renderer = self.renderer.name(),
            format = %self.config.output.format,
            sample_size = self.config.schema.sample_size,
            "Starting schema generation"
        );

        let (schemas, skipped) = self.infer_schemas().await?;
        let relationships = self.detect_relationships(&schemas);

        let diagrams = self.plan_diagrams(&schemas, &relationships);
        let directory = &self.config.output.directory;
        if !self.config.dry_run && !diagrams.is_empty() {
            tokio::fs::create_dir_all(directory)
                .await
                .map_err(|e| PipelineError::io(directory, e))?;
        }

        let assembler = DiagramAssembler::new(self.renderer.as_ref())
            .with_timeout(self.config.renderer.timeout())
            .with_retry_backoff(self.config.renderer.retry_backoff());

        let mut files = Vec::new();
        let mut failed = Vec::new();
        for (file_name, spec) in diagrams {
            match assembler.assemble_spec(&spec, self.config.output.format).await {
                Ok(text) => {
                    let path = directory.join(&file_name);
                    if self.config.dry_run {
                        info!(path = %path.display(), bytes = text.len(), "Dry run, not writing");
                    } else {
                        tokio::fs::write(&path, text)
                            .await
                            .map_err(|e| PipelineError::io(&path, e))?;
                        info!(path = %path.display(), "Diagram written");
                    }
                    files.push(path);
                }
                Err(e) => {
                    error!(diagram = %file_name, attempts = e.attempts(), error = %e, "Diagram failed");
                    failed.push(FailedDiagram {
                        diagram: file_name,
                        error: e.to_string(),
                    });
                }
            }
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(
            collections = schemas.len(),
            skipped = skipped.len(),
            relationships = relationships.len(),
            failed = failed.len(),
            duration_ms,
            "Schema generation completed"
        );

        Ok(RunReport {
            run_id,
            started_at,
            succeeded: schemas.iter().map(|s| s.name().to_string()).collect(),
            skipped,
            failed,
            relationships,
            files,
            dry_run: self.config.dry_run,
            duration_ms,
        })
    }

    /// Sample and build the schema of every selected collection
    ///
    /// Returns the schemas in listing order together with the collections
    /// that were left out and why.
    pub async fn infer_schemas(
        &self,
    ) -> PipelineResult<(Vec<CollectionSchema>, Vec<SkippedCollection>)> {
        let sampler = Sampler::new(self.source.as_ref())
            .with_sample_size(self.config.schema.sample_size)
            .with_timeout(self.config.source.timeout());

        let names = sampler.list_collections().await?;
        debug!(collections = names.len(), "Collections listed");

        let builder = SchemaBuilder::with_config(self.config.inference_config());
        let filter = self.config.field_filter();

        let mut schemas = Vec::new();
        let mut skipped = Vec::new();
        for name in names {
            if !self.config.wants_collection(&name) {
                debug!(collection = %name, "Collection filtered out");
                continue;
            }

            let span = info_span!("collection", collection = %name);
            let documents = match sampler.sample(&name).instrument(span).await {
                Ok(documents) => documents,
                Err(e) => {
                    skipped.push(SkippedCollection {
                        collection: name,
                        reason: e.reason(),
                    });
                    continue;
                }
            };

            let schema = builder.build(&name, &documents, &filter);
            if schema.is_empty() {
                warn!(
                    collection = %name,
                    documents = documents.len(),
                    "No fields found, skipping collection"
                );
                skipped.push(SkippedCollection {
                    collection: name,
                    reason: "no fields".to_string(),
                });
                continue;
            }

            info!(
                collection = %name,
                documents = documents.len(),
                fields = schema.len(),
                "Schema inferred"
            );
            schemas.push(schema);
        }

        Ok((schemas, skipped))
    }

    /// Detect relationships between the built schemas
    pub fn detect_relationships(&self, schemas: &[CollectionSchema]) -> Vec<Relationship> {
        RelationshipDetector::new()
            .with_value_overlap(self.config.relationships.value_overlap)
            .detect(schemas)
    }

    /// Output file names and the spec drawn into each
    ///
    /// Nothing is planned when no collection produced a schema. Collection
    /// names that map to the same file name (ignoring case) get a numeric
    /// suffix.
    fn plan_diagrams(
        &self,
        schemas: &[CollectionSchema],
        relationships: &[Relationship],
    ) -> Vec<(String, DiagramSpec)> {
        if schemas.is_empty() {
            warn!("No collection produced a schema, no diagram to write");
            return Vec::new();
        }

        let extension = self.config.output.format.extension();
        let spec = DiagramSpec::new(schemas, relationships);

        match self.config.output.granularity {
            Granularity::Unified => vec![(format!("{UNIFIED_FILE_STEM}.{extension}"), spec)],
            Granularity::PerCollection => {
                let mut stems = NameScope::ignoring_case();
                schemas
                    .iter()
                    .filter_map(|schema| {
                        let sub = spec.for_collection(schema.name())?;
                        let stem = stems.claim(file_stem(schema.name()));
                        if stem != file_stem(schema.name()) {
                            warn!(collection = schema.name(), file = %stem, "File name already taken, using a suffix");
                        }
                        Some((format!("{stem}.{extension}"), sub))
                    })
                    .collect()
            }
        }
    }
}

/// Collection name made safe for use as a file name
fn file_stem(collection: &str) -> String {
    collection
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Open the document source named by the configuration
pub async fn source_from_config(
    config: &GeneratorConfig,
) -> PipelineResult<Box<dyn DocumentSource>> {
    match config.source.kind {
        SourceKind::JsonDir => {
            let path: PathBuf = config.source.path.clone().ok_or_else(|| {
                PipelineError::ConfigError("source.path is required for the json-dir source".into())
            })?;
            Ok(Box::new(JsonDirSource::new(path)))
        }
        SourceKind::Mongodb => {
            let uri = config.mongodb.resolved_uri();
            let source = MongoSource::connect(&uri, config.mongodb.database.clone())
                .await
                .map_err(|e| match e {
                    SourceError::ListFailed(_) => PipelineError::Source(e),
                    other => PipelineError::Source(SourceError::ListFailed(other.to_string())),
                })?;
            Ok(Box::new(source))
        }
    }
}

/// Build the renderer named by the configuration
pub fn renderer_from_config(config: &GeneratorConfig) -> PipelineResult<Box<dyn DiagramRenderer>> {
    let settings = &config.renderer;
    if settings.kind != RendererKind::Local && !cfg!(feature = "llm-online") {
        return Err(PipelineError::Renderer(LlmError::FeatureNotAvailable(
            format!("{} renderer", settings.kind),
            "llm-online".to_string(),
        )));
    }

    let renderer: Box<dyn DiagramRenderer> = match settings.kind {
        RendererKind::Local => Box::new(MermaidRenderer::new()),
        RendererKind::Anthropic => {
            let client =
                AnthropicClient::from_env(settings.model.clone())?.with_timeout(settings.timeout_secs);
            Box::new(LlmRenderer::new(client).with_name("anthropic"))
        }
        RendererKind::Ollama => {
            let model = if settings.model == DEFAULT_ANTHROPIC_MODEL {
                DEFAULT_OLLAMA_MODEL
            } else {
                settings.model.as_str()
            };
            let client = OllamaClient::new(settings.url.clone(), model)
                .with_timeout(settings.timeout_secs);
            Box::new(LlmRenderer::new(client).with_name("ollama"))
        }
    };

    info!(renderer = renderer.name(), "Renderer configured");
    Ok(renderer)
}
