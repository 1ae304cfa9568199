//! Integration tests for the generator
//!
//! Tests the complete workflow: sample → infer → relate → render → write

use std::sync::Mutex;

use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{Document, doc};
use tempfile::TempDir;

use docschema_core::diagram::{
    DiagramAssembler, DiagramRenderer, DiagramSpec, MermaidRenderer, OutputFormat, RenderError,
};
use docschema_core::inference::{FieldFilter, SchemaBuilder};
use docschema_core::pipeline::{GeneratorConfig, SchemaGenerator};
use docschema_core::relationships::{RelationshipDetector, RelationshipKind};
use docschema_core::source::{DocumentSource, MemorySource, SourceError, SourceResult};

fn users() -> Vec<Document> {
    vec![
        doc! { "_id": ObjectId::new(), "name": "Ann", "email": "ann@example.com", "manager_id": ObjectId::new() },
        doc! { "_id": ObjectId::new(), "name": "Bob", "email": "bob@example.com", "manager_id": ObjectId::new() },
    ]
}

fn managers() -> Vec<Document> {
    vec![doc! { "_id": ObjectId::new(), "name": "Eve" }]
}

fn memory_source() -> MemorySource {
    MemorySource::new()
        .with_collection("users", users())
        .with_collection("managers", managers())
}

fn config(dir: &TempDir) -> GeneratorConfig {
    let mut config = GeneratorConfig::default().with_output_dir(dir.path().join("out"));
    config.mongodb.database = "company".to_string();
    config.renderer.retry_backoff_ms = 1;
    config
}

/// Delegates to a memory source but fails one collection
struct PartlyBrokenSource {
    inner: MemorySource,
    broken: &'static str,
}

#[async_trait]
impl DocumentSource for PartlyBrokenSource {
    async fn list_collections(&self) -> SourceResult<Vec<String>> {
        let mut names = self.inner.list_collections().await?;
        names.insert(0, self.broken.to_string());
        Ok(names)
    }

    async fn sample(&self, collection: &str, limit: usize) -> SourceResult<Vec<Document>> {
        if collection == self.broken {
            return Err(SourceError::unavailable(collection, "not authorized"));
        }
        self.inner.sample(collection, limit).await
    }
}

/// Fails with the scripted errors, then renders locally
struct ScriptedRenderer {
    failures: Mutex<Vec<RenderError>>,
    seen: Mutex<Vec<DiagramSpec>>,
}

impl ScriptedRenderer {
    fn new(mut failures: Vec<RenderError>) -> Self {
        failures.reverse();
        Self {
            failures: Mutex::new(failures),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl DiagramRenderer for ScriptedRenderer {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn render(&self, spec: &DiagramSpec) -> Result<String, RenderError> {
        self.seen.lock().unwrap().push(spec.clone());
        match self.failures.lock().unwrap().pop() {
            Some(err) => Err(err),
            None => Ok(MermaidRenderer.render_text(spec)),
        }
    }
}

#[async_trait]
impl DiagramRenderer for &'static ScriptedRenderer {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn render(&self, spec: &DiagramSpec) -> Result<String, RenderError> {
        (**self).render(spec).await
    }
}

fn leak(renderer: ScriptedRenderer) -> &'static ScriptedRenderer {
    Box::leak(Box::new(renderer))
}

#[tokio::test]
async fn test_users_and_managers_spec() {
    let builder = SchemaBuilder::new();
    let filter = FieldFilter::new();
    let schemas = vec![
        builder.build("users", &users(), &filter),
        builder.build("managers", &managers(), &filter),
    ];
    let relationships = RelationshipDetector::new().detect(&schemas);
    let spec = DiagramSpec::new(&schemas, &relationships);

    assert_eq!(spec.nodes.len(), 2);
    assert_eq!(spec.edges.len(), 1);
    let edge = &spec.edges[0];
    assert_eq!(
        (edge.source.as_str(), edge.field.as_str(), edge.target.as_str()),
        ("users", "manager_id", "managers")
    );
    assert_eq!(relationships[0].kind, RelationshipKind::NamingConvention);
}

#[tokio::test]
async fn test_mermaid_output_is_raw_diagram() {
    let temp = TempDir::new().unwrap();
    let generator = SchemaGenerator::new(
        config(&temp).with_format(OutputFormat::Mermaid),
        Box::new(memory_source()),
        Box::new(MermaidRenderer::new()),
    )
    .unwrap();

    let report = generator.run().await.unwrap();
    assert!(report.is_success());

    let path = temp.path().join("out").join("unified_database_schema.mmd");
    let text = std::fs::read_to_string(path).unwrap();
    assert!(text.starts_with("erDiagram\n"));
    assert!(!text.contains('#'));
    assert!(!text.contains("```"));
    assert!(text.contains("    users {\n"));
    assert!(text.contains("    managers {\n"));
    assert!(text.contains("users ||--o{ managers : \"manager_id\""));
}

#[tokio::test]
async fn test_md_output_has_headings_then_fence() {
    let temp = TempDir::new().unwrap();
    let generator = SchemaGenerator::new(
        config(&temp),
        Box::new(memory_source()),
        Box::new(MermaidRenderer::new()),
    )
    .unwrap();

    generator.run().await.unwrap();

    let path = temp.path().join("out").join("unified_database_schema.md");
    let text = std::fs::read_to_string(path).unwrap();
    let users = text.find("## users").unwrap();
    let managers = text.find("## managers").unwrap();
    let fence = text.find("```mermaid\nerDiagram").unwrap();
    assert!(users < fence && managers < fence);
    assert!(text.trim_end().ends_with("```"));
}

#[tokio::test]
async fn test_unavailable_collection_is_skipped() {
    let temp = TempDir::new().unwrap();
    let source = PartlyBrokenSource {
        inner: memory_source(),
        broken: "audit_log",
    };
    let generator = SchemaGenerator::new(
        config(&temp).with_format(OutputFormat::Mermaid),
        Box::new(source),
        Box::new(MermaidRenderer::new()),
    )
    .unwrap();

    let report = generator.run().await.unwrap();
    assert!(!report.is_success());
    assert_eq!(report.succeeded, vec!["users", "managers"]);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].collection, "audit_log");
    assert!(report.skipped[0].reason.contains("not authorized"));

    let text = std::fs::read_to_string(&report.files[0]).unwrap();
    assert!(text.contains("users {"));
    assert!(!text.contains("audit_log"));
}

#[tokio::test]
async fn test_retry_after_unavailable_is_transparent() {
    let temp = TempDir::new().unwrap();
    let direct = SchemaGenerator::new(
        config(&temp),
        Box::new(memory_source()),
        Box::new(MermaidRenderer::new()),
    )
    .unwrap();
    let schemas = direct.infer_schemas().await.unwrap().0;
    let relationships = direct.detect_relationships(&schemas);

    let renderer = ScriptedRenderer::new(vec![]);
    let expected = DiagramAssembler::new(&renderer)
        .assemble(&schemas, &relationships, OutputFormat::Md)
        .await
        .unwrap();

    let flaky = leak(ScriptedRenderer::new(vec![RenderError::Unavailable(
        "connection reset".to_string(),
    )]));
    let generator =
        SchemaGenerator::new(config(&temp), Box::new(memory_source()), Box::new(flaky)).unwrap();
    let report = generator.run().await.unwrap();

    assert!(report.is_success());
    assert_eq!(flaky.calls(), 2);
    let written = std::fs::read_to_string(&report.files[0]).unwrap();
    assert_eq!(written, expected);
}

#[tokio::test]
async fn test_invalid_output_retries_without_relationships() {
    let temp = TempDir::new().unwrap();
    let renderer = leak(ScriptedRenderer::new(vec![RenderError::Invalid(
        "unbalanced braces".to_string(),
    )]));
    let generator = SchemaGenerator::new(
        config(&temp).with_format(OutputFormat::Mermaid),
        Box::new(memory_source()),
        Box::new(renderer),
    )
    .unwrap();

    let report = generator.run().await.unwrap();
    assert!(report.is_success());

    let seen = renderer.seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].edges.len(), 1);
    assert!(seen[1].edges.is_empty());

    let text = std::fs::read_to_string(&report.files[0]).unwrap();
    assert!(text.contains("users {"));
    assert!(!text.contains("||--o{"));
}

#[tokio::test]
async fn test_render_failure_is_recorded_not_fatal() {
    let temp = TempDir::new().unwrap();
    let renderer = leak(ScriptedRenderer::new(vec![
        RenderError::Unavailable("down".to_string()),
        RenderError::Unavailable("still down".to_string()),
    ]));
    let generator = SchemaGenerator::new(
        config(&temp),
        Box::new(memory_source()),
        Box::new(renderer),
    )
    .unwrap();

    let report = generator.run().await.unwrap();
    assert_eq!(report.succeeded.len(), 2);
    assert!(report.files.is_empty());
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].diagram, "unified_database_schema.md");
    assert!(report.failed[0].error.contains("still down"));
}

#[tokio::test]
async fn test_listing_failure_is_fatal() {
    let temp = TempDir::new().unwrap();
    let generator = SchemaGenerator::new(
        config(&temp).with_json_dir(temp.path().join("missing")),
        Box::new(docschema_core::source::JsonDirSource::new(temp.path().join("missing"))),
        Box::new(MermaidRenderer::new()),
    )
    .unwrap();

    let err = generator.run().await.unwrap_err();
    assert!(matches!(
        err,
        docschema_core::pipeline::PipelineError::Source(SourceError::ListFailed(_))
    ));
}
