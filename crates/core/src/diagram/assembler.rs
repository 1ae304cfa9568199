//! Diagram assembly with bounded retries

use std::time::Duration;

use tracing::{debug, warn};

use super::error::{DiagramError, DiagramResult, RenderError};
use super::format::OutputFormat;
use super::renderer::DiagramRenderer;
use super::spec::DiagramSpec;
use super::validate::check_diagram;
use crate::inference::CollectionSchema;
use crate::relationships::Relationship;

/// Default time allowed for one render call
pub const DEFAULT_RENDER_TIMEOUT: Duration = Duration::from_secs(120);

/// Default pause before retrying an unavailable renderer
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// Renders and wraps diagrams
///
/// Each render call is bounded by a timeout and its output is sanity
/// checked. A failed call is retried once:
/// - unavailable: same spec again after a backoff
/// - invalid: the spec without relationships
///
/// A rejected call is final.
pub struct DiagramAssembler<'a> {
    renderer: &'a dyn DiagramRenderer,
    timeout: Duration,
    retry_backoff: Duration,
}

impl<'a> DiagramAssembler<'a> {
    /// Create an assembler with default timeout and backoff
    pub fn new(renderer: &'a dyn DiagramRenderer) -> Self {
        Self {
            renderer,
            timeout: DEFAULT_RENDER_TIMEOUT,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }

    /// Set the per-call timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the pause before retrying an unavailable renderer
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Build, render and wrap the diagram of `schemas`
    pub async fn assemble(
        &self,
        schemas: &[CollectionSchema],
        relationships: &[Relationship],
        format: OutputFormat,
    ) -> DiagramResult<String> {
        let spec = DiagramSpec::new(schemas, relationships);
        self.assemble_spec(&spec, format).await
    }

    /// Render and wrap an existing spec
    pub async fn assemble_spec(
        &self,
        spec: &DiagramSpec,
        format: OutputFormat,
    ) -> DiagramResult<String> {
        let diagram = self.render(spec).await?;
        Ok(format.wrap(spec, &diagram))
    }

    /// Render a spec, applying the retry policy
    pub async fn render(&self, spec: &DiagramSpec) -> DiagramResult<String> {
        let err = match self.attempt(spec).await {
            Ok(diagram) => return Ok(diagram),
            Err(err) => err,
        };

        let retried = match &err {
            RenderError::Unavailable(reason) => {
                warn!(
                    renderer = self.renderer.name(),
                    reason = %reason,
                    backoff_ms = self.retry_backoff.as_millis() as u64,
                    "Renderer unavailable, retrying"
                );
                tokio::time::sleep(self.retry_backoff).await;
                self.attempt(spec).await
            }
            RenderError::Invalid(reason) => {
                warn!(
                    renderer = self.renderer.name(),
                    reason = %reason,
                    "Renderer output invalid, retrying without relationships"
                );
                self.attempt(&spec.without_edges()).await
            }
            RenderError::Rejected(reason) => {
                warn!(
                    renderer = self.renderer.name(),
                    reason = %reason,
                    "Renderer rejected the request, not retrying"
                );
                return Err(DiagramError::after(1, err.clone()));
            }
        };

        retried.map_err(|e| DiagramError::after(2, e))
    }

    async fn attempt(&self, spec: &DiagramSpec) -> Result<String, RenderError> {
        debug!(
            renderer = self.renderer.name(),
            nodes = spec.nodes.len(),
            edges = spec.edges.len(),
            "Rendering diagram"
        );

        let text = match tokio::time::timeout(self.timeout, self.renderer.render(spec)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(RenderError::Unavailable(format!(
                    "timed out after {} seconds",
                    self.timeout.as_secs()
                )));
            }
        };

        check_diagram(&text, spec.nodes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::MermaidRenderer;
    use crate::inference::{FieldFilter, SchemaBuilder};
    use crate::relationships::RelationshipDetector;
    use async_trait::async_trait;
    use bson::doc;
    use bson::oid::ObjectId;
    use std::sync::Mutex;

    /// Replays scripted results and records the specs it was given
    struct ScriptedRenderer {
        script: Mutex<Vec<Result<String, RenderError>>>,
        seen: Mutex<Vec<DiagramSpec>>,
    }

    impl ScriptedRenderer {
        fn new(mut script: Vec<Result<String, RenderError>>) -> Self {
            script.reverse();
            Self {
                script: Mutex::new(script),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn seen(&self) -> Vec<DiagramSpec> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DiagramRenderer for ScriptedRenderer {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn render(&self, spec: &DiagramSpec) -> Result<String, RenderError> {
            self.seen.lock().unwrap().push(spec.clone());
            match self.script.lock().unwrap().pop() {
                Some(Ok(text)) if text.is_empty() => Ok(MermaidRenderer.render_text(spec)),
                Some(result) => result,
                None => Err(RenderError::Unavailable("script exhausted".to_string())),
            }
        }
    }

    struct HangingRenderer;

    #[async_trait]
    impl DiagramRenderer for HangingRenderer {
        fn name(&self) -> &str {
            "hanging"
        }

        async fn render(&self, _spec: &DiagramSpec) -> Result<String, RenderError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(String::new())
        }
    }

    fn fixture() -> (Vec<CollectionSchema>, Vec<Relationship>) {
        let builder = SchemaBuilder::new();
        let schemas = vec![
            builder.build(
                "users",
                &[doc! { "name": "a", "manager_id": ObjectId::new() }],
                &FieldFilter::new(),
            ),
            builder.build("managers", &[doc! { "name": "m" }], &FieldFilter::new()),
        ];
        let relationships = RelationshipDetector::new().detect(&schemas);
        (schemas, relationships)
    }

    /// Empty scripted text means "render locally"
    fn local() -> Result<String, RenderError> {
        Ok(String::new())
    }

    #[tokio::test]
    async fn test_immediate_success() {
        let (schemas, relationships) = fixture();
        let renderer = ScriptedRenderer::new(vec![local()]);
        let out = DiagramAssembler::new(&renderer)
            .assemble(&schemas, &relationships, OutputFormat::Mermaid)
            .await
            .unwrap();

        assert!(out.starts_with("erDiagram\n"));
        assert!(out.contains("users ||--o{ managers"));
        assert_eq!(renderer.seen().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unavailable_retry_is_transparent() {
        let (schemas, relationships) = fixture();

        let direct = ScriptedRenderer::new(vec![local()]);
        let expected = DiagramAssembler::new(&direct)
            .assemble(&schemas, &relationships, OutputFormat::Md)
            .await
            .unwrap();

        let flaky = ScriptedRenderer::new(vec![
            Err(RenderError::Unavailable("connection refused".to_string())),
            local(),
        ]);
        let retried = DiagramAssembler::new(&flaky)
            .assemble(&schemas, &relationships, OutputFormat::Md)
            .await
            .unwrap();

        assert_eq!(retried, expected);
        let seen = flaky.seen();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], seen[1]);
    }

    #[tokio::test]
    async fn test_invalid_retries_without_edges() {
        let (schemas, relationships) = fixture();
        let renderer = ScriptedRenderer::new(vec![Ok("I cannot draw that".to_string()), local()]);

        let out = DiagramAssembler::new(&renderer)
            .assemble(&schemas, &relationships, OutputFormat::Mermaid)
            .await
            .unwrap();

        let seen = renderer.seen();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].edges.len(), 1);
        assert!(seen[1].edges.is_empty());
        assert!(!out.contains("||--o{"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_two_attempts() {
        let (schemas, relationships) = fixture();
        let renderer = ScriptedRenderer::new(vec![
            Err(RenderError::Unavailable("down".to_string())),
            Err(RenderError::Unavailable("still down".to_string())),
            local(),
        ]);

        let err = DiagramAssembler::new(&renderer)
            .assemble(&schemas, &relationships, OutputFormat::Md)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            DiagramError::RenderUnavailable {
                attempts: 2,
                message: "still down".to_string()
            }
        );
        assert_eq!(renderer.seen().len(), 2);
    }

    #[tokio::test]
    async fn test_rejected_is_not_retried() {
        let (schemas, relationships) = fixture();
        let renderer = ScriptedRenderer::new(vec![
            Err(RenderError::Rejected("HTTP 401: invalid x-api-key".to_string())),
            local(),
        ]);

        let err = DiagramAssembler::new(&renderer)
            .assemble(&schemas, &relationships, OutputFormat::Md)
            .await
            .unwrap_err();

        assert_eq!(err.attempts(), 1);
        assert!(matches!(err, DiagramError::RenderUnavailable { .. }));
        assert_eq!(renderer.seen().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_twice() {
        let (schemas, relationships) = fixture();
        let renderer = ScriptedRenderer::new(vec![
            Ok("nope".to_string()),
            Ok("erDiagram\n    users {\n".to_string()),
        ]);

        let err = DiagramAssembler::new(&renderer)
            .assemble(&schemas, &relationships, OutputFormat::Md)
            .await
            .unwrap_err();
        assert!(matches!(err, DiagramError::RenderInvalid { attempts: 2, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_maps_to_unavailable() {
        let (schemas, relationships) = fixture();
        let err = DiagramAssembler::new(&HangingRenderer)
            .with_timeout(Duration::from_secs(1))
            .with_retry_backoff(Duration::from_millis(10))
            .assemble(&schemas, &relationships, OutputFormat::Md)
            .await
            .unwrap_err();

        match err {
            DiagramError::RenderUnavailable { attempts, message } => {
                assert_eq!(attempts, 2);
                assert!(message.contains("timed out"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
