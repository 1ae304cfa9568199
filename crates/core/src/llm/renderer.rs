//! Diagram rendering through an LLM

use async_trait::async_trait;
use tracing::{debug, info};

use super::client::LlmClient;
use super::error::LlmError;
use super::prompt::{PromptContext, SYSTEM_PROMPT, estimate_tokens, extract_diagram};
use crate::diagram::{DiagramRenderer, DiagramSpec, MermaidRenderer, RenderError};

/// Renders diagrams by asking an LLM to fix a locally drawn draft
///
/// Client failures are classified for the assembler's retry policy:
/// unusable replies are `Invalid`, transient failures are `Unavailable`
/// and everything else (bad credentials, 4xx) is `Rejected`.
pub struct LlmRenderer<C: LlmClient> {
    client: C,
    name: String,
}

impl<C: LlmClient> LlmRenderer<C> {
    /// Create a renderer named after the client's model
    pub fn new(client: C) -> Self {
        let name = format!("llm:{}", client.model_name());
        Self { client, name }
    }

    /// Override the name used in logs
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    fn build_prompt(&self, spec: &DiagramSpec) -> Result<String, RenderError> {
        let spec_json = serde_json::to_string_pretty(spec)
            .map_err(|e| RenderError::Invalid(format!("could not serialize diagram spec: {e}")))?;
        let draft = MermaidRenderer.render_text(spec);
        let prompt = PromptContext::new(spec_json, draft).build_prompt();

        let tokens = estimate_tokens(SYSTEM_PROMPT) + estimate_tokens(&prompt);
        if tokens > self.client.max_tokens() {
            return Err(classify(LlmError::ContextTooLarge {
                max: self.client.max_tokens(),
                actual: tokens,
            }));
        }
        Ok(prompt)
    }
}

/// Map a client error onto the render retry categories
fn classify(err: LlmError) -> RenderError {
    match err {
        LlmError::InvalidResponse(_) | LlmError::ParseError(_) | LlmError::ContextTooLarge { .. } => {
            RenderError::Invalid(err.to_string())
        }
        other if other.is_retryable() => RenderError::Unavailable(other.to_string()),
        other => RenderError::Rejected(other.to_string()),
    }
}

#[async_trait]
impl<C: LlmClient> DiagramRenderer for LlmRenderer<C> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn render(&self, spec: &DiagramSpec) -> Result<String, RenderError> {
        let prompt = self.build_prompt(spec)?;

        info!(
            model = self.client.model_name(),
            nodes = spec.nodes.len(),
            edges = spec.edges.len(),
            "Requesting diagram from LLM"
        );

        let reply = self
            .client
            .complete_with_system(SYSTEM_PROMPT, &prompt)
            .await
            .map_err(classify)?;

        debug!(reply_chars = reply.len(), "LLM reply received");

        extract_diagram(&reply).ok_or_else(|| {
            RenderError::Invalid("reply does not contain an erDiagram".to_string())
        })
    }
}
