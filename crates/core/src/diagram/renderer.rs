//! Rendering collaborator

use async_trait::async_trait;

use super::error::RenderError;
use super::spec::DiagramSpec;

/// Turns a [`DiagramSpec`] into Mermaid `erDiagram` text
///
/// Implementations may be remote and slow; the assembler bounds every call
/// with a timeout and checks the returned text before using it.
#[async_trait]
pub trait DiagramRenderer: Send + Sync {
    /// Renderer name used in logs
    fn name(&self) -> &str;

    /// Render the diagram text
    async fn render(&self, spec: &DiagramSpec) -> Result<String, RenderError>;
}
