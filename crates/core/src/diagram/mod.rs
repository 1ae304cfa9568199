//! Diagram assembly
//!
//! Schemas and relationships become a [`DiagramSpec`], a [`DiagramRenderer`]
//! turns the spec into Mermaid `erDiagram` text, and the result is wrapped
//! according to the [`OutputFormat`].
//!
//! # Example
//!
//! ```rust,ignore
//! use docschema_core::diagram::{DiagramAssembler, MermaidRenderer, OutputFormat};
//!
//! let renderer = MermaidRenderer::new();
//! let text = DiagramAssembler::new(&renderer)
//!     .assemble(&schemas, &relationships, OutputFormat::Md)
//!     .await?;
//! ```

pub mod assembler;
pub mod error;
pub mod format;
pub mod mermaid;
pub mod renderer;
pub mod spec;
pub mod validate;

pub use assembler::{DEFAULT_RENDER_TIMEOUT, DEFAULT_RETRY_BACKOFF, DiagramAssembler};
pub use error::{DiagramError, DiagramResult, RenderError};
pub use format::OutputFormat;
pub use mermaid::{MermaidRenderer, NameScope, sanitize_identifier};
pub use renderer::DiagramRenderer;
pub use spec::{DiagramEdge, DiagramField, DiagramNode, DiagramSpec, KeyKind};
pub use validate::{check_diagram, strip_fence};
