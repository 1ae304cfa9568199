//! LLM-backed diagram rendering
//!
//! This module provides a [`DiagramRenderer`](crate::diagram::DiagramRenderer)
//! that sends the locally drawn diagram and its spec to a language model
//! and keeps the corrected `erDiagram` from the reply.
//!
//! # Backends
//!
//! - **Anthropic**: Messages API, key from `ANTHROPIC_API_KEY` or `CLAUDE_API_KEY`
//! - **Ollama**: locally hosted models through `/api/generate`
//!
//! # Example
//!
//! ```ignore
//! use docschema_core::llm::{AnthropicClient, LlmRenderer, DEFAULT_ANTHROPIC_MODEL};
//!
//! let client = AnthropicClient::from_env(DEFAULT_ANTHROPIC_MODEL)?.with_timeout(120);
//! let renderer = LlmRenderer::new(client);
//! let text = DiagramAssembler::new(&renderer)
//!     .assemble(&schemas, &relationships, OutputFormat::Md)
//!     .await?;
//! ```
//!
//! # Feature Flags
//!
//! - `llm-online`: enable the HTTP clients
//!
//! Without the feature both clients exist but every request fails with
//! [`LlmError::FeatureNotAvailable`], which the renderer reports as
//! unavailable.

pub mod anthropic;
pub mod client;
pub mod error;
#[cfg(feature = "llm-online")]
mod http;
pub mod ollama;
pub mod prompt;
pub mod renderer;

pub use anthropic::{AnthropicClient, DEFAULT_ANTHROPIC_MODEL};
pub use client::LlmClient;
pub use error::{LlmError, LlmResult};
pub use ollama::{DEFAULT_OLLAMA_MODEL, DEFAULT_OLLAMA_URL, OllamaClient};
pub use prompt::{PromptContext, SYSTEM_PROMPT, estimate_tokens, extract_diagram};
pub use renderer::LlmRenderer;

#[cfg(test)]
pub use client::MockLlmClient;
