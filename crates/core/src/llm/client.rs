//! LLM client trait
//!
//! This module defines the `LlmClient` trait for interacting with LLMs.
//! Implementations exist for the Anthropic Messages API and Ollama.

use async_trait::async_trait;

#[cfg(test)]
use super::error::LlmError;
use super::error::LlmResult;

/// Trait for LLM client implementations
///
/// This trait provides a unified interface for different LLM backends,
/// allowing the diagram renderer to work with hosted and local models.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a completion for the given prompt
    ///
    /// # Arguments
    /// * `prompt` - The input prompt for the LLM
    ///
    /// # Returns
    /// The generated text response
    async fn complete(&self, prompt: &str) -> LlmResult<String>;

    /// Generate a completion with a separate system instruction
    ///
    /// Backends without a system slot receive both parts in one prompt.
    async fn complete_with_system(&self, system: &str, prompt: &str) -> LlmResult<String> {
        self.complete(&format!("{system}\n\n{prompt}")).await
    }

    /// Get the model name being used
    fn model_name(&self) -> &str;

    /// Get the maximum context size in tokens
    fn max_tokens(&self) -> usize;
}

/// A mock LLM client for testing
///
/// Replies are handed out in order; the last one repeats.
#[cfg(test)]
pub struct MockLlmClient {
    replies: std::sync::Mutex<Vec<Option<String>>>,
    prompts: std::sync::Mutex<Vec<String>>,
    failure: fn() -> LlmError,
    model: String,
    max_tokens: usize,
}

#[cfg(test)]
impl MockLlmClient {
    /// Create a new mock client that returns the given response
    pub fn new(response: impl Into<String>) -> Self {
        Self::scripted(vec![Some(response.into())])
    }

    /// Create a mock client that fails
    pub fn failing() -> Self {
        Self::scripted(vec![None])
    }

    /// Create a mock client whose every call fails with `failure()`
    pub fn failing_with(failure: fn() -> LlmError) -> Self {
        let mut client = Self::failing();
        client.failure = failure;
        client
    }

    /// Replies in order; `None` fails with a connection error
    pub fn scripted(replies: Vec<Option<String>>) -> Self {
        let mut replies = replies;
        replies.reverse();
        Self {
            replies: std::sync::Mutex::new(replies),
            prompts: std::sync::Mutex::new(Vec::new()),
            failure: || LlmError::ConnectionError("Mock failure".to_string()),
            model: "mock-model".to_string(),
            max_tokens: 100_000,
        }
    }

    /// Set the context size
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, prompt: &str) -> LlmResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let reply = {
            let mut replies = self.replies.lock().unwrap();
            if replies.len() > 1 {
                replies.pop().flatten()
            } else {
                replies.last().cloned().flatten()
            }
        };
        reply.ok_or_else(self.failure)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn max_tokens(&self) -> usize {
        self.max_tokens
    }
}
