//! Anthropic Messages API client

use async_trait::async_trait;
#[cfg(feature = "llm-online")]
use serde::{Deserialize, Serialize};

use super::client::LlmClient;
use super::error::{LlmError, LlmResult};

/// Messages endpoint
pub const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";

/// API version sent in the `anthropic-version` header
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Model used when none is configured
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-opus-20240229";

/// Environment variables consulted for the API key, in order
pub const API_KEY_VARS: [&str; 2] = ["ANTHROPIC_API_KEY", "CLAUDE_API_KEY"];

/// Client for the Anthropic Messages API
#[derive(Clone)]
pub struct AnthropicClient {
    api_key: String,
    model: String,
    endpoint: String,
    /// Reply budget in tokens
    max_output_tokens: u32,
    timeout_seconds: u64,
    #[cfg(feature = "llm-online")]
    client: reqwest::Client,
}

impl std::fmt::Debug for AnthropicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicClient")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("api_key_set", &!self.api_key.is_empty())
            .field("max_output_tokens", &self.max_output_tokens)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "llm-online")]
#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[cfg(feature = "llm-online")]
#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[cfg(feature = "llm-online")]
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[cfg(feature = "llm-online")]
#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[cfg(feature = "llm-online")]
impl MessagesResponse {
    /// Concatenated text blocks of the reply
    fn text(&self) -> String {
        self.content
            .iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
    }
}

impl AnthropicClient {
    /// Create a client with an explicit API key
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            endpoint: ANTHROPIC_API_URL.to_string(),
            max_output_tokens: 4096,
            timeout_seconds: 120,
            #[cfg(feature = "llm-online")]
            client: reqwest::Client::new(),
        }
    }

    /// Create a client reading the API key from the environment
    pub fn from_env(model: impl Into<String>) -> LlmResult<Self> {
        let api_key = API_KEY_VARS
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|v| !v.trim().is_empty()))
            .ok_or_else(|| {
                LlmError::ConfigError(format!(
                    "no API key found, set {}",
                    API_KEY_VARS.join(" or ")
                ))
            })?;
        Ok(Self::new(api_key, model))
    }

    /// Override the endpoint (proxies, gateways)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Set the reply budget
    pub fn with_max_output_tokens(mut self, tokens: u32) -> Self {
        self.max_output_tokens = tokens;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[cfg(feature = "llm-online")]
    async fn send(&self, system: &str, prompt: &str) -> LlmResult<String> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_output_tokens,
            temperature: 0.0,
            system,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        tracing::debug!(endpoint = %self.endpoint, model = %self.model, "Sending request to Anthropic");

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .timeout(std::time::Duration::from_secs(self.timeout_seconds))
            .send()
            .await
            .map_err(|e| super::http::map_reqwest_error(e, "Anthropic API", self.timeout_seconds))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            let body = response.text().await.unwrap_or_default();
            return Err(super::http::map_status(status.as_u16(), body, retry_after));
        }

        let reply: MessagesResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ParseError(e.to_string()))?;

        if reply.stop_reason.as_deref() == Some("max_tokens") {
            tracing::warn!(model = %self.model, "Anthropic reply was cut at max_tokens");
        }

        let text = reply.text();
        if text.trim().is_empty() {
            return Err(LlmError::InvalidResponse("empty reply".to_string()));
        }
        Ok(text)
    }

    #[cfg(not(feature = "llm-online"))]
    async fn send(&self, _system: &str, _prompt: &str) -> LlmResult<String> {
        Err(LlmError::FeatureNotAvailable(
            "Online LLM".to_string(),
            "llm-online".to_string(),
        ))
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(&self, prompt: &str) -> LlmResult<String> {
        self.send("", prompt).await
    }

    async fn complete_with_system(&self, system: &str, prompt: &str) -> LlmResult<String> {
        self.send(system, prompt).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn max_tokens(&self) -> usize {
        200_000
    }

}
