//! OpenAI-compatible chat completions adapter.
//!
//! Talks to any server implementing the non-streaming
//! `/v1/chat/completions` endpoint: DeepSeek (the default), OpenAI,
//! Ollama, vLLM, llama.cpp server and so on.
//!
//! ```rust,no_run
//! use empath::llm::openai::{OpenAiAdapter, OpenAiConfig};
//! use empath::llm::provider::{ChatModel, RequestOptions};
//! use empath::llm::message::Message;
//!
//! # async fn example() -> Result<(), empath::llm::error::LlmError> {
//! let adapter = OpenAiAdapter::new(OpenAiConfig::new("sk-...", "deepseek-reasoner"))?;
//! let reply = adapter
//!     .complete(&[Message::user("Hello")], &RequestOptions::new())
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::error::LlmError;
use super::message::Message;
use super::provider::{ChatModel, RequestOptions};
use super::redact::RedactedString;

/// Default base URL for the hosted provider.
pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

// ── Configuration ─────────────────────────────────────────────

/// Configuration for the OpenAI-compatible adapter.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API key for bearer authentication. Empty means no header is sent.
    pub api_key: RedactedString,
    /// Base URL, with or without a trailing `/v1`.
    pub base_url: String,
    /// The model to use.
    pub model: String,
    /// Whole-request timeout enforced by the HTTP client.
    pub timeout: Duration,
}

impl OpenAiConfig {
    /// Create a new config with the given API key and model.
    pub fn new(api_key: impl Into<RedactedString>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.into(),
            model: model.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Resolve the completions URL, tolerating a base URL that already ends in `/v1`.
pub fn completions_url(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let base = base.strip_suffix("/v1").unwrap_or(base);
    format!("{base}/v1/chat/completions")
}

// ── Request / response mapping ────────────────────────────────

/// Build the JSON request body for the Chat Completions API.
pub fn build_completions_request(
    model: &str,
    messages: &[Message],
    options: &RequestOptions,
) -> serde_json::Value {
    let wire_messages: Vec<serde_json::Value> = messages
        .iter()
        .map(|m| {
            serde_json::json!({
                "role": m.role.as_str(),
                "content": m.content,
            })
        })
        .collect();

    let mut body = serde_json::json!({
        "model": model,
        "messages": wire_messages,
        "stream": false,
    });

    if let Some(obj) = body.as_object_mut() {
        if let Some(max_tokens) = options.max_tokens {
            obj.insert("max_tokens".into(), serde_json::json!(max_tokens));
        }
        if let Some(temp) = options.temperature {
            obj.insert("temperature".into(), serde_json::json!(temp));
        }
    }

    body
}

/// Extract the assistant text from a non-streaming completion body.
///
/// Any `<think>...</think>` block emitted inline by reasoning models is
/// removed; the provider's separate `reasoning_content` field is ignored.
pub fn parse_completion_response(body: &str) -> Result<String, LlmError> {
    let parsed: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| LlmError::InvalidResponse(format!("completion is not JSON: {e}")))?;

    let content = parsed
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .ok_or_else(|| {
            LlmError::InvalidResponse("completion has no choices[0].message.content".into())
        })?;

    Ok(strip_think_blocks(content))
}

/// Strip `<think>...</think>` blocks from generated text.
pub fn strip_think_blocks(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut remaining = text;
    while let Some(start) = remaining.find("<think>") {
        result.push_str(&remaining[..start]);
        if let Some(end) = remaining[start..].find("</think>") {
            remaining = &remaining[start + end + "</think>".len()..];
        } else {
            // Unclosed <think>: discard the rest
            return result;
        }
    }
    result.push_str(remaining);
    result
}

/// Extract an error message from an OpenAI-style error body.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.to_string())
}

/// Map an HTTP error status to the appropriate [`LlmError`].
fn map_http_error(status: reqwest::StatusCode, body: &str) -> LlmError {
    let message = extract_error_message(body);
    match status.as_u16() {
        401 | 403 => LlmError::AuthError(format!("authentication failed: {message}")),
        429 => LlmError::RequestError(format!("rate limited: {message}")),
        code => LlmError::ProviderError(format!("HTTP {code}: {message}")),
    }
}

// ── Adapter ───────────────────────────────────────────────────

/// OpenAI-compatible chat model.
pub struct OpenAiAdapter {
    config: OpenAiConfig,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiAdapter")
            .field("model", &self.config.model)
            .field("base_url", &self.config.base_url)
            .finish()
    }
}

impl OpenAiAdapter {
    /// Create a new adapter with a pooled HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: OpenAiConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::RequestError(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl ChatModel for OpenAiAdapter {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &RequestOptions,
    ) -> Result<String, LlmError> {
        let url = completions_url(&self.config.base_url);
        let body = build_completions_request(&self.config.model, messages, options);

        debug!(
            model = %self.config.model,
            messages = messages.len(),
            "sending chat completion request"
        );

        let mut request = self.client.post(&url).json(&body);
        if !self.config.api_key.is_empty() {
            request = request.bearer_auth(self.config.api_key.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| LlmError::from_transport(self.name(), &e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| LlmError::from_transport(self.name(), &e))?;

        if !status.is_success() {
            return Err(map_http_error(status, &text));
        }

        parse_completion_response(&text)
    }
}
