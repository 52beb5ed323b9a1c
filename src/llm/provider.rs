//! Chat-model capability trait and per-call generation options.
//!
//! [`ChatModel`] is the seam between the pipeline and any generative
//! backend: the sarcasm detector and the reply stage both talk to it, and
//! tests substitute scripted implementations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::LlmError;
use super::message::Message;

/// Options controlling one generation call.
///
/// ```
/// use empath::llm::provider::RequestOptions;
///
/// let opts = RequestOptions::new().with_max_tokens(200).with_temperature(0.6);
/// assert_eq!(opts.max_tokens, Some(200));
/// assert_eq!(opts.temperature, Some(0.6));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestOptions {
    /// Maximum tokens to generate. `None` means use provider default.
    pub max_tokens: Option<usize>,
    /// Sampling temperature (0.0 = deterministic, 2.0 = max randomness).
    pub temperature: Option<f64>,
}

impl RequestOptions {
    /// Create request options that defer everything to the provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// A generative model that turns an ordered message list into one reply.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Returns the provider name (e.g. `"openai"`), used in logs.
    fn name(&self) -> &str;

    /// Generate a single, complete assistant message.
    async fn complete(
        &self,
        messages: &[Message],
        options: &RequestOptions,
    ) -> Result<String, LlmError>;
}
