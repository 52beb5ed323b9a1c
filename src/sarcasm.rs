//! Sarcasm detection through a generative model with a strict JSON contract.
//!
//! The model is instructed to answer with exactly
//! `{"sarcastic": <bool>, "reason": "<one sentence>"}`. Markdown code fences
//! and inline `<think>` blocks are tolerated and removed before parsing;
//! anything else that does not match the shape is a
//! [`EmpathError::SarcasmParse`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{EmpathError, Result};
use crate::llm::error::LlmError;
use crate::llm::message::Message;
use crate::llm::openai::strip_think_blocks;
use crate::llm::provider::{ChatModel, RequestOptions};

/// Instructions given to the sarcasm model.
pub const SARCASM_SYSTEM_PROMPT: &str = "You are a sarcasm-detection assistant. \
Given a single sentence, determine whether it is sarcastic. \
Respond with STRICT JSON, without any extra keys, markdown formatting, \
or explanation outside the JSON. The JSON schema is:\n\
{\n  \"sarcastic\": <true|false>,\n  \"reason\": \"<one-sentence justification>\"\n}";

/// Whether a message's literal sentiment is reversed by tone, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SarcasmVerdict {
    /// True when the message is sarcastic.
    #[serde(rename = "sarcastic")]
    pub is_sarcastic: bool,
    /// Natural-language justification from the model.
    pub reason: String,
}

impl SarcasmVerdict {
    /// Create a verdict.
    pub fn new(is_sarcastic: bool, reason: impl Into<String>) -> Self {
        Self {
            is_sarcastic,
            reason: reason.into(),
        }
    }
}

/// Sarcasm classification capability.
#[async_trait]
pub trait SarcasmDetector: Send + Sync {
    /// Classify `text`.
    async fn detect(&self, text: &str) -> Result<SarcasmVerdict>;
}

/// Build the prompt for one sarcasm classification.
pub fn build_sarcasm_messages(text: &str) -> Vec<Message> {
    vec![
        Message::system(SARCASM_SYSTEM_PROMPT),
        Message::user(format!("Text: \"{text}\"")),
    ]
}

/// Remove code fences and reasoning blocks around the JSON payload.
fn clean_model_output(raw: &str) -> String {
    strip_think_blocks(raw)
        .replace("```json", "")
        .replace("```", "")
        .trim()
        .to_owned()
}

/// Parse the model's answer into a [`SarcasmVerdict`].
///
/// # Errors
///
/// Returns [`EmpathError::SarcasmParse`] carrying the cleaned output when
/// it is not a JSON object with a boolean `sarcastic` and a string `reason`.
pub fn parse_verdict(raw: &str) -> Result<SarcasmVerdict> {
    let cleaned = clean_model_output(raw);
    serde_json::from_str(&cleaned).map_err(|e| {
        EmpathError::SarcasmParse(format!("failed to parse JSON from model ({e}):\n{cleaned}"))
    })
}

/// [`SarcasmDetector`] that asks a [`ChatModel`].
pub struct LlmSarcasmDetector {
    model: Arc<dyn ChatModel>,
    options: RequestOptions,
}

impl std::fmt::Debug for LlmSarcasmDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmSarcasmDetector")
            .field("model", &self.model.name())
            .field("options", &self.options)
            .finish()
    }
}

impl LlmSarcasmDetector {
    /// Create a detector; the model is sampled at temperature 0.
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            model,
            options: RequestOptions::new().with_temperature(0.0),
        }
    }

    /// Override the request options.
    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }
}

/// Map a provider failure during sarcasm classification.
fn map_llm_error(err: LlmError) -> EmpathError {
    match err {
        LlmError::TimeoutError(m) => EmpathError::Timeout(format!("sarcasm model: {m}")),
        other => EmpathError::Classification(format!("sarcasm model: {other}")),
    }
}

#[async_trait]
impl SarcasmDetector for LlmSarcasmDetector {
    async fn detect(&self, text: &str) -> Result<SarcasmVerdict> {
        let messages = build_sarcasm_messages(text);
        let raw = self
            .model
            .complete(&messages, &self.options)
            .await
            .map_err(map_llm_error)?;

        let verdict = parse_verdict(&raw).inspect_err(|e| {
            warn!(error = %e, "sarcasm model returned non-conforming output");
        })?;
        debug!(sarcastic = verdict.is_sarcastic, "sarcasm classified");
        Ok(verdict)
    }
}
