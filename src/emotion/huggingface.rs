//! Hugging Face Inference API emotion classifier.
//!
//! Calls a hosted text-classification model (by default
//! `SamLowe/roberta-base-go_emotions`) and asks for every label's score.
//! The API returns either a nested `[[{label, score}, ...]]` batch or a flat
//! `[{label, score}, ...]` list depending on the deployment; both are
//! accepted.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{EmotionClassifier, EmotionScore};
use crate::error::{EmpathError, Result};
use crate::llm::redact::RedactedString;

/// Default Inference API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co";

/// Default go_emotions model.
pub const DEFAULT_MODEL_ID: &str = "SamLowe/roberta-base-go_emotions";

/// Configuration for [`HuggingFaceEmotionClassifier`].
#[derive(Debug, Clone)]
pub struct HuggingFaceConfig {
    /// Access token. Empty means no header is sent.
    pub api_key: RedactedString,
    /// Base URL of the Inference API (or a self-hosted TGI/TEI endpoint).
    pub base_url: String,
    /// Model repository ID.
    pub model_id: String,
    /// Whole-request timeout.
    pub timeout: Duration,
}

impl HuggingFaceConfig {
    /// Config for the default model with the given token.
    pub fn new(api_key: impl Into<RedactedString>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.into(),
            model_id: DEFAULT_MODEL_ID.into(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the model ID.
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full inference URL for the configured model.
    pub fn inference_url(&self) -> String {
        format!(
            "{}/models/{}",
            self.base_url.trim_end_matches('/'),
            self.model_id
        )
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ClassificationBody {
    Batched(Vec<Vec<EmotionScore>>),
    Flat(Vec<EmotionScore>),
}

/// Parse an Inference API text-classification body.
///
/// # Errors
///
/// Returns [`EmpathError::Classification`] for unparseable bodies and for
/// empty label lists.
pub fn parse_classification_body(body: &str) -> Result<Vec<EmotionScore>> {
    let parsed: ClassificationBody = serde_json::from_str(body).map_err(|e| {
        EmpathError::Classification(format!("unexpected classifier response: {e}"))
    })?;

    let scores = match parsed {
        ClassificationBody::Batched(batches) => batches.into_iter().next().unwrap_or_default(),
        ClassificationBody::Flat(scores) => scores,
    };

    if scores.is_empty() {
        return Err(EmpathError::Classification(
            "classifier returned no labels".into(),
        ));
    }
    Ok(scores)
}

/// Pull the `error` field out of an Inference API error body.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
        .unwrap_or_else(|| body.to_string())
}

/// Map a `reqwest` failure at send or body read, keeping timeouts distinguishable.
fn map_transport_error(err: reqwest::Error) -> EmpathError {
    if err.is_timeout() {
        EmpathError::Timeout(format!("emotion classifier timed out: {err}"))
    } else {
        EmpathError::Classification(format!("emotion classifier request failed: {err}"))
    }
}

/// Emotion classifier backed by the Hugging Face Inference API.
pub struct HuggingFaceEmotionClassifier {
    config: HuggingFaceConfig,
    client: reqwest::Client,
}

impl std::fmt::Debug for HuggingFaceEmotionClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HuggingFaceEmotionClassifier")
            .field("model_id", &self.config.model_id)
            .field("base_url", &self.config.base_url)
            .finish()
    }
}

impl HuggingFaceEmotionClassifier {
    /// Create a classifier with a pooled HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: HuggingFaceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EmpathError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl EmotionClassifier for HuggingFaceEmotionClassifier {
    fn name(&self) -> &str {
        "huggingface"
    }

    async fn classify(&self, text: &str) -> Result<Vec<EmotionScore>> {
        let body = serde_json::json!({
            "inputs": text,
            "parameters": { "top_k": null },
            "options": { "wait_for_model": true },
        });

        debug!(model = %self.config.model_id, "classifying emotion");

        let mut request = self.client.post(self.config.inference_url()).json(&body);
        if !self.config.api_key.is_empty() {
            request = request.bearer_auth(self.config.api_key.as_str());
        }

        let response = request.send().await.map_err(map_transport_error)?;

        let status = response.status();
        let text = response.text().await.map_err(map_transport_error)?;

        if !status.is_success() {
            return Err(EmpathError::Classification(format!(
                "emotion classifier HTTP {}: {}",
                status.as_u16(),
                extract_error_message(&text)
            )));
        }

        parse_classification_body(&text)
    }
}
