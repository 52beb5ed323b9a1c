//! Composition root: turns an [`EmpathConfig`] into a ready [`Therapist`].
//!
//! Every client is constructed exactly once here and shared through `Arc`,
//! so HTTP connection pools are reused across turns.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::EmpathConfig;
use crate::emotion::{
    EmotionResolver, HuggingFaceConfig, HuggingFaceEmotionClassifier, ResolveOptions,
};
use crate::error::{EmpathError, Result};
use crate::llm::openai::{OpenAiAdapter, OpenAiConfig};
use crate::llm::provider::ChatModel;
use crate::llm::redact::RedactedString;
use crate::sarcasm::LlmSarcasmDetector;
use crate::therapy::{Therapist, TherapistSettings};

fn secret_or_empty(
    secret: Option<RedactedString>,
    env_var: &str,
    upstream: &str,
) -> RedactedString {
    secret.unwrap_or_else(|| {
        warn!("{env_var} is not set; calling the {upstream} without credentials");
        RedactedString::default()
    })
}

fn chat_model(
    config: &EmpathConfig,
    api_key: &RedactedString,
    model: &str,
) -> Result<Arc<dyn ChatModel>> {
    let adapter = OpenAiAdapter::new(
        OpenAiConfig::new(api_key.clone(), model)
            .with_base_url(&config.llm.base_url)
            .with_timeout(config.llm.timeout()),
    )
    .map_err(|e| EmpathError::Config(format!("chat model client: {e}")))?;
    Ok(Arc::new(adapter))
}

/// Wire the sarcasm detector, emotion resolver and reply model.
///
/// The reply model and the sarcasm detector share one client unless
/// `sarcasm.model` names a different model.
///
/// # Errors
///
/// Returns [`EmpathError::Config`] if the configuration is invalid or an
/// HTTP client cannot be built.
pub fn build_therapist(config: &EmpathConfig) -> Result<Therapist> {
    config.validate()?;

    let llm_key = secret_or_empty(
        config.llm.resolve_api_key(),
        &config.llm.api_key_env,
        "chat model provider",
    );
    let emotion_key = secret_or_empty(
        config.emotion.resolve_api_key(),
        &config.emotion.api_key_env,
        "emotion classifier",
    );

    let reply_model = chat_model(config, &llm_key, &config.llm.model)?;
    let sarcasm_model = match config.sarcasm.model.as_deref() {
        Some(model) if model != config.llm.model => chat_model(config, &llm_key, model)?,
        _ => Arc::clone(&reply_model),
    };
    let sarcasm = LlmSarcasmDetector::new(sarcasm_model)
        .with_options(config.sarcasm.request_options());

    let classifier = HuggingFaceEmotionClassifier::new(
        HuggingFaceConfig::new(emotion_key)
            .with_base_url(&config.emotion.base_url)
            .with_model_id(&config.emotion.model_id)
            .with_timeout(config.emotion.timeout()),
    )?;

    let settings = TherapistSettings {
        resolve: ResolveOptions {
            threshold: config.emotion.threshold,
            exclude_neutral: config.emotion.exclude_neutral,
            sarcasm: false,
        },
        reply_options: config.reply.request_options(),
        sarcasm_timeout: config.llm.timeout(),
        emotion_timeout: config.emotion.timeout(),
        reply_timeout: config.llm.timeout(),
    };

    info!(
        llm_model = %config.llm.model,
        sarcasm_model = config.sarcasm.model.as_deref().unwrap_or(&config.llm.model),
        emotion_model = %config.emotion.model_id,
        "therapist initialized"
    );

    Ok(Therapist::new(
        Arc::new(sarcasm),
        EmotionResolver::new(Arc::new(classifier)),
        reply_model,
    )
    .with_settings(settings))
}
