//! Response orchestration for one chat turn.
//!
//! [`Therapist::respond`] runs strictly in sequence:
//!
//! ```text
//! validate → sarcasm → emotion (sarcasm-aware) → prompt → reply model
//! ```
//!
//! Sarcasm must finish first because emotion resolution branches on it.
//! Every stage failure aborts the turn; there is no partial result, because
//! a guessed emotion or sarcasm value would silently skew the reply prompt.

pub mod prompt;

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::emotion::{EmotionResolver, ResolveOptions, ResolvedEmotion};
use crate::error::{EmpathError, Result};
use crate::llm::error::LlmError;
use crate::llm::provider::{ChatModel, RequestOptions};
use crate::sarcasm::{SarcasmDetector, SarcasmVerdict};

pub use prompt::{HistoryEntry, build_reply_messages};

/// Everything produced for one chat turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurnResult {
    /// Generated reply, trimmed.
    pub reply: String,
    /// Sarcasm verdict for the latest message.
    pub sarcasm: SarcasmVerdict,
    /// Emotion resolved for the latest message.
    pub emotion: ResolvedEmotion,
}

/// Pipeline stage, used for timeout errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Sarcasm classification.
    Sarcasm,
    /// Emotion classification and resolution.
    Emotion,
    /// Reply generation.
    Reply,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sarcasm => write!(f, "sarcasm"),
            Self::Emotion => write!(f, "emotion"),
            Self::Reply => write!(f, "reply"),
        }
    }
}

/// Tunables for [`Therapist`].
#[derive(Debug, Clone)]
pub struct TherapistSettings {
    /// Neutral-override threshold and exclusion flag; `sarcasm` is set per turn.
    pub resolve: ResolveOptions,
    /// Options for the reply model call.
    pub reply_options: RequestOptions,
    /// Budget for the sarcasm stage.
    pub sarcasm_timeout: Duration,
    /// Budget for the emotion stage.
    pub emotion_timeout: Duration,
    /// Budget for the reply stage.
    pub reply_timeout: Duration,
}

impl Default for TherapistSettings {
    fn default() -> Self {
        Self {
            resolve: ResolveOptions::default(),
            reply_options: RequestOptions::new()
                .with_temperature(0.6)
                .with_max_tokens(200),
            sarcasm_timeout: Duration::from_secs(60),
            emotion_timeout: Duration::from_secs(30),
            reply_timeout: Duration::from_secs(60),
        }
    }
}

/// Run `fut` with a time budget, turning expiry into [`EmpathError::Timeout`].
async fn within<T>(
    stage: Stage,
    limit: Duration,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::time::timeout(limit, fut).await.unwrap_or_else(|_| {
        Err(EmpathError::Timeout(format!(
            "{stage} stage exceeded {}ms",
            limit.as_millis()
        )))
    })
}

/// Map a provider failure during reply generation.
fn map_reply_error(err: LlmError) -> EmpathError {
    match err {
        LlmError::TimeoutError(m) => EmpathError::Timeout(format!("reply model: {m}")),
        other => EmpathError::Generation(format!("reply model: {other}")),
    }
}

/// Sequences sarcasm detection, emotion resolution and reply generation.
///
/// Holds no per-conversation state; one instance serves concurrent turns.
pub struct Therapist {
    sarcasm: Arc<dyn SarcasmDetector>,
    resolver: EmotionResolver,
    reply_model: Arc<dyn ChatModel>,
    settings: TherapistSettings,
}

impl fmt::Debug for Therapist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Therapist")
            .field("resolver", &self.resolver)
            .field("reply_model", &self.reply_model.name())
            .field("settings", &self.settings)
            .finish()
    }
}

impl Therapist {
    /// Create a therapist with default settings.
    pub fn new(
        sarcasm: Arc<dyn SarcasmDetector>,
        resolver: EmotionResolver,
        reply_model: Arc<dyn ChatModel>,
    ) -> Self {
        Self {
            sarcasm,
            resolver,
            reply_model,
            settings: TherapistSettings::default(),
        }
    }

    /// Replace the settings.
    pub fn with_settings(mut self, settings: TherapistSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Current settings.
    pub fn settings(&self) -> &TherapistSettings {
        &self.settings
    }

    /// Produce the reply and analysis for `message` given prior `history`.
    ///
    /// # Errors
    ///
    /// - [`EmpathError::Validation`] for empty or whitespace-only input,
    ///   before any outbound call
    /// - any error from the sarcasm, emotion or reply stage, unchanged
    /// - [`EmpathError::Timeout`] when a stage exceeds its budget
    pub async fn respond(&self, message: &str, history: &[HistoryEntry]) -> Result<ChatTurnResult> {
        if message.trim().is_empty() {
            return Err(EmpathError::Validation("Empty message".into()));
        }

        let settings = &self.settings;

        let sarcasm = within(
            Stage::Sarcasm,
            settings.sarcasm_timeout,
            self.sarcasm.detect(message),
        )
        .await?;
        debug!(sarcastic = sarcasm.is_sarcastic, "sarcasm stage done");

        let options = settings.resolve.with_sarcasm(sarcasm.is_sarcastic);
        let emotion = within(
            Stage::Emotion,
            settings.emotion_timeout,
            self.resolver.resolve(message, &options),
        )
        .await?;
        debug!(label = %emotion.label, confidence = emotion.confidence, "emotion stage done");

        let messages = build_reply_messages(message, &emotion, &sarcasm, history);
        let reply = within(Stage::Reply, settings.reply_timeout, async {
            self.reply_model
                .complete(&messages, &settings.reply_options)
                .await
                .map_err(map_reply_error)
        })
        .await?;

        info!(
            emotion = %emotion.label,
            confidence = emotion.confidence,
            sarcastic = sarcasm.is_sarcastic,
            history = history.len(),
            prompt_messages = messages.len(),
            "chat turn complete"
        );

        Ok(ChatTurnResult {
            reply: reply.trim().to_owned(),
            sarcasm,
            emotion,
        })
    }
}
