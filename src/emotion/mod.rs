//! Emotion classification and resolution.
//!
//! A multi-label classifier scores every label of the go_emotions
//! vocabulary independently. [`resolver::EmotionResolver`] turns that
//! distribution, plus the sarcasm verdict, into the single emotion the
//! reply prompt is conditioned on.

pub mod huggingface;
pub mod resolver;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use huggingface::{HuggingFaceConfig, HuggingFaceEmotionClassifier};
pub use resolver::{EmotionResolver, ResolveOptions, resolve_scores};

/// Label the classifier uses for "no particular emotion".
pub const NEUTRAL: &str = "neutral";

/// Labels treated as affectively negative.
///
/// Sarcastic messages often read literally positive, so resolution prefers
/// these labels when sarcasm is detected.
pub const NEGATIVE_EMOTIONS: &[&str] = &[
    "anger",
    "annoyance",
    "disgust",
    "fear",
    "sadness",
    "disappointment",
    "disapproval",
    "embarrassment",
    "remorse",
    "grief",
];

/// Whether `label` belongs to [`NEGATIVE_EMOTIONS`].
pub fn is_negative_emotion(label: &str) -> bool {
    NEGATIVE_EMOTIONS.contains(&label)
}

/// One (label, score) pair from the classifier, score in `0.0..=1.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionScore {
    /// Emotion label, e.g. `"joy"`.
    pub label: String,
    /// Independent confidence for this label.
    pub score: f64,
}

impl EmotionScore {
    /// Create a new score.
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// The single emotion chosen to represent a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedEmotion {
    /// Emotion label.
    pub label: String,
    /// Confidence as a percentage, `0.0..=100.0`.
    pub confidence: f64,
}

impl From<&EmotionScore> for ResolvedEmotion {
    fn from(score: &EmotionScore) -> Self {
        Self {
            label: score.label.clone(),
            confidence: score.score * 100.0,
        }
    }
}

/// Multi-label emotion classification capability.
///
/// Implementations must return at least one score; labels come from a fixed
/// vocabulary and scores do not sum to one.
#[async_trait]
pub trait EmotionClassifier: Send + Sync {
    /// Returns the backend name, used in logs.
    fn name(&self) -> &str;

    /// Score `text` against every label.
    async fn classify(&self, text: &str) -> Result<Vec<EmotionScore>>;
}
