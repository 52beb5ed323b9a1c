//! Emotion resolution policy.
//!
//! Picks one (label, confidence) from a multi-label distribution:
//!
//! 1. Scores are ranked highest first; ties keep the classifier's order.
//! 2. **Sarcasm mode**: the highest-ranked negative label wins. With no
//!    negative label at all, the runner-up is used on the assumption that
//!    the top label is the misleading literal reading. This is a heuristic
//!    with no confidence floor, so the runner-up may be close to zero. A
//!    single-entry distribution falls through to normal mode.
//! 3. **Normal mode**: the top label wins, except that a `neutral` top
//!    label below `threshold` gives way to the first non-neutral label
//!    after it (when one exists).
//!
//! Confidence is always reported on a 0–100 scale.

use std::sync::Arc;

use tracing::debug;

use super::{EmotionClassifier, EmotionScore, NEUTRAL, ResolvedEmotion, is_negative_emotion};
use crate::error::{EmpathError, Result};

/// Default neutral-override threshold.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Knobs for one resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolveOptions {
    /// A `neutral` top label scoring below this is overridden.
    pub threshold: f64,
    /// Whether low-confidence `neutral` may be overridden at all.
    pub exclude_neutral: bool,
    /// Whether the message was judged sarcastic.
    pub sarcasm: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            exclude_neutral: true,
            sarcasm: false,
        }
    }
}

impl ResolveOptions {
    /// Set the sarcasm flag.
    pub fn with_sarcasm(mut self, sarcasm: bool) -> Self {
        self.sarcasm = sarcasm;
        self
    }
}

/// Rank scores highest first, dropping NaN entries. Equal scores keep input order.
fn rank(mut scores: Vec<EmotionScore>) -> Vec<EmotionScore> {
    scores.retain(|s| !s.score.is_nan());
    scores.sort_by(|a, b| b.score.total_cmp(&a.score));
    scores
}

/// Apply the resolution policy to an already-classified distribution.
///
/// # Errors
///
/// Returns [`EmpathError::Classification`] when `scores` holds no usable
/// (non-NaN) entry, which means the classifier broke its contract.
pub fn resolve_scores(
    scores: Vec<EmotionScore>,
    options: &ResolveOptions,
) -> Result<ResolvedEmotion> {
    let ranked = rank(scores);
    let top = ranked.first().ok_or_else(|| {
        EmpathError::Classification("emotion classifier returned no usable scores".into())
    })?;

    if options.sarcasm {
        if let Some(negative) = ranked.iter().find(|s| is_negative_emotion(&s.label)) {
            return Ok(negative.into());
        }
        if let Some(runner_up) = ranked.get(1) {
            return Ok(runner_up.into());
        }
    }

    let low_neutral = top.label == NEUTRAL && top.score < options.threshold;
    let chosen = if options.exclude_neutral && low_neutral {
        ranked
            .iter()
            .skip(1)
            .find(|s| s.label != NEUTRAL)
            .unwrap_or(top)
    } else {
        top
    };

    Ok(chosen.into())
}

/// Classifies a message and resolves it to a single emotion.
#[derive(Clone)]
pub struct EmotionResolver {
    classifier: Arc<dyn EmotionClassifier>,
}

impl std::fmt::Debug for EmotionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmotionResolver")
            .field("classifier", &self.classifier.name())
            .finish()
    }
}

impl EmotionResolver {
    /// Create a resolver backed by `classifier`.
    pub fn new(classifier: Arc<dyn EmotionClassifier>) -> Self {
        Self { classifier }
    }

    /// Classify `message` and apply the resolution policy.
    ///
    /// # Errors
    ///
    /// Classifier failures propagate unchanged.
    pub async fn resolve(
        &self,
        message: &str,
        options: &ResolveOptions,
    ) -> Result<ResolvedEmotion> {
        let scores = self.classifier.classify(message).await?;
        debug!(
            classifier = self.classifier.name(),
            labels = scores.len(),
            sarcasm = options.sarcasm,
            "resolving emotion"
        );
        resolve_scores(scores, options)
    }
}
