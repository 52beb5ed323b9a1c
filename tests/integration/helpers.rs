//! Shared helpers for integration tests.
//!
//! Recording doubles for every outbound capability. All three share one
//! [`CallLog`] so tests can assert on cross-stage call order.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use empath::emotion::{EmotionClassifier, EmotionResolver, EmotionScore};
use empath::error::{EmpathError, Result};
use empath::llm::{ChatModel, LlmError, Message, RequestOptions};
use empath::sarcasm::{SarcasmDetector, SarcasmVerdict};
use empath::therapy::Therapist;

/// Ordered record of capability invocations.
#[derive(Clone, Default)]
pub(crate) struct CallLog(Arc<Mutex<Vec<&'static str>>>);

impl CallLog {
    fn push(&self, call: &'static str) {
        self.0.lock().unwrap().push(call);
    }

    pub(crate) fn calls(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().clone()
    }
}

pub(crate) struct RecordingDetector {
    log: CallLog,
    verdict: Option<SarcasmVerdict>,
}

#[async_trait]
impl SarcasmDetector for RecordingDetector {
    async fn detect(&self, _text: &str) -> Result<SarcasmVerdict> {
        self.log.push("sarcasm");
        self.verdict
            .clone()
            .ok_or_else(|| EmpathError::SarcasmParse("scripted parse failure".into()))
    }
}

pub(crate) struct RecordingClassifier {
    log: CallLog,
    scores: Vec<EmotionScore>,
}

#[async_trait]
impl EmotionClassifier for RecordingClassifier {
    fn name(&self) -> &str {
        "recording"
    }

    async fn classify(&self, _text: &str) -> Result<Vec<EmotionScore>> {
        self.log.push("emotion");
        Ok(self.scores.clone())
    }
}

pub(crate) struct RecordingModel {
    log: CallLog,
    reply: String,
    prompts: Mutex<Vec<Vec<Message>>>,
}

impl RecordingModel {
    /// Every prompt the model has been sent, in order.
    pub(crate) fn prompts(&self) -> Vec<Vec<Message>> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for RecordingModel {
    fn name(&self) -> &str {
        "recording"
    }

    async fn complete(
        &self,
        messages: &[Message],
        _options: &RequestOptions,
    ) -> std::result::Result<String, LlmError> {
        self.log.push("reply");
        self.prompts.lock().unwrap().push(messages.to_vec());
        Ok(self.reply.clone())
    }
}

/// A therapist wired to recording doubles.
pub(crate) struct Harness {
    pub(crate) therapist: Arc<Therapist>,
    pub(crate) log: CallLog,
    pub(crate) model: Arc<RecordingModel>,
}

/// Build a harness. `verdict = None` makes the sarcasm stage fail.
pub(crate) fn harness(
    verdict: Option<SarcasmVerdict>,
    scores: &[(&str, f64)],
    reply: &str,
) -> Harness {
    let log = CallLog::default();
    let detector = RecordingDetector {
        log: log.clone(),
        verdict,
    };
    let classifier = RecordingClassifier {
        log: log.clone(),
        scores: scores
            .iter()
            .map(|(label, score)| EmotionScore::new(*label, *score))
            .collect(),
    };
    let model = Arc::new(RecordingModel {
        log: log.clone(),
        reply: reply.to_owned(),
        prompts: Mutex::new(Vec::new()),
    });

    let therapist = Therapist::new(
        Arc::new(detector),
        EmotionResolver::new(Arc::new(classifier)),
        model.clone(),
    );

    Harness {
        therapist: Arc::new(therapist),
        log,
        model,
    }
}

/// Sincere verdict used by most scenarios.
pub(crate) fn sincere() -> Option<SarcasmVerdict> {
    Some(SarcasmVerdict::new(false, "The statement reads as sincere."))
}

/// Sarcastic verdict used by sarcasm scenarios.
pub(crate) fn sarcastic() -> Option<SarcasmVerdict> {
    Some(SarcasmVerdict::new(true, "Praise paired with a clearly bad outcome."))
}
