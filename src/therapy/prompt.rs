//! Reply prompt assembly.
//!
//! The reply model sees, in order: the persona instructions, a per-turn
//! context message describing the latest user message, the filtered
//! caller-supplied history, and finally the latest message itself.

use serde::{Deserialize, Serialize};

use crate::emotion::ResolvedEmotion;
use crate::llm::message::{Message, Role};
use crate::sarcasm::SarcasmVerdict;

/// Persona and response-style instructions.
pub const PERSONA_PROMPT: &str = "You are a compassionate therapist. \
Respond in no more than three sentences, validating the user's feelings and \
guiding them forward with an open-ended question. Review the conversation \
history provided to understand the context and avoid repeating previous \
advice or questions unless relevant for clarification.";

/// One caller-supplied history entry.
///
/// Entries are accepted loosely from the wire; [`HistoryEntry::to_message`]
/// decides whether an entry makes it into the prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// `"user"` or `"assistant"`; anything else is dropped.
    #[serde(default)]
    pub role: String,
    /// Message text; missing or blank entries are dropped.
    #[serde(default)]
    pub content: Option<String>,
}

impl HistoryEntry {
    /// A user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: Some(content.into()),
        }
    }

    /// An assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".into(),
            content: Some(content.into()),
        }
    }

    /// Convert to a prompt message, or `None` when the entry is not a
    /// well-formed conversation turn.
    pub fn to_message(&self) -> Option<Message> {
        let role = Role::parse_turn(&self.role)?;
        let content = self.content.as_deref()?;
        if content.trim().is_empty() {
            return None;
        }
        Some(Message::text(role, content))
    }
}

/// Context for the latest user message only.
pub fn turn_context(emotion: &ResolvedEmotion, sarcasm: &SarcasmVerdict) -> String {
    format!(
        "Context for the LATEST user message (the one you are about to respond to): \
         User's emotional tone is '{}' ({:.1}%). \
         Sarcasm detected in latest message: {}. Reason for sarcasm: {}.",
        emotion.label, emotion.confidence, sarcasm.is_sarcastic, sarcasm.reason
    )
}

/// Assemble the full reply prompt.
pub fn build_reply_messages(
    message: &str,
    emotion: &ResolvedEmotion,
    sarcasm: &SarcasmVerdict,
    history: &[HistoryEntry],
) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len() + 3);
    messages.push(Message::system(PERSONA_PROMPT));
    messages.push(Message::system(turn_context(emotion, sarcasm)));
    messages.extend(history.iter().filter_map(HistoryEntry::to_message));
    messages.push(Message::user(message));
    messages
}
