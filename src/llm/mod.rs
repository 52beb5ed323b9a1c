//! Chat-model plumbing shared by the sarcasm detector and the reply stage.
//!
//! - [`provider::ChatModel`]: the generation capability trait
//! - [`openai::OpenAiAdapter`]: OpenAI-compatible HTTP implementation
//! - [`message`]: role-tagged messages
//! - [`redact::RedactedString`]: keeps API keys out of logs

pub mod error;
pub mod message;
pub mod openai;
pub mod provider;
pub mod redact;

pub use error::LlmError;
pub use message::{Message, Role};
pub use openai::{OpenAiAdapter, OpenAiConfig};
pub use provider::{ChatModel, RequestOptions};
