//! Empath: sarcasm-aware empathetic chat backend.
//!
//! Each chat turn runs a fixed pipeline:
//! Message → sarcasm verdict → emotion resolution → reply prompt → reply
//!
//! # Architecture
//!
//! - **Sarcasm**: a generative model answers with a strict JSON verdict
//! - **Emotion**: a multi-label classifier scores every label; the resolver
//!   picks one, taking sarcasm into account
//! - **Therapy**: builds the persona prompt and asks the reply model
//! - **Server**: exposes the pipeline as `POST /api/chat` via `axum`

pub mod config;
pub mod emotion;
pub mod error;
pub mod llm;
pub mod sarcasm;
pub mod server;
pub mod startup;
pub mod therapy;

pub use config::EmpathConfig;
pub use emotion::{EmotionClassifier, EmotionResolver, EmotionScore, ResolvedEmotion};
pub use error::{EmpathError, Result};
pub use sarcasm::{SarcasmDetector, SarcasmVerdict};
pub use server::ChatServer;
pub use startup::build_therapist;
pub use therapy::{ChatTurnResult, HistoryEntry, Therapist};
