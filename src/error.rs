//! Error types for the empath chat pipeline.
//!
//! Each variant carries a stable error code (SCREAMING_SNAKE_CASE) that is
//! included in the Display output and accessible via [`EmpathError::code()`].
//! The transport layer uses the kind, never the message text, to decide what
//! the end user sees.

/// Stable error codes for programmatic error handling.
pub mod error_codes {
    /// Input rejected before any outbound call.
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";

    /// Emotion or sarcasm classifier backing call failed.
    pub const CLASSIFICATION_FAILED: &str = "CLASSIFICATION_FAILED";

    /// Sarcasm model returned output that is not the required JSON shape.
    pub const SARCASM_PARSE_FAILED: &str = "SARCASM_PARSE_FAILED";

    /// Reply generation call failed.
    pub const GENERATION_FAILED: &str = "GENERATION_FAILED";

    /// An outbound call exceeded its time budget.
    pub const TIMEOUT_ERROR: &str = "TIMEOUT_ERROR";

    /// Invalid or missing configuration.
    pub const CONFIG_INVALID: &str = "CONFIG_INVALID";

    /// Filesystem or socket I/O error.
    pub const IO_ERROR: &str = "IO_ERROR";
}

/// Top-level error type for the chat pipeline.
///
/// The Display impl formats as `[CODE] message`.
#[derive(Debug, thiserror::Error)]
pub enum EmpathError {
    /// Empty or otherwise invalid user input.
    #[error("[{}] {}", error_codes::VALIDATION_FAILED, .0)]
    Validation(String),

    /// A classifier's upstream call failed.
    #[error("[{}] {}", error_codes::CLASSIFICATION_FAILED, .0)]
    Classification(String),

    /// The sarcasm model answered with non-conforming output.
    #[error("[{}] {}", error_codes::SARCASM_PARSE_FAILED, .0)]
    SarcasmParse(String),

    /// The reply model call failed.
    #[error("[{}] {}", error_codes::GENERATION_FAILED, .0)]
    Generation(String),

    /// An outbound call timed out.
    #[error("[{}] {}", error_codes::TIMEOUT_ERROR, .0)]
    Timeout(String),

    /// Configuration error.
    #[error("[{}] {}", error_codes::CONFIG_INVALID, .0)]
    Config(String),

    /// I/O error.
    #[error("[{}] {}", error_codes::IO_ERROR, .0)]
    Io(#[from] std::io::Error),
}

impl EmpathError {
    /// Returns the stable error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => error_codes::VALIDATION_FAILED,
            Self::Classification(_) => error_codes::CLASSIFICATION_FAILED,
            Self::SarcasmParse(_) => error_codes::SARCASM_PARSE_FAILED,
            Self::Generation(_) => error_codes::GENERATION_FAILED,
            Self::Timeout(_) => error_codes::TIMEOUT_ERROR,
            Self::Config(_) => error_codes::CONFIG_INVALID,
            Self::Io(_) => error_codes::IO_ERROR,
        }
    }

    /// Whether the caller sent bad input, as opposed to an internal failure.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, EmpathError>;
