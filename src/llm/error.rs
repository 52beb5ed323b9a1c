//! Error types for chat-model providers.
//!
//! Provider errors stay provider-shaped here; the pipeline decides which
//! [`EmpathError`](crate::error::EmpathError) kind they become depending on
//! the stage that made the call.

/// Stable error codes for provider failures.
pub mod error_codes {
    /// Authentication failed (invalid/missing API key).
    pub const AUTH_FAILED: &str = "AUTH_FAILED";

    /// Request to the provider failed (network, rate limit).
    pub const REQUEST_FAILED: &str = "REQUEST_FAILED";

    /// The provider answered with a body we could not interpret.
    pub const RESPONSE_INVALID: &str = "RESPONSE_INVALID";

    /// Request timed out.
    pub const TIMEOUT_ERROR: &str = "TIMEOUT_ERROR";

    /// Provider-specific error not covered by other variants.
    pub const PROVIDER_ERROR: &str = "PROVIDER_ERROR";
}

/// Errors produced by chat-model providers.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// Authentication failed (invalid/missing API key).
    #[error("[{}] {}", error_codes::AUTH_FAILED, .0)]
    AuthError(String),

    /// Request to the provider failed.
    #[error("[{}] {}", error_codes::REQUEST_FAILED, .0)]
    RequestError(String),

    /// Response body did not contain a usable message.
    #[error("[{}] {}", error_codes::RESPONSE_INVALID, .0)]
    InvalidResponse(String),

    /// Request timed out.
    #[error("[{}] {}", error_codes::TIMEOUT_ERROR, .0)]
    TimeoutError(String),

    /// Provider-specific error (HTTP 5xx and friends).
    #[error("[{}] {}", error_codes::PROVIDER_ERROR, .0)]
    ProviderError(String),
}

impl LlmError {
    /// Returns the stable error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::AuthError(_) => error_codes::AUTH_FAILED,
            Self::RequestError(_) => error_codes::REQUEST_FAILED,
            Self::InvalidResponse(_) => error_codes::RESPONSE_INVALID,
            Self::TimeoutError(_) => error_codes::TIMEOUT_ERROR,
            Self::ProviderError(_) => error_codes::PROVIDER_ERROR,
        }
    }

    /// Map a `reqwest` transport error, keeping timeouts distinguishable.
    pub(crate) fn from_transport(provider: &str, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::TimeoutError(format!("{provider} request timed out: {err}"))
        } else {
            Self::RequestError(format!("{provider} request failed: {err}"))
        }
    }
}
