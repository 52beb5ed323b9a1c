//! Secret redaction for credentials held in memory.
//!
//! ```rust
//! use empath::llm::redact::RedactedString;
//!
//! let api_key = RedactedString::new("sk-1234567890abcdef");
//! assert_eq!(format!("{api_key}"), "[REDACTED]");
//! assert_eq!(api_key.as_str(), "sk-1234567890abcdef");
//! ```

use std::fmt;

/// A string wrapper that redacts its value in Display and Debug output.
///
/// The only way to read the value is [`as_str`](RedactedString::as_str).
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RedactedString {
    inner: String,
}

impl RedactedString {
    /// Create a new redacted string.
    pub fn new<S: Into<String>>(value: S) -> Self {
        Self {
            inner: value.into(),
        }
    }

    /// Access the inner value, e.g. to build an `Authorization` header.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Whether no secret was supplied.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl fmt::Display for RedactedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl fmt::Debug for RedactedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RedactedString(\"[REDACTED]\")")
    }
}

impl From<String> for RedactedString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for RedactedString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
