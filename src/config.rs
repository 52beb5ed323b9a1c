//! Configuration for the chat backend.
//!
//! Loaded from TOML; every field has a default so a missing file, or a file
//! with only a few keys, is valid. Secrets never live in the file: each
//! upstream names the environment variable its API key is read from.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::emotion::huggingface;
use crate::error::{EmpathError, Result};
use crate::llm::openai;
use crate::llm::provider::RequestOptions;
use crate::llm::redact::RedactedString;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmpathConfig {
    /// HTTP transport settings.
    pub server: ServerConfig,
    /// Chat-model provider shared by the sarcasm and reply stages.
    pub llm: LlmConfig,
    /// Reply generation settings.
    pub reply: ReplyConfig,
    /// Sarcasm classification settings.
    pub sarcasm: SarcasmConfig,
    /// Emotion classification and resolution settings.
    pub emotion: EmotionConfig,
}

/// HTTP transport configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind host.
    pub host: String,
    /// Bind port (0 = auto-assign).
    pub port: u16,
    /// Allowed CORS origins. Empty allows any origin.
    pub cors_allowed_origins: Vec<String>,
    /// Include internal error text in 500 responses. Development only.
    pub expose_error_details: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8000,
            cors_allowed_origins: Vec::new(),
            expose_error_details: false,
        }
    }
}

/// OpenAI-compatible provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider base URL.
    pub base_url: String,
    /// Model used for both stages unless overridden.
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: openai::DEFAULT_BASE_URL.to_owned(),
            model: "deepseek-reasoner".to_owned(),
            api_key_env: "EMPATH_LLM_API_KEY".to_owned(),
            request_timeout_secs: 60,
        }
    }
}

impl LlmConfig {
    /// Read the API key from the configured environment variable.
    pub fn resolve_api_key(&self) -> Option<RedactedString> {
        read_secret(&self.api_key_env)
    }

    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Reply generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplyConfig {
    /// Sampling temperature.
    pub temperature: f64,
    /// Maximum reply tokens.
    pub max_tokens: usize,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            temperature: 0.6,
            max_tokens: 200,
        }
    }
}

impl ReplyConfig {
    /// Request options for the reply call.
    pub fn request_options(&self) -> RequestOptions {
        RequestOptions::new()
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens)
    }
}

/// Sarcasm classification settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SarcasmConfig {
    /// Sampling temperature (0 for repeatable verdicts).
    pub temperature: f64,
    /// Use a different model than `llm.model` for classification.
    pub model: Option<String>,
}

impl SarcasmConfig {
    /// Request options for the sarcasm call.
    pub fn request_options(&self) -> RequestOptions {
        RequestOptions::new().with_temperature(self.temperature)
    }
}

/// Emotion classifier and resolution settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmotionConfig {
    /// Inference API base URL.
    pub base_url: String,
    /// Classifier model ID.
    pub model_id: String,
    /// Environment variable holding the access token.
    pub api_key_env: String,
    /// A `neutral` top label below this score is overridden.
    pub threshold: f64,
    /// Whether low-confidence `neutral` may be overridden.
    pub exclude_neutral: bool,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for EmotionConfig {
    fn default() -> Self {
        Self {
            base_url: huggingface::DEFAULT_BASE_URL.to_owned(),
            model_id: huggingface::DEFAULT_MODEL_ID.to_owned(),
            api_key_env: "EMPATH_EMOTION_API_KEY".to_owned(),
            threshold: 0.5,
            exclude_neutral: true,
            request_timeout_secs: 30,
        }
    }
}

impl EmotionConfig {
    /// Read the access token from the configured environment variable.
    pub fn resolve_api_key(&self) -> Option<RedactedString> {
        read_secret(&self.api_key_env)
    }

    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn read_secret(var: &str) -> Option<RedactedString> {
    std::env::var(var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(RedactedString::new)
}

impl EmpathConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| EmpathError::Config(e.to_string()))
    }

    /// Like [`from_file`](Self::from_file), but a missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| EmpathError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values that would make the pipeline misbehave.
    ///
    /// # Errors
    ///
    /// Returns [`EmpathError::Config`] describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.emotion.threshold) {
            return Err(EmpathError::Config(format!(
                "emotion.threshold must be within 0..=1, got {}",
                self.emotion.threshold
            )));
        }
        let required = [
            ("llm.base_url", &self.llm.base_url),
            ("llm.model", &self.llm.model),
            ("emotion.base_url", &self.emotion.base_url),
            ("emotion.model_id", &self.emotion.model_id),
            ("server.host", &self.server.host),
        ];
        if let Some((name, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(EmpathError::Config(format!("{name} must not be empty")));
        }
        if self.sarcasm.model.as_deref().is_some_and(|m| m.trim().is_empty()) {
            return Err(EmpathError::Config(
                "sarcasm.model must not be empty when set".into(),
            ));
        }
        if self.reply.max_tokens == 0 {
            return Err(EmpathError::Config("reply.max_tokens must be positive".into()));
        }
        let timeouts = [
            ("llm.request_timeout_secs", self.llm.request_timeout_secs),
            ("emotion.request_timeout_secs", self.emotion.request_timeout_secs),
        ];
        if let Some((name, _)) = timeouts.iter().find(|(_, secs)| *secs == 0) {
            return Err(EmpathError::Config(format!("{name} must be positive")));
        }
        Ok(())
    }

    /// Returns the default config file path: `<config dir>/empath/config.toml`.
    ///
    /// `EMPATH_CONFIG_DIR` overrides the directory.
    pub fn default_config_path() -> PathBuf {
        let dir = match std::env::var_os("EMPATH_CONFIG_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::config_dir()
                .map(|d| d.join("empath"))
                .unwrap_or_else(|| PathBuf::from("/tmp/empath-config")),
        };
        dir.join("config.toml")
    }
}
