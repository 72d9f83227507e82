//! Language-model completion configuration.

use crate::core::errors::{AuditError, AuditResult};
use serde::{Deserialize, Serialize};

/// Settings for the chat-completion service used by the audit step.
#[derive(Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Base URL of an OpenAI-compatible API.
    /// Default: "https://api.openai.com/v1"
    #[serde(default = "CompletionConfig::default_base_url")]
    pub base_url: String,

    /// Bearer token sent with every request.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Model identifier.
    /// Default: "gpt-4o"
    #[serde(default = "CompletionConfig::default_model")]
    pub model: String,

    /// Sampling temperature.
    /// Default: 0.3
    #[serde(default = "CompletionConfig::default_temperature")]
    pub temperature: f32,

    /// Maximum number of tokens in the generated report.
    /// Default: 2000
    #[serde(default = "CompletionConfig::default_max_tokens")]
    pub max_tokens: u32,

    /// Upper bound for a single completion call, in seconds.
    /// Default: 120
    #[serde(default = "CompletionConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl CompletionConfig {
    /// Create a new CompletionConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the API key.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    /// Set the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the token limit.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the per-call timeout.
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Checks that the settings can produce a working client.
    pub fn validate(&self) -> AuditResult<()> {
        if self.api_key.as_deref().is_none_or(str::is_empty) {
            return Err(AuditError::missing_setting("api_key", "completion config"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(AuditError::Config {
                message: format!(
                    "temperature must be within [0, 2], got {}",
                    self.temperature
                ),
            });
        }
        if self.max_tokens == 0 {
            return Err(AuditError::Config {
                message: "max_tokens must be positive".to_string(),
            });
        }
        Ok(())
    }

    fn default_base_url() -> String {
        "https://api.openai.com/v1".to_string()
    }

    fn default_model() -> String {
        "gpt-4o".to_string()
    }

    fn default_temperature() -> f32 {
        0.3
    }

    fn default_max_tokens() -> u32 {
        2000
    }

    fn default_timeout_secs() -> u64 {
        120
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            api_key: None,
            model: Self::default_model(),
            temperature: Self::default_temperature(),
            max_tokens: Self::default_max_tokens(),
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}

impl std::fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
