use std::time::Duration;

use super::GenerationError;
use crate::constants::{
    DEFAULT_CHAT_COMPLETIONS_URL, DEFAULT_JUDGE_MODEL, DEFAULT_REQUEST_TIMEOUT_SECS,
};

/// Settings for an OpenAI-compatible chat-completion endpoint.
#[derive(Clone, PartialEq)]
pub struct GeneratorConfig {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for GeneratorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_CHAT_COMPLETIONS_URL.to_string(),
            api_key: String::new(),
            model: DEFAULT_JUDGE_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl GeneratorConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<(), GenerationError> {
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(GenerationError::InvalidConfig {
                reason: format!("endpoint must be an http(s) URL, got '{}'", self.endpoint),
            });
        }
        if self.model.trim().is_empty() {
            return Err(GenerationError::InvalidConfig {
                reason: "model must not be empty".to_string(),
            });
        }
        if self.timeout.is_zero() {
            return Err(GenerationError::InvalidConfig {
                reason: "timeout must be positive".to_string(),
            });
        }
        Ok(())
    }
}
