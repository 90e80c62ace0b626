//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `STEPWISE_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_CHAT_COMPLETIONS_URL, DEFAULT_EMBEDDING_DIM, DEFAULT_JUDGE_MODEL,
    DEFAULT_MIN_SIMILARITY, DEFAULT_REQUEST_TIMEOUT_SECS,
};
use crate::embedding::EmbedderConfig;
use crate::generation::GeneratorConfig;
use crate::index::Normalization;
use crate::ranking::RankerConfig;

/// Assistant configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `STEPWISE_*` overrides on top of defaults.
#[derive(Clone, PartialEq)]
pub struct Config {
    /// Bearer token for the chat-completion service. Default: empty.
    pub api_key: String,

    /// Chat-completion endpoint. Default: OpenRouter.
    pub judge_url: String,

    /// Model used by the relevance judge.
    pub judge_model: String,

    /// Model used for recommendations. Default: same as `judge_model`.
    pub composer_model: String,

    /// Per-request timeout for judge and composer calls. Default: `120`.
    pub request_timeout_secs: u64,

    /// Sentence-embedding model directory. Required while vector search is on,
    /// unless `embedding_stub` is set.
    pub embedding_model_path: Option<PathBuf>,

    /// Uses the hash-based stub embedder instead of a model. Default: `false`.
    pub embedding_stub: bool,

    /// Stub embedder dimension. Default: `384`.
    pub embedding_dim: usize,

    /// Enables the vector stage. Default: `true`.
    pub vector_search: bool,

    /// Cosine (`true`) or Euclidean similarity. Default: `true`.
    pub cosine: bool,

    /// Vector-stage similarity floor. Default: `0.3`.
    pub min_similarity: f32,

    /// Path prefix for persisted index artifacts.
    pub index_path: Option<PathBuf>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &if self.api_key.is_empty() { "" } else { "<redacted>" })
            .field("judge_url", &self.judge_url)
            .field("judge_model", &self.judge_model)
            .field("composer_model", &self.composer_model)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("embedding_model_path", &self.embedding_model_path)
            .field("embedding_stub", &self.embedding_stub)
            .field("embedding_dim", &self.embedding_dim)
            .field("vector_search", &self.vector_search)
            .field("cosine", &self.cosine)
            .field("min_similarity", &self.min_similarity)
            .field("index_path", &self.index_path)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            judge_url: DEFAULT_CHAT_COMPLETIONS_URL.to_string(),
            judge_model: DEFAULT_JUDGE_MODEL.to_string(),
            composer_model: DEFAULT_JUDGE_MODEL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            embedding_model_path: None,
            embedding_stub: false,
            embedding_dim: DEFAULT_EMBEDDING_DIM,
            vector_search: true,
            cosine: true,
            min_similarity: DEFAULT_MIN_SIMILARITY,
            index_path: None,
        }
    }
}

impl Config {
    const ENV_API_KEY: &'static str = "STEPWISE_API_KEY";
    const ENV_JUDGE_URL: &'static str = "STEPWISE_JUDGE_URL";
    const ENV_JUDGE_MODEL: &'static str = "STEPWISE_JUDGE_MODEL";
    const ENV_COMPOSER_MODEL: &'static str = "STEPWISE_COMPOSER_MODEL";
    const ENV_REQUEST_TIMEOUT_SECS: &'static str = "STEPWISE_REQUEST_TIMEOUT_SECS";
    const ENV_EMBEDDING_MODEL_PATH: &'static str = "STEPWISE_EMBEDDING_MODEL_PATH";
    const ENV_EMBEDDING_STUB: &'static str = "STEPWISE_EMBEDDING_STUB";
    const ENV_EMBEDDING_DIM: &'static str = "STEPWISE_EMBEDDING_DIM";
    const ENV_VECTOR_SEARCH: &'static str = "STEPWISE_VECTOR_SEARCH";
    const ENV_COSINE: &'static str = "STEPWISE_COSINE";
    const ENV_MIN_SIMILARITY: &'static str = "STEPWISE_MIN_SIMILARITY";
    const ENV_INDEX_PATH: &'static str = "STEPWISE_INDEX_PATH";

    /// Every variable read by [`Config::from_env`].
    pub const ENV_VARS: [&'static str; 12] = [
        Self::ENV_API_KEY,
        Self::ENV_JUDGE_URL,
        Self::ENV_JUDGE_MODEL,
        Self::ENV_COMPOSER_MODEL,
        Self::ENV_REQUEST_TIMEOUT_SECS,
        Self::ENV_EMBEDDING_MODEL_PATH,
        Self::ENV_EMBEDDING_STUB,
        Self::ENV_EMBEDDING_DIM,
        Self::ENV_VECTOR_SEARCH,
        Self::ENV_COSINE,
        Self::ENV_MIN_SIMILARITY,
        Self::ENV_INDEX_PATH,
    ];

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let api_key = Self::parse_string_from_env(Self::ENV_API_KEY, defaults.api_key);
        let judge_url = Self::parse_string_from_env(Self::ENV_JUDGE_URL, defaults.judge_url);
        let judge_model = Self::parse_string_from_env(Self::ENV_JUDGE_MODEL, defaults.judge_model);
        let composer_model =
            Self::parse_string_from_env(Self::ENV_COMPOSER_MODEL, judge_model.clone());
        let request_timeout_secs = Self::parse_number_from_env(
            Self::ENV_REQUEST_TIMEOUT_SECS,
            defaults.request_timeout_secs,
        )?;
        let embedding_model_path = Self::parse_optional_path_from_env(Self::ENV_EMBEDDING_MODEL_PATH);
        let embedding_stub =
            Self::parse_bool_from_env(Self::ENV_EMBEDDING_STUB, defaults.embedding_stub)?;
        let embedding_dim =
            Self::parse_number_from_env(Self::ENV_EMBEDDING_DIM, defaults.embedding_dim)?;
        let vector_search = Self::parse_bool_from_env(Self::ENV_VECTOR_SEARCH, defaults.vector_search)?;
        let cosine = Self::parse_bool_from_env(Self::ENV_COSINE, defaults.cosine)?;
        let min_similarity =
            Self::parse_number_from_env(Self::ENV_MIN_SIMILARITY, defaults.min_similarity)?;
        let index_path = Self::parse_optional_path_from_env(Self::ENV_INDEX_PATH);

        Ok(Self {
            api_key,
            judge_url,
            judge_model,
            composer_model,
            request_timeout_secs,
            embedding_model_path,
            embedding_stub,
            embedding_dim,
            vector_search,
            cosine,
            min_similarity,
            index_path,
        })
    }

    /// Validates paths and basic invariants (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_REQUEST_TIMEOUT_SECS,
                reason: "must be at least 1 second".to_string(),
            });
        }

        if self.embedding_dim == 0 {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_EMBEDDING_DIM,
                reason: "must be positive".to_string(),
            });
        }

        if !(0.0..=1.0).contains(&self.min_similarity) {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_MIN_SIMILARITY,
                reason: format!("{} is not within [0, 1]", self.min_similarity),
            });
        }

        if let Some(ref path) = self.embedding_model_path {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_dir() {
                return Err(ConfigError::NotADirectory { path: path.clone() });
            }
        }

        if let Some(parent) = self
            .index_path
            .as_deref()
            .and_then(|p| p.parent())
            .filter(|p| !p.as_os_str().is_empty())
            && parent.exists()
            && !parent.is_dir()
        {
            return Err(ConfigError::NotADirectory {
                path: parent.to_path_buf(),
            });
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Client settings for the relevance judge.
    pub fn judge_generator(&self) -> GeneratorConfig {
        self.generator_for(&self.judge_model)
    }

    /// Client settings for the response composer.
    pub fn composer_generator(&self) -> GeneratorConfig {
        self.generator_for(&self.composer_model)
    }

    /// Embedder settings. A model directory wins over the stub opt-in; with neither
    /// there is no embedding backend.
    pub fn embedder(&self) -> Result<EmbedderConfig, ConfigError> {
        match &self.embedding_model_path {
            Some(path) => Ok(EmbedderConfig::new(path.clone())),
            None if self.embedding_stub => Ok(EmbedderConfig::stub(self.embedding_dim)),
            None => Err(ConfigError::MissingEmbeddingModel {
                name: Self::ENV_EMBEDDING_MODEL_PATH,
                stub_name: Self::ENV_EMBEDDING_STUB,
            }),
        }
    }

    pub fn ranker(&self) -> RankerConfig {
        RankerConfig::default().with_min_similarity(self.min_similarity)
    }

    pub fn normalization(&self) -> Normalization {
        if self.cosine {
            Normalization::Cosine
        } else {
            Normalization::Euclidean
        }
    }

    fn generator_for(&self, model: &str) -> GeneratorConfig {
        GeneratorConfig::new(self.api_key.clone())
            .with_endpoint(self.judge_url.clone())
            .with_model(model)
            .with_timeout(self.request_timeout())
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(default)
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    fn parse_number_from_env<T>(var_name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match env::var(var_name) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidNumber {
                    name: var_name,
                    value: value.clone(),
                    reason: e.to_string(),
                }),
            Err(_) => Ok(default),
        }
    }

    fn parse_bool_from_env(var_name: &'static str, default: bool) -> Result<bool, ConfigError> {
        match env::var(var_name) {
            Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => Err(ConfigError::InvalidBool {
                    name: var_name,
                    value,
                }),
            },
            Err(_) => Ok(default),
        }
    }
}
