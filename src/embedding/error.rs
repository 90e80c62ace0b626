use std::path::PathBuf;
use thiserror::Error;

/// Failures while loading or running a sentence embedder.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// A required model file (config, weights or tokenizer) is missing.
    #[error("sentence model file missing: {path}")]
    ModelNotFound { path: PathBuf },

    #[error("could not load sentence model: {reason}")]
    ModelLoadFailed { reason: String },

    #[error("embedding inference failed: {reason}")]
    InferenceFailed { reason: String },

    #[error("could not tokenize input: {reason}")]
    TokenizationFailed { reason: String },

    #[error("invalid embedder configuration: {reason}")]
    InvalidConfig { reason: String },

    /// The backend returned a different number of vectors than inputs.
    #[error("embedder returned {actual} vectors for {expected} inputs")]
    BatchSizeMismatch { expected: usize, actual: usize },
}

impl From<candle_core::Error> for EmbeddingError {
    fn from(err: candle_core::Error) -> Self {
        Self::InferenceFailed {
            reason: err.to_string(),
        }
    }
}

impl From<std::io::Error> for EmbeddingError {
    fn from(err: std::io::Error) -> Self {
        Self::ModelLoadFailed {
            reason: err.to_string(),
        }
    }
}
