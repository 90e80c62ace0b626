use std::path::PathBuf;
use thiserror::Error;

use crate::embedding::EmbeddingError;

#[derive(Debug, Error)]
/// Errors returned by index build, search and persistence.
pub enum IndexError {
    /// The embedding backend failed.
    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    /// The backend returned the wrong number of vectors for a batch.
    #[error("embedder returned {actual} vectors for {expected} records")]
    BatchSizeMismatch { expected: usize, actual: usize },

    /// Vector lengths disagree with the index dimension.
    #[error("invalid vector dimension: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Persistence was requested before any build.
    #[error("index has not been built")]
    NotBuilt,

    /// A persisted artifact is missing.
    #[error("index artifact not found: {path}")]
    ArtifactNotFound { path: PathBuf },

    /// Reading or writing an artifact failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An artifact could not be encoded or decoded.
    #[error("failed to (de)serialize {path}: {reason}")]
    Serialization { path: PathBuf, reason: String },

    /// Restored artifacts disagree with each other.
    #[error("inconsistent index artifacts: {reason}")]
    Inconsistent { reason: String },
}

pub type IndexResult<T> = Result<T, IndexError>;
