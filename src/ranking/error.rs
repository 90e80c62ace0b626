use thiserror::Error;

use crate::index::IndexError;

/// Errors raised by the hybrid ranker.
///
/// Judge failures never surface here; they are folded into zero-score judgments.
#[derive(Debug, Error)]
pub enum RankingError {
    /// Building the vector index failed.
    #[error("failed to build vector index: {0}")]
    IndexBuild(#[source] IndexError),

    /// The vector stage failed at query time.
    #[error("vector search failed: {0}")]
    VectorSearch(#[source] IndexError),

    /// Ranker settings are unusable.
    #[error("invalid ranker config: {reason}")]
    InvalidConfig { reason: String },
}
