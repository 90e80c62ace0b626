use thiserror::Error;

use crate::config::ConfigError;
use crate::embedding::EmbeddingError;
use crate::generation::GenerationError;
use crate::index::IndexError;
use crate::ranking::RankingError;

/// Errors raised while wiring or maintaining the assistant.
///
/// Query-time failures are reported inside [`AnswerResponse`](super::AnswerResponse)
/// with `status = error` instead.
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The embedding backend could not be created.
    #[error("embedding backend unavailable: {0}")]
    Embedding(#[from] EmbeddingError),

    /// A generation client could not be created.
    #[error("generation client unavailable: {0}")]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Ranking(#[from] RankingError),

    #[error(transparent)]
    Index(#[from] IndexError),

    /// Index persistence was requested while vector search is off.
    #[error("vector search is disabled; there is no index to {operation}")]
    VectorSearchDisabled { operation: &'static str },
}
