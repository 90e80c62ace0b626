//! Embedding backends.
//!
//! - [`Embedder`] is the seam the index builds against.
//! - [`sentence`] provides the local BERT sentence embedder (with a stub mode).

/// BERT sentence encoder with mean pooling.
pub mod bert;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
/// Sentence embedder.
pub mod sentence;
/// Tokenizer loading helpers.
pub mod utils;

pub use error::EmbeddingError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockEmbedder;
pub use sentence::{EmbedderConfig, SENTENCE_EMBEDDING_DIM, SentenceEmbedder};

/// Turns text into dense vectors.
///
/// Implementations must return exactly one vector per input, all of
/// [`dimension`](Embedder::dimension) length.
pub trait Embedder: Send + Sync {
    /// Identifier persisted with an index so the same backend can be re-created.
    fn model_id(&self) -> &str;

    /// Output vector length.
    fn dimension(&self) -> usize;

    /// Embeds a batch of inputs in one call.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Embeds a single input.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let vectors = self.embed_batch(&[text])?;
        if vectors.len() != 1 {
            return Err(EmbeddingError::BatchSizeMismatch {
                expected: 1,
                actual: vectors.len(),
            });
        }
        Ok(vectors.into_iter().next().unwrap_or_default())
    }
}
