//! Stepwise library crate (used by the CLI binary and integration tests).
//!
//! Matches a free-text question against a corpus of step-by-step instructions and
//! returns the single best instruction plus a short recommendation.
//!
//! # Public API Surface
//!
//! ## Facade
//! - [`Assistant`], [`QueryOptions`], [`AnswerResponse`] - Load a corpus, answer questions
//! - [`Config`], [`ConfigError`] - Environment-backed settings
//!
//! ## Retrieval
//! - [`EmbeddingIndex`], [`IndexKind`], [`choose_index_kind`] - Flat / inverted-file vector index
//! - [`HybridRanker`], [`SearchResult`] - Vector stage + judge stage with score fusion
//! - [`RelevanceJudge`], [`Judgment`], [`JudgeOutcome`] - External relevance scoring
//! - [`ResponseComposer`] - User-facing recommendation text
//!
//! ## Backends
//! - [`Embedder`], [`SentenceEmbedder`] - Local sentence embeddings (with a stub mode)
//! - [`TextGenerator`], [`ChatCompletionClient`] - OpenAI-compatible chat completions
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod assistant;
pub mod compose;
pub mod config;
pub mod constants;
pub mod embedding;
pub mod generation;
pub mod index;
pub mod judge;
pub mod ranking;
pub mod record;

pub use assistant::{
    AnswerResponse, AnswerStatus, Assistant, AssistantError, IndexSource, QueryOptions,
};
pub use compose::ResponseComposer;
pub use config::{Config, ConfigError};
pub use constants::fuse_scores;
#[cfg(any(test, feature = "mock"))]
pub use embedding::MockEmbedder;
pub use embedding::{Embedder, EmbedderConfig, EmbeddingError, SentenceEmbedder};
#[cfg(any(test, feature = "mock"))]
pub use generation::MockTextGenerator;
pub use generation::{ChatCompletionClient, GenerationError, GeneratorConfig, TextGenerator};
pub use index::{EmbeddingIndex, IndexError, IndexKind, Normalization, choose_index_kind};
pub use judge::{JudgeOutcome, Judgment, RelevanceJudge, parse_judgment};
pub use ranking::{
    Candidate, HybridRanker, RankerConfig, RankingError, SearchParams, SearchResult,
    SearchStatus,
};
pub use record::{InstructionRecord, RecordError, parse_corpus};
