//! The assistant facade: corpus lifecycle plus `answer_question`.
//!
//! ```text
//! NEW -> VECTOR_SEARCH -> (empty) NO_MATCH
//!                      -> JUDGE_EVALUATION -> (none passes) NO_MATCH
//!                                          -> SUCCESS -> (optional) RECOMMENDATION
//! ```

mod error;
mod response;


pub use error::AssistantError;
pub use response::{AnswerResponse, AnswerStatus, QueryOptions};

use std::path::Path;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::compose::ResponseComposer;
use crate::config::Config;
use crate::embedding::{Embedder, EmbeddingError, SentenceEmbedder};
use crate::generation::{ChatCompletionClient, TextGenerator};
use crate::index::{EmbeddingIndex, artifacts_exist};
use crate::judge::RelevanceJudge;
use crate::ranking::HybridRanker;
use crate::record::InstructionRecord;

pub const NOT_LOADED_MESSAGE: &str = "No instructions loaded; call load() first";

/// Where [`Assistant::load_or_restore`] took the vector index from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexSource {
    /// Saved artifacts held exactly the given corpus.
    Restored,
    /// Built from the corpus and written over the artifacts.
    Built,
}

/// Answers questions against a loaded instruction corpus.
#[derive(Debug)]
pub struct Assistant {
    ranker: HybridRanker,
    composer: ResponseComposer,
    corpus: Vec<InstructionRecord>,
}

impl Assistant {
    pub fn new(ranker: HybridRanker, composer: ResponseComposer) -> Self {
        Self {
            ranker,
            composer,
            corpus: Vec::new(),
        }
    }

    /// Wires every service from `config`.
    ///
    /// Fails when vector search is on and the embedding backend is missing or cannot
    /// be created.
    pub fn from_config(config: &Config) -> Result<Self, AssistantError> {
        config.validate()?;
        let embedder_config = config
            .vector_search
            .then(|| config.embedder())
            .transpose()?;

        let judge_client: Arc<dyn TextGenerator> =
            Arc::new(ChatCompletionClient::new(config.judge_generator())?);
        let composer_client: Arc<dyn TextGenerator> = if config.composer_model == config.judge_model
        {
            Arc::clone(&judge_client)
        } else {
            Arc::new(ChatCompletionClient::new(config.composer_generator())?)
        };

        let ranker_config = config.ranker();
        ranker_config.validate()?;
        let mut ranker = HybridRanker::new(RelevanceJudge::new(judge_client)).with_config(ranker_config);

        if let Some(embedder_config) = embedder_config {
            let embedder = SentenceEmbedder::load(embedder_config)?;
            ranker = ranker.with_index(EmbeddingIndex::new(
                Arc::new(embedder),
                config.normalization(),
            ));
        }

        info!(
            vector_search = config.vector_search,
            judge_model = %config.judge_model,
            composer_model = %config.composer_model,
            "Assistant initialized"
        );
        Ok(Self::new(ranker, ResponseComposer::new(composer_client)))
    }

    /// Replaces the corpus, rebuilding the vector index first when vector search is on.
    ///
    /// On failure the previous corpus and index stay in place.
    pub fn load(&mut self, corpus: Vec<InstructionRecord>) -> Result<(), AssistantError> {
        if self.ranker.uses_vector_search() {
            info!(records = corpus.len(), "Building vector index");
        }
        self.ranker.build_index(&corpus)?;
        self.corpus = corpus;
        info!(records = self.corpus.len(), "Instructions loaded");
        Ok(())
    }

    pub fn corpus(&self) -> &[InstructionRecord] {
        &self.corpus
    }

    pub fn is_loaded(&self) -> bool {
        !self.corpus.is_empty()
    }

    pub fn ranker(&self) -> &HybridRanker {
        &self.ranker
    }

    pub async fn answer_question(&self, query: &str, options: &QueryOptions) -> AnswerResponse {
        if self.corpus.is_empty() {
            return AnswerResponse::error(query, NOT_LOADED_MESSAGE);
        }

        info!(query_len = query.len(), "Answering question");

        let result = match self
            .ranker
            .search_hybrid(query, &self.corpus, &options.search_params())
            .await
        {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, "Hybrid search failed");
                return AnswerResponse::error(query, format!("Search failed: {e}"));
            }
        };

        let recommendation = if options.include_recommendation && result.is_success() {
            Some(self.composer.compose(query, &result).await)
        } else {
            None
        };

        let mut response = AnswerResponse::from(result);
        response.recommendation = recommendation;

        info!(
            status = ?response.status,
            search_time_ms = response.search_time_ms,
            "Question answered"
        );
        response
    }

    /// Persists the vector index under `prefix`.
    pub fn save_index(&self, prefix: impl AsRef<Path>) -> Result<(), AssistantError> {
        let index = self
            .ranker
            .index()
            .ok_or(AssistantError::VectorSearchDisabled { operation: "save" })?;
        index.save(prefix)?;
        Ok(())
    }

    /// Restores an index saved with [`save_index`](Self::save_index), re-creating the
    /// sentence embedder named in the artifacts. The restored records become the corpus.
    pub fn load_index(&mut self, prefix: impl AsRef<Path>) -> Result<(), AssistantError> {
        self.load_index_with(prefix, sentence_embedder)
    }

    /// Like [`load_index`](Self::load_index) with a caller-supplied embedder factory.
    pub fn load_index_with<F>(
        &mut self,
        prefix: impl AsRef<Path>,
        make_embedder: F,
    ) -> Result<(), AssistantError>
    where
        F: FnOnce(&str) -> Result<Arc<dyn Embedder>, EmbeddingError>,
    {
        if !self.ranker.uses_vector_search() {
            return Err(AssistantError::VectorSearchDisabled { operation: "load" });
        }

        let index = EmbeddingIndex::restore(prefix, make_embedder)?;
        self.corpus = index.records().to_vec();
        self.ranker.replace_index(index);
        info!(records = self.corpus.len(), "Instructions restored from index");
        Ok(())
    }

    /// Loads `corpus`, reusing the index saved under `prefix` only when its records are
    /// exactly `corpus`. A changed corpus or unreadable artifacts trigger a rebuild whose
    /// result is saved under `prefix`.
    pub fn load_or_restore(
        &mut self,
        corpus: Vec<InstructionRecord>,
        prefix: impl AsRef<Path>,
    ) -> Result<IndexSource, AssistantError> {
        self.load_or_restore_with(corpus, prefix, sentence_embedder)
    }

    /// Like [`load_or_restore`](Self::load_or_restore) with a caller-supplied embedder
    /// factory for the restore attempt.
    pub fn load_or_restore_with<F>(
        &mut self,
        corpus: Vec<InstructionRecord>,
        prefix: impl AsRef<Path>,
        make_embedder: F,
    ) -> Result<IndexSource, AssistantError>
    where
        F: FnOnce(&str) -> Result<Arc<dyn Embedder>, EmbeddingError>,
    {
        let prefix = prefix.as_ref();
        if !self.ranker.uses_vector_search() {
            return Err(AssistantError::VectorSearchDisabled { operation: "load" });
        }

        if artifacts_exist(prefix) {
            match EmbeddingIndex::restore(prefix, make_embedder) {
                Ok(index) if index.records() == corpus.as_slice() => {
                    self.ranker.replace_index(index);
                    self.corpus = corpus;
                    info!(
                        prefix = %prefix.display(),
                        records = self.corpus.len(),
                        "Saved index matches corpus, restored"
                    );
                    return Ok(IndexSource::Restored);
                }
                Ok(index) => warn!(
                    prefix = %prefix.display(),
                    saved = index.len(),
                    current = corpus.len(),
                    "Saved index does not match corpus, rebuilding"
                ),
                Err(e) => warn!(
                    prefix = %prefix.display(),
                    error = %e,
                    "Saved index unreadable, rebuilding"
                ),
            }
        }

        self.load(corpus)?;
        if self.is_loaded() {
            self.save_index(prefix)?;
        }
        Ok(IndexSource::Built)
    }
}

fn sentence_embedder(model_id: &str) -> Result<Arc<dyn Embedder>, EmbeddingError> {
    Ok(Arc::new(SentenceEmbedder::from_model_id(model_id)?))
}
