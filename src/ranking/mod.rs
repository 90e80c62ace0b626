//! Two-stage hybrid retrieval.
//!
//! Stage 1 asks the vector index for a wide, cheap candidate list. Stage 2 sends
//! only the first `llm_top_k` candidates to the relevance judge and fuses both
//! scores. A candidate becomes the running best when its fused score beats the
//! current best *and* its raw judge score meets `min_relevance`.

mod error;
mod result;


pub use error::RankingError;
pub use result::{Candidate, SearchParams, SearchResult, SearchStatus};

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::constants::{DEFAULT_MIN_SIMILARITY, NEUTRAL_SIMILARITY, fuse_scores};
use crate::index::EmbeddingIndex;
use crate::judge::{Judgment, RelevanceJudge};
use crate::record::InstructionRecord;

/// Ranker settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankerConfig {
    /// Vector-stage candidates below this similarity are dropped.
    pub min_similarity: f32,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            min_similarity: DEFAULT_MIN_SIMILARITY,
        }
    }
}

impl RankerConfig {
    pub fn with_min_similarity(mut self, min_similarity: f32) -> Self {
        self.min_similarity = min_similarity;
        self
    }

    pub fn validate(&self) -> Result<(), RankingError> {
        if !(0.0..=1.0).contains(&self.min_similarity) {
            return Err(RankingError::InvalidConfig {
                reason: format!(
                    "min_similarity must be within [0, 1], got {}",
                    self.min_similarity
                ),
            });
        }
        Ok(())
    }
}

/// Vector search + judge reranking.
///
/// Vector search is enabled exactly when an [`EmbeddingIndex`] is attached.
#[derive(Debug)]
pub struct HybridRanker {
    index: Option<EmbeddingIndex>,
    judge: RelevanceJudge,
    config: RankerConfig,
}

struct BestCandidate<'a> {
    record: &'a InstructionRecord,
    judgment: Judgment,
    combined: f32,
}

impl HybridRanker {
    /// Ranker without vector search: every corpus record is judged with neutral similarity.
    pub fn new(judge: RelevanceJudge) -> Self {
        Self {
            index: None,
            judge,
            config: RankerConfig::default(),
        }
    }

    pub fn with_index(mut self, index: EmbeddingIndex) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_config(mut self, config: RankerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn uses_vector_search(&self) -> bool {
        self.index.is_some()
    }

    pub fn index(&self) -> Option<&EmbeddingIndex> {
        self.index.as_ref()
    }

    /// Swaps in a different index (e.g. one restored from disk).
    pub fn replace_index(&mut self, index: EmbeddingIndex) -> Option<EmbeddingIndex> {
        self.index.replace(index)
    }

    pub fn config(&self) -> &RankerConfig {
        &self.config
    }

    /// Rebuilds the vector index from `corpus`; a no-op when vector search is off.
    pub fn build_index(&mut self, corpus: &[InstructionRecord]) -> Result<(), RankingError> {
        match self.index.as_mut() {
            Some(index) => index.build(corpus).map_err(RankingError::IndexBuild),
            None => {
                debug!("Vector search disabled, skipping index build");
                Ok(())
            }
        }
    }

    /// Vector-stage candidates at or above the similarity floor, best first.
    ///
    /// Always empty when vector search is disabled.
    pub fn vector_search_candidates(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<Candidate<'_>>, RankingError> {
        let Some(index) = self.index.as_ref() else {
            return Ok(Vec::new());
        };

        let hits = index
            .search(query, top_k)
            .map_err(RankingError::VectorSearch)?;

        let candidates: Vec<Candidate<'_>> = hits
            .into_iter()
            .filter(|(_, similarity)| *similarity >= self.config.min_similarity)
            .filter_map(|(position, similarity)| {
                index
                    .record(position)
                    .map(|record| Candidate { record, similarity })
            })
            .collect();

        debug!(
            requested = top_k,
            candidates = candidates.len(),
            min_similarity = self.config.min_similarity,
            "Vector candidates selected"
        );
        Ok(candidates)
    }

    /// Runs both stages and decides on a single answer.
    pub async fn search_hybrid(
        &self,
        query: &str,
        corpus: &[InstructionRecord],
        params: &SearchParams,
    ) -> Result<SearchResult, RankingError> {
        let started = Instant::now();
        info!(query_len = query.len(), "Starting hybrid search");

        let candidates = if self.uses_vector_search() {
            self.vector_search_candidates(query, params.vector_top_k)?
        } else {
            corpus
                .iter()
                .map(|record| Candidate {
                    record,
                    similarity: NEUTRAL_SIMILARITY,
                })
                .collect()
        };

        if candidates.is_empty() {
            warn!("No candidates to evaluate");
            return Ok(SearchResult::no_matches(
                query,
                elapsed_ms(started),
                "No matching instructions found",
            ));
        }

        let to_judge = params.llm_top_k.min(candidates.len());
        debug!(
            candidates = candidates.len(),
            judged = to_judge,
            "Evaluating candidates with judge"
        );

        let mut best: Option<BestCandidate<'_>> = None;
        let mut best_relevance_seen = 0.0f32;

        for candidate in candidates.iter().take(to_judge) {
            let judgment = self
                .judge
                .score(query, &candidate.record.judge_text())
                .await;
            let relevance = judgment.relevance_score;
            let combined = fuse_scores(candidate.similarity, relevance);
            best_relevance_seen = best_relevance_seen.max(relevance);

            debug!(
                task = %candidate.record.task_name,
                similarity = candidate.similarity,
                relevance,
                combined,
                "Candidate scored"
            );

            let beats_best = best.as_ref().is_none_or(|b| combined > b.combined);
            if beats_best && relevance >= params.min_relevance {
                best = Some(BestCandidate {
                    record: candidate.record,
                    judgment,
                    combined,
                });
            }
        }

        let search_time_ms = elapsed_ms(started);

        let Some(best) = best else {
            warn!(
                score = best_relevance_seen,
                threshold = params.min_relevance,
                "No candidate passed the relevance threshold"
            );
            return Ok(SearchResult::no_matches(
                query,
                search_time_ms,
                format!(
                    "Best relevance score ({:.2}) is below the threshold ({:.2})",
                    best_relevance_seen, params.min_relevance
                ),
            ));
        };

        info!(
            task = %best.record.task_name,
            score = best.combined,
            relevance = best.judgment.relevance_score,
            search_time_ms,
            "Hybrid search complete"
        );

        Ok(accepted_result(query, best, search_time_ms))
    }
}

fn accepted_result(query: &str, best: BestCandidate<'_>, search_time_ms: f64) -> SearchResult {
    let Judgment {
        rewritten_instruction,
        description,
        ..
    } = best.judgment;

    // Unparsed or failed judgments carry no rewrite; answer with the record itself.
    let (instruction, description) = if rewritten_instruction.is_empty() {
        let description = if description.is_empty() {
            best.record.description.clone()
        } else {
            description
        };
        (best.record.instruction_text.clone(), description)
    } else {
        (rewritten_instruction, description)
    };

    SearchResult {
        description,
        instruction,
        user_query: query.to_string(),
        status: SearchStatus::Success,
        search_time_ms,
        error_message: None,
        similarity_score: Some(best.combined),
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}
