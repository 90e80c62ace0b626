use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_LLM_TOP_K, DEFAULT_MIN_RELEVANCE, DEFAULT_VECTOR_TOP_K};
use crate::record::InstructionRecord;

/// Terminal state of one hybrid search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    Success,
    NoMatches,
}

impl std::fmt::Display for SearchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchStatus::Success => write!(f, "success"),
            SearchStatus::NoMatches => write!(f, "no_matches"),
        }
    }
}

/// Outcome of [`HybridRanker::search_hybrid`](super::HybridRanker::search_hybrid).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub description: String,
    pub instruction: String,
    pub user_query: String,
    pub status: SearchStatus,
    /// Wall-clock time from the start of the vector stage to the decision.
    pub search_time_ms: f64,
    pub error_message: Option<String>,
    /// Fused score of the accepted candidate.
    pub similarity_score: Option<f32>,
}

impl SearchResult {
    pub(crate) fn no_matches(
        user_query: &str,
        search_time_ms: f64,
        message: impl Into<String>,
    ) -> Self {
        Self {
            description: String::new(),
            instruction: String::new(),
            user_query: user_query.to_string(),
            status: SearchStatus::NoMatches,
            search_time_ms,
            error_message: Some(message.into()),
            similarity_score: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == SearchStatus::Success
    }
}

/// A record proposed by the vector stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate<'a> {
    pub record: &'a InstructionRecord,
    /// Vector similarity in `(0, 1]`, or the neutral value when vector search is off.
    pub similarity: f32,
}

/// Per-query retrieval knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchParams {
    /// Candidates requested from the vector stage.
    pub vector_top_k: usize,
    /// Candidates sent to the judge, taken from the front of the vector results.
    pub llm_top_k: usize,
    /// Floor on the raw judge score for a candidate to be accepted.
    pub min_relevance: f32,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            vector_top_k: DEFAULT_VECTOR_TOP_K,
            llm_top_k: DEFAULT_LLM_TOP_K,
            min_relevance: DEFAULT_MIN_RELEVANCE,
        }
    }
}

impl SearchParams {
    pub fn with_vector_top_k(mut self, vector_top_k: usize) -> Self {
        self.vector_top_k = vector_top_k;
        self
    }

    pub fn with_llm_top_k(mut self, llm_top_k: usize) -> Self {
        self.llm_top_k = llm_top_k;
        self
    }

    pub fn with_min_relevance(mut self, min_relevance: f32) -> Self {
        self.min_relevance = min_relevance;
        self
    }
}
