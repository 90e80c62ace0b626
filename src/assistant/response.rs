use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_LLM_TOP_K, DEFAULT_MIN_RELEVANCE, DEFAULT_VECTOR_TOP_K};
use crate::ranking::{SearchParams, SearchResult, SearchStatus};

/// Knobs for one [`Assistant::answer_question`](super::Assistant::answer_question) call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryOptions {
    pub vector_top_k: usize,
    pub llm_top_k: usize,
    pub min_relevance: f32,
    /// Compose a recommendation for successful searches.
    pub include_recommendation: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            vector_top_k: DEFAULT_VECTOR_TOP_K,
            llm_top_k: DEFAULT_LLM_TOP_K,
            min_relevance: DEFAULT_MIN_RELEVANCE,
            include_recommendation: true,
        }
    }
}

impl QueryOptions {
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

    pub fn with_recommendation(mut self, include_recommendation: bool) -> Self {
        self.include_recommendation = include_recommendation;
        self
    }

    pub fn search_params(&self) -> SearchParams {
        SearchParams {
            vector_top_k: self.vector_top_k,
            llm_top_k: self.llm_top_k,
            min_relevance: self.min_relevance,
        }
    }
}

/// Status reported to callers; `Error` covers facade-level failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerStatus {
    Success,
    NoMatches,
    Error,
}

impl From<SearchStatus> for AnswerStatus {
    fn from(status: SearchStatus) -> Self {
        match status {
            SearchStatus::Success => AnswerStatus::Success,
            SearchStatus::NoMatches => AnswerStatus::NoMatches,
        }
    }
}

/// Serialized answer to one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub description: String,
    pub instruction: String,
    pub user_query: String,
    pub status: AnswerStatus,
    /// Rounded to 2 decimals.
    pub search_time_ms: f64,
    pub error_message: Option<String>,
    /// Fused score, rounded to 4 decimals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

impl AnswerResponse {
    pub fn error(user_query: &str, message: impl Into<String>) -> Self {
        Self {
            description: String::new(),
            instruction: String::new(),
            user_query: user_query.to_string(),
            status: AnswerStatus::Error,
            search_time_ms: 0.0,
            error_message: Some(message.into()),
            similarity_score: None,
            recommendation: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == AnswerStatus::Success
    }
}

impl From<SearchResult> for AnswerResponse {
    fn from(result: SearchResult) -> Self {
        Self {
            description: result.description,
            instruction: result.instruction,
            user_query: result.user_query,
            status: result.status.into(),
            search_time_ms: round_to(result.search_time_ms, 2),
            error_message: result.error_message,
            similarity_score: result
                .similarity_score
                .map(|score| round_to(f64::from(score), 4)),
            recommendation: None,
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}
