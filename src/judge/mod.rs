//! External relevance judge.
//!
//! Scores how well one candidate instruction answers a query and rewrites it.
//! Scoring never fails: transport errors become a zero-score [`Judgment`] and
//! unparseable replies fall back through [`parse_judgment`].

mod parse;


pub use parse::{JudgeOutcome, normalize_score, parse_judgment};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::constants::{JUDGE_TEMPERATURE, NEUTRAL_RELEVANCE};
use crate::generation::TextGenerator;

/// The judge's verdict on one candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Judgment {
    /// Relevance in `[0, 1]`.
    pub relevance_score: f32,
    /// Reformulated instruction; empty when the judge gave none.
    pub rewritten_instruction: String,
    pub reasoning: String,
    /// Step description; empty when the judge gave none.
    pub description: String,
}

impl Judgment {
    /// Neutral-score judgment used when a reply cannot be interpreted.
    pub fn neutral(reasoning: impl Into<String>) -> Self {
        Self {
            relevance_score: NEUTRAL_RELEVANCE,
            reasoning: reasoning.into(),
            ..Self::default()
        }
    }

    /// Zero-score judgment used when the judge could not be reached.
    pub fn failed(reasoning: impl Into<String>) -> Self {
        Self {
            relevance_score: 0.0,
            reasoning: reasoning.into(),
            ..Self::default()
        }
    }
}

/// Relevance judge backed by a [`TextGenerator`].
pub struct RelevanceJudge {
    generator: Arc<dyn TextGenerator>,
    temperature: f32,
}

impl std::fmt::Debug for RelevanceJudge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelevanceJudge")
            .field("model", &self.generator.model())
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl RelevanceJudge {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            temperature: JUDGE_TEMPERATURE,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Scores `candidate_text` against `query`. Never fails.
    pub async fn score(&self, query: &str, candidate_text: &str) -> Judgment {
        let prompt = judge_prompt(query, candidate_text);

        let reply = match self.generator.generate(&prompt, self.temperature).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Relevance judge request failed");
                return Judgment::failed(format!("Judge request failed: {e}"));
            }
        };

        let judgment = parse_judgment(&reply).into_judgment();
        debug!(
            score = judgment.relevance_score,
            has_instruction = !judgment.rewritten_instruction.is_empty(),
            "Candidate judged"
        );
        judgment
    }
}

/// Prompt asking the judge for a JSON verdict.
pub fn judge_prompt(query: &str, candidate_text: &str) -> String {
    format!(
        r#"You are an expert at analysing step-by-step instructions. Rate how well the instruction below answers the user's request.

User request: "{query}"

Instruction:
{candidate_text}

Consider:
1. Does the task of the instruction match the request?
2. Is the instruction semantically close to the request?
3. Would following it solve the user's problem?

Answer with a JSON object, in the language of the user's request:
{{
  "relevance_score": <number from 0 to 1>,
  "instruction": "<the full instruction, rewritten for this request>",
  "reasoning": "<one or two sentences>",
  "description": "<short step-by-step description>"
}}

Answer (JSON only, no other text):"#
    )
}
