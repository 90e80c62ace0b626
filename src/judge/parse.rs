//! Tolerant parsing of judge replies.
//!
//! Strategies run in order and the first one that recognizes the reply wins:
//!
//! 1. `structured_json`: the outermost `{...}` span parsed as a JSON object.
//! 2. `numeric_token`: the first `0.xx` or integer token read as a score.
//!
//! When neither applies the reply is [`JudgeOutcome::Unparseable`].

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use super::Judgment;
use crate::constants::NEUTRAL_RELEVANCE;

static SCORE_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(0\.\d+|\d+)\b").expect("score token pattern is valid"));

/// What a judge reply could be turned into.
#[derive(Debug, Clone, PartialEq)]
pub enum JudgeOutcome {
    /// A JSON object with (at least some of) the requested fields.
    Parsed(Judgment),
    /// No usable JSON, but a numeric score was found.
    PartiallyParsed { score: f32 },
    /// Nothing usable in the reply.
    Unparseable,
}

impl JudgeOutcome {
    /// Collapses the outcome into a judgment, filling neutral values where needed.
    pub fn into_judgment(self) -> Judgment {
        match self {
            JudgeOutcome::Parsed(judgment) => judgment,
            JudgeOutcome::PartiallyParsed { score } => Judgment {
                relevance_score: score,
                reasoning: "Judge reply was not JSON; score read from a numeric token".to_string(),
                ..Judgment::default()
            },
            JudgeOutcome::Unparseable => Judgment::neutral("Judge reply could not be parsed"),
        }
    }
}

type Strategy = fn(&str) -> Option<JudgeOutcome>;

const STRATEGIES: &[(&str, Strategy)] = &[
    ("structured_json", parse_structured),
    ("numeric_token", parse_numeric_token),
];

/// Runs the strategy chain over a raw judge reply.
pub fn parse_judgment(reply: &str) -> JudgeOutcome {
    for (name, strategy) in STRATEGIES {
        if let Some(outcome) = strategy(reply) {
            debug!(strategy = name, "Judge reply parsed");
            return outcome;
        }
    }
    debug!(reply_len = reply.len(), "Judge reply unparseable");
    JudgeOutcome::Unparseable
}

/// Maps a raw score onto `[0, 1]`; values above 1 are read as percentages.
pub fn normalize_score(raw: f32) -> f32 {
    if !raw.is_finite() {
        return NEUTRAL_RELEVANCE;
    }
    let scaled = if raw > 1.0 { raw / 100.0 } else { raw };
    scaled.clamp(0.0, 1.0)
}

fn outermost_object(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (start < end).then(|| &reply[start..=end])
}

fn parse_structured(reply: &str) -> Option<JudgeOutcome> {
    let span = outermost_object(reply)?;
    let Value::Object(fields) = serde_json::from_str::<Value>(span).ok()? else {
        return None;
    };

    let relevance_score = fields
        .get("relevance_score")
        .and_then(score_value)
        .map(normalize_score)
        .unwrap_or(NEUTRAL_RELEVANCE);

    Some(JudgeOutcome::Parsed(Judgment {
        relevance_score,
        rewritten_instruction: text_field(&fields, "instruction"),
        reasoning: text_field(&fields, "reasoning"),
        description: text_field(&fields, "description"),
    }))
}

fn parse_numeric_token(reply: &str) -> Option<JudgeOutcome> {
    let token = SCORE_TOKEN_RE.captures(reply)?.get(1)?.as_str();
    let score = token.parse::<f32>().ok()?;
    Some(JudgeOutcome::PartiallyParsed {
        score: normalize_score(score),
    })
}

fn score_value(value: &Value) -> Option<f32> {
    match value {
        Value::Number(n) => n.as_f64().map(|v| v as f32),
        Value::String(s) => s.trim().parse::<f32>().ok(),
        _ => None,
    }
}

fn text_field(fields: &Map<String, Value>, key: &str) -> String {
    match fields.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.trim().to_string(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Some(other) => other.to_string(),
    }
}
