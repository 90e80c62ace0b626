//! Instruction records and corpus ingestion.
//!
//! A record carries three required text fields plus an open extension map so
//! upstream producers can attach extra metadata without breaking ingestion.

pub mod error;


pub use error::RecordError;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One previously generated step-by-step instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstructionRecord {
    /// Short task title, e.g. "Add to cart".
    pub task_name: String,
    /// Navigation path inside the target site or app.
    pub full_path: String,
    /// The instruction body.
    #[serde(rename = "instruction", alias = "instruction_text")]
    pub instruction_text: String,
    /// Optional human-readable step description.
    #[serde(default)]
    pub description: String,
    /// Any other fields supplied by the producer.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InstructionRecord {
    pub fn new(
        task_name: impl Into<String>,
        full_path: impl Into<String>,
        instruction_text: impl Into<String>,
    ) -> Self {
        Self {
            task_name: task_name.into(),
            full_path: full_path.into(),
            instruction_text: instruction_text.into(),
            description: String::new(),
            extra: Map::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Text fed to the embedding model (title + body).
    pub fn embedding_text(&self) -> String {
        format!("{}. {}", self.task_name, self.instruction_text)
    }

    /// Text shown to the relevance judge.
    pub fn judge_text(&self) -> String {
        format!(
            "Task: {}\nPath: {}\nInstruction:\n{}",
            self.task_name, self.full_path, self.instruction_text
        )
    }

    /// Validates and converts one JSON value into a record.
    pub fn from_value(value: Value, position: usize) -> Result<Self, RecordError> {
        if !value.is_object() {
            return Err(RecordError::InvalidRecord {
                position,
                reason: "expected a JSON object".to_string(),
            });
        }

        serde_json::from_value(value).map_err(|e| RecordError::InvalidRecord {
            position,
            reason: e.to_string(),
        })
    }
}

/// Parses a JSON array of records, rejecting the whole corpus on the first bad record.
pub fn parse_corpus(json: &str) -> Result<Vec<InstructionRecord>, RecordError> {
    let value: Value = serde_json::from_str(json).map_err(|e| RecordError::InvalidJson {
        reason: e.to_string(),
    })?;

    let Value::Array(items) = value else {
        return Err(RecordError::NotAnArray);
    };

    items
        .into_iter()
        .enumerate()
        .map(|(position, item)| InstructionRecord::from_value(item, position))
        .collect()
}
