use thiserror::Error;

/// Errors raised while ingesting instruction records.
#[derive(Debug, Error)]
pub enum RecordError {
    /// The corpus document is not valid JSON.
    #[error("corpus is not valid JSON: {reason}")]
    InvalidJson { reason: String },

    /// The corpus document is not a JSON array of records.
    #[error("corpus must be a JSON array of records")]
    NotAnArray,

    /// One record is missing a required field or has the wrong shape.
    #[error("record {position} is invalid: {reason}")]
    InvalidRecord { position: usize, reason: String },
}
