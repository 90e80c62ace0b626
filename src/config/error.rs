//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A numeric variable could not be parsed.
    #[error("failed to parse {name}='{value}': {reason}")]
    InvalidNumber {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// A boolean variable is not one of the accepted spellings.
    #[error("invalid boolean {name}='{value}': expected true/false, 1/0, yes/no or on/off")]
    InvalidBool { name: &'static str, value: String },

    /// A value parsed but is outside its allowed range.
    #[error("{name} is out of range: {reason}")]
    OutOfRange { name: &'static str, reason: String },

    /// Vector search is on but no embedding backend was configured.
    #[error("vector search needs an embedding model: set {name} (or {stub_name}=true for the hash stub)")]
    MissingEmbeddingModel {
        name: &'static str,
        stub_name: &'static str,
    },

    /// Specified path does not exist on the filesystem.
    #[error("path does not exist: {path}")]
    PathNotFound { path: PathBuf },

    /// Path exists but is not a directory (when a directory was expected).
    #[error("path is not a directory: {path}")]
    NotADirectory { path: PathBuf },
}
