use std::time::Duration;
use thiserror::Error;

/// Errors returned by text-generation backends.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The request exceeded the configured timeout.
    #[error("generation request timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    /// The service answered with a non-success status.
    #[error("generation service returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Connecting, sending or reading failed.
    #[error("generation transport failed: {reason}")]
    Transport { reason: String },

    /// The response body did not have the expected shape.
    #[error("malformed generation response: {reason}")]
    MalformedResponse { reason: String },

    /// Client settings are unusable.
    #[error("invalid generator config: {reason}")]
    InvalidConfig { reason: String },
}
