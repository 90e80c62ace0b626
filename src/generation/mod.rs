//! Text generation backends shared by the relevance judge and the response composer.

mod client;
mod config;
mod error;
#[cfg(any(test, feature = "mock"))]
mod mock;

#[cfg(test)]
mod tests;

pub use client::ChatCompletionClient;
pub use config::GeneratorConfig;
pub use error::GenerationError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockTextGenerator;

use async_trait::async_trait;

/// Turns a single-message prompt into a completion.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Model identifier sent with each request.
    fn model(&self) -> &str;

    /// Generates a reply to `prompt`; the result is trimmed of surrounding whitespace.
    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String, GenerationError>;
}
