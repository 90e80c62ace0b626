//! Chat-completion client over `reqwest`.

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{GenerationError, GeneratorConfig, TextGenerator};

/// Longest error body kept in [`GenerationError::Http`].
const MAX_ERROR_BODY_CHARS: usize = 512;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible `/chat/completions` client with bearer-token auth.
pub struct ChatCompletionClient {
    http: HttpClient,
    config: GeneratorConfig,
}

impl std::fmt::Debug for ChatCompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionClient")
            .field("config", &self.config)
            .finish()
    }
}

impl ChatCompletionClient {
    pub fn new(config: GeneratorConfig) -> Result<Self, GenerationError> {
        config.validate()?;
        if config.api_key.is_empty() {
            warn!(endpoint = %config.endpoint, "No API key configured for generation client");
        }

        let http = HttpClient::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GenerationError::Transport {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    fn map_send_error(&self, error: reqwest::Error) -> GenerationError {
        if error.is_timeout() {
            GenerationError::Timeout {
                timeout: self.config.timeout,
            }
        } else {
            GenerationError::Transport {
                reason: error.to_string(),
            }
        }
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionClient {
    fn model(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String, GenerationError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature,
        };

        debug!(
            model = %self.config.model,
            prompt_len = prompt.len(),
            temperature,
            "Sending chat completion request"
        );

        let response = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Chat completion request failed");
            return Err(GenerationError::Http {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let body = response.text().await.map_err(|e| self.map_send_error(e))?;
        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| GenerationError::MalformedResponse {
                reason: e.to_string(),
            })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| GenerationError::MalformedResponse {
                reason: "response has no choices[0].message.content".to_string(),
            })?;

        debug!(reply_len = content.len(), "Chat completion received");
        Ok(content.trim().to_string())
    }
}
