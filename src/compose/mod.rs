//! User-facing recommendation text for an accepted search result.


use std::sync::Arc;

use tracing::{debug, warn};

use crate::constants::{COMPOSER_TEMPERATURE, FALLBACK_INSTRUCTION_CHARS};
use crate::generation::TextGenerator;
use crate::ranking::SearchResult;

pub const FALLBACK_PREFIX: &str = "Try following this instruction: ";
pub const EMPTY_INSTRUCTION_MESSAGE: &str = "Error: no matching instruction found";

/// Writes a short recommendation; never fails.
pub struct ResponseComposer {
    generator: Arc<dyn TextGenerator>,
    temperature: f32,
}

impl std::fmt::Debug for ResponseComposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseComposer")
            .field("model", &self.generator.model())
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl ResponseComposer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            temperature: COMPOSER_TEMPERATURE,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub async fn compose(&self, query: &str, result: &SearchResult) -> String {
        if !result.is_success() {
            return no_match_message(query);
        }
        if result.instruction.trim().is_empty() {
            return EMPTY_INSTRUCTION_MESSAGE.to_string();
        }

        let prompt = composer_prompt(query, result);
        match self.generator.generate(&prompt, self.temperature).await {
            Ok(reply) if !reply.trim().is_empty() => {
                debug!(reply_len = reply.len(), "Recommendation composed");
                reply
            }
            Ok(_) => {
                warn!("Composer returned an empty reply, using fallback");
                fallback_recommendation(&result.instruction)
            }
            Err(e) => {
                warn!(error = %e, "Composer request failed, using fallback");
                fallback_recommendation(&result.instruction)
            }
        }
    }
}

pub fn no_match_message(query: &str) -> String {
    format!(
        "Sorry, I couldn't find a matching instruction for your request: '{query}'. \
         Try rephrasing the question or start from the main menu."
    )
}

/// Fixed prefix plus the first [`FALLBACK_INSTRUCTION_CHARS`] characters of the instruction.
pub fn fallback_recommendation(instruction: &str) -> String {
    let head: String = instruction.chars().take(FALLBACK_INSTRUCTION_CHARS).collect();
    format!("{FALLBACK_PREFIX}{head}...")
}

fn composer_prompt(query: &str, result: &SearchResult) -> String {
    format!(
        r#"You are a helpful assistant. Using the instruction found below, give the user a short piece of advice.

User request: "{query}"

Instruction found:
- Instruction: {instruction}
- Description: {description}

Reply in the language of the user's request:
1. Confirm that you understood the request.
2. Point the user to the instruction.
3. Add a brief clarification if needed.
4. Be friendly and helpful.

Answer (2-3 sentences, friendly tone):"#,
        instruction = result.instruction,
        description = result.description,
    )
}
