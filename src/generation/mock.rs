use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{GenerationError, TextGenerator};

type Responder = Box<dyn Fn(&str) -> Result<String, GenerationError> + Send + Sync>;

/// Scripted text generator that records every prompt it receives.
pub struct MockTextGenerator {
    responder: Responder,
    calls: AtomicUsize,
    prompts: Mutex<Vec<(String, f32)>>,
}

impl MockTextGenerator {
    /// Answers every prompt through `responder`.
    pub fn from_fn<F>(responder: F) -> Self
    where
        F: Fn(&str) -> Result<String, GenerationError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Returns the same reply for every prompt.
    pub fn replying(reply: impl Into<String>) -> Self {
        let reply = reply.into();
        Self::from_fn(move |_| Ok(reply.clone()))
    }

    /// Fails every call with a transport error.
    pub fn unavailable() -> Self {
        Self::from_fn(|_| {
            Err(GenerationError::Transport {
                reason: "connection refused".to_string(),
            })
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().iter().map(|(p, _)| p.clone()).collect()
    }

    /// Temperatures received so far, in call order.
    pub fn temperatures(&self) -> Vec<f32> {
        self.prompts.lock().iter().map(|(_, t)| *t).collect()
    }
}

#[async_trait]
impl TextGenerator for MockTextGenerator {
    fn model(&self) -> &str {
        "mock"
    }

    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push((prompt.to_string(), temperature));
        (self.responder)(prompt)
    }
}
