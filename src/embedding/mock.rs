use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::embedding::{Embedder, EmbeddingError};

/// Test embedder with pinned vectors and call accounting.
///
/// Texts without a pinned vector get a deterministic hash-derived vector.
pub struct MockEmbedder {
    model_id: String,
    dimension: usize,
    pinned: HashMap<String, Vec<f32>>,
    failure: Option<String>,
    calls: AtomicUsize,
    inputs: Mutex<Vec<String>>,
}

impl MockEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            model_id: format!("mock:{dimension}"),
            dimension,
            pinned: HashMap::new(),
            failure: None,
            calls: AtomicUsize::new(0),
            inputs: Mutex::new(Vec::new()),
        }
    }

    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    /// Pins the vector returned for an exact input text.
    pub fn with_vector(mut self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        assert_eq!(vector.len(), self.dimension, "pinned vector has wrong length");
        self.pinned.insert(text.into(), vector);
        self
    }

    /// Makes every call fail with an inference error.
    pub fn failing(mut self, reason: impl Into<String>) -> Self {
        self.failure = Some(reason.into());
        self
    }

    /// Number of `embed_batch` calls (single `embed` calls count once).
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every text embedded so far, in call order.
    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().clone()
    }

    fn hashed_vector(&self, text: &str) -> Vec<f32> {
        let digest = blake3::hash(text.as_bytes());
        digest
            .as_bytes()
            .iter()
            .cycle()
            .take(self.dimension)
            .map(|b| *b as f32 / 255.0 + 0.01)
            .collect()
    }
}

impl Embedder for MockEmbedder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inputs
            .lock()
            .extend(texts.iter().map(|t| t.to_string()));

        if let Some(reason) = &self.failure {
            return Err(EmbeddingError::InferenceFailed {
                reason: reason.clone(),
            });
        }

        Ok(texts
            .iter()
            .map(|text| {
                self.pinned
                    .get(*text)
                    .cloned()
                    .unwrap_or_else(|| self.hashed_vector(text))
            })
            .collect())
    }
}
