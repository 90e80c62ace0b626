use std::path::PathBuf;

use crate::embedding::error::EmbeddingError;

/// Default sentence-embedding dimension.
pub const SENTENCE_EMBEDDING_DIM: usize = crate::constants::DEFAULT_EMBEDDING_DIM;

/// Default max sequence length.
pub const SENTENCE_MAX_SEQ_LEN: usize = crate::constants::DEFAULT_MAX_SEQ_LEN;

/// Model-identifier prefix used by the deterministic stub backend.
pub const STUB_MODEL_PREFIX: &str = "stub:";

#[derive(Debug, Clone)]
/// Configuration for [`SentenceEmbedder`](super::SentenceEmbedder).
pub struct EmbedderConfig {
    /// Directory holding `config.json`, `model.safetensors` and `tokenizer.json`.
    pub model_path: PathBuf,
    /// Max tokens per input.
    pub max_seq_len: usize,
    /// Output dimension in stub mode (model mode uses the model's hidden size).
    pub embedding_dim: usize,
    /// If true, run in deterministic stub mode (no model files required).
    pub testing_stub: bool,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::new(),
            max_seq_len: SENTENCE_MAX_SEQ_LEN,
            embedding_dim: SENTENCE_EMBEDDING_DIM,
            testing_stub: false,
        }
    }
}

impl EmbedderConfig {
    /// Creates a config for a model directory.
    pub fn new<P: Into<PathBuf>>(model_path: P) -> Self {
        Self {
            model_path: model_path.into(),
            ..Default::default()
        }
    }

    /// Creates a stub config producing `embedding_dim`-sized vectors.
    pub fn stub(embedding_dim: usize) -> Self {
        Self {
            embedding_dim,
            testing_stub: true,
            ..Default::default()
        }
    }

    pub fn with_max_seq_len(mut self, max_seq_len: usize) -> Self {
        self.max_seq_len = max_seq_len;
        self
    }

    /// Rebuilds a config from a persisted model identifier.
    ///
    /// `stub:<dim>` selects the stub backend; anything else is a model directory.
    pub fn from_model_id(model_id: &str) -> Result<Self, EmbeddingError> {
        match model_id.strip_prefix(STUB_MODEL_PREFIX) {
            Some(dim) => {
                let embedding_dim =
                    dim.parse::<usize>()
                        .map_err(|e| EmbeddingError::InvalidConfig {
                            reason: format!("bad stub model id '{}': {}", model_id, e),
                        })?;
                Ok(Self::stub(embedding_dim))
            }
            None => Ok(Self::new(model_id)),
        }
    }

    /// Identifier persisted alongside an index built with this config.
    pub fn model_id(&self) -> String {
        if self.testing_stub {
            format!("{}{}", STUB_MODEL_PREFIX, self.embedding_dim)
        } else {
            self.model_path.display().to_string()
        }
    }

    /// Validates required fields; model mode checks the three model files exist.
    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if self.max_seq_len == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "max_seq_len must be greater than zero".to_string(),
            });
        }

        if self.testing_stub {
            if self.embedding_dim == 0 {
                return Err(EmbeddingError::InvalidConfig {
                    reason: "embedding_dim must be greater than zero".to_string(),
                });
            }
            return Ok(());
        }

        if self.model_path.as_os_str().is_empty() {
            return Err(EmbeddingError::InvalidConfig {
                reason: "model_path is required (stubbing is disabled)".to_string(),
            });
        }

        for file in ["config.json", "model.safetensors", "tokenizer.json"] {
            let path = self.model_path.join(file);
            if !path.exists() {
                return Err(EmbeddingError::ModelNotFound { path });
            }
        }

        Ok(())
    }
}
