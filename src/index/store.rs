use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::error::{IndexError, IndexResult};
use super::native::{Metric, NativeIndex};
use super::policy::{IndexKind, choose_index_kind};
use crate::embedding::Embedder;
use crate::record::InstructionRecord;

/// How vectors are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// L2-normalized vectors compared by inner product.
    Cosine,
    /// Raw vectors compared by squared Euclidean distance.
    Euclidean,
}

impl Normalization {
    pub fn metric(&self) -> Metric {
        match self {
            Normalization::Cosine => Metric::InnerProduct,
            Normalization::Euclidean => Metric::SquaredL2,
        }
    }

    /// Maps a raw index score onto a similarity (higher is closer).
    pub fn to_similarity(&self, raw: f32) -> f32 {
        match self {
            Normalization::Cosine => raw,
            Normalization::Euclidean => 1.0 / (1.0 + raw),
        }
    }
}

/// One built index generation: texts, records and vectors share positions.
pub(crate) struct IndexSnapshot {
    pub(crate) texts: Vec<String>,
    pub(crate) records: Vec<InstructionRecord>,
    pub(crate) native: NativeIndex,
}

impl IndexSnapshot {
    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }
}

/// Vector index over an instruction corpus.
///
/// `build` swaps in a complete new generation or leaves the previous one intact;
/// searches read the current generation through `&self`.
pub struct EmbeddingIndex {
    pub(crate) embedder: Arc<dyn Embedder>,
    pub(crate) normalization: Normalization,
    pub(crate) snapshot: Option<IndexSnapshot>,
}

impl std::fmt::Debug for EmbeddingIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingIndex")
            .field("model_id", &self.embedder.model_id())
            .field("normalization", &self.normalization)
            .field("len", &self.len())
            .field("kind", &self.kind())
            .finish()
    }
}

impl EmbeddingIndex {
    pub fn new(embedder: Arc<dyn Embedder>, normalization: Normalization) -> Self {
        Self {
            embedder,
            normalization,
            snapshot: None,
        }
    }

    /// Cosine-mode index.
    pub fn cosine(embedder: Arc<dyn Embedder>) -> Self {
        Self::new(embedder, Normalization::Cosine)
    }

    /// Embeds the whole corpus in one batch and replaces the current generation.
    ///
    /// An empty corpus is a no-op: the previous generation stays in place.
    pub fn build(&mut self, corpus: &[InstructionRecord]) -> IndexResult<()> {
        if corpus.is_empty() {
            warn!(
                current = self.len(),
                "No instructions to index, keeping previous vector index"
            );
            return Ok(());
        }

        let texts: Vec<String> = corpus.iter().map(InstructionRecord::embedding_text).collect();
        let inputs: Vec<&str> = texts.iter().map(String::as_str).collect();

        info!(
            records = corpus.len(),
            model_id = self.embedder.model_id(),
            "Embedding instruction corpus"
        );
        let mut vectors = self.embedder.embed_batch(&inputs)?;

        if vectors.len() != corpus.len() {
            return Err(IndexError::BatchSizeMismatch {
                expected: corpus.len(),
                actual: vectors.len(),
            });
        }

        let dimension = vectors[0].len();
        if dimension == 0 {
            return Err(IndexError::DimensionMismatch {
                expected: self.embedder.dimension(),
                actual: 0,
            });
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != dimension) {
            return Err(IndexError::DimensionMismatch {
                expected: dimension,
                actual: bad.len(),
            });
        }

        if self.normalization == Normalization::Cosine {
            vectors.iter_mut().for_each(|v| l2_normalize(v));
        }

        let kind = choose_index_kind(vectors.len());
        let native = NativeIndex::build(kind, self.normalization.metric(), dimension, &vectors);

        self.snapshot = Some(IndexSnapshot {
            texts,
            records: corpus.to_vec(),
            native,
        });

        info!(
            records = corpus.len(),
            dimension,
            kind = %kind,
            "Vector index built"
        );
        Ok(())
    }

    /// Returns up to `k` `(position, similarity)` pairs, best first.
    ///
    /// Non-positive similarities are dropped; an unbuilt index yields nothing.
    pub fn search(&self, query: &str, k: usize) -> IndexResult<Vec<(usize, f32)>> {
        let Some(snapshot) = self.snapshot.as_ref().filter(|s| s.len() > 0) else {
            warn!("Vector index not built");
            return Ok(Vec::new());
        };

        let mut query_vector = self.embedder.embed(query)?;
        if query_vector.len() != snapshot.native.dimension() {
            return Err(IndexError::DimensionMismatch {
                expected: snapshot.native.dimension(),
                actual: query_vector.len(),
            });
        }
        if self.normalization == Normalization::Cosine {
            l2_normalize(&mut query_vector);
        }

        let limit = k.min(snapshot.len());
        let mut results: Vec<(usize, f32)> = snapshot
            .native
            .search(&query_vector, limit)
            .into_iter()
            .filter(|(position, _)| *position < snapshot.len())
            .map(|(position, raw)| (position, self.normalization.to_similarity(raw)))
            .filter(|(_, similarity)| *similarity > 0.0)
            .collect();

        results.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        debug!(
            query_len = query.len(),
            requested = k,
            hits = results.len(),
            top = results.first().map(|(_, s)| *s),
            "Vector search complete"
        );
        Ok(results)
    }

    /// Record at an index position.
    pub fn record(&self, position: usize) -> Option<&InstructionRecord> {
        self.snapshot.as_ref()?.records.get(position)
    }

    /// Records of the current generation, in index order.
    pub fn records(&self) -> &[InstructionRecord] {
        self.snapshot
            .as_ref()
            .map(|s| s.records.as_slice())
            .unwrap_or_default()
    }

    /// Embedding input text at an index position.
    pub fn text(&self, position: usize) -> Option<&str> {
        self.snapshot
            .as_ref()?
            .texts
            .get(position)
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.snapshot.as_ref().map_or(0, IndexSnapshot::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_built(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Structure of the current generation, if any.
    pub fn kind(&self) -> Option<IndexKind> {
        self.snapshot.as_ref().map(|s| s.native.kind())
    }

    pub fn normalization(&self) -> Normalization {
        self.normalization
    }

    pub fn model_id(&self) -> &str {
        self.embedder.model_id()
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }
}

/// Scales `vector` to unit length; zero vectors are left untouched.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        vector.iter_mut().for_each(|x| *x /= norm);
    }
}
