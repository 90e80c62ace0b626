//! Exact brute-force index.

use rkyv::{Archive, Deserialize, Serialize};

use super::native::{Metric, top_k};

/// Row-major vector matrix scanned in full on every query.
#[derive(Archive, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FlatIndex {
    pub(crate) metric: Metric,
    pub(crate) dimension: usize,
    pub(crate) vectors: Vec<f32>,
}

impl FlatIndex {
    pub fn new(metric: Metric, dimension: usize) -> Self {
        Self {
            metric,
            dimension,
            vectors: Vec::new(),
        }
    }

    /// Appends vectors; positions continue from the current length.
    pub fn add(&mut self, vectors: &[Vec<f32>]) {
        self.vectors.reserve(vectors.len() * self.dimension);
        for vector in vectors {
            self.vectors.extend_from_slice(vector);
        }
    }

    pub fn len(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.vectors.len() / self.dimension
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn check(&self) -> Result<(), String> {
        if self.dimension == 0 || self.vectors.len() % self.dimension != 0 {
            return Err(format!(
                "{} vector values do not fit dimension {}",
                self.vectors.len(),
                self.dimension
            ));
        }
        Ok(())
    }

    /// Returns up to `k` `(position, raw_score)` pairs, best first.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<(usize, f32)> {
        if self.dimension == 0 {
            return Vec::new();
        }
        let scored = self
            .vectors
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(position, vector)| (position, self.metric.score(query, vector)))
            .collect();
        top_k(scored, k, self.metric)
    }
}
