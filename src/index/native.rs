//! Native index structures (the persisted "index blob").

use rkyv::{Archive, Deserialize, Serialize};
use std::cmp::Ordering;

use super::flat::FlatIndex;
use super::ivf::IvfIndex;
use super::policy::IndexKind;

/// Raw score semantics of an index.
#[derive(Archive, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// Dot product, higher is closer.
    InnerProduct,
    /// Squared Euclidean distance, lower is closer.
    SquaredL2,
}

impl Metric {
    pub fn score(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Metric::InnerProduct => dot(a, b),
            Metric::SquaredL2 => squared_l2(a, b),
        }
    }

    /// Orders raw scores best-first.
    pub fn compare(&self, a: f32, b: f32) -> Ordering {
        match self {
            Metric::InnerProduct => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
            Metric::SquaredL2 => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        }
    }
}

pub(crate) fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

pub(crate) fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Sorts best-first and keeps `k` entries.
pub(crate) fn top_k(mut scored: Vec<(usize, f32)>, k: usize, metric: Metric) -> Vec<(usize, f32)> {
    scored.sort_by(|a, b| metric.compare(a.1, b.1));
    scored.truncate(k);
    scored
}

/// Either index structure, as chosen by [`choose_index_kind`](super::choose_index_kind).
#[derive(Archive, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum NativeIndex {
    Flat(FlatIndex),
    InvertedFile(IvfIndex),
}

impl NativeIndex {
    /// Builds the structure for `kind` over `vectors` (all of length `dimension`).
    pub fn build(kind: IndexKind, metric: Metric, dimension: usize, vectors: &[Vec<f32>]) -> Self {
        match kind {
            IndexKind::Flat => {
                let mut flat = FlatIndex::new(metric, dimension);
                flat.add(vectors);
                NativeIndex::Flat(flat)
            }
            IndexKind::InvertedFile { clusters, probes } => NativeIndex::InvertedFile(
                IvfIndex::train(metric, dimension, clusters, probes, vectors),
            ),
        }
    }

    pub fn kind(&self) -> IndexKind {
        match self {
            NativeIndex::Flat(_) => IndexKind::Flat,
            NativeIndex::InvertedFile(ivf) => IndexKind::InvertedFile {
                clusters: ivf.clusters(),
                probes: ivf.probes(),
            },
        }
    }

    pub fn metric(&self) -> Metric {
        match self {
            NativeIndex::Flat(flat) => flat.metric,
            NativeIndex::InvertedFile(ivf) => ivf.metric,
        }
    }

    pub fn dimension(&self) -> usize {
        match self {
            NativeIndex::Flat(flat) => flat.dimension,
            NativeIndex::InvertedFile(ivf) => ivf.dimension,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            NativeIndex::Flat(flat) => flat.len(),
            NativeIndex::InvertedFile(ivf) => ivf.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Validates a decoded structure before it is searched.
    pub(crate) fn check(&self) -> Result<(), String> {
        match self {
            NativeIndex::Flat(flat) => flat.check(),
            NativeIndex::InvertedFile(ivf) => ivf.check(),
        }
    }

    /// Returns up to `k` `(position, raw_score)` pairs, best first.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<(usize, f32)> {
        match self {
            NativeIndex::Flat(flat) => flat.search(query, k),
            NativeIndex::InvertedFile(ivf) => ivf.search(query, k),
        }
    }
}
