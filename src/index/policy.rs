//! Index-structure selection by corpus size.

use crate::constants::{
    DEFAULT_IVF_PROBES, FLAT_INDEX_CUTOFF, MAX_IVF_CLUSTERS, VECTORS_PER_CLUSTER,
};

/// Structure used for a given index generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    /// Exact brute-force search.
    Flat,
    /// k-means inverted file; `probes` clusters are scanned per query.
    InvertedFile { clusters: usize, probes: usize },
}

impl IndexKind {
    pub fn is_approximate(&self) -> bool {
        matches!(self, IndexKind::InvertedFile { .. })
    }
}

impl std::fmt::Display for IndexKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexKind::Flat => write!(f, "flat"),
            IndexKind::InvertedFile { clusters, probes } => {
                write!(f, "ivf(clusters={}, probes={})", clusters, probes)
            }
        }
    }
}

/// Picks flat search below [`FLAT_INDEX_CUTOFF`] records, an inverted file at or above it.
pub fn choose_index_kind(corpus_size: usize) -> IndexKind {
    if corpus_size < FLAT_INDEX_CUTOFF {
        return IndexKind::Flat;
    }

    let clusters = (corpus_size / VECTORS_PER_CLUSTER).clamp(1, MAX_IVF_CLUSTERS);
    IndexKind::InvertedFile {
        clusters,
        probes: DEFAULT_IVF_PROBES.min(clusters),
    }
}
