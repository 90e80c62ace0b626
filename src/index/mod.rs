//! Vector index over instruction records.
//!
//! Corpora below [`FLAT_INDEX_CUTOFF`](crate::constants::FLAT_INDEX_CUTOFF) records get an
//! exact flat index; larger ones get an inverted-file index trained with k-means.
//! A built index can be persisted to three artifacts and restored later.

mod error;
/// Exact brute-force index.
pub mod flat;
/// Inverted-file (IVF) index.
pub mod ivf;
/// Serializable index structures and metrics.
pub mod native;
mod persist;
/// Flat vs IVF selection.
pub mod policy;
mod store;

#[cfg(test)]
mod tests;

pub use error::{IndexError, IndexResult};
pub use native::{Metric, NativeIndex};
pub use persist::{
    DATA_SUFFIX, INDEX_SUFFIX, MODEL_SUFFIX, ModelInfo, artifact_path, artifacts_exist,
    read_model_info,
};
pub use policy::{IndexKind, choose_index_kind};
pub use store::{EmbeddingIndex, Normalization, l2_normalize};
