//! Cross-cutting, shared constants.
//!
//! Retrieval knobs, index-policy thresholds and fusion weights live here so the
//! ranker, index and facade agree on them.

/// Corpus size at which the index switches from exact flat search to an inverted file.
pub const FLAT_INDEX_CUTOFF: usize = 10_000;

/// Upper bound on inverted-file clusters.
pub const MAX_IVF_CLUSTERS: usize = 100;

/// Target vectors per cluster used to derive the cluster count.
pub const VECTORS_PER_CLUSTER: usize = 39;

/// Clusters scanned per inverted-file query.
pub const DEFAULT_IVF_PROBES: usize = 10;

/// k-means iterations used when training inverted-file centroids.
pub const KMEANS_ITERATIONS: usize = 20;

/// Max training points sampled per centroid.
pub const KMEANS_MAX_POINTS_PER_CLUSTER: usize = 256;

/// Weight of vector similarity in the fused score.
pub const VECTOR_WEIGHT: f32 = 0.4;

/// Weight of the judge relevance score in the fused score.
pub const JUDGE_WEIGHT: f32 = 0.6;

/// Similarity assigned to every record when vector search is disabled.
pub const NEUTRAL_SIMILARITY: f32 = 0.5;

/// Relevance assigned when a judge reply cannot be parsed.
pub const NEUTRAL_RELEVANCE: f32 = 0.5;

/// Vector-stage similarity floor.
pub const DEFAULT_MIN_SIMILARITY: f32 = 0.3;

pub const DEFAULT_VECTOR_TOP_K: usize = 15;
pub const DEFAULT_LLM_TOP_K: usize = 3;
pub const DEFAULT_MIN_RELEVANCE: f32 = 0.3;

/// Temperature for relevance judgments.
pub const JUDGE_TEMPERATURE: f32 = 0.3;

/// Temperature for user-facing recommendations.
pub const COMPOSER_TEMPERATURE: f32 = 0.7;

/// Characters of raw instruction kept by the composer fallback.
pub const FALLBACK_INSTRUCTION_CHARS: usize = 200;

/// Default embedding dimension (MiniLM-L12 family).
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

/// Max tokens fed to the sentence encoder.
pub const DEFAULT_MAX_SEQ_LEN: usize = 256;

pub const DEFAULT_CHAT_COMPLETIONS_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_JUDGE_MODEL: &str = "tngtech/deepseek-r1t2-chimera:free";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Fused ranking score for one judged candidate.
pub fn fuse_scores(similarity: f32, relevance: f32) -> f32 {
    VECTOR_WEIGHT * similarity + JUDGE_WEIGHT * relevance
}
