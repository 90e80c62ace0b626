//! Inverted-file (IVF-Flat) index.
//!
//! Vectors are bucketed by their nearest k-means centroid (squared L2). A query
//! scans only the `probes` buckets whose centroids are closest, then scores the
//! bucket members with the index metric.

use rkyv::{Archive, Deserialize, Serialize};
use tracing::debug;

use super::native::{Metric, squared_l2, top_k};
use crate::constants::{KMEANS_ITERATIONS, KMEANS_MAX_POINTS_PER_CLUSTER};

#[derive(Archive, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct IvfIndex {
    pub(crate) metric: Metric,
    pub(crate) dimension: usize,
    pub(crate) probes: usize,
    /// Row-major `clusters x dimension`.
    pub(crate) centroids: Vec<f32>,
    /// Member positions per centroid.
    pub(crate) lists: Vec<Vec<u32>>,
    /// Row-major `len x dimension`, indexed by position.
    pub(crate) vectors: Vec<f32>,
}

impl IvfIndex {
    /// Trains centroids on `vectors` and assigns every vector to a list.
    pub fn train(
        metric: Metric,
        dimension: usize,
        clusters: usize,
        probes: usize,
        vectors: &[Vec<f32>],
    ) -> Self {
        let clusters = clusters.clamp(1, vectors.len().max(1));
        let centroids = kmeans(vectors, dimension, clusters, KMEANS_ITERATIONS);

        let mut lists = vec![Vec::new(); clusters];
        let mut flat = Vec::with_capacity(vectors.len() * dimension);
        for (position, vector) in vectors.iter().enumerate() {
            lists[nearest_centroid(&centroids, dimension, vector)].push(position as u32);
            flat.extend_from_slice(vector);
        }

        debug!(
            clusters,
            probes,
            vectors = vectors.len(),
            largest_list = lists.iter().map(Vec::len).max().unwrap_or(0),
            "Trained inverted file"
        );

        Self {
            metric,
            dimension,
            probes: probes.clamp(1, clusters),
            centroids,
            lists,
            vectors: flat,
        }
    }

    pub fn clusters(&self) -> usize {
        self.lists.len()
    }

    pub fn probes(&self) -> usize {
        self.probes
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

    /// Checks the invariants `search` indexes by: centroid rows match the lists and
    /// every list entry names a stored vector.
    pub(crate) fn check(&self) -> Result<(), String> {
        if self.dimension == 0 || self.vectors.len() % self.dimension != 0 {
            return Err(format!(
                "{} vector values do not fit dimension {}",
                self.vectors.len(),
                self.dimension
            ));
        }
        if self.lists.is_empty() || self.centroids.len() != self.lists.len() * self.dimension {
            return Err(format!(
                "{} centroid values for {} lists of dimension {}",
                self.centroids.len(),
                self.lists.len(),
                self.dimension
            ));
        }
        if !(1..=self.lists.len()).contains(&self.probes) {
            return Err(format!(
                "{} probes for {} lists",
                self.probes,
                self.lists.len()
            ));
        }
        let len = self.len();
        if let Some(position) = self.lists.iter().flatten().find(|p| **p as usize >= len) {
            return Err(format!("list entry {position} outside {len} vectors"));
        }
        Ok(())
    }

    /// Returns up to `k` `(position, raw_score)` pairs from the probed lists, best first.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<(usize, f32)> {
        if self.dimension == 0 {
            return Vec::new();
        }

        let mut by_distance: Vec<(usize, f32)> = self
            .centroids
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(cluster, centroid)| (cluster, squared_l2(query, centroid)))
            .collect();
        by_distance.sort_by(|a, b| Metric::SquaredL2.compare(a.1, b.1));

        let scored = by_distance
            .iter()
            .take(self.probes)
            .flat_map(|(cluster, _)| self.lists[*cluster].iter())
            .map(|&position| {
                let position = position as usize;
                let start = position * self.dimension;
                let vector = &self.vectors[start..start + self.dimension];
                (position, self.metric.score(query, vector))
            })
            .collect();

        top_k(scored, k, self.metric)
    }
}

fn nearest_centroid(centroids: &[f32], dimension: usize, vector: &[f32]) -> usize {
    centroids
        .chunks_exact(dimension)
        .enumerate()
        .map(|(cluster, centroid)| (cluster, squared_l2(vector, centroid)))
        .min_by(|a, b| Metric::SquaredL2.compare(a.1, b.1))
        .map(|(cluster, _)| cluster)
        .unwrap_or(0)
}

/// Lloyd's k-means over an evenly strided training sample.
///
/// Centroids start at evenly spaced sample points, so training is deterministic.
/// A cluster that loses all members keeps its previous centroid.
pub(crate) fn kmeans(
    vectors: &[Vec<f32>],
    dimension: usize,
    clusters: usize,
    iterations: usize,
) -> Vec<f32> {
    if vectors.is_empty() || clusters == 0 {
        return Vec::new();
    }

    let max_points = clusters * KMEANS_MAX_POINTS_PER_CLUSTER;
    let stride = vectors.len().div_ceil(max_points).max(1);
    let sample: Vec<&[f32]> = vectors.iter().step_by(stride).map(Vec::as_slice).collect();

    let mut centroids = Vec::with_capacity(clusters * dimension);
    for cluster in 0..clusters {
        let pick = cluster * sample.len() / clusters;
        centroids.extend_from_slice(sample[pick]);
    }

    let mut assignment = vec![usize::MAX; sample.len()];
    for iteration in 0..iterations {
        let mut changed = 0usize;
        for (slot, point) in assignment.iter_mut().zip(&sample) {
            let nearest = nearest_centroid(&centroids, dimension, point);
            if *slot != nearest {
                *slot = nearest;
                changed += 1;
            }
        }

        let mut sums = vec![0.0f32; clusters * dimension];
        let mut counts = vec![0usize; clusters];
        for (cluster, point) in assignment.iter().zip(&sample) {
            counts[*cluster] += 1;
            let row = &mut sums[cluster * dimension..(cluster + 1) * dimension];
            for (acc, value) in row.iter_mut().zip(point.iter()) {
                *acc += value;
            }
        }

        for (cluster, count) in counts.iter().enumerate() {
            if *count == 0 {
                continue;
            }
            let range = cluster * dimension..(cluster + 1) * dimension;
            for (centroid, sum) in centroids[range.clone()].iter_mut().zip(&sums[range]) {
                *centroid = sum / *count as f32;
            }
        }

        if changed == 0 {
            debug!(iteration, "k-means converged");
            break;
        }
    }

    centroids
}
