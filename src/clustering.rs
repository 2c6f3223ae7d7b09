//! K-means partitioning of embedded content batches.
//!
//! Centroid initialization picks k distinct input vectors uniformly at
//! random, so repeated runs on the same input may produce different
//! (similar-quality) partitions. This is accepted nondeterminism, not
//! a bug; tests pin outcomes by injecting a seeded RNG.
//!
//! - Distance metric: Euclidean, ties broken by lowest centroid index
//! - Convergence: stop as soon as an assignment pass changes nothing
//! - Empty cluster: keeps its previous centroid for the round
//! - No inertia or quality score is computed

use rand::Rng;

/// Default iteration cap when the caller has no opinion.
pub const DEFAULT_MAX_ITERATIONS: usize = 50;

/// Cluster count policy bounds: never fewer than 3 nor more than 7
/// clusters, scaling roughly one cluster per 7 items in between.
const MIN_CLUSTERS: usize = 3;
const MAX_CLUSTERS: usize = 7;
const ITEMS_PER_CLUSTER: usize = 7;

/// Sentinel for "no assignment yet", so the first pass never reads as
/// converged.
const UNASSIGNED: usize = usize::MAX;

/// Result of a k-means run.
///
/// `assignments[i]` is the cluster index (0..k) of input vector `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansOutcome {
    pub assignments: Vec<usize>,
    pub centroids: Vec<Vec<f32>>,
    pub iterations: usize,
}

impl KMeansOutcome {
    fn empty() -> Self {
        Self {
            assignments: Vec::new(),
            centroids: Vec::new(),
            iterations: 0,
        }
    }
}

/// Errors that can occur during clustering.
#[derive(Debug, thiserror::Error)]
pub enum ClusteringError {
    #[error("Invalid cluster count: {requested} requested for {available} vectors")]
    InvalidClusterCount { requested: usize, available: usize },

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// Cluster count policy: `clamp(floor(n / 7), 3, 7)`, except batches
/// with fewer than 3 items get one cluster per item.
pub fn cluster_count(n: usize) -> usize {
    if n < MIN_CLUSTERS {
        return n;
    }
    (n / ITEMS_PER_CLUSTER).clamp(MIN_CLUSTERS, MAX_CLUSTERS)
}

/// Partition `vectors` into `k` clusters.
///
/// An empty input yields an empty outcome without error. `k` must be
/// between 1 and the number of vectors, and all vectors must share one
/// dimension.
pub fn kmeans<R: Rng + ?Sized>(
    vectors: &[Vec<f32>],
    k: usize,
    max_iterations: usize,
    rng: &mut R,
) -> Result<KMeansOutcome, ClusteringError> {
    if vectors.is_empty() {
        return Ok(KMeansOutcome::empty());
    }

    if k == 0 || k > vectors.len() {
        return Err(ClusteringError::InvalidClusterCount {
            requested: k,
            available: vectors.len(),
        });
    }

    let dimension = vectors[0].len();
    if let Some(bad) = vectors.iter().find(|v| v.len() != dimension) {
        return Err(ClusteringError::DimensionMismatch {
            expected: dimension,
            got: bad.len(),
        });
    }

    let mut centroids = initial_centroids(vectors, k, rng);
    let mut assignments = vec![UNASSIGNED; vectors.len()];
    let mut iterations = 0;

    while iterations < max_iterations {
        iterations += 1;

        let new_assignments: Vec<usize> = vectors
            .iter()
            .map(|vector| nearest_centroid(vector, &centroids))
            .collect();

        let converged = new_assignments == assignments;
        assignments = new_assignments;
        if converged {
            break;
        }

        update_centroids(vectors, &assignments, &mut centroids);
    }

    Ok(KMeansOutcome {
        assignments,
        centroids,
        iterations,
    })
}

/// Pick k distinct item indices by rejection sampling and copy their
/// vectors as the initial centroids.
fn initial_centroids<R: Rng + ?Sized>(
    vectors: &[Vec<f32>],
    k: usize,
    rng: &mut R,
) -> Vec<Vec<f32>> {
    let mut chosen: Vec<usize> = Vec::with_capacity(k);
    while chosen.len() < k {
        let idx = rng.random_range(0..vectors.len());
        if !chosen.contains(&idx) {
            chosen.push(idx);
        }
    }
    chosen.into_iter().map(|idx| vectors[idx].clone()).collect()
}

/// Index of the nearest centroid by Euclidean distance. Ties go to the
/// lowest centroid index (strict `<` keeps the first best).
fn nearest_centroid(vector: &[f32], centroids: &[Vec<f32>]) -> usize {
    let mut best = 0;
    let mut best_distance = f32::INFINITY;

    for (idx, centroid) in centroids.iter().enumerate() {
        let distance = squared_distance(vector, centroid);
        if distance < best_distance {
            best_distance = distance;
            best = idx;
        }
    }

    best
}

/// Squared Euclidean distance; the square root is monotone, so argmin
/// is unaffected by skipping it.
fn squared_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Recompute each centroid as the coordinate-wise mean of its members.
/// A cluster with no members keeps its previous centroid.
fn update_centroids(vectors: &[Vec<f32>], assignments: &[usize], centroids: &mut [Vec<f32>]) {
    let dimension = vectors[0].len();
    let k = centroids.len();
    let mut sums = vec![vec![0.0f32; dimension]; k];
    let mut counts = vec![0usize; k];

    for (vector, &cluster) in vectors.iter().zip(assignments.iter()) {
        for (acc, &value) in sums[cluster].iter_mut().zip(vector.iter()) {
            *acc += value;
        }
        counts[cluster] += 1;
    }

    for ((centroid, sum), &count) in centroids.iter_mut().zip(sums).zip(counts.iter()) {
        if count == 0 {
            continue;
        }
        *centroid = sum.into_iter().map(|v| v / count as f32).collect();
    }
}
