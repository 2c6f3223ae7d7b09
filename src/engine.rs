//! High-level semantic organization service.
//!
//! One `Engine` instance is constructed per process with explicit
//! dependencies: the config, an embedding provider and a label
//! generator. The embedding cache lives inside the engine with a
//! documented lifecycle (`clear_cache()` exists for test isolation and
//! operational reset) instead of hiding behind a module-level global.
//!
//! Both the search and the clustering entry points live here, so every
//! caller shares one implementation of each.

use std::sync::Arc;

use rand::Rng;

use crate::cache::{CacheError, VectorCache};
use crate::clustering::{cluster_count, kmeans, ClusteringError};
use crate::config::{ConfigError, EngineConfig};
use crate::content::ContentItem;
use crate::hybrid::{self, SearchOutcome};
use crate::labeling::label_cluster;
use crate::provider::{EmbeddingProvider, LabelGenerator, ProviderError};
use crate::similarity::SimilarityMatrix;

/// A labeled cluster of content items.
///
/// Membership is recomputed in full on every `organize` call; cluster
/// ids carry no identity across runs.
#[derive(Debug, Clone)]
pub struct Cluster {
    pub id: usize,
    pub label: String,
    pub member_ids: Vec<u64>,
    pub centroid: Vec<f32>,
}

/// Errors surfaced by the engine's operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Query text is empty")]
    EmptyQuery,

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Clustering error: {0}")]
    Clustering(#[from] ClusteringError),
}

/// Semantic organization engine: hybrid search and labeled clustering
/// over in-memory content batches.
pub struct Engine {
    config: EngineConfig,
    cache: VectorCache,
    embedder: Arc<dyn EmbeddingProvider>,
    labeler: Arc<dyn LabelGenerator>,
}

impl Engine {
    /// Create an engine. Validates the config eagerly.
    pub fn new(
        config: EngineConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        labeler: Arc<dyn LabelGenerator>,
    ) -> Result<Self, EngineError> {
        config.validate()?;

        let cache = VectorCache::new(
            config.cache_capacity,
            std::time::Duration::from_secs(config.cache_ttl_secs),
        );

        Ok(Self {
            config,
            cache,
            embedder,
            labeler,
        })
    }

    /// Hybrid search over `corpus`.
    ///
    /// The query embedding is resolved through the cache; an embedding
    /// provider failure surfaces to the caller. `threshold` falls back
    /// to the configured default when `None`.
    pub fn search(
        &self,
        query: &str,
        corpus: &[ContentItem],
        threshold: Option<f32>,
        limit: usize,
    ) -> Result<SearchOutcome, EngineError> {
        if query.trim().is_empty() {
            return Err(EngineError::EmptyQuery);
        }

        let query_embedding = self.cache.resolve(query, self.embedder.as_ref())?;
        let threshold = threshold.unwrap_or(self.config.default_threshold);

        Ok(hybrid::rank(query, &query_embedding, corpus, threshold, limit))
    }

    /// Partition `corpus` into labeled clusters.
    ///
    /// Uses the process RNG for centroid seeding; repeated runs on the
    /// same batch may produce different partitions. Tests use
    /// [`Engine::organize_with_rng`] with a seeded RNG instead.
    pub fn organize(&self, corpus: &[ContentItem]) -> Result<Vec<Cluster>, EngineError> {
        self.organize_with_rng(corpus, &mut rand::rng())
    }

    /// `organize` with an injected randomness source.
    pub fn organize_with_rng<R: Rng + ?Sized>(
        &self,
        corpus: &[ContentItem],
        rng: &mut R,
    ) -> Result<Vec<Cluster>, EngineError> {
        let embedded = embedded_items(corpus);
        if embedded.is_empty() {
            return Ok(Vec::new());
        }

        let vectors: Vec<Vec<f32>> = embedded
            .iter()
            .map(|(_, embedding)| embedding.to_vec())
            .collect();

        let k = cluster_count(vectors.len());
        let outcome = kmeans(&vectors, k, self.config.max_iterations, rng)?;

        let mut members: Vec<Vec<&ContentItem>> = vec![Vec::new(); k];
        for (&(item, _), &cluster) in embedded.iter().zip(outcome.assignments.iter()) {
            members[cluster].push(item);
        }

        log::debug!(
            "Clustered {} items into {} clusters in {} iterations",
            vectors.len(),
            k,
            outcome.iterations
        );

        // A failed label for one cluster falls back inside
        // `label_cluster` and never aborts the others.
        let clusters = members
            .into_iter()
            .zip(outcome.centroids)
            .enumerate()
            .map(|(id, (members, centroid))| Cluster {
                id,
                label: label_cluster(&members, self.labeler.as_ref()),
                member_ids: members.iter().map(|item| item.id).collect(),
                centroid,
            })
            .collect();

        Ok(clusters)
    }

    /// Full pairwise similarity matrix over the embedded items of
    /// `corpus`.
    pub fn similarity_matrix(&self, corpus: &[ContentItem]) -> SimilarityMatrix {
        SimilarityMatrix::build(corpus)
    }

    /// Number of cached query embeddings.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Drop all cached query embeddings.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

/// Items eligible for vector operations: embedding present, and
/// dimensionality consistent with the first embedded item. Mismatched
/// items are dropped with a warning rather than failing the batch.
fn embedded_items(corpus: &[ContentItem]) -> Vec<(&ContentItem, &[f32])> {
    let mut expected_dim: Option<usize> = None;
    let mut result: Vec<(&ContentItem, &[f32])> = Vec::new();

    for item in corpus {
        let Some(embedding) = item.embedding.as_deref().filter(|e| !e.is_empty()) else {
            continue;
        };

        match expected_dim {
            None => {
                expected_dim = Some(embedding.len());
                result.push((item, embedding));
            }
            Some(dim) if embedding.len() == dim => result.push((item, embedding)),
            Some(dim) => {
                log::warn!(
                    "Dropping item {} from clustering: embedding dimension {} != {}",
                    item.id,
                    embedding.len(),
                    dim
                );
            }
        }
    }

    result
}
