//! Semantic organization engine for content collections.
//!
//! Given content items with precomputed embedding vectors, this crate
//! answers two questions:
//!
//! - which items are most relevant to a free-text query (hybrid
//!   lexical + semantic search), and
//! - how do the items naturally group into themes (k-means clustering
//!   with human-readable labels).
//!
//! Embedding generation, persistence and any network surface belong to
//! the surrounding application; the engine consumes an
//! [`EmbeddingProvider`] and a [`LabelGenerator`] through traits and
//! returns plain values.
//!
//! # Architecture
//!
//! - `content`: strict item shapes plus boundary mapping from loose payloads
//! - `provider`: traits for the external embedding and labeling services
//! - `providers`: ready-made provider implementations (fastembed, HTTP)
//! - `cache`: bounded, time-expiring query embedding cache
//! - `similarity`: cosine similarity and pairwise similarity matrices
//! - `clustering`: k-means partitioning with injectable randomness
//! - `labeling`: cluster label derivation with deterministic fallback
//! - `hybrid`: lexical + semantic ranking with a recency fallback
//! - `engine`: high-level service tying everything together

pub mod cache;
pub mod clustering;
pub mod config;
pub mod content;
pub mod engine;
pub mod hybrid;
pub mod labeling;
pub mod provider;
pub mod providers;
pub mod similarity;

#[cfg(test)]
mod tests;

pub use cache::{CacheError, VectorCache};
pub use clustering::{cluster_count, kmeans, ClusteringError, KMeansOutcome};
pub use config::{ConfigError, EngineConfig, LabelerConfig};
pub use content::{ContentItem, ContentKind};
pub use engine::{Cluster, Engine, EngineError};
pub use hybrid::{RankedResult, SearchOutcome};
pub use labeling::label_cluster;
pub use provider::{EmbeddingProvider, LabelGenerator, ProviderError};
pub use similarity::{cosine, SimilarityMatrix};
