//! Seams to the external embedding and labeling services.
//!
//! The engine never generates embeddings or labels itself. Both
//! capabilities are consumed through traits so the integrating
//! application can plug in whatever backend it runs: the bundled
//! implementations live in `providers`, tests use in-memory fakes.
//!
//! Neither call is retried or bounded by the engine; a slow service is
//! the caller's problem to time out, a failed one surfaces immediately.

/// Error from an external provider call.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Embedding provider failed: {0}")]
    Embedding(String),

    #[error("Label generator failed: {0}")]
    Labeling(String),

    #[error("Provider returned malformed output: {0}")]
    Malformed(String),
}

/// Produces a fixed-dimension embedding vector for a piece of text.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text. The returned vector must have `dimensions()`
    /// components.
    fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError>;

    /// Dimensionality of the vectors this provider produces.
    fn dimensions(&self) -> usize;
}

/// Produces a short natural-language label from sampled cluster content.
///
/// Only the sampled titles and the distinct kind tags are disclosed to
/// the service; no other item data leaves the engine.
pub trait LabelGenerator: Send + Sync {
    /// Summarize the samples into a 2-3 word label.
    fn summarize(&self, sample_titles: &[String], kinds: &[String]) -> Result<String, ProviderError>;
}
