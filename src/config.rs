//! Engine configuration.
//!
//! Every field has a serde default so a partial (or empty) config
//! document deserializes into something usable; `validate()` catches
//! the values that would silently misbehave at runtime.

use serde::{Deserialize, Serialize};

/// Default minimum semantic similarity for search results.
const DEFAULT_THRESHOLD: f32 = 0.35;
/// Default embedding cache capacity (entries).
const DEFAULT_CACHE_CAPACITY: usize = 128;
/// Default embedding cache TTL in seconds.
const DEFAULT_CACHE_TTL_SECS: u64 = 900;
/// Default k-means iteration cap.
const DEFAULT_MAX_ITERATIONS: usize = 50;
/// Default labeling request timeout in seconds.
const DEFAULT_LABELER_TIMEOUT_SECS: u64 = 10;

/// Configuration for the labeling service adapter.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LabelerConfig {
    /// Endpoint of the labeling service; empty disables the HTTP
    /// labeler (the rule-based fallback still applies).
    #[serde(default)]
    pub endpoint: String,

    /// Optional bearer token for the labeling service.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_labeler_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LabelerConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: None,
            timeout_secs: DEFAULT_LABELER_TIMEOUT_SECS,
        }
    }
}

fn default_labeler_timeout_secs() -> u64 {
    DEFAULT_LABELER_TIMEOUT_SECS
}

/// Configuration for the semantic organization engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Default similarity threshold [0.0, 1.0] used when a search call
    /// passes none.
    #[serde(default = "default_threshold")]
    pub default_threshold: f32,

    /// Maximum number of cached query embeddings.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Cache entry lifetime in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Iteration cap for a clustering run.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    #[serde(default)]
    pub labeler: LabelerConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_threshold: DEFAULT_THRESHOLD,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            labeler: LabelerConfig::default(),
        }
    }
}

fn default_threshold() -> f32 {
    DEFAULT_THRESHOLD
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

fn default_cache_ttl_secs() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}

fn default_max_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS
}

/// Configuration validation failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("default_threshold must be between 0.0 and 1.0, got {0}")]
    InvalidThreshold(f32),

    #[error("cache_capacity must be at least 1")]
    ZeroCacheCapacity,

    #[error("max_iterations must be at least 1")]
    ZeroMaxIterations,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.default_threshold) || self.default_threshold.is_nan() {
            return Err(ConfigError::InvalidThreshold(self.default_threshold));
        }
        if self.cache_capacity == 0 {
            return Err(ConfigError::ZeroCacheCapacity);
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::ZeroMaxIterations);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.default_threshold - 0.35).abs() < f32::EPSILON);
        assert_eq!(config.cache_capacity, 128);
    }

    #[test]
    fn test_empty_document_deserializes() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_iterations, 50);
        assert!(config.labeler.endpoint.is_empty());
    }

    #[test]
    fn test_partial_document_keeps_other_defaults() {
        let raw = r#"{"default_threshold": 0.5, "labeler": {"endpoint": "http://localhost:9090/label"}}"#;
        let config: EngineConfig = serde_json::from_str(raw).unwrap();
        assert!((config.default_threshold - 0.5).abs() < f32::EPSILON);
        assert_eq!(config.cache_ttl_secs, 900);
        assert_eq!(config.labeler.endpoint, "http://localhost:9090/label");
        assert_eq!(config.labeler.timeout_secs, 10);
    }

    #[test]
    fn test_out_of_range_threshold_rejected() {
        let config = EngineConfig {
            default_threshold: 1.5,
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidThreshold(_))
        ));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = EngineConfig {
            cache_capacity: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroCacheCapacity)
        ));
    }
}
