//! Local embedding provider backed by fastembed.
//!
//! Downloads the model on first use into `cache_dir/models/`. Wrapped
//! in a Mutex because fastembed's `embed()` requires `&mut self`; the
//! lock covers only the model call, never engine state.

use std::path::PathBuf;
use std::sync::Mutex;

use fastembed::{InitOptions, TextEmbedding};

use crate::provider::{EmbeddingProvider, ProviderError};

/// `EmbeddingProvider` implementation running a local fastembed model.
pub struct FastembedProvider {
    model: Mutex<TextEmbedding>,
    model_name: String,
    dimensions: usize,
}

impl FastembedProvider {
    /// Initialize a provider for the named model, downloading it into
    /// `cache_dir/models/` if not already present.
    pub fn new(model_name: &str, cache_dir: PathBuf) -> Result<Self, ProviderError> {
        let model_enum = parse_model_name(model_name)?;

        let models_dir = cache_dir.join("models");
        std::fs::create_dir_all(&models_dir).map_err(|e| {
            ProviderError::Embedding(format!("Failed to create models directory: {}", e))
        })?;

        let options = InitOptions::new(model_enum)
            .with_cache_dir(models_dir)
            .with_show_download_progress(false);

        let mut model = TextEmbedding::try_new(options)
            .map_err(|e| ProviderError::Embedding(format!("Model initialization failed: {}", e)))?;

        let dimensions = probe_dimensions(&mut model)?;

        Ok(Self {
            model: Mutex::new(model),
            model_name: model_name.to_string(),
            dimensions,
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

impl EmbeddingProvider for FastembedProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let mut model = self
            .model
            .lock()
            .map_err(|e| ProviderError::Embedding(format!("Failed to acquire model lock: {}", e)))?;

        let embeddings = model
            .embed(vec![text], None)
            .map_err(|e| ProviderError::Embedding(e.to_string()))?;

        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Malformed("Model returned no embedding".to_string()))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Map a model name to the fastembed enum. A short allowlist keeps the
/// engine's vectors dimensionally consistent per corpus.
fn parse_model_name(name: &str) -> Result<fastembed::EmbeddingModel, ProviderError> {
    match name.to_lowercase().as_str() {
        "all-minilm-l6-v2" => Ok(fastembed::EmbeddingModel::AllMiniLML6V2),
        "bge-small-en-v1.5" => Ok(fastembed::EmbeddingModel::BGESmallENV15),
        "bge-base-en-v1.5" => Ok(fastembed::EmbeddingModel::BGEBaseENV15),
        _ => Err(ProviderError::Embedding(format!(
            "Unknown model: {}. Supported models: all-MiniLM-L6-v2, bge-small-en-v1.5, bge-base-en-v1.5",
            name
        ))),
    }
}

/// Determine the output dimensionality by embedding a probe string.
fn probe_dimensions(model: &mut TextEmbedding) -> Result<usize, ProviderError> {
    let probe = model
        .embed(vec!["probe"], None)
        .map_err(|e| ProviderError::Embedding(format!("Failed to probe dimensions: {}", e)))?;

    probe
        .first()
        .map(|v| v.len())
        .ok_or_else(|| ProviderError::Malformed("Model returned no embedding".to_string()))
}
