//! HTTP client for the external labeling service.
//!
//! Posts the sampled titles and kinds as JSON and expects a response
//! of the form `{"label": "..."}`. Any transport failure, non-success
//! status or missing field surfaces as a `ProviderError`; the engine's
//! labeling layer turns that into the rule-based fallback.

use std::time::Duration;

use serde_json::{json, Value};

use crate::config::LabelerConfig;
use crate::provider::{LabelGenerator, ProviderError};

/// `LabelGenerator` implementation calling a labeling HTTP endpoint.
pub struct HttpLabelGenerator {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpLabelGenerator {
    /// Build a client from config. Fails when the endpoint is empty or
    /// the HTTP client cannot be constructed.
    pub fn new(config: &LabelerConfig) -> Result<Self, ProviderError> {
        if config.endpoint.trim().is_empty() {
            return Err(ProviderError::Labeling(
                "Labeling endpoint is not configured".to_string(),
            ));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::Labeling(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim().to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn extract_label(resp: &Value) -> Option<String> {
        resp.get("label")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
    }
}

impl LabelGenerator for HttpLabelGenerator {
    fn summarize(&self, sample_titles: &[String], kinds: &[String]) -> Result<String, ProviderError> {
        let body = json!({
            "titles": sample_titles,
            "kinds": kinds,
            "style": "2-3 word descriptive label",
        });

        let mut req = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req
            .send()
            .map_err(|e| ProviderError::Labeling(format!("Request failed: {}", e)))?;

        if !resp.status().is_success() {
            return Err(ProviderError::Labeling(format!(
                "Labeling service returned status {}",
                resp.status()
            )));
        }

        let payload: Value = resp
            .json()
            .map_err(|e| ProviderError::Malformed(format!("Invalid JSON response: {}", e)))?;

        Self::extract_label(&payload)
            .ok_or_else(|| ProviderError::Malformed("Response has no usable label".to_string()))
    }
}
