use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use minutey_agent::LlmClient;
use minutey_core::config::LlmConfig;
use minutey_core::ExtractionError;

/// Generation knobs mirrored from the dashboard's tuning: low temperature
/// for schema-faithful JSON, bounded prediction length per fragment.
const TEMPERATURE: f64 = 0.3;
const NUM_PREDICT: u32 = 500;

/// [`LlmClient`] backed by a local Ollama server's `/api/generate` endpoint.
/// Transport failures and timeouts surface as `UpstreamUnavailable`, which
/// the reconciler treats as "fall back to the deterministic pass".
pub struct OllamaClient {
    http: Client,
    base_url: String,
    model: String,
    max_retries: u32,
}

impl OllamaClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(Duration::from_secs(config.timeout_secs)).build()?;
        Ok(Self {
            http,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| "http://localhost:11434".to_string()),
            model: config.model.clone(),
            max_retries: config.max_retries,
        })
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn complete(&self, prompt: &str) -> Result<String, ExtractionError> {
        let url = format!("{}/api/generate", self.base_url.trim_end_matches('/'));
        let body = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "format": "json",
            "options": {"temperature": TEMPERATURE, "num_predict": NUM_PREDICT},
        });

        let mut last_error = String::new();
        for attempt in 0..=self.max_retries {
            let sent = self.http.post(&url).json(&body).send().await;
            match sent.and_then(|response| response.error_for_status()) {
                Ok(response) => {
                    let payload = response
                        .json::<GenerateResponse>()
                        .await
                        .map_err(|source| ExtractionError::MalformedResponse(source.to_string()))?;
                    return payload.response.ok_or_else(|| {
                        ExtractionError::MalformedResponse(
                            "completion payload carries no `response` field".to_string(),
                        )
                    });
                }
                Err(error) => {
                    last_error = error.to_string();
                    if attempt < self.max_retries {
                        debug!(
                            event_name = "server.ollama.retry",
                            attempt = attempt + 1,
                            error = %last_error,
                            "retrying ollama completion"
                        );
                    }
                }
            }
        }

        Err(ExtractionError::UpstreamUnavailable(last_error))
    }
}
