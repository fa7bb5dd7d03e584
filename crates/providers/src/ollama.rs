//! Sentence embeddings via Ollama.
//!
//! Uses Ollama's batch embedding API with a sentence-transformer model
//! (`all-minilm` by default).

use async_trait::async_trait;
use lexqual_core::EmbeddingConfig;
use reqwest::{Client, ClientBuilder};
use serde_json::json;
use tracing::debug;

use crate::trait_::{ProviderError, Result, SentenceEmbedder};

/// Ollama Embedding Client.
#[derive(Clone)]
pub struct OllamaEmbedder {
    /// HTTP client
    client: Client,

    /// Ollama server URL
    url: String,

    /// Model name
    model: String,
}

impl OllamaEmbedder {
    /// Create a new Ollama embedding client.
    pub fn new(config: &EmbeddingConfig) -> Self {
        Self {
            client: ClientBuilder::new()
                .timeout(config.timeout())
                .build()
                .unwrap_or_default(),
            url: config.ollama_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        }
    }

    /// Whether the server answers its version endpoint with a success status.
    ///
    /// Errors only when the server cannot be reached at all.
    pub async fn health_check(&self) -> Result<bool> {
        let response = self
            .client
            .get(format!("{}/api/version", self.url))
            .send()
            .await?;

        Ok(response.status().is_success())
    }
}

#[derive(serde::Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[async_trait]
impl SentenceEmbedder for OllamaEmbedder {
    async fn embed(&self, sentences: &[String]) -> Result<Vec<Vec<f32>>> {
        if sentences.is_empty() {
            return Ok(Vec::new());
        }

        let payload = json!({
            "model": self.model,
            "input": sentences,
        });

        debug!("Embedding {} sentences with {}", sentences.len(), self.model);

        let response = self
            .client
            .post(format!("{}/api/embed", self.url))
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                service: "Ollama",
                status,
                body,
            });
        }

        let data: EmbedResponse = response.json().await?;

        if data.embeddings.len() != sentences.len() {
            return Err(ProviderError::Contract(format!(
                "expected {} embeddings, got {}",
                sentences.len(),
                data.embeddings.len()
            )));
        }

        Ok(data.embeddings)
    }
}
