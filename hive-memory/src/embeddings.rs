//! Embedding providers for the memory store.
//!
//! The embedding engine is an injected black box: UTF-8 text in, a
//! fixed-dimension vector out. The store treats any provider failure as a
//! store-level failure; it never caches or retries on the provider's behalf.

use crate::config::EmbeddingConfig;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

/// Trait for embedding backends.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Provider name (e.g., "openai", "noop")
    fn name(&self) -> &str;

    /// Vector dimensions produced by this provider.
    ///
    /// Must be non-zero for providers used with a vector index.
    fn dimensions(&self) -> usize;

    /// Embed a batch of texts, one vector per input.
    async fn embed(&self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>>;

    /// Embed a single text.
    async fn embed_one(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let mut vectors = self.embed(&[text]).await?;
        vectors
            .pop()
            .ok_or_else(|| anyhow::anyhow!("embedding provider returned no vector"))
    }
}

/// Provider that produces no vectors.
///
/// Useful as a placeholder where semantic search is disabled; rejected by
/// the store at construction because its dimension is zero.
pub struct NoopEmbedding;

#[async_trait]
impl EmbeddingProvider for NoopEmbedding {
    fn name(&self) -> &str {
        "noop"
    }

    fn dimensions(&self) -> usize {
        0
    }

    async fn embed(&self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(vec![Vec::new(); texts.len()])
    }
}

/// OpenAI-compatible embedding provider.
///
/// Works against any endpoint implementing the `/embeddings` API shape.
pub struct OpenAiEmbedding {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    dimensions: usize,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl OpenAiEmbedding {
    /// Create a provider with the default model and endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_config(api_key, &EmbeddingConfig::default())
    }

    /// Create a provider from an explicit configuration.
    pub fn with_config(api_key: impl Into<String>, config: &EmbeddingConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            dimensions: config.dimensions,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedding {
    fn name(&self) -> &str {
        "openai"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
        let url = format!("{}/embeddings", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "model": self.model,
                "input": texts,
            }))
            .send()
            .await?
            .error_for_status()?;

        let parsed: EmbeddingResponse = response.json().await?;

        if parsed.data.len() != texts.len() {
            anyhow::bail!(
                "embedding endpoint returned {} vectors for {} inputs",
                parsed.data.len(),
                texts.len()
            );
        }

        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}

/// Build an embedding provider from configuration.
///
/// Unknown provider names fail rather than silently degrading to noop.
pub fn create_embedding_provider(
    config: &EmbeddingConfig,
) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "openai" => {
            let api_key = config
                .api_key
                .clone()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok())
                .filter(|key| !key.is_empty())
                .ok_or_else(|| {
                    anyhow::anyhow!("openai embedding provider requires an API key")
                })?;
            Ok(Arc::new(OpenAiEmbedding::with_config(api_key, config)))
        }
        "noop" => Ok(Arc::new(NoopEmbedding)),
        other => anyhow::bail!("unknown embedding provider: {other}"),
    }
}
