//! Euri-backed providers for embeddings and chat
//!
//! Wraps the shared `EuriClient` to implement the provider traits.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::ApiConfig;
use crate::error::Result;
use crate::generation::EuriClient;

use super::embedding::EmbeddingProvider;
use super::llm::ChatModel;

/// Hosted embedding provider
pub struct EuriEmbedder {
    client: Arc<EuriClient>,
    dimensions: usize,
    batch_size: usize,
}

impl EuriEmbedder {
    /// Create from an existing client
    pub fn from_client(client: Arc<EuriClient>) -> Self {
        let dimensions = client.config().embedding_dimensions;
        let batch_size = client.config().embed_batch_size.max(1);
        Self {
            client,
            dimensions,
            batch_size,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for EuriEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.client.embed_batch(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| crate::error::Error::embedding("Empty embedding result"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            embeddings.extend(self.client.embed_batch(batch).await?);
        }
        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "euri"
    }
}

/// Hosted chat model
pub struct EuriChat {
    client: Arc<EuriClient>,
    model: String,
}

impl EuriChat {
    /// Create from an existing client
    pub fn from_client(client: Arc<EuriClient>) -> Self {
        let model = client.config().chat_model.clone();
        Self { client, model }
    }
}

#[async_trait]
impl ChatModel for EuriChat {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.client.complete(prompt).await
    }

    async fn health_check(&self) -> Result<bool> {
        self.client.health_check().await
    }

    fn name(&self) -> &str {
        "euri"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Embedding and chat providers sharing one client
#[derive(Clone)]
pub struct Providers {
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub chat: Arc<dyn ChatModel>,
}

impl Providers {
    /// Build hosted providers from configuration. Fails without an API key.
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let client = Arc::new(EuriClient::new(config)?);
        tracing::info!(
            "Using {} (chat: {}, embeddings: {})",
            config.base_url,
            config.chat_model,
            config.embedding_model
        );
        Ok(Self {
            embedder: Arc::new(EuriEmbedder::from_client(Arc::clone(&client))),
            chat: Arc::new(EuriChat::from_client(client)),
        })
    }

    /// Use explicit providers
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, chat: Arc<dyn ChatModel>) -> Self {
        Self { embedder, chat }
    }
}
