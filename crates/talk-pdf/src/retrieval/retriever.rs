//! Query-time retrieval over a vector index

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;

use super::index::{SearchResult, VectorIndex};

/// Default number of chunks returned per query
pub const DEFAULT_TOP_K: usize = 4;

/// Embeds queries and looks up the nearest chunks
pub struct Retriever {
    index: Arc<VectorIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
    top_k: usize,
}

impl Retriever {
    pub fn new(
        index: Arc<VectorIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
        top_k: usize,
    ) -> Self {
        Self {
            index,
            embedder,
            top_k: top_k.max(1),
        }
    }

    pub fn index(&self) -> &Arc<VectorIndex> {
        &self.index
    }

    /// Most relevant chunks for a question
    pub async fn retrieve(&self, query: &str) -> Result<Vec<SearchResult>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::InvalidQuery("Query must not be empty".to_string()));
        }

        let embedding = self.embedder.embed(query).await?;
        let results = self.index.search(&embedding, self.top_k)?;

        tracing::debug!(
            "Retrieved {} chunks (best score: {:?})",
            results.len(),
            results.first().map(|r| r.score)
        );
        Ok(results)
    }
}
