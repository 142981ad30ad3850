//! Exact in-memory vector index
//!
//! Every query is scored against every stored embedding, so results are
//! exact. Scoring runs in parallel with rayon.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;
use crate::types::Chunk;

/// Distance metric used to rank chunks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Squared Euclidean distance, lower is better
    #[default]
    L2,
    /// Cosine similarity, higher is better
    Cosine,
}

impl DistanceMetric {
    fn score(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            DistanceMetric::L2 => squared_l2(a, b),
            DistanceMetric::Cosine => cosine_similarity(a, b),
        }
    }

    /// Ordering that puts better scores first
    fn ordering(&self, a: f32, b: f32) -> std::cmp::Ordering {
        match self {
            DistanceMetric::L2 => a.total_cmp(&b),
            DistanceMetric::Cosine => b.total_cmp(&a),
        }
    }
}

/// A chunk together with its embedding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedChunk {
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

/// Search result with chunk and score
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The retrieved chunk
    pub chunk: Chunk,
    /// L2 distance or cosine similarity, depending on the index metric
    pub score: f32,
}

/// Flat vector index over document chunks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorIndex {
    dimensions: usize,
    metric: DistanceMetric,
    entries: Vec<IndexedChunk>,
}

impl VectorIndex {
    /// Create an empty index with fixed dimensions
    pub fn new(dimensions: usize, metric: DistanceMetric) -> Self {
        Self {
            dimensions,
            metric,
            entries: Vec::new(),
        }
    }

    /// Embed all chunks and build an index from them
    pub async fn build(
        chunks: Vec<Chunk>,
        embedder: &dyn EmbeddingProvider,
        metric: DistanceMetric,
    ) -> Result<Self> {
        if chunks.is_empty() {
            return Err(Error::EmptyIndex);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        tracing::info!("Embedding {} chunks with {}", texts.len(), embedder.name());

        let embeddings = embedder.embed_batch(&texts).await?;
        if embeddings.len() != chunks.len() {
            return Err(Error::vector_db(format!(
                "Embedding provider returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let dimensions = embeddings.first().map(Vec::len).unwrap_or(0);
        if dimensions == 0 {
            return Err(Error::vector_db("Embedding provider returned empty vectors"));
        }
        if dimensions != embedder.dimensions() {
            tracing::debug!(
                "{} reported {} dimensions, vectors have {}",
                embedder.name(),
                embedder.dimensions(),
                dimensions
            );
        }

        let mut index = Self::new(dimensions, metric);
        for (chunk, embedding) in chunks.into_iter().zip(embeddings) {
            index.insert(chunk, embedding)?;
        }

        tracing::info!(
            "Built vector index: {} chunks, {} dimensions, {:?}",
            index.len(),
            index.dimensions,
            index.metric
        );
        Ok(index)
    }

    /// Add a single chunk
    pub fn insert(&mut self, chunk: Chunk, embedding: Vec<f32>) -> Result<()> {
        if embedding.len() != self.dimensions {
            return Err(Error::vector_db(format!(
                "Dimension mismatch: expected {}, got {}",
                self.dimensions,
                embedding.len()
            )));
        }
        self.entries.push(IndexedChunk { chunk, embedding });
        Ok(())
    }

    /// Top `k` chunks for a query embedding, best first
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        if query.len() != self.dimensions {
            return Err(Error::vector_db(format!(
                "Query dimension mismatch: expected {}, got {}",
                self.dimensions,
                query.len()
            )));
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .par_iter()
            .enumerate()
            .map(|(i, entry)| (i, self.metric.score(query, &entry.embedding)))
            .collect();

        // Stable sort keeps insertion order among equal scores
        scored.sort_by(|a, b| self.metric.ordering(a.1, b.1));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(i, score)| SearchResult {
                chunk: self.entries[i].chunk.clone(),
                score,
            })
            .collect())
    }

    /// Write the index to a JSON file
    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, serde_json::to_vec(self)?).await?;
        tracing::info!("Saved {} chunks to {}", self.len(), path.display());
        Ok(())
    }

    /// Read an index written by [`VectorIndex::save`]
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read(path).await?;
        let index: Self = serde_json::from_slice(&raw)?;

        if let Some(bad) = index
            .entries
            .iter()
            .find(|e| e.embedding.len() != index.dimensions)
        {
            return Err(Error::vector_db(format!(
                "Chunk {} has {} dimensions, index has {}",
                bad.chunk.id,
                bad.embedding.len(),
                index.dimensions
            )));
        }

        tracing::info!("Loaded {} chunks from {}", index.len(), path.display());
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Distinct source filenames, in insertion order
    pub fn documents(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for entry in &self.entries {
            if !names.contains(&entry.chunk.source.filename) {
                names.push(entry.chunk.source.filename.clone());
            }
        }
        names
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
