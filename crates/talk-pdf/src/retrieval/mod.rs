//! Retrieval: vector index and query-time retriever

pub mod index;
pub mod retriever;

pub use index::{DistanceMetric, IndexedChunk, SearchResult, VectorIndex};
pub use retriever::Retriever;
