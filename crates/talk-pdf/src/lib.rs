//! talk-pdf: ask questions about your PDF documents
//!
//! PDFs are split into overlapping text chunks, embedded through a hosted
//! OpenAI-compatible API and kept in an exact in-memory vector index. Each
//! question retrieves the closest chunks and sends them with the question to
//! a chat model.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod session;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use retrieval::{DistanceMetric, SearchResult, VectorIndex};
pub use session::{ChatSession, ProcessSummary, UploadedFile};
pub use types::{ChatMessage, Chunk, ChunkSource, Document, Role};
