//! Core types

pub mod document;
pub mod message;

pub use document::{Chunk, ChunkSource, Document};
pub use message::{timestamp_now, ChatMessage, Role};
