//! Ingestion pipeline orchestration

use crate::config::ChunkingConfig;
use crate::error::Result;
use crate::types::{Chunk, Document};

use super::chunker::TextChunker;
use super::pdf::{ExtractedPdf, PdfExtractor};

/// A document with its chunks, ready for indexing
#[derive(Debug, Clone)]
pub struct IngestedDocument {
    pub document: Document,
    pub chunks: Vec<Chunk>,
}

/// Main ingestion pipeline: extract, then chunk
pub struct IngestPipeline {
    chunker: TextChunker,
}

impl IngestPipeline {
    /// Create a new ingestion pipeline
    pub fn new(config: &ChunkingConfig) -> Result<Self> {
        Ok(Self {
            chunker: TextChunker::new(config.chunk_size, config.chunk_overlap)?,
        })
    }

    /// Extract text from a PDF
    pub fn extract(&self, filename: &str, data: &[u8]) -> Result<ExtractedPdf> {
        PdfExtractor::extract(filename, data)
    }

    /// Create a document record and its chunks from extracted text
    pub fn chunk(&self, pdf: &ExtractedPdf, file_size: u64) -> IngestedDocument {
        let mut document = Document::new(pdf.filename.clone(), pdf.content_hash.clone(), file_size);
        document.total_pages = Some(pdf.total_pages);

        let chunks = self.chunker.chunk_document(&document, pdf);
        document.total_chunks = chunks.len() as u32;

        IngestedDocument { document, chunks }
    }

    /// Full ingestion: extract + chunk
    pub fn ingest(&self, filename: &str, data: &[u8]) -> Result<IngestedDocument> {
        let pdf = self.extract(filename, data)?;
        Ok(self.chunk(&pdf, data.len() as u64))
    }
}

impl Default for IngestPipeline {
    fn default() -> Self {
        Self {
            chunker: TextChunker::default(),
        }
    }
}
