//! Document ingestion: PDF text extraction and chunking

mod chunker;
mod pdf;
mod pipeline;

pub use chunker::{TextChunker, DEFAULT_SEPARATORS};
pub use pdf::{hash_content, ExtractedPdf, PageText, PdfExtractor};
pub use pipeline::{IngestPipeline, IngestedDocument};

#[cfg(test)]
pub(crate) use pdf::test_support;
