//! Recursive character chunking with page tracking
//!
//! Text is split on the first separator (in priority order) that occurs in it,
//! the separator staying attached to the start of the following piece. Pieces
//! shorter than `chunk_size` are merged greedily into chunks; pieces that are
//! still too long are split again with the remaining separators. When a chunk
//! is emitted, pieces are dropped from its front until at most `chunk_overlap`
//! characters remain, and those carry over into the next chunk.
//!
//! Lengths are counted in `char`s.

use std::collections::VecDeque;

use crate::error::{Error, Result};
use crate::types::{Chunk, ChunkSource, Document};

use super::pdf::ExtractedPdf;

/// Default separators: paragraphs, lines, words, characters
pub const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Recursive text chunker with configurable size and overlap
#[derive(Debug, Clone)]
pub struct TextChunker {
    /// Maximum chunk size in characters
    chunk_size: usize,
    /// Overlap carried between consecutive chunks
    chunk_overlap: usize,
    /// Separators in priority order
    separators: Vec<String>,
}

impl TextChunker {
    /// Create a new chunker
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::Config("chunk_size must be greater than 0".to_string()));
        }
        if chunk_overlap > chunk_size {
            return Err(Error::Config(format!(
                "chunk_overlap ({}) must not exceed chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }

        Ok(Self {
            chunk_size,
            chunk_overlap,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Replace the separator list
    pub fn with_separators(mut self, separators: &[&str]) -> Self {
        self.separators = separators.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Split text into chunks
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }

    /// Chunk an extracted PDF, attributing each chunk to the page it starts on
    pub fn chunk_document(&self, doc: &Document, pdf: &ExtractedPdf) -> Vec<Chunk> {
        let texts = self.split_text(&pdf.text);
        let mut chunks = Vec::with_capacity(texts.len());
        let mut previous_start: Option<usize> = None;

        for (index, content) in texts.into_iter().enumerate() {
            let search_from = match previous_start {
                Some(start) => next_char_boundary(&pdf.text, start),
                None => 0,
            };
            let char_start = pdf.text[search_from..]
                .find(content.as_str())
                .map(|pos| search_from + pos)
                .unwrap_or_else(|| previous_start.unwrap_or(0));
            previous_start = Some(char_start);

            let source = ChunkSource {
                filename: doc.filename.clone(),
                page_number: pdf.page_for_offset(char_start),
                page_count: Some(pdf.total_pages),
            };

            chunks.push(Chunk::new(doc.id, content, source, char_start, index as u32));
        }

        tracing::debug!("{}: {} chunks", doc.filename, chunks.len());
        chunks
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let mut final_chunks = Vec::new();

        let mut separator = separators.last().map(String::as_str).unwrap_or("");
        let mut remaining: &[String] = &[];
        for (i, candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                separator = "";
                break;
            }
            if text.contains(candidate.as_str()) {
                separator = candidate;
                remaining = &separators[i + 1..];
                break;
            }
        }

        let mut good_splits: Vec<&str> = Vec::new();
        for piece in split_keep_start(text, separator) {
            if char_len(piece) < self.chunk_size {
                good_splits.push(piece);
                continue;
            }

            if !good_splits.is_empty() {
                final_chunks.extend(self.merge_splits(&good_splits));
                good_splits.clear();
            }

            if remaining.is_empty() {
                let trimmed = piece.trim();
                if !trimmed.is_empty() {
                    final_chunks.push(trimmed.to_string());
                }
            } else {
                final_chunks.extend(self.split_recursive(piece, remaining));
            }
        }

        if !good_splits.is_empty() {
            final_chunks.extend(self.merge_splits(&good_splits));
        }

        final_chunks
    }

    fn merge_splits(&self, splits: &[&str]) -> Vec<String> {
        let mut docs = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for piece in splits {
            let len = char_len(piece);

            if total + len > self.chunk_size {
                if total > self.chunk_size {
                    tracing::warn!(
                        "Created a chunk of size {}, which is longer than the specified {}",
                        total,
                        self.chunk_size
                    );
                }

                if !current.is_empty() {
                    if let Some(doc) = join_pieces(&current) {
                        docs.push(doc);
                    }

                    while total > self.chunk_overlap
                        || (total + len > self.chunk_size && total > 0)
                    {
                        match current.pop_front() {
                            Some(first) => total -= char_len(first),
                            None => break,
                        }
                    }
                }
            }

            current.push_back(piece);
            total += len;
        }

        if let Some(doc) = join_pieces(&current) {
            docs.push(doc);
        }

        docs
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Split on `separator`, keeping it at the start of each following piece.
/// An empty separator splits into characters. Empty pieces are dropped.
fn split_keep_start<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0usize;
    for (pos, _) in text.match_indices(separator) {
        if pos > start {
            pieces.push(&text[start..pos]);
        }
        start = pos;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }

    pieces.retain(|p| !p.is_empty());
    pieces
}

fn join_pieces(pieces: &VecDeque<&str>) -> Option<String> {
    let joined: String = pieces.iter().copied().collect();
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn next_char_boundary(text: &str, index: usize) -> usize {
    let mut next = index + 1;
    while next < text.len() && !text.is_char_boundary(next) {
        next += 1;
    }
    next.min(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::pdf::PageText;
    use proptest::prelude::*;

    fn chunker(size: usize, overlap: usize) -> TextChunker {
        TextChunker::new(size, overlap).unwrap()
    }

    fn page(page_number: u32, text: &str, char_offset: usize) -> PageText {
        PageText {
            page_number,
            text: text.to_string(),
            char_offset,
        }
    }

    fn extracted(text: &str, pages: Vec<PageText>) -> ExtractedPdf {
        let total_pages = pages.len() as u32;
        ExtractedPdf {
            filename: "doc.pdf".to_string(),
            text: text.to_string(),
            pages,
            total_pages,
            content_hash: String::new(),
        }
    }

    #[test]
    fn test_short_text_single_chunk() {
        let chunks = TextChunker::default().split_text("  Para one.\n\nPara two.  ");
        assert_eq!(chunks, vec!["Para one.\n\nPara two."]);
    }

    #[test]
    fn test_empty_text() {
        assert!(TextChunker::default().split_text("").is_empty());
        assert!(TextChunker::default().split_text(" \n\n \n").is_empty());
    }

    #[test]
    fn test_paragraph_split() {
        let chunks = chunker(12, 0).split_text("Para one.\n\nPara two.");
        assert_eq!(chunks, vec!["Para one.", "Para two."]);
    }

    #[test]
    fn test_word_overlap() {
        let chunks = chunker(10, 5).split_text("aa bb cc dd ee ff");
        assert_eq!(chunks, vec!["aa bb cc", "cc dd ee", "ee ff"]);
    }

    #[test]
    fn test_character_fallback() {
        let chunks = chunker(4, 0).split_text("abcdefghij");
        assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        let chunks = chunker(2, 0).split_text("ééééé");
        assert_eq!(chunks, vec!["éé", "éé", "é"]);
    }

    #[test]
    fn test_chunks_respect_size() {
        let text = (0..400)
            .map(|i| format!("word{} ", i))
            .collect::<String>()
            .replace("word100 ", "word100\n\n");
        let chunker = TextChunker::default();
        let chunks = chunker.split_text(&text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 1000);
        }
    }

    #[test]
    fn test_unsplittable_piece_kept_whole() {
        let chunks = chunker(5, 0)
            .with_separators(&[" "])
            .split_text("abcdefghijkl mn");
        assert_eq!(chunks, vec!["abcdefghijkl", "mn"]);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(TextChunker::new(0, 0).is_err());
        assert!(TextChunker::new(100, 200).is_err());
        assert!(TextChunker::new(100, 100).is_ok());
    }

    #[test]
    fn test_chunk_document_offsets_and_pages() {
        let text = "aa bb cc\ndd ee ff";
        let pdf = extracted(
            text,
            vec![page(1, "aa bb cc", 0), page(2, "dd ee ff", 9)],
        );
        let doc = Document::new("doc.pdf".to_string(), String::new(), 0);

        let chunks = chunker(10, 5).chunk_document(&doc, &pdf);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].content, "aa bb cc");
        assert_eq!(chunks[0].char_start, 0);
        assert_eq!(chunks[0].source.page_number, Some(1));
        assert_eq!(chunks[1].content, "dd ee ff");
        assert_eq!(chunks[1].char_start, 9);
        assert_eq!(chunks[1].source.page_number, Some(2));
        assert_eq!(chunks[1].chunk_index, 1);
        assert!(chunks.iter().all(|c| c.document_id == doc.id));
    }

    #[test]
    fn test_overlapping_chunks_located_forward() {
        let text = "aa bb cc dd ee ff";
        let pdf = extracted(text, vec![page(1, text, 0)]);
        let doc = Document::new("doc.pdf".to_string(), String::new(), 0);

        let starts: Vec<usize> = chunker(10, 5)
            .chunk_document(&doc, &pdf)
            .iter()
            .map(|c| c.char_start)
            .collect();
        assert_eq!(starts, vec![0, 6, 12]);
    }

    /// Space, line or paragraph separated text of unique fixed-width words
    fn word_text(words: &[u8]) -> String {
        let mut text = String::new();
        for (i, kind) in words.iter().enumerate() {
            if i > 0 {
                text.push_str(match kind % 4 {
                    0 => "\n\n",
                    1 => "\n",
                    _ => " ",
                });
            }
            text.push_str(&format!("w{:04}", i));
        }
        text
    }

    proptest! {
        #[test]
        fn test_chunk_bounds_and_overlap(
            words in proptest::collection::vec(any::<u8>(), 1..150),
            chunk_size in 10usize..80,
            overlap_fraction in 0usize..=50,
        ) {
            let chunk_overlap = chunk_size * overlap_fraction / 100;
            let text = word_text(&words);
            let pdf = extracted(&text, vec![page(1, &text, 0)]);
            let doc = Document::new("doc.pdf".to_string(), String::new(), 0);

            let chunks = chunker(chunk_size, chunk_overlap).chunk_document(&doc, &pdf);
            prop_assert!(!chunks.is_empty());

            for chunk in &chunks {
                prop_assert!(chunk.content.chars().count() <= chunk_size);
                let located = &text[chunk.char_start..chunk.char_start + chunk.content.len()];
                prop_assert_eq!(located, chunk.content.as_str());
            }
            for pair in chunks.windows(2) {
                let previous_end = pair[0].char_start + pair[0].content.len();
                prop_assert!(pair[1].char_start > pair[0].char_start);
                prop_assert!(previous_end.saturating_sub(pair[1].char_start) <= chunk_overlap);
            }
        }
    }
}
