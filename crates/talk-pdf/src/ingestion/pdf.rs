//! PDF text extraction
//!
//! Page text comes from `lopdf`; documents whose pages yield nothing that way
//! are retried whole with `pdf-extract`, which copes better with unusual font
//! encodings.

use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Text extracted from a single page
#[derive(Debug, Clone)]
pub struct PageText {
    /// Page number (1-indexed)
    pub page_number: u32,
    /// Text content of the page
    pub text: String,
    /// Byte offset of this page in the full document text
    pub char_offset: usize,
}

/// Extracted PDF with page map
#[derive(Debug, Clone)]
pub struct ExtractedPdf {
    /// Filename as uploaded
    pub filename: String,
    /// Full text, pages joined with a newline
    pub text: String,
    /// Page-level text
    pub pages: Vec<PageText>,
    /// Total pages in the document
    pub total_pages: u32,
    /// Hex SHA-256 of `text`
    pub content_hash: String,
}

impl ExtractedPdf {
    /// Page containing the given byte offset of `text`
    pub fn page_for_offset(&self, offset: usize) -> Option<u32> {
        self.pages
            .iter()
            .take_while(|p| p.char_offset <= offset)
            .last()
            .map(|p| p.page_number)
    }
}

/// PDF text extractor
pub struct PdfExtractor;

impl PdfExtractor {
    /// Extract text from PDF bytes
    pub fn extract(filename: &str, data: &[u8]) -> Result<ExtractedPdf> {
        if !has_pdf_header(data) {
            return Err(Error::file_parse(filename, "missing %PDF header"));
        }

        let doc = lopdf::Document::load_mem(data)
            .map_err(|e| Error::file_parse(filename, e.to_string()))?;

        let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
        let total_pages = page_numbers.len() as u32;

        let mut page_texts = Vec::with_capacity(page_numbers.len());
        for page_number in &page_numbers {
            let text = match doc.extract_text(&[*page_number]) {
                Ok(text) => text,
                Err(e) => {
                    tracing::debug!("{}: page {} extraction failed: {}", filename, page_number, e);
                    String::new()
                }
            };
            page_texts.push((*page_number, text.trim_end().to_string()));
        }

        if page_texts.iter().all(|(_, text)| text.trim().is_empty()) {
            tracing::debug!("{}: no page text from lopdf, trying pdf-extract", filename);
            // pdf-extract panics on some malformed fonts
            let fallback = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(data));
            match fallback {
                Ok(Ok(text)) if !text.trim().is_empty() => {
                    page_texts = vec![(1, text.trim_end().to_string())];
                }
                Ok(Ok(_)) => {}
                Ok(Err(e)) => {
                    tracing::warn!("{}: pdf-extract failed: {}", filename, e);
                }
                Err(_) => {
                    tracing::warn!("{}: pdf-extract panicked", filename);
                }
            }
        }

        let mut text = String::new();
        let mut pages = Vec::with_capacity(page_texts.len());
        for (i, (page_number, page_text)) in page_texts.into_iter().enumerate() {
            if i > 0 {
                text.push('\n');
            }
            pages.push(PageText {
                page_number,
                char_offset: text.len(),
                text: page_text.clone(),
            });
            text.push_str(&page_text);
        }

        if text.trim().is_empty() {
            tracing::warn!("{}: no extractable text (scanned or image-only PDF?)", filename);
        }

        tracing::info!(
            "Extracted {} characters from {} ({} pages)",
            text.chars().count(),
            filename,
            total_pages
        );

        Ok(ExtractedPdf {
            filename: filename.to_string(),
            content_hash: hash_content(&text),
            text,
            pages,
            total_pages,
        })
    }
}

fn has_pdf_header(data: &[u8]) -> bool {
    let head = &data[..data.len().min(1024)];
    head.windows(5).any(|w| w == b"%PDF-")
}

/// Hash content for deduplication
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
pub(crate) mod test_support {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    /// Build a PDF with one page per entry, each showing a single text line
    pub fn sample_pdf(pages: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::sample_pdf;
    use super::*;

    fn page_text(page_number: u32, text: &str, char_offset: usize) -> PageText {
        PageText {
            page_number,
            text: text.to_string(),
            char_offset,
        }
    }

    #[test]
    fn test_rejects_non_pdf() {
        let err = PdfExtractor::extract("notes.pdf", b"just some text").unwrap_err();
        assert!(matches!(err, Error::FileParse { ref filename, .. } if filename == "notes.pdf"));
    }

    #[test]
    fn test_rejects_truncated_pdf() {
        let err = PdfExtractor::extract("broken.pdf", b"%PDF-1.5\n%garbage").unwrap_err();
        assert!(matches!(err, Error::FileParse { .. }));
    }

    #[test]
    fn test_extracts_pages_in_order() {
        let data = sample_pdf(&["Hello first page", "Second page here"]);
        let pdf = PdfExtractor::extract("sample.pdf", &data).unwrap();

        assert_eq!(pdf.total_pages, 2);
        assert!(pdf.text.contains("Hello"));
        assert!(pdf.text.find("Hello").unwrap() < pdf.text.find("Second").unwrap());
        assert_eq!(pdf.content_hash, hash_content(&pdf.text));
    }

    #[test]
    fn test_page_for_offset() {
        let pdf = ExtractedPdf {
            filename: "a.pdf".to_string(),
            text: "one\ntwo".to_string(),
            pages: vec![page_text(1, "one", 0), page_text(2, "two", 4)],
            total_pages: 2,
            content_hash: String::new(),
        };

        assert_eq!(pdf.page_for_offset(0), Some(1));
        assert_eq!(pdf.page_for_offset(3), Some(1));
        assert_eq!(pdf.page_for_offset(4), Some(2));
        assert_eq!(pdf.page_for_offset(100), Some(2));
    }

    #[test]
    fn test_text_less_pdf_extracts_empty() {
        let pdf = PdfExtractor::extract("scan.pdf", &sample_pdf(&[""])).unwrap();
        assert_eq!(pdf.total_pages, 1);
        assert!(pdf.text.trim().is_empty());
    }

    #[test]
    fn test_hash_is_stable() {
        assert_eq!(hash_content("abc"), hash_content("abc"));
        assert_ne!(hash_content("abc"), hash_content("abd"));
        assert_eq!(hash_content("").len(), 64);
    }
}
