use std::path::Path;

use lopdf::Document;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse PDF: {0}")]
    Parse(String),
    #[error("Document has no pages")]
    NoPages,
    #[error("Page index {0} out of range")]
    InvalidPage(usize),
    #[error("Text extraction failed: {0}")]
    TextExtraction(String),
}

/// Abstraction over the text-extraction / file-splitting collaborator.
///
/// `extract_pages` yields `(page_index, raw_text)` per page; `split_page`
/// re-splits the source document into the bytes of a single-page artifact.
/// Page indices are zero-based.
pub trait PageSource: Send + Sync {
    fn extract_pages(&self) -> Result<Vec<(usize, String)>, SourceError>;
    fn split_page(&self, page_index: usize) -> Result<Vec<u8>, SourceError>;
}

// ── Mock source (always available, used for tests) ────────────────────────────

/// Serves pre-set page texts — lets the extraction and matching pipeline be
/// exercised without a real PDF on disk.
pub struct MockSource {
    pages: Vec<String>,
}

impl MockSource {
    pub fn new<S: Into<String>>(pages: Vec<S>) -> Self {
        Self {
            pages: pages.into_iter().map(Into::into).collect(),
        }
    }
}

impl PageSource for MockSource {
    fn extract_pages(&self) -> Result<Vec<(usize, String)>, SourceError> {
        Ok(self.pages.iter().cloned().enumerate().collect())
    }

    fn split_page(&self, page_index: usize) -> Result<Vec<u8>, SourceError> {
        self.pages
            .get(page_index)
            .map(|p| p.clone().into_bytes())
            .ok_or(SourceError::InvalidPage(page_index))
    }
}

// ── PDF source ────────────────────────────────────────────────────────────────

/// Real backend over `lopdf` + `pdf-extract`.
pub struct PdfSource {
    document: Document,
    raw_data: Vec<u8>,
}

impl PdfSource {
    pub fn from_bytes(data: &[u8]) -> Result<Self, SourceError> {
        let document = Document::load_mem(data).map_err(|e| SourceError::Parse(e.to_string()))?;
        if document.get_pages().is_empty() {
            return Err(SourceError::NoPages);
        }
        Ok(Self {
            document,
            raw_data: data.to_vec(),
        })
    }

    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }
}

impl PageSource for PdfSource {
    fn extract_pages(&self) -> Result<Vec<(usize, String)>, SourceError> {
        let full_text = pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| SourceError::TextExtraction(e.to_string()))?;

        // pdf-extract emits a form feed between pages.
        let mut pages: Vec<(usize, String)> = full_text
            .split('\u{c}')
            .map(str::to_string)
            .enumerate()
            .collect();

        // Some producers omit the form feed; fall back to an even line split
        // so every physical page still gets a slice of text.
        let page_count = self.page_count();
        if pages.len() < page_count {
            let lines: Vec<&str> = full_text.lines().collect();
            let per_page = (lines.len() / page_count).max(1);
            pages = (0..page_count)
                .map(|i| {
                    let start = (i * per_page).min(lines.len());
                    let end = if i + 1 == page_count {
                        lines.len()
                    } else {
                        ((i + 1) * per_page).min(lines.len())
                    };
                    (i, lines[start..end].join("\n"))
                })
                .collect();
        }

        Ok(pages)
    }

    fn split_page(&self, page_index: usize) -> Result<Vec<u8>, SourceError> {
        let page_count = self.page_count();
        if page_index >= page_count {
            return Err(SourceError::InvalidPage(page_index));
        }

        // lopdf numbers pages from 1; drop every page except the requested one.
        let mut single = self.document.clone();
        let discard: Vec<u32> = (1..=page_count as u32)
            .filter(|&n| n != page_index as u32 + 1)
            .collect();
        single.delete_pages(&discard);
        single.prune_objects();

        let mut out = Vec::new();
        single
            .save_to(&mut out)
            .map_err(|e| SourceError::Parse(e.to_string()))?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_enumerates_pages_in_order() {
        let source = MockSource::new(vec!["first", "second"]);
        let pages = source.extract_pages().unwrap();
        assert_eq!(pages, vec![(0, "first".to_string()), (1, "second".to_string())]);
    }

    #[test]
    fn mock_split_returns_page_bytes() {
        let source = MockSource::new(vec!["first", "second"]);
        assert_eq!(source.split_page(1).unwrap(), b"second");
    }

    #[test]
    fn mock_split_out_of_range() {
        let source = MockSource::new(vec!["only"]);
        assert!(matches!(
            source.split_page(5),
            Err(SourceError::InvalidPage(5))
        ));
    }

    #[test]
    fn pdf_source_rejects_garbage() {
        assert!(PdfSource::from_bytes(b"not a pdf").is_err());
    }
}
