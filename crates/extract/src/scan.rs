use concilia_core::ReceiptRecord;

use crate::fields::extract_receipt;
use crate::source::{PageSource, SourceError};

/// Everything a single document scan produced.
#[derive(Debug)]
pub struct ScanResult {
    pub records: Vec<ReceiptRecord>,
    pub pages_scanned: usize,
    /// Pages that did not match the receipt layout. Surfaced per document so
    /// the caller can warn about documents that yielded nothing.
    pub misses: usize,
}

impl ScanResult {
    pub fn found_any(&self) -> bool {
        !self.records.is_empty()
    }
}

/// Run the field extractor over every page of a source. Pages that are not
/// receipts are counted, never fatal.
pub fn scan_source(source: &dyn PageSource) -> Result<ScanResult, SourceError> {
    let pages = source.extract_pages()?;
    let pages_scanned = pages.len();

    let mut records = Vec::new();
    let mut misses = 0;
    for (index, text) in pages {
        match extract_receipt(index, &text) {
            Some(record) => records.push(record),
            None => {
                tracing::debug!("page {index} did not match the receipt layout");
                misses += 1;
            }
        }
    }

    tracing::info!(
        "scanned {pages_scanned} page(s): {} receipt(s), {misses} miss(es)",
        records.len()
    );

    Ok(ScanResult {
        records,
        pages_scanned,
        misses,
    })
}
