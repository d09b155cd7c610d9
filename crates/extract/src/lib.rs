pub mod artifact;
pub mod fields;
pub mod scan;
pub mod source;

pub use artifact::artifact_file_name;
pub use fields::extract_receipt;
pub use scan::{scan_source, ScanResult};
pub use source::{MockSource, PageSource, PdfSource, SourceError};
