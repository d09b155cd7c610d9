pub mod canonical;
pub mod money;
pub mod record;

pub use canonical::{normalize_text, parse_day_first, CanonicalKey};
pub use money::Money;
pub use record::{PayableRecord, ReceiptRecord};
