use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::money::Money;

/// One bank payment confirmation, extracted from a single PDF page.
/// `document_number` is not guaranteed unique — a malformed source document
/// may repeat it across pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptRecord {
    pub payer: String,
    pub payee: String,
    /// Operation date; `None` when the source text was unparseable.
    pub operation_date: Option<NaiveDate>,
    pub document_number: String,
    pub amount: Money,
    /// Page in the source document this receipt came from, for re-splitting.
    pub source_page_index: usize,
}

/// One row of the accounts-payable ledger. `code` is expected unique per
/// ledger but is not validated as such.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayableRecord {
    pub payer: String,
    pub payee: String,
    pub due_date: Option<NaiveDate>,
    pub amount: Money,
    pub code: String,
}
