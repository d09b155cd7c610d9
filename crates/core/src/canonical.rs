use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::record::{PayableRecord, ReceiptRecord};

/// Lowercase + trim. Used on free-text fields before any comparison.
/// Identifier fields (`code`, `document_number`) are only trimmed — case is
/// meaningful there.
pub fn normalize_text(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Day-first calendar date parsing. Unparseable input is an explicit
/// unknown, never an error.
pub fn parse_day_first(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    for fmt in &["%d/%m/%Y", "%d-%m-%Y", "%d/%m/%y", "%Y-%m-%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }
    None
}

/// The comparison key for exact matching: two records are exact-comparable
/// iff their keys are equal. Derived on demand, never stored on a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalKey {
    pub payer: String,
    pub payee: String,
    pub amount: Decimal,
}

impl CanonicalKey {
    pub fn of_receipt(r: &ReceiptRecord) -> Self {
        CanonicalKey {
            payer: normalize_text(&r.payer),
            payee: normalize_text(&r.payee),
            amount: r.amount.rounded(),
        }
    }

    pub fn of_payable(p: &PayableRecord) -> Self {
        CanonicalKey {
            payer: normalize_text(&p.payer),
            payee: normalize_text(&p.payee),
            amount: p.amount.rounded(),
        }
    }
}
