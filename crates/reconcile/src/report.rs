use std::collections::HashSet;

use serde::Serialize;

use concilia_core::{PayableRecord, ReceiptRecord};

use crate::matcher::Association;

/// The three output views derived from a resolved association set.
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationReport {
    /// One row per resolved association, matched or unmatched.
    pub reconciled: Vec<Association>,
    /// Payables whose association carries no receipt (or a blank document
    /// number) after resolution.
    pub payables_without_receipt: Vec<PayableRecord>,
    /// Receipts from the original pool whose document number was never
    /// claimed — original formatting preserved for display.
    pub receipts_without_payable: Vec<ReceiptRecord>,
}

/// Derive the report views. `receipt_pool` is the full original receipt set,
/// not the canonicalized one; the set difference runs on document numbers.
pub fn build_report(
    resolved: &[Association],
    receipt_pool: &[ReceiptRecord],
) -> ReconciliationReport {
    let claimed: HashSet<&str> = resolved
        .iter()
        .filter_map(|a| a.receipt.as_ref())
        .map(|r| r.document_number.as_str())
        .filter(|d| !d.trim().is_empty())
        .collect();

    let payables_without_receipt = resolved
        .iter()
        .filter(|a| match &a.receipt {
            None => true,
            Some(r) => r.document_number.trim().is_empty(),
        })
        .map(|a| a.payable.clone())
        .collect();

    let receipts_without_payable = receipt_pool
        .iter()
        .filter(|r| !claimed.contains(r.document_number.as_str()))
        .cloned()
        .collect();

    ReconciliationReport {
        reconciled: resolved.to_vec(),
        payables_without_receipt,
        receipts_without_payable,
    }
}
