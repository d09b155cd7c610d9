use std::collections::HashMap;

use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use concilia_core::{normalize_text, CanonicalKey, PayableRecord, ReceiptRecord};

use crate::similarity::{combined_score, token_set_ratio};

pub const DEFAULT_FUZZY_THRESHOLD: u8 = 90;

/// A candidate or resolved link between one payable and at most one receipt.
/// `score` is only meaningful for fuzzy candidates; exact and unmatched
/// associations carry `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Association {
    pub payable: PayableRecord,
    pub receipt: Option<ReceiptRecord>,
    pub score: Option<u8>,
}

impl Association {
    pub fn matched(payable: PayableRecord, receipt: ReceiptRecord, score: Option<u8>) -> Self {
        Association {
            payable,
            receipt: Some(receipt),
            score,
        }
    }

    pub fn unmatched(payable: PayableRecord) -> Self {
        Association {
            payable,
            receipt: None,
            score: None,
        }
    }

    pub fn is_matched(&self) -> bool {
        self.receipt.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStrategy {
    /// Relational left join on the canonical key, fan-out kept on duplicates.
    Exact,
    /// Amount-equality pre-filter, then token-set similarity of payer and
    /// payee averaged into one 0–100 score.
    Fuzzy { threshold: u8 },
}

impl Default for MatchStrategy {
    fn default() -> Self {
        MatchStrategy::Fuzzy {
            threshold: DEFAULT_FUZZY_THRESHOLD,
        }
    }
}

pub struct MatchEngine {
    strategy: MatchStrategy,
}

impl MatchEngine {
    pub fn new(strategy: MatchStrategy) -> Self {
        Self { strategy }
    }

    /// Produce the candidate association set. Every payable yields at least
    /// one association; payables with no candidate receipt yield exactly one
    /// unmatched association. Output follows payable input order, candidates
    /// per payable follow receipt input order.
    pub fn find_candidates(
        &self,
        payables: &[PayableRecord],
        receipts: &[ReceiptRecord],
    ) -> Vec<Association> {
        let candidates = match self.strategy {
            MatchStrategy::Exact => exact_join(payables, receipts),
            MatchStrategy::Fuzzy { threshold } => fuzzy_join(payables, receipts, threshold),
        };
        tracing::debug!(
            "{} payable(s) × {} receipt(s) → {} candidate association(s)",
            payables.len(),
            receipts.len(),
            candidates.len()
        );
        candidates
    }
}

fn exact_join(payables: &[PayableRecord], receipts: &[ReceiptRecord]) -> Vec<Association> {
    let mut index: HashMap<CanonicalKey, Vec<usize>> = HashMap::new();
    for (i, receipt) in receipts.iter().enumerate() {
        index.entry(CanonicalKey::of_receipt(receipt)).or_default().push(i);
    }

    let mut out = Vec::with_capacity(payables.len());
    for payable in payables {
        match index.get(&CanonicalKey::of_payable(payable)) {
            Some(hits) if !hits.is_empty() => {
                for &i in hits {
                    out.push(Association::matched(
                        payable.clone(),
                        receipts[i].clone(),
                        None,
                    ));
                }
            }
            _ => out.push(Association::unmatched(payable.clone())),
        }
    }
    out
}

fn fuzzy_join(
    payables: &[PayableRecord],
    receipts: &[ReceiptRecord],
    threshold: u8,
) -> Vec<Association> {
    // Amount equality is mandatory — index receipts by rounded amount so the
    // similarity pass only ever sees same-amount candidates.
    let mut by_amount: HashMap<Decimal, Vec<usize>> = HashMap::new();
    for (i, receipt) in receipts.iter().enumerate() {
        by_amount.entry(receipt.amount.rounded()).or_default().push(i);
    }

    let canonical: Vec<(String, String)> = receipts
        .iter()
        .map(|r| (normalize_text(&r.payer), normalize_text(&r.payee)))
        .collect();

    // Rows are independent; score them in parallel. `collect` keeps payable
    // input order.
    let per_payable: Vec<Vec<Association>> = payables
        .par_iter()
        .map(|payable| {
            let payer = normalize_text(&payable.payer);
            let payee = normalize_text(&payable.payee);

            let mut row = Vec::new();
            if let Some(hits) = by_amount.get(&payable.amount.rounded()) {
                for &i in hits {
                    let (r_payer, r_payee) = &canonical[i];
                    let score = combined_score(
                        token_set_ratio(&payer, r_payer),
                        token_set_ratio(&payee, r_payee),
                    );
                    if score >= threshold {
                        row.push(Association::matched(
                            payable.clone(),
                            receipts[i].clone(),
                            Some(score),
                        ));
                    }
                }
            }
            if row.is_empty() {
                row.push(Association::unmatched(payable.clone()));
            }
            row
        })
        .collect();

    per_payable.into_iter().flatten().collect()
}
