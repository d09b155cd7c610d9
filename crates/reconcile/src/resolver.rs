use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::matcher::Association;

/// Identifies one ambiguous group across the two resolution phases.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupKey {
    /// Several candidate associations for one payable code.
    PayableCode(String),
    /// One receipt document number still claimed by several payables.
    ReceiptDocument(String),
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::PayableCode(code) => write!(f, "payable:{code}"),
            GroupKey::ReceiptDocument(doc) => write!(f, "receipt:{doc}"),
        }
    }
}

impl FromStr for GroupKey {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(code) = s.strip_prefix("payable:") {
            Ok(GroupKey::PayableCode(code.to_string()))
        } else if let Some(doc) = s.strip_prefix("receipt:") {
            Ok(GroupKey::ReceiptDocument(doc.to_string()))
        } else {
            Err(format!("Unknown group key: '{s}'"))
        }
    }
}

/// An ambiguous group as presented to the decision function: the members
/// carry full payable and receipt context (document numbers, amounts, dates)
/// so a human can tell them apart. Member order is input order.
#[derive(Debug, Clone, Serialize)]
pub struct AmbiguousGroup {
    pub key: GroupKey,
    pub members: Vec<Association>,
}

/// The injected decision function. Returns the index (into `members`) of the
/// association to keep, or `None` to decline — a declined group is reported
/// as pending, never guessed at.
pub trait Decider {
    fn decide(&mut self, group: &AmbiguousGroup) -> Option<usize>;
}

impl<F: FnMut(&AmbiguousGroup) -> Option<usize>> Decider for F {
    fn decide(&mut self, group: &AmbiguousGroup) -> Option<usize> {
        self(group)
    }
}

/// Decider backed by a prepared `GroupKey → index` map. This is the
/// re-entrant path: resolve once, collect the pending groups, obtain
/// decisions out of band, then resolve again with the filled-in map.
#[derive(Debug, Default, Clone)]
pub struct MapDecider {
    choices: HashMap<GroupKey, usize>,
}

impl MapDecider {
    pub fn new(choices: HashMap<GroupKey, usize>) -> Self {
        Self { choices }
    }

    pub fn insert(&mut self, key: GroupKey, index: usize) {
        self.choices.insert(key, index);
    }
}

impl Decider for MapDecider {
    fn decide(&mut self, group: &AmbiguousGroup) -> Option<usize> {
        self.choices.get(&group.key).copied()
    }
}

/// Outcome of a resolution pass.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Surviving associations, at most one per payable code and one per
    /// non-null receipt document number.
    pub resolved: Vec<Association>,
    /// Groups whose decision was declined; their members are withheld from
    /// `resolved` until a decision is supplied.
    pub pending: Vec<AmbiguousGroup>,
}

impl Resolution {
    pub fn is_complete(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Reduce the candidate set to at most one association per payable code and
/// per receipt document number, in two strict phases:
///
/// 1. group by `payable.code`, one kept per group;
/// 2. group the survivors by non-null `receipt.document_number`, one kept
///    per group — the losing payables revert to unmatched associations so
///    every payable stays covered.
///
/// Groups are visited in first-appearance order and members in input order;
/// for a fixed input and fixed decisions the output is fully determined.
/// Resolving an already-resolved set is a no-op.
pub fn resolve(candidates: Vec<Association>, decider: &mut dyn Decider) -> Resolution {
    let mut pending = Vec::new();

    // ── Phase 1: payable-side ambiguity ──────────────────────────────────────
    let mut by_code: IndexMap<String, Vec<Association>> = IndexMap::new();
    for assoc in candidates {
        by_code
            .entry(assoc.payable.code.clone())
            .or_default()
            .push(assoc);
    }

    let mut survivors: Vec<Association> = Vec::with_capacity(by_code.len());
    for (code, members) in by_code {
        if members.len() == 1 {
            survivors.extend(members);
            continue;
        }
        let group = AmbiguousGroup {
            key: GroupKey::PayableCode(code),
            members,
        };
        match decider.decide(&group).filter(|&i| i < group.members.len()) {
            Some(chosen) => {
                let mut members = group.members;
                survivors.push(members.swap_remove(chosen));
            }
            None => {
                tracing::debug!("no decision for {}, leaving group pending", group.key);
                pending.push(group);
            }
        }
    }

    // ── Phase 2: receipt-side ambiguity ──────────────────────────────────────
    let mut by_document: IndexMap<String, Vec<usize>> = IndexMap::new();
    for (idx, assoc) in survivors.iter().enumerate() {
        if let Some(receipt) = &assoc.receipt {
            if !receipt.document_number.trim().is_empty() {
                by_document
                    .entry(receipt.document_number.clone())
                    .or_default()
                    .push(idx);
            }
        }
    }

    let mut demoted: HashSet<usize> = HashSet::new();
    let mut withheld: HashSet<usize> = HashSet::new();
    for (document, indices) in by_document {
        if indices.len() == 1 {
            continue;
        }
        let group = AmbiguousGroup {
            key: GroupKey::ReceiptDocument(document),
            members: indices.iter().map(|&i| survivors[i].clone()).collect(),
        };
        match decider.decide(&group).filter(|&i| i < group.members.len()) {
            Some(chosen) => {
                for (position, &idx) in indices.iter().enumerate() {
                    if position != chosen {
                        demoted.insert(idx);
                    }
                }
            }
            None => {
                tracing::debug!("no decision for {}, leaving group pending", group.key);
                withheld.extend(indices);
                pending.push(group);
            }
        }
    }

    let resolved = survivors
        .into_iter()
        .enumerate()
        .filter(|(idx, _)| !withheld.contains(idx))
        .map(|(idx, assoc)| {
            if demoted.contains(&idx) {
                Association::unmatched(assoc.payable)
            } else {
                assoc
            }
        })
        .collect();

    Resolution { resolved, pending }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concilia_core::{Money, PayableRecord, ReceiptRecord};

    fn payable(code: &str) -> PayableRecord {
        PayableRecord {
            payer: "Acme".to_string(),
            payee: "Bob".to_string(),
            due_date: None,
            amount: Money::parse_brl("10,00").unwrap(),
            code: code.to_string(),
        }
    }

    fn receipt(doc: &str, page: usize) -> ReceiptRecord {
        ReceiptRecord {
            payer: "Acme".to_string(),
            payee: "Bob".to_string(),
            operation_date: None,
            document_number: doc.to_string(),
            amount: Money::parse_brl("10,00").unwrap(),
            source_page_index: page,
        }
    }

    fn matched(code: &str, doc: &str, page: usize) -> Association {
        Association::matched(payable(code), receipt(doc, page), Some(90))
    }

    fn no_decision(_: &AmbiguousGroup) -> Option<usize> {
        None
    }

    fn always_first(_: &AmbiguousGroup) -> Option<usize> {
        Some(0)
    }

    #[test]
    fn resolved_set_passes_through_unchanged() {
        let input = vec![
            matched("C1", "1", 0),
            matched("C2", "2", 1),
            Association::unmatched(payable("C3")),
        ];
        let out = resolve(input.clone(), &mut no_decision);
        assert!(out.is_complete());
        assert_eq!(out.resolved.len(), 3);
        let codes: Vec<_> = out.resolved.iter().map(|a| a.payable.code.clone()).collect();
        assert_eq!(codes, vec!["C1", "C2", "C3"]);
    }

    #[test]
    fn idempotent_on_own_output() {
        let input = vec![matched("C1", "9", 0), matched("C1", "9", 1)];
        let once = resolve(input, &mut always_first);
        let twice = resolve(once.resolved.clone(), &mut no_decision);
        assert!(twice.is_complete());
        assert_eq!(twice.resolved.len(), once.resolved.len());
    }

    #[test]
    fn payable_group_reduced_by_decision() {
        // Two receipts share document "9", both candidates for C1.
        let input = vec![matched("C1", "9", 0), matched("C1", "9", 1)];
        let mut picks = Vec::new();
        let out = resolve(input, &mut |g: &AmbiguousGroup| {
            picks.push(g.key.clone());
            Some(1)
        });
        assert!(out.is_complete());
        assert_eq!(out.resolved.len(), 1);
        assert_eq!(out.resolved[0].receipt.as_ref().unwrap().source_page_index, 1);
        assert_eq!(picks, vec![GroupKey::PayableCode("C1".to_string())]);
    }

    #[test]
    fn undecided_payable_group_is_pending() {
        let input = vec![matched("C1", "1", 0), matched("C1", "2", 1)];
        let out = resolve(input, &mut no_decision);
        assert!(!out.is_complete());
        assert!(out.resolved.is_empty());
        assert_eq!(out.pending.len(), 1);
        assert_eq!(out.pending[0].key, GroupKey::PayableCode("C1".to_string()));
        assert_eq!(out.pending[0].members.len(), 2);
    }

    #[test]
    fn receipt_group_losers_revert_to_unmatched() {
        // Same receipt claimed by two different payables.
        let input = vec![matched("C1", "9", 0), matched("C2", "9", 0)];
        let out = resolve(input, &mut always_first);
        assert!(out.is_complete());
        assert_eq!(out.resolved.len(), 2);
        let c1 = out.resolved.iter().find(|a| a.payable.code == "C1").unwrap();
        let c2 = out.resolved.iter().find(|a| a.payable.code == "C2").unwrap();
        assert!(c1.is_matched());
        assert!(!c2.is_matched());
        assert_eq!(c2.score, None);
    }

    #[test]
    fn no_code_or_document_survives_twice() {
        let input = vec![
            matched("C1", "9", 0),
            matched("C1", "8", 1),
            matched("C2", "9", 0),
            matched("C3", "7", 2),
        ];
        let out = resolve(input, &mut always_first);
        assert!(out.is_complete());

        let mut codes = HashSet::new();
        let mut documents = HashSet::new();
        for a in &out.resolved {
            assert!(codes.insert(a.payable.code.clone()), "code kept twice");
            if let Some(r) = &a.receipt {
                assert!(
                    documents.insert(r.document_number.clone()),
                    "document kept twice"
                );
            }
        }
    }

    #[test]
    fn two_phases_run_in_sequence() {
        // Phase 1 must settle C1's fan-out before phase 2 sees document "9".
        let input = vec![
            matched("C1", "9", 0),
            matched("C1", "8", 1),
            matched("C2", "9", 0),
        ];
        let mut keys = Vec::new();
        let out = resolve(input, &mut |g: &AmbiguousGroup| {
            keys.push(g.key.clone());
            Some(0)
        });
        // C1 kept "9", so phase 2 then arbitrates "9" between C1 and C2.
        assert_eq!(
            keys,
            vec![
                GroupKey::PayableCode("C1".to_string()),
                GroupKey::ReceiptDocument("9".to_string()),
            ]
        );
        assert!(out.is_complete());
    }

    #[test]
    fn map_decider_resumes_a_pending_run() {
        let input = vec![matched("C1", "1", 0), matched("C1", "2", 1)];

        let first = resolve(input.clone(), &mut MapDecider::default());
        assert_eq!(first.pending.len(), 1);

        let mut decisions = MapDecider::default();
        decisions.insert(first.pending[0].key.clone(), 1);
        let second = resolve(input, &mut decisions);
        assert!(second.is_complete());
        assert_eq!(second.resolved.len(), 1);
        assert_eq!(
            second.resolved[0].receipt.as_ref().unwrap().document_number,
            "2"
        );
    }

    #[test]
    fn out_of_range_decision_is_treated_as_declined() {
        let input = vec![matched("C1", "1", 0), matched("C1", "2", 1)];
        let out = resolve(input, &mut |_: &AmbiguousGroup| Some(99));
        assert!(!out.is_complete());
    }

    #[test]
    fn blank_document_numbers_never_group() {
        let input = vec![matched("C1", "", 0), matched("C2", "", 1)];
        let out = resolve(input, &mut no_decision);
        assert!(out.is_complete());
        assert_eq!(out.resolved.len(), 2);
    }

    #[test]
    fn group_key_string_roundtrip() {
        for key in [
            GroupKey::PayableCode("C1".to_string()),
            GroupKey::ReceiptDocument("9".to_string()),
        ] {
            assert_eq!(key.to_string().parse::<GroupKey>().unwrap(), key);
        }
        assert!("bogus".parse::<GroupKey>().is_err());
    }
}
