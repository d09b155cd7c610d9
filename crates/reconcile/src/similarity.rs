use std::collections::BTreeSet;

use strsim::normalized_levenshtein;

fn ratio(a: &str, b: &str) -> f64 {
    normalized_levenshtein(a, b) * 100.0
}

fn join_with(base: &str, extra: &[&str]) -> String {
    if extra.is_empty() {
        base.to_string()
    } else if base.is_empty() {
        extra.join(" ")
    } else {
        format!("{base} {}", extra.join(" "))
    }
}

/// Token-set similarity in 0–100: compares the word sets of two strings,
/// insensitive to token order and duplication. Inputs are expected to be
/// canonicalized already (lowercased, trimmed).
///
/// The score is the best of three edit-distance ratios over the sorted
/// intersection string and each side's intersection-plus-remainder string —
/// so a string that fully contains the other's tokens scores 100.
pub fn token_set_ratio(a: &str, b: &str) -> u8 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();

    // With an empty side the intersection-based ratios degenerate.
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return if tokens_a.len() == tokens_b.len() { 100 } else { 0 };
    }

    let intersection: Vec<&str> = tokens_a.intersection(&tokens_b).copied().collect();
    let only_a: Vec<&str> = tokens_a.difference(&tokens_b).copied().collect();
    let only_b: Vec<&str> = tokens_b.difference(&tokens_a).copied().collect();

    let base = intersection.join(" ");
    let combined_a = join_with(&base, &only_a);
    let combined_b = join_with(&base, &only_b);

    let best = ratio(&base, &combined_a)
        .max(ratio(&base, &combined_b))
        .max(ratio(&combined_a, &combined_b));
    best.round().clamp(0.0, 100.0) as u8
}

/// Average of the payer-side and payee-side token-set scores.
pub fn combined_score(payer_score: u8, payee_score: u8) -> u8 {
    ((payer_score as u16 + payee_score as u16) as f64 / 2.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_score_100() {
        assert_eq!(token_set_ratio("acme ltda", "acme ltda"), 100);
    }

    #[test]
    fn token_order_is_ignored() {
        assert_eq!(token_set_ratio("ltda acme", "acme ltda"), 100);
    }

    #[test]
    fn duplicate_tokens_are_ignored() {
        assert_eq!(token_set_ratio("acme acme ltda", "acme ltda"), 100);
    }

    #[test]
    fn subset_scores_100() {
        // One side fully contains the other's tokens.
        assert_eq!(token_set_ratio("acme", "acme ltda"), 100);
    }

    #[test]
    fn unrelated_strings_score_low() {
        assert!(token_set_ratio("acme ltda", "fornecedora beta") < 50);
    }

    #[test]
    fn partial_overlap_scores_between() {
        let score = token_set_ratio("acme comercio ltda", "acme industria ltda");
        assert!((50..100).contains(&score), "score was {score}");
    }

    #[test]
    fn both_empty_score_100() {
        assert_eq!(token_set_ratio("", ""), 100);
        assert_eq!(token_set_ratio("  ", ""), 100);
    }

    #[test]
    fn one_empty_scores_0() {
        assert_eq!(token_set_ratio("", "acme"), 0);
    }

    #[test]
    fn combined_score_averages_and_rounds() {
        assert_eq!(combined_score(80, 90), 85);
        assert_eq!(combined_score(80, 91), 86); // 85.5 rounds up
        assert_eq!(combined_score(100, 100), 100);
        assert_eq!(combined_score(0, 0), 0);
    }
}
