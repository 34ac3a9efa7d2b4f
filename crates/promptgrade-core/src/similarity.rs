//! String similarity metrics.
//!
//! Every metric normalizes its inputs with [`normalize`] first and returns a
//! value in `[0, 1]`.

use std::collections::HashSet;

use crate::text::{normalize, tokens};

/// Token-set (Jaccard) similarity: `|A ∩ B| / |A ∪ B|`.
///
/// Returns 0.0 when both token sets are empty.
pub fn jaccard(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);
    let set_a: HashSet<&str> = tokens(&a).collect();
    let set_b: HashSet<&str> = tokens(&b).collect();

    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.len() + set_b.len() - intersection;
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}

/// Unit-cost edit distance between two strings, counted in chars.
///
/// Uses two rolling rows, so memory is `O(min(n, m))`.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };

    let mut prev: Vec<usize> = (0..=short.len()).collect();
    let mut curr = vec![0usize; short.len() + 1];

    for (i, lc) in long.iter().enumerate() {
        curr[0] = i + 1;
        for (j, sc) in short.iter().enumerate() {
            let cost = usize::from(lc != sc);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[short.len()]
}

/// Edit-distance similarity: `1 - distance / max(len(a), len(b))` over the
/// normalized forms.
///
/// Two strings that are both empty after normalization are identical and
/// score 1.0.
pub fn levenshtein_similarity(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein_distance(&a, &b) as f64 / max_len as f64
}

/// The higher of [`jaccard`] and [`levenshtein_similarity`].
pub fn fuzzy_match_score(user: &str, expected: &str) -> f64 {
    jaccard(user, expected).max(levenshtein_similarity(user, expected))
}
