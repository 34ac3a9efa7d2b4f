//! Heuristic relevance/clarity/creativity/persuasiveness scoring.
//!
//! This is a word-presence proxy, not semantic understanding: each criterion
//! counts how many distinct cue words from its [`CriteriaTable`] entry occur
//! as substrings of the normalized submission.

use serde::{Deserialize, Serialize};

use crate::config::{CriteriaTable, CriterionTerms};
use crate::text::{normalize, word_count};

/// The four heuristic sub-scores, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriteriaScores {
    pub relevance: f64,
    pub clarity: f64,
    pub creativity: f64,
    pub persuasiveness: f64,
}

/// Score raw user text against the criteria table.
pub fn score_criteria(user_text: &str, table: &CriteriaTable) -> CriteriaScores {
    let text = normalize(user_text);
    let structure_bonus = if word_count(&text) > table.structure_min_words {
        table.structure_bonus
    } else {
        0.0
    };

    let score = |criterion: &CriterionTerms| -> f64 {
        // Cue terms may come from config, so they are normalized like the text.
        let hits = criterion
            .terms
            .iter()
            .map(|term| normalize(term))
            .filter(|term| !term.is_empty() && text.contains(term.as_str()))
            .collect::<std::collections::HashSet<_>>()
            .len();
        let base = (hits as f64 / criterion.denominator).min(1.0);
        let bonus = if criterion.structure_bonus {
            structure_bonus
        } else {
            0.0
        };
        (base + bonus + criterion.flat_bonus).min(1.0)
    };

    CriteriaScores {
        relevance: score(&table.relevance),
        clarity: score(&table.clarity),
        creativity: score(&table.creativity),
        persuasiveness: score(&table.persuasiveness),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn empty_text_gets_only_flat_bonuses() {
        let s = score_criteria("", &CriteriaTable::default());
        assert_eq!(s.relevance, 0.0);
        assert_eq!(s.clarity, 0.0);
        assert!(approx(s.creativity, 0.1));
        assert!(approx(s.persuasiveness, 0.1));
    }

    #[test]
    fn counts_distinct_cues() {
        let s = score_criteria(
            "Explain why, and explain why again. Therefore, clearly!",
            &CriteriaTable::default(),
        );
        assert!(approx(s.relevance, 0.5), "relevance {}", s.relevance);
        assert!(approx(s.clarity, 2.0 / 3.0), "clarity {}", s.clarity);
    }

    #[test]
    fn substring_matching_is_intentional() {
        // "however" contains "how", "somewhat" contains "what"
        let s = score_criteria("however somewhat", &CriteriaTable::default());
        assert!(approx(s.relevance, 0.5));
    }

    #[test]
    fn multi_word_cue_matches() {
        let s = score_criteria("In conclusion, it works.", &CriteriaTable::default());
        assert!(approx(s.clarity, 1.0 / 3.0));
    }

    #[test]
    fn structure_bonus_above_thirty_words() {
        let thirty = vec!["word"; 30].join(" ");
        let thirty_one = vec!["word"; 31].join(" ");
        let table = CriteriaTable::default();

        let s30 = score_criteria(&thirty, &table);
        assert_eq!(s30.relevance, 0.0);

        let s31 = score_criteria(&thirty_one, &table);
        assert!(approx(s31.relevance, 0.2));
        assert!(approx(s31.clarity, 0.2));
        assert!(approx(s31.creativity, 0.1));
        assert!(approx(s31.persuasiveness, 0.1));
    }

    #[test]
    fn scores_are_clamped() {
        let s = score_criteria(
            "imagine a unique creative innovative vision that must inspire; it should be \
             powerful, effective, important and strongly argued",
            &CriteriaTable::default(),
        );
        assert_eq!(s.creativity, 1.0);
        assert_eq!(s.persuasiveness, 1.0);
    }

    #[test]
    fn terms_are_normalized_before_matching() {
        let mut table = CriteriaTable::default();
        table.clarity.terms = vec!["In Conclusion".into(), "step-by-step".into(), "".into()];
        table.clarity.denominator = 2.0;
        let s = score_criteria("In conclusion, go step-by-step.", &table);
        assert_eq!(s.clarity, 1.0);
        // an empty term never counts as a hit
        assert_eq!(score_criteria("zzz", &table).clarity, 0.0);
    }

    #[test]
    fn custom_table_is_used() {
        let mut table = CriteriaTable::default();
        table.relevance.terms = vec!["prompt".into()];
        table.relevance.denominator = 1.0;
        let s = score_criteria("A good PROMPT.", &table);
        assert_eq!(s.relevance, 1.0);
    }
}
