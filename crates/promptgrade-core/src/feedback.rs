//! Diagnostic messages and hint selection.

use crate::config::FeedbackThresholds;

pub const MISSING_KEYWORDS: &str = "Try including more of the essential keywords or concepts.";
pub const MEANING_DIFFERS: &str = "Output meaning differs from the expected result.";
pub const UNCLEAR: &str = "Improve sentence structure for better clarity.";
pub const UNIMAGINATIVE: &str = "Add more unique or imaginative phrasing.";
pub const UNCONVINCING: &str = "Use more assertive or convincing language.";
pub const TOO_SHORT: &str = "Your response seems too short, expand your ideas.";
pub const WELL_BALANCED: &str = "Excellent! Your prompt output is balanced and effective.";

/// The unrounded signals diagnostics are derived from.
#[derive(Debug, Clone, Copy)]
pub struct Signals {
    pub keyword: f64,
    pub fuzzy: f64,
    pub clarity: f64,
    pub creativity: f64,
    pub persuasiveness: f64,
    pub token_count: usize,
    pub max_tokens: u32,
    pub passed: bool,
}

/// Derive diagnostics from sub-score thresholds, in a fixed order.
///
/// When nothing is flagged and the attempt passed, a single acknowledgement
/// is returned instead.
pub fn diagnostics(signals: &Signals, thresholds: &FeedbackThresholds) -> Vec<String> {
    let checks = [
        (signals.keyword < thresholds.keyword, MISSING_KEYWORDS),
        (signals.fuzzy < thresholds.fuzzy, MEANING_DIFFERS),
        (signals.clarity < thresholds.clarity, UNCLEAR),
        (signals.creativity < thresholds.creativity, UNIMAGINATIVE),
        (
            signals.persuasiveness < thresholds.persuasiveness,
            UNCONVINCING,
        ),
        (
            (signals.token_count as f64) < f64::from(signals.max_tokens) * thresholds.short_ratio,
            TOO_SHORT,
        ),
    ];

    let mut details: Vec<String> = checks
        .into_iter()
        .filter(|(triggered, _)| *triggered)
        .map(|(_, message)| message.to_string())
        .collect();

    if details.is_empty() && signals.passed {
        details.push(WELL_BALANCED.to_string());
    }
    details
}

/// The first `max` rubric hints, unmodified.
pub fn surface_hints(hints: &[String], max: usize) -> Vec<String> {
    hints.iter().take(max).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strong() -> Signals {
        Signals {
            keyword: 1.0,
            fuzzy: 0.9,
            clarity: 0.8,
            creativity: 0.5,
            persuasiveness: 0.5,
            token_count: 40,
            max_tokens: 50,
            passed: true,
        }
    }

    #[test]
    fn all_clear_and_passed_is_acknowledged() {
        let details = diagnostics(&strong(), &FeedbackThresholds::default());
        assert_eq!(details, vec![WELL_BALANCED.to_string()]);
    }

    #[test]
    fn all_clear_but_failed_is_empty() {
        let signals = Signals {
            passed: false,
            ..strong()
        };
        assert!(diagnostics(&signals, &FeedbackThresholds::default()).is_empty());
    }

    #[test]
    fn every_check_fires_in_order() {
        let signals = Signals {
            keyword: 0.0,
            fuzzy: 0.0,
            clarity: 0.0,
            creativity: 0.1,
            persuasiveness: 0.1,
            token_count: 0,
            max_tokens: 20,
            passed: false,
        };
        let details = diagnostics(&signals, &FeedbackThresholds::default());
        assert_eq!(
            details,
            vec![
                MISSING_KEYWORDS,
                MEANING_DIFFERS,
                UNCLEAR,
                UNIMAGINATIVE,
                UNCONVINCING,
                TOO_SHORT
            ]
        );
    }

    #[test]
    fn thresholds_are_strict() {
        let signals = Signals {
            keyword: 0.5,
            fuzzy: 0.6,
            clarity: 0.5,
            creativity: 0.4,
            persuasiveness: 0.4,
            token_count: 15,
            max_tokens: 50,
            passed: true,
        };
        let details = diagnostics(&signals, &FeedbackThresholds::default());
        assert_eq!(details, vec![WELL_BALANCED.to_string()]);
    }

    #[test]
    fn hints_are_capped() {
        let hints: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        assert_eq!(surface_hints(&hints, 3), vec!["a", "b", "c"]);
        assert_eq!(surface_hints(&hints[..1], 3), vec!["a"]);
        assert!(surface_hints(&[], 3).is_empty());
    }
}
