//! The prompt evaluation engine.
//!
//! Scores a submission against a rubric with keyword coverage, regex
//! patterns, fuzzy similarity, heuristic criteria, and length balance, then
//! combines them into a weighted composite. Evaluation is pure: no I/O and no
//! shared state, so an [`Evaluator`] can be shared freely across threads.

use std::collections::BTreeMap;

use regex::{Regex, RegexBuilder};

use crate::config::ScoringConfig;
use crate::criteria::{score_criteria, CriteriaScores};
use crate::error::EvalError;
use crate::feedback::{diagnostics, surface_hints, Signals};
use crate::model::{EvaluationRequest, EvaluationResult, Feedback, Mode};
use crate::similarity::fuzzy_match_score;
use crate::text::{normalize, word_count};

/// Unrounded sub-scores of one evaluation, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubScores {
    pub keyword: f64,
    pub pattern: f64,
    pub fuzzy: f64,
    pub token: f64,
    pub criteria: CriteriaScores,
}

/// Grades submissions with a fixed [`ScoringConfig`].
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    config: ScoringConfig,
}

impl Evaluator {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Grade one submission.
    ///
    /// Fails on a zero token budget, an oversized input, or any pattern that
    /// is not a valid regular expression. A failed call yields no score.
    pub fn evaluate(&self, request: &EvaluationRequest) -> Result<EvaluationResult, EvalError> {
        self.check_bounds(request)?;
        let patterns = compile_patterns(&request.patterns)?;

        let user = normalize(&request.user_text);
        let neutral = self.config.neutral_score;

        let keyword = if request.keywords.is_empty() {
            neutral
        } else {
            let hits = request
                .keywords
                .iter()
                .filter(|k| user.contains(normalize(k).as_str()))
                .count();
            hits as f64 / request.keywords.len() as f64
        };

        // Patterns see the raw text: they may depend on case or punctuation.
        let pattern = if patterns.is_empty() {
            neutral
        } else {
            let hits = patterns
                .iter()
                .filter(|re| re.is_match(&request.user_text))
                .count();
            hits as f64 / patterns.len() as f64
        };

        let fuzzy = fuzzy_match_score(&request.user_text, &request.expected_output);

        let token_count = word_count(&request.user_text);
        let budget = f64::from(request.max_tokens);
        let token = (token_count as f64 / (budget * self.config.target_length_ratio)).min(1.0);
        let penalty = if token_count as f64 > budget {
            self.config.length_penalty
        } else {
            1.0
        };

        let scores = SubScores {
            keyword,
            pattern,
            fuzzy,
            token,
            criteria: score_criteria(&request.user_text, &self.config.criteria),
        };

        let composite = self.composite(&scores) * penalty;
        let passed = composite >= self.threshold(request.mode);

        tracing::debug!(
            keyword,
            pattern,
            fuzzy,
            token,
            token_count,
            composite,
            passed,
            mode = %request.mode,
            "evaluated submission"
        );

        let details = diagnostics(
            &Signals {
                keyword,
                fuzzy,
                clarity: scores.criteria.clarity,
                creativity: scores.criteria.creativity,
                persuasiveness: scores.criteria.persuasiveness,
                token_count,
                max_tokens: request.max_tokens,
                passed,
            },
            &self.config.feedback,
        );

        Ok(EvaluationResult {
            passed,
            score: percent(composite),
            feedback: Feedback {
                keyword_score: percent(scores.keyword),
                pattern_score: percent(scores.pattern),
                fuzzy_score: percent(scores.fuzzy),
                token_score: percent(scores.token),
                relevance_score: percent(scores.criteria.relevance),
                clarity_score: percent(scores.criteria.clarity),
                creativity_score: percent(scores.criteria.creativity),
                persuasiveness_score: percent(scores.criteria.persuasiveness),
                details,
                hints: surface_hints(&request.hints, self.config.feedback.max_hints),
            },
        })
    }

    /// Weighted sum of the sub-scores, before the length penalty.
    ///
    /// The default weights total 1.05, so this can exceed 1.0; reported
    /// scores are capped at 100.
    pub fn composite(&self, scores: &SubScores) -> f64 {
        let w = &self.config.weights;
        scores.keyword * w.keyword
            + scores.pattern * w.pattern
            + scores.fuzzy * w.fuzzy
            + scores.criteria.relevance * w.relevance
            + scores.criteria.clarity * w.clarity
            + scores.criteria.creativity * w.creativity
            + scores.criteria.persuasiveness * w.persuasiveness
            + scores.token * w.token
    }

    /// Pass threshold for a mode.
    pub fn threshold(&self, mode: Mode) -> f64 {
        match mode {
            Mode::Run => self.config.thresholds.run,
            Mode::Submit => self.config.thresholds.submit,
        }
    }

    fn check_bounds(&self, request: &EvaluationRequest) -> Result<(), EvalError> {
        if request.max_tokens == 0 {
            return Err(EvalError::InvalidArgument(
                "max_tokens must be greater than 0".into(),
            ));
        }
        let max = self.config.max_input_chars;
        for (field, value) in [
            ("user_text", &request.user_text),
            ("expected_output", &request.expected_output),
        ] {
            let len = value.chars().count();
            if len > max {
                return Err(EvalError::InputTooLarge { field, len, max });
            }
        }
        Ok(())
    }
}

/// Compile rubric patterns as case-insensitive regular expressions.
///
/// Patterns use the `regex` crate dialect, which has no look-around and no
/// backreferences. See [`unsupported_construct`].
pub fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>, EvalError> {
    patterns
        .iter()
        .map(|p| {
            RegexBuilder::new(p)
                .case_insensitive(true)
                .build()
                .map_err(|source| EvalError::InvalidPattern {
                    pattern: p.clone(),
                    source,
                })
        })
        .collect()
}

/// Name the first construct in `pattern` that the `regex` dialect rejects
/// but other engines commonly accept.
pub fn unsupported_construct(pattern: &str) -> Option<&'static str> {
    let bytes = pattern.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                if matches!(bytes.get(i + 1), Some(b'1'..=b'9')) {
                    return Some("backreferences");
                }
                i += 2;
                continue;
            }
            b'(' => {
                let rest = &pattern[i + 1..];
                if rest.starts_with("?=") || rest.starts_with("?!") {
                    return Some("look-ahead assertions");
                }
                if rest.starts_with("?<=") || rest.starts_with("?<!") {
                    return Some("look-behind assertions");
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Grade one submission with the default configuration.
#[allow(clippy::too_many_arguments)]
pub fn evaluate(
    user_text: &str,
    expected_output: &str,
    keywords: &[&str],
    patterns: &[&str],
    max_tokens: u32,
    hints: &[&str],
    mode: Mode,
    ai_eval_metrics: &BTreeMap<String, f64>,
) -> Result<EvaluationResult, EvalError> {
    let to_owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    Evaluator::default().evaluate(&EvaluationRequest {
        user_text: user_text.to_string(),
        expected_output: expected_output.to_string(),
        keywords: to_owned(keywords),
        patterns: to_owned(patterns),
        max_tokens,
        hints: to_owned(hints),
        mode,
        ai_eval_metrics: ai_eval_metrics.clone(),
    })
}

fn percent(value: f64) -> u32 {
    (value.clamp(0.0, 1.0) * 100.0).round() as u32
}
