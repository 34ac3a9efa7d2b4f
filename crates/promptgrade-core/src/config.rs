//! Scoring configuration and loading.
//!
//! Every constant the evaluator uses lives here, so the weighted-sum formula
//! can be audited and tuned without touching the engine.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::text::normalize;

/// Weights of the composite score.
///
/// The defaults total 1.05; they are kept as-is so scores stay comparable
/// with previously graded attempts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub keyword: f64,
    pub pattern: f64,
    pub fuzzy: f64,
    pub relevance: f64,
    pub clarity: f64,
    pub creativity: f64,
    pub persuasiveness: f64,
    pub token: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            keyword: 0.15,
            pattern: 0.15,
            fuzzy: 0.25,
            relevance: 0.15,
            clarity: 0.10,
            creativity: 0.10,
            persuasiveness: 0.10,
            token: 0.05,
        }
    }
}

impl ScoreWeights {
    pub fn total(&self) -> f64 {
        self.keyword
            + self.pattern
            + self.fuzzy
            + self.relevance
            + self.clarity
            + self.creativity
            + self.persuasiveness
            + self.token
    }
}

/// Minimum composite score for `passed`, per mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PassThresholds {
    pub run: f64,
    pub submit: f64,
}

impl Default for PassThresholds {
    fn default() -> Self {
        Self {
            run: 0.55,
            submit: 0.70,
        }
    }
}

/// Sub-score thresholds below which a diagnostic is emitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackThresholds {
    pub keyword: f64,
    pub fuzzy: f64,
    pub clarity: f64,
    pub creativity: f64,
    pub persuasiveness: f64,
    /// Fraction of `max_tokens` under which a submission is "too short".
    pub short_ratio: f64,
    /// Maximum number of rubric hints surfaced.
    pub max_hints: usize,
}

impl Default for FeedbackThresholds {
    fn default() -> Self {
        Self {
            keyword: 0.5,
            fuzzy: 0.6,
            clarity: 0.5,
            creativity: 0.4,
            persuasiveness: 0.4,
            short_ratio: 0.3,
            max_hints: 3,
        }
    }
}

/// One heuristic criterion: the cue words to look for and how to scale hits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionTerms {
    /// Cue words, matched as substrings of the normalized submission.
    pub terms: Vec<String>,
    /// Hit count that maps to a full 1.0 score.
    pub denominator: f64,
    /// Flat bonus always added to this criterion.
    #[serde(default)]
    pub flat_bonus: f64,
    /// Whether this criterion receives the long-text structure bonus.
    #[serde(default)]
    pub structure_bonus: bool,
}

impl CriterionTerms {
    fn new(terms: &[&str], denominator: f64, flat_bonus: f64, structure_bonus: bool) -> Self {
        Self {
            terms: terms.iter().map(|t| t.to_string()).collect(),
            denominator,
            flat_bonus,
            structure_bonus,
        }
    }
}

/// Term tables for the heuristic relevance/clarity/creativity/persuasiveness scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CriteriaTable {
    pub relevance: CriterionTerms,
    pub clarity: CriterionTerms,
    pub creativity: CriterionTerms,
    pub persuasiveness: CriterionTerms,
    /// Word count that must be exceeded to earn the structure bonus.
    pub structure_min_words: usize,
    pub structure_bonus: f64,
}

impl Default for CriteriaTable {
    fn default() -> Self {
        Self {
            relevance: CriterionTerms::new(
                &[
                    "explain", "define", "analyze", "how", "why", "what", "steps", "process",
                    "goal",
                ],
                4.0,
                0.0,
                true,
            ),
            clarity: CriterionTerms::new(
                &[
                    "therefore",
                    "first",
                    "second",
                    "finally",
                    "clearly",
                    "in conclusion",
                ],
                3.0,
                0.0,
                true,
            ),
            creativity: CriterionTerms::new(
                &[
                    "imagine",
                    "unique",
                    "creative",
                    "innovative",
                    "inspire",
                    "vision",
                ],
                3.0,
                0.1,
                false,
            ),
            persuasiveness: CriterionTerms::new(
                &[
                    "must",
                    "should",
                    "powerful",
                    "effective",
                    "important",
                    "strongly",
                ],
                3.0,
                0.1,
                false,
            ),
            structure_min_words: 30,
            structure_bonus: 0.2,
        }
    }
}

/// Complete scoring configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub weights: ScoreWeights,
    #[serde(default)]
    pub thresholds: PassThresholds,
    #[serde(default)]
    pub feedback: FeedbackThresholds,
    #[serde(default)]
    pub criteria: CriteriaTable,
    /// Sub-score used when a rubric has no keywords or no patterns.
    #[serde(default = "default_neutral_score")]
    pub neutral_score: f64,
    /// Multiplier applied when the submission exceeds `max_tokens`.
    #[serde(default = "default_length_penalty")]
    pub length_penalty: f64,
    /// Fraction of `max_tokens` at which the token score saturates.
    #[serde(default = "default_target_length_ratio")]
    pub target_length_ratio: f64,
    /// Maximum accepted length, in chars, of the submission and expected output.
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
}

fn default_neutral_score() -> f64 {
    0.5
}
fn default_length_penalty() -> f64 {
    0.8
}
fn default_target_length_ratio() -> f64 {
    0.6
}
fn default_max_input_chars() -> usize {
    20_000
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            thresholds: PassThresholds::default(),
            feedback: FeedbackThresholds::default(),
            criteria: CriteriaTable::default(),
            neutral_score: default_neutral_score(),
            length_penalty: default_length_penalty(),
            target_length_ratio: default_target_length_ratio(),
            max_input_chars: default_max_input_chars(),
        }
    }
}

impl ScoringConfig {
    /// Check internal consistency.
    pub fn validate(&self) -> Result<()> {
        let w = &self.weights;
        anyhow::ensure!(
            [
                w.keyword,
                w.pattern,
                w.fuzzy,
                w.relevance,
                w.clarity,
                w.creativity,
                w.persuasiveness,
                w.token,
            ]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0),
            "score weights must be finite and not negative"
        );
        anyhow::ensure!(w.total() > 0.0, "score weights must not all be zero");
        anyhow::ensure!(
            self.thresholds.submit >= self.thresholds.run,
            "submit threshold ({}) must not be below run threshold ({})",
            self.thresholds.submit,
            self.thresholds.run
        );
        for (name, criterion) in [
            ("relevance", &self.criteria.relevance),
            ("clarity", &self.criteria.clarity),
            ("creativity", &self.criteria.creativity),
            ("persuasiveness", &self.criteria.persuasiveness),
        ] {
            anyhow::ensure!(
                criterion.denominator > 0.0,
                "{name} denominator must be positive"
            );
            if let Some(term) = criterion.terms.iter().find(|t| normalize(t).is_empty()) {
                anyhow::bail!("{name} term '{term}' is empty after normalization");
            }
            ensure_unit(&format!("{name} flat_bonus"), criterion.flat_bonus)?;
        }
        let f = &self.feedback;
        for (name, value) in [
            ("neutral_score", self.neutral_score),
            ("length_penalty", self.length_penalty),
            ("thresholds.run", self.thresholds.run),
            ("thresholds.submit", self.thresholds.submit),
            ("criteria.structure_bonus", self.criteria.structure_bonus),
            ("feedback.keyword", f.keyword),
            ("feedback.fuzzy", f.fuzzy),
            ("feedback.clarity", f.clarity),
            ("feedback.creativity", f.creativity),
            ("feedback.persuasiveness", f.persuasiveness),
            ("feedback.short_ratio", f.short_ratio),
        ] {
            ensure_unit(name, value)?;
        }
        anyhow::ensure!(
            self.target_length_ratio > 0.0,
            "target_length_ratio must be positive"
        );
        anyhow::ensure!(self.max_input_chars > 0, "max_input_chars must be positive");
        Ok(())
    }
}

fn ensure_unit(name: &str, value: f64) -> Result<()> {
    anyhow::ensure!(
        value.is_finite() && (0.0..=1.0).contains(&value),
        "{name} must be a finite number in [0, 1], got {value}"
    );
    Ok(())
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order when no path is given:
/// 1. `promptgrade.toml` in the current directory
/// 2. `~/.config/promptgrade/config.toml`
///
/// Environment variable override: `PROMPTGRADE_MAX_INPUT_CHARS`.
pub fn load_config_from(path: Option<&Path>) -> Result<ScoringConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("promptgrade.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ScoringConfig::default(),
    };

    if let Ok(raw) = std::env::var("PROMPTGRADE_MAX_INPUT_CHARS") {
        config.max_input_chars = raw
            .trim()
            .parse()
            .with_context(|| format!("invalid PROMPTGRADE_MAX_INPUT_CHARS: '{raw}'"))?;
    }

    config.validate()?;
    Ok(config)
}

/// Parse a TOML string into a `ScoringConfig` (useful for testing).
pub fn parse_config_str(content: &str) -> Result<ScoringConfig> {
    Ok(toml::from_str::<ScoringConfig>(content)?)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("promptgrade"))
}
