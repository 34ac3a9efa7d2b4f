//! Core data model types for promptgrade.
//!
//! Evaluation requests and results, plus the exercise (rubric) types that
//! catalogs are made of.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How a submission is graded. Controls the pass threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Practice run, lenient threshold.
    #[default]
    Run,
    /// Final submission, strict threshold.
    Submit,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Run => write!(f, "run"),
            Mode::Submit => write!(f, "submit"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "run" => Ok(Mode::Run),
            "submit" => Ok(Mode::Submit),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}

/// Everything needed to grade one submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRequest {
    /// The submission being graded.
    pub user_text: String,
    /// Reference text describing the ideal answer.
    pub expected_output: String,
    /// Terms searched for in the normalized submission.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Case-insensitive regular expressions matched against the raw submission.
    #[serde(default)]
    pub patterns: Vec<String>,
    /// Target word-count budget. Must be positive.
    pub max_tokens: u32,
    /// Rubric hints; only a prefix is surfaced.
    #[serde(default)]
    pub hints: Vec<String>,
    #[serde(default)]
    pub mode: Mode,
    /// Metric weights declared by the rubric. Accepted but not used in scoring.
    #[serde(default)]
    pub ai_eval_metrics: BTreeMap<String, f64>,
}

/// Outcome of grading one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub passed: bool,
    /// Composite score in `[0, 100]`.
    pub score: u32,
    pub feedback: Feedback,
}

/// Sub-scores (each in `[0, 100]`), diagnostics, and surfaced hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub keyword_score: u32,
    pub pattern_score: u32,
    pub fuzzy_score: u32,
    pub token_score: u32,
    pub relevance_score: u32,
    pub clarity_score: u32,
    pub creativity_score: u32,
    pub persuasiveness_score: u32,
    pub details: Vec<String>,
    pub hints: Vec<String>,
}

impl Feedback {
    /// The eight sub-scores with their names, in report order.
    pub fn sub_scores(&self) -> [(&'static str, u32); 8] {
        [
            ("keyword", self.keyword_score),
            ("pattern", self.pattern_score),
            ("fuzzy", self.fuzzy_score),
            ("token", self.token_score),
            ("relevance", self.relevance_score),
            ("clarity", self.clarity_score),
            ("creativity", self.creativity_score),
            ("persuasiveness", self.persuasiveness_score),
        ]
    }
}

// ---------------------------------------------------------------------------
// Exercises
// ---------------------------------------------------------------------------

/// Exercise difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    #[serde(alias = "easy")]
    Easy,
    #[serde(alias = "medium")]
    Medium,
    #[serde(alias = "hard")]
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "Easy"),
            Difficulty::Medium => write!(f, "Medium"),
            Difficulty::Hard => write!(f, "Hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// Whether an exercise is ordinary practice or a timed competition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseKind {
    #[default]
    Normal,
    Competition,
}

/// A practice exercise: presentation fields plus the grading rubric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    /// Unique identifier within a catalog.
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub category: String,
    /// Prompting technique the exercise practices (e.g. "Chain-of-Thought").
    #[serde(default)]
    pub technique: String,
    #[serde(default)]
    pub scenario: String,
    #[serde(default)]
    pub input_data: String,
    /// Reference answer the submission is compared to. Structured values
    /// (e.g. a JSON object) are stored in their serialized form.
    #[serde(deserialize_with = "string_or_serialized")]
    pub expected_output: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub patterns: Vec<String>,
    pub max_tokens: u32,
    #[serde(default)]
    pub example_output: String,
    #[serde(default)]
    pub hints: Vec<String>,
    #[serde(default, alias = "type")]
    pub kind: ExerciseKind,
    #[serde(default)]
    pub ai_eval_metrics: BTreeMap<String, f64>,
    /// Human-readable description per metric name.
    #[serde(default)]
    pub ai_eval_criteria: BTreeMap<String, String>,
    /// Time limit for competition exercises.
    #[serde(default)]
    pub time_limit_secs: Option<u64>,
}

fn string_or_serialized<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        other => Ok(other.to_string()),
    }
}

/// Competition time limit when an exercise does not set one.
pub const DEFAULT_COMPETITION_SECS: u64 = 15 * 60;

impl Exercise {
    /// Build the evaluation request for a submission to this exercise.
    pub fn to_request(&self, user_text: impl Into<String>, mode: Mode) -> EvaluationRequest {
        EvaluationRequest {
            user_text: user_text.into(),
            expected_output: self.expected_output.clone(),
            keywords: self.keywords.clone(),
            patterns: self.patterns.clone(),
            max_tokens: self.max_tokens,
            hints: self.hints.clone(),
            mode,
            ai_eval_metrics: self.ai_eval_metrics.clone(),
        }
    }

    /// Time limit for a competition exercise; `None` for normal ones.
    pub fn competition_time_limit(&self) -> Option<u64> {
        match self.kind {
            ExerciseKind::Normal => None,
            ExerciseKind::Competition => {
                Some(self.time_limit_secs.unwrap_or(DEFAULT_COMPETITION_SECS))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_display_and_parse() {
        assert_eq!(Mode::Run.to_string(), "run");
        assert_eq!(Mode::Submit.to_string(), "submit");
        assert_eq!("SUBMIT".parse::<Mode>().unwrap(), Mode::Submit);
        assert!("grade".parse::<Mode>().is_err());
        assert_eq!(Mode::default(), Mode::Run);
    }

    #[test]
    fn difficulty_parse_and_order() {
        assert_eq!("hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!(Difficulty::Easy < Difficulty::Hard);
        let d: Difficulty = serde_json::from_str("\"medium\"").unwrap();
        assert_eq!(d, Difficulty::Medium);
    }

    #[test]
    fn request_defaults_from_json() {
        let req: EvaluationRequest = serde_json::from_str(
            r#"{"user_text": "hi", "expected_output": "hello", "max_tokens": 10}"#,
        )
        .unwrap();
        assert_eq!(req.mode, Mode::Run);
        assert!(req.keywords.is_empty());
        assert!(req.ai_eval_metrics.is_empty());
    }

    #[test]
    fn structured_expected_output_is_serialized() {
        let exercise: Exercise = serde_json::from_str(
            r#"{
                "id": "json-1",
                "title": "Extract fields",
                "difficulty": "Medium",
                "expected_output": {"name": "Ada", "age": 36},
                "max_tokens": 40,
                "type": "competition"
            }"#,
        )
        .unwrap();
        assert_eq!(exercise.expected_output, r#"{"age":36,"name":"Ada"}"#);
        assert_eq!(exercise.kind, ExerciseKind::Competition);
    }

    #[test]
    fn exercise_to_request_copies_rubric() {
        let exercise = Exercise {
            id: "sky".into(),
            title: "Why is the sky blue".into(),
            description: String::new(),
            difficulty: Difficulty::Easy,
            category: "Science".into(),
            technique: "Zero-shot".into(),
            scenario: String::new(),
            input_data: String::new(),
            expected_output: "rayleigh scattering".into(),
            keywords: vec!["sky".into()],
            patterns: vec!["scatter".into()],
            max_tokens: 50,
            example_output: String::new(),
            hints: vec!["mention wavelength".into()],
            kind: ExerciseKind::Competition,
            ai_eval_metrics: BTreeMap::from([("clarity".to_string(), 0.5)]),
            ai_eval_criteria: BTreeMap::new(),
            time_limit_secs: None,
        };
        let req = exercise.to_request("my answer", Mode::Submit);
        assert_eq!(req.user_text, "my answer");
        assert_eq!(req.max_tokens, 50);
        assert_eq!(req.mode, Mode::Submit);
        assert_eq!(req.ai_eval_metrics.get("clarity"), Some(&0.5));
        assert_eq!(exercise.competition_time_limit(), Some(DEFAULT_COMPETITION_SECS));
    }
}
