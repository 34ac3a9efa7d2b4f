//! Aggregate statistics over graded attempts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::Mode;
use crate::report::AttemptRecord;

/// Aggregate statistics across all attempts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregateStats {
    /// Per-exercise statistics, keyed by exercise id.
    pub per_exercise: BTreeMap<String, ExerciseStats>,
    /// Totals across every attempt.
    pub overall: OverallStats,
}

/// Statistics for a single exercise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseStats {
    pub exercise_id: String,
    pub attempts: usize,
    pub passed: usize,
    pub pass_rate: f64,
    pub mean_score: f64,
    pub best_score: u32,
    /// At least one `submit` attempt passed.
    pub solved: bool,
}

/// Totals across all exercises.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverallStats {
    pub attempts: usize,
    pub passed: usize,
    pub pass_rate: f64,
    pub mean_score: f64,
    /// Mean of each named sub-score.
    pub mean_sub_scores: BTreeMap<String, f64>,
    /// Number of exercises with a passing `submit` attempt.
    pub solved: usize,
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

/// Compute aggregate statistics from graded attempts.
pub fn compute_aggregate_stats(attempts: &[AttemptRecord]) -> AggregateStats {
    let mut grouped: BTreeMap<&str, Vec<&AttemptRecord>> = BTreeMap::new();
    for a in attempts {
        grouped.entry(a.exercise_id.as_str()).or_default().push(a);
    }

    let per_exercise: BTreeMap<String, ExerciseStats> = grouped
        .into_iter()
        .map(|(id, group)| {
            let passed = group.iter().filter(|a| a.result.passed).count();
            let stats = ExerciseStats {
                exercise_id: id.to_string(),
                attempts: group.len(),
                passed,
                pass_rate: passed as f64 / group.len() as f64,
                mean_score: mean(group.iter().map(|a| f64::from(a.result.score))),
                best_score: group.iter().map(|a| a.result.score).max().unwrap_or(0),
                solved: group
                    .iter()
                    .any(|a| a.mode == Mode::Submit && a.result.passed),
            };
            (id.to_string(), stats)
        })
        .collect();

    let passed = attempts.iter().filter(|a| a.result.passed).count();
    let mut sub_score_sums: BTreeMap<String, f64> = BTreeMap::new();
    for a in attempts {
        for (name, value) in a.result.feedback.sub_scores() {
            *sub_score_sums.entry(name.to_string()).or_default() += f64::from(value);
        }
    }
    let mean_sub_scores = sub_score_sums
        .into_iter()
        .map(|(name, sum)| (name, sum / attempts.len().max(1) as f64))
        .collect();

    let overall = OverallStats {
        attempts: attempts.len(),
        passed,
        pass_rate: if attempts.is_empty() {
            0.0
        } else {
            passed as f64 / attempts.len() as f64
        },
        mean_score: mean(attempts.iter().map(|a| f64::from(a.result.score))),
        mean_sub_scores,
        solved: per_exercise.values().filter(|s| s.solved).count(),
    };

    AggregateStats {
        per_exercise,
        overall,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EvaluationResult, Feedback};

    fn attempt(exercise_id: &str, mode: Mode, score: u32, passed: bool) -> AttemptRecord {
        AttemptRecord {
            exercise_id: exercise_id.into(),
            mode,
            text: String::new(),
            result: EvaluationResult {
                passed,
                score,
                feedback: Feedback {
                    keyword_score: score,
                    pattern_score: 50,
                    fuzzy_score: 0,
                    token_score: 100,
                    relevance_score: 0,
                    clarity_score: 0,
                    creativity_score: 10,
                    persuasiveness_score: 10,
                    details: vec![],
                    hints: vec![],
                },
            },
            elapsed_us: 0,
        }
    }

    #[test]
    fn empty_input() {
        let stats = compute_aggregate_stats(&[]);
        assert!(stats.per_exercise.is_empty());
        assert_eq!(stats.overall.attempts, 0);
        assert_eq!(stats.overall.pass_rate, 0.0);
        assert_eq!(stats.overall.mean_score, 0.0);
    }

    #[test]
    fn per_exercise_and_overall() {
        let attempts = vec![
            attempt("a", Mode::Run, 60, true),
            attempt("a", Mode::Submit, 80, true),
            attempt("b", Mode::Run, 70, true),
            attempt("b", Mode::Submit, 40, false),
        ];
        let stats = compute_aggregate_stats(&attempts);

        let a = &stats.per_exercise["a"];
        assert_eq!(a.attempts, 2);
        assert_eq!(a.best_score, 80);
        assert!((a.mean_score - 70.0).abs() < f64::EPSILON);
        assert!(a.solved);

        let b = &stats.per_exercise["b"];
        assert!((b.pass_rate - 0.5).abs() < f64::EPSILON);
        // only a run attempt passed
        assert!(!b.solved);

        assert_eq!(stats.overall.attempts, 4);
        assert_eq!(stats.overall.passed, 3);
        assert_eq!(stats.overall.solved, 1);
        assert!((stats.overall.mean_score - 62.5).abs() < f64::EPSILON);
        assert!((stats.overall.mean_sub_scores["keyword"] - 62.5).abs() < f64::EPSILON);
        assert!((stats.overall.mean_sub_scores["pattern"] - 50.0).abs() < f64::EPSILON);
        assert_eq!(stats.overall.mean_sub_scores.len(), 8);
    }
}
