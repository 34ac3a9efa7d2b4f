//! Grading report types with JSON persistence and regression detection.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::model::{EvaluationResult, Mode};
use crate::statistics::AggregateStats;

/// One graded submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub exercise_id: String,
    pub mode: Mode,
    /// The submitted text.
    pub text: String,
    pub result: EvaluationResult,
    /// Wall-clock evaluation time in microseconds.
    pub elapsed_us: u64,
}

/// Why a submission produced no score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The submission names an exercise no catalog defines.
    UnknownExercise,
    /// The exercise's rubric is unusable (bad pattern, zero budget, ...).
    Rubric,
    /// The submission itself was rejected, e.g. it is too long.
    #[default]
    Submission,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::UnknownExercise => write!(f, "unknown exercise"),
            FailureKind::Rubric => write!(f, "rubric"),
            FailureKind::Submission => write!(f, "submission"),
        }
    }
}

/// A submission that could not be graded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedAttempt {
    pub exercise_id: String,
    pub mode: Mode,
    #[serde(default)]
    pub kind: FailureKind,
    pub error: String,
}

/// Summary of a catalog (without the full exercise definitions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSummary {
    pub id: String,
    pub name: String,
    pub exercise_count: usize,
}

impl From<&Catalog> for CatalogSummary {
    fn from(catalog: &Catalog) -> Self {
        Self {
            id: catalog.id.clone(),
            name: catalog.name.clone(),
            exercise_count: catalog.exercises.len(),
        }
    }
}

/// A complete grading report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradingReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Catalogs the submissions were graded against.
    pub catalogs: Vec<CatalogSummary>,
    /// Graded attempts, in submission order.
    pub attempts: Vec<AttemptRecord>,
    /// Submissions that produced no score.
    #[serde(default)]
    pub failures: Vec<FailedAttempt>,
    /// Aggregate statistics.
    pub aggregate: AggregateStats,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

impl GradingReport {
    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: GradingReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Compare this report against a baseline, on the best score per
    /// (exercise, mode). `threshold` is in score points.
    pub fn compare(&self, baseline: &GradingReport, threshold: u32) -> RegressionReport {
        let best_scores = |report: &GradingReport| -> HashMap<(String, Mode), u32> {
            let mut map: HashMap<(String, Mode), u32> = HashMap::new();
            for a in &report.attempts {
                let entry = map.entry((a.exercise_id.clone(), a.mode)).or_insert(0);
                *entry = (*entry).max(a.result.score);
            }
            map
        };

        let baseline_scores = best_scores(baseline);
        let current_scores = best_scores(self);

        let mut regressions = Vec::new();
        let mut improvements = Vec::new();
        let mut unchanged = 0usize;
        let mut new_exercises = 0usize;

        for ((exercise_id, mode), &current) in &current_scores {
            let Some(&baseline_score) = baseline_scores.get(&(exercise_id.clone(), *mode)) else {
                new_exercises += 1;
                continue;
            };
            let delta = i64::from(current) - i64::from(baseline_score);
            let change = ScoreChange {
                exercise_id: exercise_id.clone(),
                mode: *mode,
                baseline_score,
                current_score: current,
                delta,
            };
            if delta < -i64::from(threshold) {
                regressions.push(change);
            } else if delta > i64::from(threshold) {
                improvements.push(change);
            } else {
                unchanged += 1;
            }
        }

        let removed_exercises = baseline_scores
            .keys()
            .filter(|k| !current_scores.contains_key(*k))
            .count();

        regressions.sort_by(|a, b| a.delta.cmp(&b.delta).then(a.exercise_id.cmp(&b.exercise_id)));
        improvements.sort_by(|a, b| b.delta.cmp(&a.delta).then(a.exercise_id.cmp(&b.exercise_id)));

        RegressionReport {
            regressions,
            improvements,
            unchanged,
            new_exercises,
            removed_exercises,
        }
    }
}

/// Result of comparing two reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionReport {
    /// Exercises whose best score went down.
    pub regressions: Vec<ScoreChange>,
    /// Exercises whose best score went up.
    pub improvements: Vec<ScoreChange>,
    /// Exercises with no significant change.
    pub unchanged: usize,
    /// Exercises in current but not baseline.
    pub new_exercises: usize,
    /// Exercises in baseline but not current.
    pub removed_exercises: usize,
}

/// A score change for one (exercise, mode) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreChange {
    pub exercise_id: String,
    pub mode: Mode,
    pub baseline_score: u32,
    pub current_score: u32,
    pub delta: i64,
}

impl RegressionReport {
    /// Format the regression report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Summary:** {} regressions, {} improvements, {} unchanged\n\n",
            self.regressions.len(),
            self.improvements.len(),
            self.unchanged
        ));

        for (title, changes) in [
            ("Regressions", &self.regressions),
            ("Improvements", &self.improvements),
        ] {
            if changes.is_empty() {
                continue;
            }
            md.push_str(&format!("### {title}\n\n"));
            md.push_str("| Exercise | Mode | Baseline | Current | Delta |\n");
            md.push_str("|----------|------|----------|---------|-------|\n");
            for c in changes {
                md.push_str(&format!(
                    "| {} | {} | {} | {} | {:+} |\n",
                    c.exercise_id, c.mode, c.baseline_score, c.current_score, c.delta
                ));
            }
            md.push('\n');
        }

        md
    }

    /// Returns true if there are any regressions.
    pub fn has_regressions(&self) -> bool {
        !self.regressions.is_empty()
    }
}
