//! Regression detection integration tests.
//!
//! Builds reports in memory, persists them, and checks the `compare`
//! command's JSON output and exit codes.

use assert_cmd::Command;
use tempfile::TempDir;
use uuid::Uuid;

use promptgrade_core::model::{EvaluationResult, Feedback, Mode};
use promptgrade_core::report::{AttemptRecord, CatalogSummary, GradingReport, RegressionReport};
use promptgrade_core::statistics::compute_aggregate_stats;

fn attempt(exercise_id: &str, mode: Mode, score: u32) -> AttemptRecord {
    AttemptRecord {
        exercise_id: exercise_id.into(),
        mode,
        text: "submission".into(),
        result: EvaluationResult {
            passed: score >= 70,
            score,
            feedback: Feedback {
                keyword_score: score,
                pattern_score: score,
                fuzzy_score: score,
                token_score: score,
                relevance_score: 0,
                clarity_score: 0,
                creativity_score: 10,
                persuasiveness_score: 10,
                details: vec![],
                hints: vec![],
            },
        },
        elapsed_us: 40,
    }
}

fn make_report(attempts: Vec<AttemptRecord>) -> GradingReport {
    GradingReport {
        id: Uuid::new_v4(),
        created_at: chrono::Utc::now(),
        catalogs: vec![CatalogSummary {
            id: "fundamentals".into(),
            name: "Prompt Fundamentals".into(),
            exercise_count: 3,
        }],
        aggregate: compute_aggregate_stats(&attempts),
        attempts,
        failures: vec![],
        duration_ms: 5,
    }
}

fn compare_json(baseline: &GradingReport, current: &GradingReport, threshold: u32) -> RegressionReport {
    let dir = TempDir::new().unwrap();
    let baseline_path = dir.path().join("baseline.json");
    let current_path = dir.path().join("current.json");
    baseline.save_json(&baseline_path).unwrap();
    current.save_json(&current_path).unwrap();

    #[allow(deprecated)]
    let output = Command::cargo_bin("promptgrade")
        .unwrap()
        .arg("compare")
        .arg("--baseline")
        .arg(&baseline_path)
        .arg("--current")
        .arg(&current_path)
        .arg("--threshold")
        .arg(threshold.to_string())
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn detects_regression_and_improvement() {
    let baseline = make_report(vec![
        attempt("a", Mode::Run, 80),
        attempt("b", Mode::Run, 40),
        attempt("c", Mode::Submit, 60),
    ]);
    let current = make_report(vec![
        attempt("a", Mode::Run, 50),
        attempt("b", Mode::Run, 75),
        attempt("c", Mode::Submit, 62),
    ]);

    let report = compare_json(&baseline, &current, 5);
    assert_eq!(report.regressions.len(), 1);
    assert_eq!(report.regressions[0].exercise_id, "a");
    assert_eq!(report.regressions[0].delta, -30);
    assert_eq!(report.improvements.len(), 1);
    assert_eq!(report.improvements[0].exercise_id, "b");
    assert_eq!(report.unchanged, 1);
}

#[test]
fn threshold_controls_sensitivity() {
    let baseline = make_report(vec![attempt("a", Mode::Run, 80)]);
    let current = make_report(vec![attempt("a", Mode::Run, 72)]);

    assert_eq!(compare_json(&baseline, &current, 10).regressions.len(), 0);
    assert_eq!(compare_json(&baseline, &current, 5).regressions.len(), 1);
}

#[test]
fn new_and_removed_exercises() {
    let baseline = make_report(vec![attempt("old", Mode::Run, 80)]);
    let current = make_report(vec![attempt("new", Mode::Submit, 90)]);

    let report = compare_json(&baseline, &current, 5);
    assert_eq!(report.new_exercises, 1);
    assert_eq!(report.removed_exercises, 1);
    assert!(report.regressions.is_empty());
}

#[test]
fn fail_on_regression_exit_code() {
    let dir = TempDir::new().unwrap();
    let baseline_path = dir.path().join("baseline.json");
    let current_path = dir.path().join("current.json");
    make_report(vec![attempt("a", Mode::Submit, 90)])
        .save_json(&baseline_path)
        .unwrap();
    make_report(vec![attempt("a", Mode::Submit, 20)])
        .save_json(&current_path)
        .unwrap();

    #[allow(deprecated)]
    Command::cargo_bin("promptgrade")
        .unwrap()
        .arg("compare")
        .arg("--baseline")
        .arg(&baseline_path)
        .arg("--current")
        .arg(&current_path)
        .arg("--fail-on-regression")
        .assert()
        .failure();
}

#[test]
fn compare_nonexistent_report() {
    #[allow(deprecated)]
    Command::cargo_bin("promptgrade")
        .unwrap()
        .arg("compare")
        .arg("--baseline")
        .arg("no_such_file.json")
        .arg("--current")
        .arg("also_no_file.json")
        .assert()
        .failure();
}
