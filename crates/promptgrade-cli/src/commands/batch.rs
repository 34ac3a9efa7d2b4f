//! The `promptgrade batch` command.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use comfy_table::{Cell, Table};

use promptgrade_core::batch::{BatchConfig, BatchRunner, ProgressReporter};
use promptgrade_core::config::load_config_from;
use promptgrade_core::model::Mode;
use promptgrade_core::parser::{load_catalogs, load_submissions};
use promptgrade_core::report::{AttemptRecord, GradingReport};
use promptgrade_core::Evaluator;

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_attempt_start(&self, exercise_id: &str, mode: Mode) {
        tracing::debug!("starting {exercise_id} ({mode})");
    }

    fn on_attempt_complete(&self, attempt: &AttemptRecord) {
        eprintln!(
            "  Done: {} ({}) score {} {}",
            attempt.exercise_id,
            attempt.mode,
            attempt.result.score,
            if attempt.result.passed { "PASS" } else { "FAIL" },
        );
    }

    fn on_attempt_error(&self, exercise_id: &str, mode: Mode, error: &str) {
        eprintln!("  ERROR: {exercise_id} ({mode}): {error}");
    }

    fn on_batch_complete(&self, total: usize, completed: usize, failed: usize, elapsed: Duration) {
        eprintln!(
            "\nComplete: {completed}/{total} graded, {failed} failed ({:.1}s)",
            elapsed.as_secs_f64()
        );
    }
}

pub async fn execute(
    catalog_path: PathBuf,
    submissions_path: PathBuf,
    parallelism: usize,
    output: PathBuf,
    config_path: Option<PathBuf>,
) -> Result<()> {
    anyhow::ensure!(parallelism >= 1, "parallelism must be at least 1");

    let config = load_config_from(config_path.as_deref())?;
    let catalogs = load_catalogs(&catalog_path)?;
    let submissions = load_submissions(&submissions_path)?;

    eprintln!(
        "promptgrade v{}: grading {} submissions against {} catalog(s)\n",
        env!("CARGO_PKG_VERSION"),
        submissions.len(),
        catalogs.len()
    );

    let runner = BatchRunner::new(Evaluator::new(config), BatchConfig { parallelism });
    let report = runner.run(&catalogs, &submissions, &ConsoleReporter).await?;

    print_summary(&report);

    std::fs::create_dir_all(&output)?;
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");
    let path = output.join(format!("report-{timestamp}.json"));
    report.save_json(&path)?;
    eprintln!("Results saved to: {}", path.display());

    Ok(())
}

fn print_summary(report: &GradingReport) {
    let mut table = Table::new();
    table.set_header(vec![
        "Exercise",
        "Attempts",
        "Pass %",
        "Mean",
        "Best",
        "Solved",
    ]);

    for (id, stats) in &report.aggregate.per_exercise {
        table.add_row(vec![
            Cell::new(id),
            Cell::new(stats.attempts),
            Cell::new(format!("{:.1}%", stats.pass_rate * 100.0)),
            Cell::new(format!("{:.1}", stats.mean_score)),
            Cell::new(stats.best_score),
            Cell::new(if stats.solved { "yes" } else { "no" }),
        ]);
    }

    let overall = &report.aggregate.overall;
    println!("{table}");
    println!(
        "Overall: {} attempts, {:.1}% passed, mean score {:.1}, {} solved",
        overall.attempts,
        overall.pass_rate * 100.0,
        overall.mean_score,
        overall.solved
    );

    for failure in &report.failures {
        println!(
            "Failed: {} ({}) [{}]: {}",
            failure.exercise_id, failure.mode, failure.kind, failure.error
        );
    }
}
