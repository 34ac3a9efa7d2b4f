//! The `promptgrade evaluate` command.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use promptgrade_core::catalog::find_exercise;
use promptgrade_core::config::load_config_from;
use promptgrade_core::model::{EvaluationResult, Exercise, Mode};
use promptgrade_core::parser::load_catalogs;
use promptgrade_core::Evaluator;

pub fn execute(
    catalog_path: PathBuf,
    exercise_id: String,
    text: Option<String>,
    file: Option<PathBuf>,
    mode: Mode,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let catalogs = load_catalogs(&catalog_path)?;
    let exercise = find_exercise(&catalogs, &exercise_id)
        .with_context(|| format!("exercise '{exercise_id}' not found"))?;

    let user_text = match (text, file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read submission: {}", path.display()))?,
        (None, None) => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read submission from stdin")?;
            buf
        }
    };

    let evaluator = Evaluator::new(config);
    let result = evaluator.evaluate(&exercise.to_request(user_text, mode))?;
    tracing::info!(
        exercise = %exercise.id,
        %mode,
        score = result.score,
        passed = result.passed,
        "graded submission"
    );

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        _ => print_text(exercise, mode, &result),
    }

    Ok(())
}

fn print_text(exercise: &Exercise, mode: Mode, result: &EvaluationResult) {
    println!("Exercise: {} ({})", exercise.title, exercise.id);
    if let Some(secs) = exercise.competition_time_limit() {
        println!("Competition: {} minute time limit", secs / 60);
    }
    println!(
        "Mode: {mode}  Score: {}/100  {}",
        result.score,
        if result.passed { "PASSED" } else { "NOT PASSED" }
    );

    let mut table = Table::new();
    table.set_header(vec!["Criterion", "Score"]);
    for (name, value) in result.feedback.sub_scores() {
        table.add_row(vec![Cell::new(name), Cell::new(value)]);
    }
    println!("\n{table}");

    if !result.feedback.details.is_empty() {
        println!("\nFeedback:");
        for line in &result.feedback.details {
            println!("  - {line}");
        }
    }
    if !result.feedback.hints.is_empty() {
        println!("\nHints:");
        for hint in &result.feedback.hints {
            println!("  - {hint}");
        }
    }
}
