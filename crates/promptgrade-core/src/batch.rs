//! Concurrent batch grading.
//!
//! Grades many submissions against a set of catalogs with bounded
//! parallelism. Evaluation is CPU-bound, so each one runs on the blocking
//! pool behind a semaphore permit.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::catalog::{find_exercise, Catalog};
use crate::engine::Evaluator;
use crate::model::Mode;
use crate::report::{AttemptRecord, CatalogSummary, FailedAttempt, FailureKind, GradingReport};
use crate::statistics::compute_aggregate_stats;

/// One submission to grade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    /// Id of the exercise this answers.
    pub exercise_id: String,
    pub text: String,
    #[serde(default)]
    pub mode: Mode,
}

/// Configuration for the batch runner.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Maximum concurrent evaluations.
    pub parallelism: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { parallelism: 4 }
    }
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_attempt_start(&self, exercise_id: &str, mode: Mode);
    fn on_attempt_complete(&self, attempt: &AttemptRecord);
    fn on_attempt_error(&self, exercise_id: &str, mode: Mode, error: &str);
    fn on_batch_complete(&self, total: usize, completed: usize, failed: usize, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_attempt_start(&self, _: &str, _: Mode) {}
    fn on_attempt_complete(&self, _: &AttemptRecord) {}
    fn on_attempt_error(&self, _: &str, _: Mode, _: &str) {}
    fn on_batch_complete(&self, _: usize, _: usize, _: usize, _: Duration) {}
}

/// Grades batches of submissions.
pub struct BatchRunner {
    evaluator: Arc<Evaluator>,
    config: BatchConfig,
}

impl BatchRunner {
    pub fn new(evaluator: Evaluator, config: BatchConfig) -> Self {
        Self {
            evaluator: Arc::new(evaluator),
            config,
        }
    }

    /// Grade every submission and build a report.
    ///
    /// Submissions naming an unknown exercise, or whose rubric is invalid,
    /// are recorded as failures. Attempts and failures keep submission order.
    pub async fn run(
        &self,
        catalogs: &[Catalog],
        submissions: &[Submission],
        progress: &dyn ProgressReporter,
    ) -> Result<GradingReport> {
        let start = Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.config.parallelism.max(1)));

        let mut failures = Vec::new();
        let mut futures = FuturesUnordered::new();

        for (index, submission) in submissions.iter().enumerate() {
            let Some(exercise) = find_exercise(catalogs, &submission.exercise_id) else {
                tracing::warn!("exercise '{}' not found, skipping", submission.exercise_id);
                let error = format!("exercise '{}' not found", submission.exercise_id);
                progress.on_attempt_error(&submission.exercise_id, submission.mode, &error);
                failures.push((
                    index,
                    FailedAttempt {
                        exercise_id: submission.exercise_id.clone(),
                        mode: submission.mode,
                        kind: FailureKind::UnknownExercise,
                        error,
                    },
                ));
                continue;
            };

            let request = exercise.to_request(submission.text.clone(), submission.mode);
            let evaluator = Arc::clone(&self.evaluator);
            let semaphore = Arc::clone(&semaphore);

            futures.push(async move {
                let outcome = async move {
                    let _permit = semaphore
                        .acquire_owned()
                        .await
                        .map_err(|_| anyhow::anyhow!("semaphore closed"))?;
                    progress.on_attempt_start(&submission.exercise_id, submission.mode);

                    let graded = tokio::task::spawn_blocking(move || {
                        let eval_start = Instant::now();
                        let result = evaluator.evaluate(&request);
                        (result, eval_start.elapsed().as_micros() as u64)
                    })
                    .await?;
                    anyhow::Ok(graded)
                }
                .await;
                (index, submission, outcome)
            });
        }

        let total = submissions.len();
        let mut attempts = Vec::new();

        while let Some((index, submission, outcome)) = futures.next().await {
            let graded = match outcome {
                Ok((Ok(result), elapsed_us)) => Ok(AttemptRecord {
                    exercise_id: submission.exercise_id.clone(),
                    mode: submission.mode,
                    text: submission.text.clone(),
                    result,
                    elapsed_us,
                }),
                Ok((Err(e), _)) => {
                    let kind = if e.is_rubric_error() {
                        FailureKind::Rubric
                    } else {
                        FailureKind::Submission
                    };
                    Err((kind, e.to_string()))
                }
                Err(e) => Err((FailureKind::Submission, format!("{e:#}"))),
            };

            match graded {
                Ok(attempt) => {
                    progress.on_attempt_complete(&attempt);
                    attempts.push((index, attempt));
                }
                Err((kind, error)) => {
                    tracing::error!(
                        "grading failed for {}/{} ({kind}): {error}",
                        submission.exercise_id,
                        submission.mode
                    );
                    progress.on_attempt_error(&submission.exercise_id, submission.mode, &error);
                    failures.push((
                        index,
                        FailedAttempt {
                            exercise_id: submission.exercise_id.clone(),
                            mode: submission.mode,
                            kind,
                            error,
                        },
                    ));
                }
            }
        }

        attempts.sort_by_key(|(index, _)| *index);
        let attempts: Vec<AttemptRecord> = attempts.into_iter().map(|(_, a)| a).collect();
        failures.sort_by_key(|(index, _)| *index);
        let failures: Vec<FailedAttempt> = failures.into_iter().map(|(_, f)| f).collect();

        let elapsed = start.elapsed();
        progress.on_batch_complete(total, attempts.len(), failures.len(), elapsed);

        Ok(GradingReport {
            id: Uuid::new_v4(),
            created_at: chrono::Utc::now(),
            catalogs: catalogs.iter().map(CatalogSummary::from).collect(),
            aggregate: compute_aggregate_stats(&attempts),
            attempts,
            failures,
            duration_ms: elapsed.as_millis() as u64,
        })
    }
}
