//! promptgrade-core: prompt evaluation engine, catalogs, and grading reports.
//!
//! This crate scores free-text prompt submissions against an exercise rubric
//! and provides the catalog, batch, and reporting layers the CLI builds on.

pub mod batch;
pub mod catalog;
pub mod config;
pub mod criteria;
pub mod engine;
pub mod error;
pub mod feedback;
pub mod model;
pub mod parser;
pub mod report;
pub mod similarity;
pub mod statistics;
pub mod text;

pub use config::ScoringConfig;
pub use engine::{evaluate, Evaluator};
pub use error::EvalError;
pub use model::{EvaluationRequest, EvaluationResult, Feedback, Mode};
