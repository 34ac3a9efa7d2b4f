//! Evaluation error types.
//!
//! These are raised at the call boundary of the evaluator. A failed call
//! never produces a partial or default score.

use thiserror::Error;

/// Errors that can occur when evaluating a submission.
#[derive(Debug, Error)]
pub enum EvalError {
    /// A rubric pattern is not a valid regular expression.
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// An argument is outside its accepted domain (e.g. `max_tokens == 0`).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An input string exceeds the configured length cap.
    #[error("{field} is too large: {len} chars (max {max})")]
    InputTooLarge {
        field: &'static str,
        len: usize,
        max: usize,
    },
}

impl EvalError {
    /// Returns `true` if the error comes from rubric data rather than the submission.
    pub fn is_rubric_error(&self) -> bool {
        match self {
            EvalError::InvalidPattern { .. } | EvalError::InvalidArgument(_) => true,
            EvalError::InputTooLarge { field, .. } => *field == "expected_output",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_too_large_message() {
        let err = EvalError::InputTooLarge {
            field: "user_text",
            len: 30_000,
            max: 20_000,
        };
        assert_eq!(
            err.to_string(),
            "user_text is too large: 30000 chars (max 20000)"
        );
        assert!(!err.is_rubric_error());
    }

    #[test]
    fn invalid_pattern_keeps_source() {
        let source = regex::Regex::new("(unclosed").unwrap_err();
        let err = EvalError::InvalidPattern {
            pattern: "(unclosed".into(),
            source,
        };
        assert!(err.to_string().starts_with("invalid pattern '(unclosed'"));
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.is_rubric_error());
    }
}
