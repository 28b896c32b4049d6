//! Submission handling core: normalize the raw body, validate it against the
//! stored question types, then score it.

pub mod normalizer;
pub mod scoring;
pub mod validation;

use serde::Serialize;

/// A single field-level problem with a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    /// Path into the payload, e.g. `answers[1].selected_option_ids`.
    pub field: String,
    pub message: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionError {
    /// The body cannot be read into the expected shape at all.
    MalformedPayload(String),
    /// `attempt_id` was present but is not an integer.
    InvalidAttemptId,
    /// The body parsed but breaks the submission rules.
    Validation(Vec<FieldIssue>),
}

impl std::fmt::Display for SubmissionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionError::MalformedPayload(msg) => write!(f, "malformed payload: {}", msg),
            SubmissionError::InvalidAttemptId => f.write_str("invalid attempt identifier"),
            SubmissionError::Validation(issues) => {
                write!(f, "{} validation issue(s)", issues.len())
            }
        }
    }
}

impl std::error::Error for SubmissionError {}
