// src/models/submission.rs

use crate::exam::FieldIssue;

/// One answered question after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerSelection {
    pub question_id: i64,
    pub selected_option_ids: Vec<i64>,
}

/// A submission body reduced to a single shape, whatever encoding it arrived in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedSubmission {
    pub attempt_id: Option<i64>,
    pub answers: Vec<AnswerSelection>,
    /// Top-level JSON keys outside the schema. Always empty for form bodies.
    pub unknown_fields: Vec<String>,
    /// Answer entries that could not be read; reported by the validator.
    pub shape_issues: Vec<FieldIssue>,
}
