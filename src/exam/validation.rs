//! Business rules for a normalized submission.

use std::collections::{HashMap, HashSet};

use crate::{
    exam::{FieldIssue, SubmissionError},
    models::{
        question::QuestionType,
        submission::{AnswerSelection, NormalizedSubmission},
    },
};

/// A submission that passed every rule.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSubmission {
    pub attempt_id: Option<i64>,
    pub answers: Vec<AnswerSelection>,
    /// Answered question ids with no known type. Arity checks were skipped for
    /// these; scoring never credits them.
    pub unknown_question_ids: Vec<i64>,
}

impl ValidatedSubmission {
    pub fn selections_by_question(&self) -> HashMap<i64, &[i64]> {
        self.answers
            .iter()
            .map(|a| (a.question_id, a.selected_option_ids.as_slice()))
            .collect()
    }
}

/// Checks `submission` against `question_types` and collects every issue found.
pub fn validate_submission(
    submission: NormalizedSubmission,
    question_types: &HashMap<i64, QuestionType>,
) -> Result<ValidatedSubmission, SubmissionError> {
    let mut issues: Vec<FieldIssue> = submission.shape_issues;
    issues.extend(
        submission
            .unknown_fields
            .iter()
            .map(|field| FieldIssue::new(field.clone(), "Extra inputs are not permitted.")),
    );

    let mut seen_questions = HashSet::new();
    let mut unknown_question_ids = Vec::new();

    for (index, answer) in submission.answers.iter().enumerate() {
        let path = format!("answers[{}]", index);

        if !seen_questions.insert(answer.question_id) {
            issues.push(FieldIssue::new(
                format!("{}.question_id", path),
                "Duplicate answers for the same question are not allowed.",
            ));
        }

        let selections_path = format!("{}.selected_option_ids", path);
        let selected = &answer.selected_option_ids;

        if selected.is_empty() {
            issues.push(FieldIssue::new(
                &selections_path,
                "At least one option must be selected.",
            ));
        }

        let distinct: HashSet<&i64> = selected.iter().collect();
        if distinct.len() != selected.len() {
            issues.push(FieldIssue::new(
                &selections_path,
                "Duplicate option ids are not allowed.",
            ));
        }

        match question_types.get(&answer.question_id) {
            Some(QuestionType::Single) if !selected.is_empty() && selected.len() != 1 => {
                issues.push(FieldIssue::new(
                    &selections_path,
                    format!("Question {} accepts a single answer.", answer.question_id),
                ));
            }
            // An empty multi selection is already reported above.
            Some(QuestionType::Single) | Some(QuestionType::Multi) => {}
            None => {
                tracing::debug!(
                    question_id = answer.question_id,
                    "Answered question has no known type; skipping arity checks"
                );
                unknown_question_ids.push(answer.question_id);
            }
        }
    }

    if !issues.is_empty() {
        return Err(SubmissionError::Validation(issues));
    }

    Ok(ValidatedSubmission {
        attempt_id: submission.attempt_id,
        answers: submission.answers,
        unknown_question_ids,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(question_id: i64, ids: &[i64]) -> AnswerSelection {
        AnswerSelection {
            question_id,
            selected_option_ids: ids.to_vec(),
        }
    }

    fn submission(answers: Vec<AnswerSelection>) -> NormalizedSubmission {
        NormalizedSubmission {
            attempt_id: Some(1),
            answers,
            unknown_fields: Vec::new(),
            shape_issues: Vec::new(),
        }
    }

    fn types() -> HashMap<i64, QuestionType> {
        HashMap::from([(1, QuestionType::Single), (2, QuestionType::Multi)])
    }

    fn issues_of(result: Result<ValidatedSubmission, SubmissionError>) -> Vec<FieldIssue> {
        match result {
            Err(SubmissionError::Validation(issues)) => issues,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_submission_passes() {
        let validated =
            validate_submission(submission(vec![answer(1, &[2]), answer(2, &[3, 4])]), &types())
                .unwrap();
        assert_eq!(validated.answers.len(), 2);
        assert!(validated.unknown_question_ids.is_empty());
        assert_eq!(validated.selections_by_question()[&2], &[3, 4]);
    }

    #[test]
    fn test_duplicate_question_rejected() {
        let issues = issues_of(validate_submission(
            submission(vec![answer(1, &[2]), answer(1, &[3])]),
            &types(),
        ));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "answers[1].question_id");
        assert!(issues[0].message.contains("Duplicate answers for the same question"));
    }

    #[test]
    fn test_empty_and_duplicate_selections_rejected() {
        let issues = issues_of(validate_submission(
            submission(vec![answer(2, &[]), answer(3, &[5, 5])]),
            &types(),
        ));
        let messages: Vec<&str> = issues.iter().map(|i| i.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "At least one option must be selected.",
                "Duplicate option ids are not allowed."
            ]
        );
    }

    #[test]
    fn test_single_question_arity() {
        let issues = issues_of(validate_submission(submission(vec![answer(1, &[2, 3])]), &types()));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].message, "Question 1 accepts a single answer.");
    }

    #[test]
    fn test_unknown_question_skips_arity() {
        let validated =
            validate_submission(submission(vec![answer(99, &[1, 2, 3])]), &types()).unwrap();
        assert_eq!(validated.unknown_question_ids, vec![99]);
    }

    #[test]
    fn test_unknown_top_level_fields_rejected() {
        let mut normalized = submission(vec![answer(1, &[2])]);
        normalized.unknown_fields = vec!["question_type_map".to_string()];

        let issues = issues_of(validate_submission(normalized, &types()));
        assert_eq!(issues[0].field, "question_type_map");
    }

    #[test]
    fn test_shape_issues_reported_with_rule_violations() {
        let mut normalized = submission(vec![answer(1, &[2, 3])]);
        normalized.shape_issues = vec![FieldIssue::new("answers[1]", "Each answer must be an object.")];

        let issues = issues_of(validate_submission(normalized, &types()));
        let fields: Vec<&str> = issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(fields, vec!["answers[1]", "answers[0].selected_option_ids"]);
    }
}
