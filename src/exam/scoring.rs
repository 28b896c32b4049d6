//! All-or-nothing scoring of single and multi choice questions.

use std::collections::{BTreeSet, HashMap};

use crate::{
    config::DEFAULT_PASS_THRESHOLD,
    models::{
        attempt::QuestionResult,
        question::{Question, QuestionType},
    },
};

/// Fraction of the max score needed to pass, always within [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassThreshold(f64);

impl PassThreshold {
    /// Clamps `fraction` into [0, 1]. NaN falls back to the default.
    pub fn new(fraction: f64) -> Self {
        if fraction.is_nan() {
            return Self::default();
        }
        Self(fraction.clamp(0.0, 1.0))
    }

    /// Parses a caller-supplied override such as `?pass_threshold=0.8`.
    pub fn from_query(raw: Option<&str>, fallback: PassThreshold) -> Self {
        match raw.map(|r| r.trim().parse::<f64>()) {
            Some(Ok(value)) if !value.is_nan() => Self::new(value),
            _ => fallback,
        }
    }

    pub fn fraction(&self) -> f64 {
        self.0
    }

    pub fn is_passing(&self, score: f64, max_score: f64) -> bool {
        score >= self.0 * max_score
    }
}

impl Default for PassThreshold {
    fn default() -> Self {
        Self(DEFAULT_PASS_THRESHOLD)
    }
}

/// Aggregate outcome of grading a whole exam.
#[derive(Debug, Clone, PartialEq)]
pub struct ExamGrade {
    pub total_score: f64,
    pub max_score: f64,
    pub passed: bool,
    pub breakdown: Vec<QuestionResult>,
}

/// 1.0 for a fully correct answer, 0.0 otherwise. Unknown question types never score.
pub fn score_question(question: &Question, selected: &[i64]) -> f64 {
    let correct = question.correct_option_ids();
    let selected: BTreeSet<i64> = selected.iter().copied().collect();

    let is_correct = match question.kind() {
        Some(QuestionType::Single) => {
            selected.len() == 1 && selected.iter().all(|id| correct.contains(id))
        }
        Some(QuestionType::Multi) => selected == correct,
        None => false,
    };

    if is_correct { 1.0 } else { 0.0 }
}

pub fn grade_question(question: &Question, selected: &[i64]) -> QuestionResult {
    let score = score_question(question, selected);
    QuestionResult {
        question_id: question.id,
        selected_option_ids: selected.to_vec(),
        correct_option_ids: question.correct_option_ids().into_iter().collect(),
        correct: score > 0.0,
        score,
    }
}

/// Grades every question of the exam; unanswered questions count as empty selections.
/// The max score is the number of questions, however many were answered.
pub fn grade_exam(
    questions: &[Question],
    selections: &HashMap<i64, &[i64]>,
    threshold: PassThreshold,
) -> ExamGrade {
    let breakdown: Vec<QuestionResult> = questions
        .iter()
        .map(|q| grade_question(q, selections.get(&q.id).copied().unwrap_or(&[])))
        .collect();

    let total_score = breakdown.iter().map(|r| r.score).sum();
    let max_score = questions.len() as f64;

    ExamGrade {
        total_score,
        max_score,
        passed: threshold.is_passing(total_score, max_score),
        breakdown,
    }
}

/// Score as a percentage of `max_score`, rounded to one decimal.
pub fn percentage(score: f64, max_score: f64) -> f64 {
    if max_score <= 0.0 {
        return 0.0;
    }
    (score / max_score * 1000.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::QuestionOption;

    fn question(id: i64, question_type: &str, options: &[(i64, bool)]) -> Question {
        Question {
            id,
            text: format!("Question {}", id),
            question_type: question_type.to_string(),
            options: options
                .iter()
                .map(|&(option_id, is_correct)| QuestionOption {
                    id: option_id,
                    question_id: id,
                    text: format!("Option {}", option_id),
                    is_correct,
                })
                .collect(),
        }
    }

    fn capital_of_france() -> Question {
        // 1 = Berlin, 2 = Paris
        question(1, "single", &[(1, false), (2, true)])
    }

    fn primes() -> Question {
        // 3 = "2", 4 = "3", 5 = "4"
        question(2, "multi", &[(3, true), (4, true), (5, false)])
    }

    #[test]
    fn test_single_choice_scoring() {
        let q = capital_of_france();
        assert_eq!(score_question(&q, &[2]), 1.0);
        assert_eq!(score_question(&q, &[1]), 0.0);
        assert_eq!(score_question(&q, &[]), 0.0);
        assert_eq!(score_question(&q, &[1, 2]), 0.0);
    }

    #[test]
    fn test_multi_choice_requires_exact_match() {
        let q = primes();
        assert_eq!(score_question(&q, &[4, 3]), 1.0);
        assert_eq!(score_question(&q, &[3]), 0.0);
        assert_eq!(score_question(&q, &[3, 4, 5]), 0.0);
        assert_eq!(score_question(&q, &[5]), 0.0);
        assert_eq!(score_question(&q, &[]), 0.0);
    }

    #[test]
    fn test_unknown_type_never_scores() {
        let q = question(9, "essay", &[(1, true)]);
        assert_eq!(score_question(&q, &[1]), 0.0);
    }

    #[test]
    fn test_grade_exam_all_correct() {
        let questions = vec![capital_of_france(), primes()];
        let selections = HashMap::from([(1, &[2][..]), (2, &[3, 4][..])]);

        let grade = grade_exam(&questions, &selections, PassThreshold::default());
        assert_eq!(grade.total_score, 2.0);
        assert_eq!(grade.max_score, 2.0);
        assert!(grade.passed);
        assert!(grade.breakdown.iter().all(|r| r.correct));
        assert_eq!(grade.breakdown[1].correct_option_ids, vec![3, 4]);
    }

    #[test]
    fn test_grade_exam_partial_multi_and_unanswered_single() {
        let questions = vec![capital_of_france(), primes()];
        let selections = HashMap::from([(2, &[3][..])]);

        let grade = grade_exam(&questions, &selections, PassThreshold::default());
        assert_eq!(grade.total_score, 0.0);
        assert_eq!(grade.max_score, 2.0);
        assert!(!grade.passed);
        assert_eq!(grade.breakdown[0].selected_option_ids, Vec::<i64>::new());
    }

    #[test]
    fn test_max_score_ignores_answer_count() {
        let questions = vec![capital_of_france(), primes(), question(3, "single", &[(6, true)])];
        let grade = grade_exam(&questions, &HashMap::new(), PassThreshold::default());
        assert_eq!(grade.max_score, 3.0);
    }

    #[test]
    fn test_threshold_clamping_and_parsing() {
        assert_eq!(PassThreshold::new(1.5).fraction(), 1.0);
        assert_eq!(PassThreshold::new(-0.2).fraction(), 0.0);
        assert_eq!(PassThreshold::new(f64::NAN), PassThreshold::default());

        let fallback = PassThreshold::new(0.6);
        assert_eq!(PassThreshold::from_query(Some("0.5"), fallback).fraction(), 0.5);
        assert_eq!(PassThreshold::from_query(Some("7"), fallback).fraction(), 1.0);
        assert_eq!(PassThreshold::from_query(Some("abc"), fallback), fallback);
        assert_eq!(PassThreshold::from_query(None, fallback), fallback);
    }

    #[test]
    fn test_pass_boundary() {
        let threshold = PassThreshold::new(0.6);
        assert!(threshold.is_passing(3.0, 5.0));
        assert!(!threshold.is_passing(2.0, 5.0));
        // An exam without questions passes with 0 / 0.
        assert!(threshold.is_passing(0.0, 0.0));
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(2.0, 2.0), 100.0);
        assert_eq!(percentage(1.0, 3.0), 33.3);
        assert_eq!(percentage(0.0, 0.0), 0.0);
    }
}
