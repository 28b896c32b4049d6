// src/models/attempt.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, types::Json};

use crate::models::question::PublicQuestion;

/// Represents the 'exam_attempts' table in the database.
#[derive(Debug, Clone, FromRow)]
pub struct ExamAttempt {
    pub id: i64,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub total_score: Option<f64>,
    pub max_score: Option<f64>,
    pub passed: bool,

    /// Bumped on every submission; used as an optimistic lock.
    pub version: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptStatus {
    Started,
    Completed,
}

impl ExamAttempt {
    pub fn status(&self) -> AttemptStatus {
        if self.completed_at.is_some() {
            AttemptStatus::Completed
        } else {
            AttemptStatus::Started
        }
    }
}

/// Represents the 'responses' table: one row per (attempt, question) after submission.
///
/// The correct ids and score are those in force when the attempt was graded.
#[derive(Debug, Clone, FromRow)]
pub struct ResponseRecord {
    pub id: i64,
    pub attempt_id: i64,
    pub question_id: i64,
    pub selected_option_ids: Json<Vec<i64>>,
    pub correct_option_ids: Json<Vec<i64>>,
    pub score: f64,
}

impl From<ResponseRecord> for QuestionResult {
    fn from(record: ResponseRecord) -> Self {
        QuestionResult {
            question_id: record.question_id,
            selected_option_ids: record.selected_option_ids.0,
            correct_option_ids: record.correct_option_ids.0,
            correct: record.score > 0.0,
            score: record.score,
        }
    }
}

/// DTO returned when an exam is started.
#[derive(Debug, Serialize)]
pub struct StartExamResponse {
    pub attempt_id: i64,
    pub max_score: f64,
    pub questions: Vec<PublicQuestion>,
}

/// DTO for one page of the question listing.
#[derive(Debug, Serialize)]
pub struct QuestionPage {
    pub questions: Vec<PublicQuestion>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
}

/// Per-question line of a result breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionResult {
    pub question_id: i64,
    pub selected_option_ids: Vec<i64>,
    pub correct_option_ids: Vec<i64>,
    pub correct: bool,
    pub score: f64,
}

/// DTO for the result view of an attempt.
#[derive(Debug, Serialize)]
pub struct ResultResponse {
    pub attempt_id: i64,
    pub status: AttemptStatus,
    pub score: f64,
    pub max_score: f64,
    pub percentage: f64,
    pub passed: bool,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub breakdown: Vec<QuestionResult>,
}
