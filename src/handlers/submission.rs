// src/handlers/submission.rs

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, header},
    response::{IntoResponse, Redirect},
};
use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{
    config::Config,
    error::AppError,
    exam::{
        normalizer::{self, BodyKind},
        scoring::{PassThreshold, grade_exam},
        validation::validate_submission,
    },
    store,
};

#[derive(Debug, Deserialize)]
pub struct SubmitParams {
    /// Optional override of the configured pass threshold, as a fraction.
    pub pass_threshold: Option<String>,
}

/// Scores a submission and stores it as the attempt's only set of responses.
///
/// * Accepts a JSON body or form fields (`answer_<id>` / `q_<id>`).
/// * Checks run in order: attempt id (400), attempt lookup (404), answers (422).
/// * Grades against the current questions, then replaces the attempt's
///   responses and summary in one write transaction (409 if another
///   submission got there first).
/// * Redirects (303) to the result view.
pub async fn submit_exam(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Query(params): Query<SubmitParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());

    let submission = normalizer::normalize(BodyKind::from_content_type(content_type), &body)?;

    let attempt_id = submission
        .attempt_id
        .ok_or(AppError::BadRequest("Attempt identifier missing.".to_string()))?;

    let mut conn = pool.acquire().await?;

    let attempt = store::attempts::find(&mut conn, attempt_id)
        .await?
        .ok_or(AppError::NotFound("Attempt not found.".to_string()))?;

    let questions = store::questions::fetch_all(&mut conn).await.map_err(|e| {
        tracing::error!("Failed to load questions for scoring: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;
    drop(conn);

    let question_types = store::questions::type_map(&questions);

    let validated = validate_submission(submission, &question_types)?;
    if !validated.unknown_question_ids.is_empty() {
        tracing::debug!(
            attempt_id,
            unknown = ?validated.unknown_question_ids,
            "Submission answers questions outside the exam"
        );
    }

    let threshold = PassThreshold::from_query(
        params.pass_threshold.as_deref(),
        PassThreshold::new(config.pass_threshold),
    );
    let grade = grade_exam(&questions, &validated.selections_by_question(), threshold);

    let saved = store::attempts::save_submission(&pool, &attempt, &grade, Utc::now()).await?;
    if !saved {
        tracing::warn!(attempt_id, "Attempt modified concurrently; submission rejected");
        return Err(AppError::Conflict(
            "Attempt was modified by another submission. Please retry.".to_string(),
        ));
    }

    tracing::info!(
        attempt_id,
        score = grade.total_score,
        max_score = grade.max_score,
        passed = grade.passed,
        threshold = threshold.fraction(),
        "Exam submitted"
    );

    Ok(Redirect::to(&format!("/exam/result/{}", attempt.id)))
}
