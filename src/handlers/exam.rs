// src/handlers/exam.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    exam::scoring::percentage,
    models::{
        attempt::{QuestionPage, QuestionResult, ResultResponse, StartExamResponse},
        question::PublicQuestion,
    },
    store,
};

/// Query parameters for listing questions.
#[derive(Debug, Deserialize, Validate)]
pub struct ListParams {
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: Option<i64>,
    #[validate(range(min = 1, max = 50, message = "per_page must be between 1 and 50"))]
    pub per_page: Option<i64>,
}

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Lists exam questions one page at a time, without correctness data.
pub async fn list_questions(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    params
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let page = params.page.unwrap_or(1);
    let per_page = params.per_page.unwrap_or(config.page_size);

    let mut conn = pool.acquire().await?;
    let total = store::questions::count(&mut conn).await?;
    let questions = store::questions::fetch_page(&mut conn, per_page, (page - 1) * per_page)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch question page: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    Ok(Json(QuestionPage {
        questions: questions.into_iter().map(PublicQuestion::from).collect(),
        page,
        per_page,
        total,
        total_pages: ((total + per_page - 1) / per_page).max(1),
    }))
}

/// Starts a new attempt.
///
/// * The attempt's max score is the current number of questions.
/// * Returns 201 with the attempt id and the full question list (no correctness flags).
pub async fn start_exam(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let mut conn = pool.acquire().await?;

    let question_count = store::questions::count(&mut conn).await?;
    let attempt = store::attempts::create(&mut conn, question_count as f64)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create attempt: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;
    let questions = store::questions::fetch_all(&mut conn).await?;

    tracing::info!(attempt_id = attempt.id, question_count, "Exam attempt started");

    Ok((
        StatusCode::CREATED,
        Json(StartExamResponse {
            attempt_id: attempt.id,
            max_score: attempt.max_score.unwrap_or(question_count as f64),
            questions: questions.into_iter().map(PublicQuestion::from).collect(),
        }),
    ))
}

/// Shows the scored breakdown of an attempt.
///
/// Everything reported is what was stored at submission time, so later edits
/// to the question bank do not change a finished attempt's result.
pub async fn view_result(
    State(pool): State<SqlitePool>,
    Path(attempt_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = pool.acquire().await?;

    let attempt = store::attempts::find(&mut conn, attempt_id)
        .await?
        .ok_or(AppError::NotFound("Attempt not found.".to_string()))?;

    let breakdown: Vec<QuestionResult> = store::attempts::fetch_responses(&mut conn, attempt.id)
        .await?
        .into_iter()
        .map(QuestionResult::from)
        .collect();

    let score = attempt
        .total_score
        .unwrap_or_else(|| breakdown.iter().map(|r| r.score).sum());
    let max_score = attempt
        .max_score
        .filter(|m| *m > 0.0)
        .unwrap_or(breakdown.len() as f64);

    Ok(Json(ResultResponse {
        attempt_id: attempt.id,
        status: attempt.status(),
        score,
        max_score,
        percentage: percentage(score, max_score),
        passed: attempt.passed,
        started_at: attempt.started_at,
        completed_at: attempt.completed_at,
        breakdown,
    }))
}
