// src/handlers/admin.rs

use axum::{Json, extract::State, response::IntoResponse};
use sqlx::SqlitePool;

use crate::{config::Config, error::AppError, seed};

/// Reloads the question bank from the configured seed file.
/// Admin only.
pub async fn run_seed(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
) -> Result<impl IntoResponse, AppError> {
    let report = seed::seed_from_file(&pool, &config.seed_file).await?;

    Ok(Json(serde_json::json!({
        "status": "ok",
        "message": "Seeding completed.",
        "report": report,
    })))
}
