// src/store/attempts.rs

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool, types::Json};

use crate::{exam::scoring::ExamGrade, models::attempt::{ExamAttempt, ResponseRecord}};

const ATTEMPT_COLUMNS: &str =
    "id, started_at, completed_at, total_score, max_score, passed, version";

/// Creates an attempt in the `Started` state.
pub async fn create(
    conn: &mut SqliteConnection,
    max_score: f64,
) -> Result<ExamAttempt, sqlx::Error> {
    let sql = format!(
        "INSERT INTO exam_attempts (started_at, max_score) VALUES (?, ?) RETURNING {}",
        ATTEMPT_COLUMNS
    );

    sqlx::query_as::<_, ExamAttempt>(&sql)
        .bind(Utc::now())
        .bind(max_score)
        .fetch_one(&mut *conn)
        .await
}

pub async fn find(
    conn: &mut SqliteConnection,
    attempt_id: i64,
) -> Result<Option<ExamAttempt>, sqlx::Error> {
    let sql = format!("SELECT {} FROM exam_attempts WHERE id = ?", ATTEMPT_COLUMNS);

    sqlx::query_as::<_, ExamAttempt>(&sql)
        .bind(attempt_id)
        .fetch_optional(&mut *conn)
        .await
}

pub async fn fetch_responses(
    conn: &mut SqliteConnection,
    attempt_id: i64,
) -> Result<Vec<ResponseRecord>, sqlx::Error> {
    sqlx::query_as::<_, ResponseRecord>(
        r#"
        SELECT id, attempt_id, question_id, selected_option_ids, correct_option_ids, score
        FROM responses
        WHERE attempt_id = ?
        ORDER BY question_id ASC
        "#,
    )
    .bind(attempt_id)
    .fetch_all(&mut *conn)
    .await
}

/// Replaces every response of the attempt with one row per graded question.
pub async fn replace_responses(
    conn: &mut SqliteConnection,
    attempt_id: i64,
    grade: &ExamGrade,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM responses WHERE attempt_id = ?")
        .bind(attempt_id)
        .execute(&mut *conn)
        .await?;

    for result in &grade.breakdown {
        sqlx::query(
            r#"
            INSERT INTO responses (attempt_id, question_id, selected_option_ids, correct_option_ids, score)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(attempt_id)
        .bind(result.question_id)
        .bind(Json(&result.selected_option_ids))
        .bind(Json(&result.correct_option_ids))
        .bind(result.score)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Writes the summary fields and bumps the version.
/// Returns `false` when the attempt changed since `attempt` was read.
pub async fn complete(
    conn: &mut SqliteConnection,
    attempt: &ExamAttempt,
    grade: &ExamGrade,
    completed_at: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE exam_attempts
        SET completed_at = ?, total_score = ?, max_score = ?, passed = ?, version = version + 1
        WHERE id = ? AND version = ?
        "#,
    )
    .bind(completed_at)
    .bind(grade.total_score)
    .bind(grade.max_score)
    .bind(grade.passed)
    .bind(attempt.id)
    .bind(attempt.version)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Stores a graded submission for `attempt` in one write transaction.
///
/// Runs under `BEGIN IMMEDIATE`: the version check and the writes hold SQLite's
/// write lock together. Returns `false` (and writes nothing) when another
/// submission completed the attempt after `attempt` was read.
pub async fn save_submission(
    pool: &SqlitePool,
    attempt: &ExamAttempt,
    grade: &ExamGrade,
    completed_at: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin_with("BEGIN IMMEDIATE").await?;

    if !complete(&mut tx, attempt, grade, completed_at).await? {
        tx.rollback().await?;
        return Ok(false);
    }

    replace_responses(&mut tx, attempt.id, grade).await?;
    tx.commit().await?;

    Ok(true)
}
