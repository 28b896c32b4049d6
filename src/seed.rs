// src/seed.rs

use std::{collections::{HashMap, HashSet}, path::Path};

use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use validator::Validate;

use crate::{
    error::AppError,
    models::question::{QuestionSpec, QuestionType},
    store,
};

/// Counts of what a seeding run changed.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub questions_inserted: u32,
    pub questions_updated: u32,
    pub options_inserted: u32,
    pub options_updated: u32,
    pub options_removed: u32,
}

/// Parses and validates a JSON question bank (an array of question objects).
pub fn parse_specs(raw: &str) -> Result<Vec<QuestionSpec>, AppError> {
    let specs: Vec<QuestionSpec> = serde_json::from_str(raw).map_err(|e| {
        AppError::BadRequest(format!("Seed file must be a JSON array of question objects: {}", e))
    })?;

    for (index, spec) in specs.iter().enumerate() {
        spec.validate().map_err(|e| {
            AppError::BadRequest(format!("Invalid question at index {}: {}", index, e))
        })?;
    }

    Ok(specs)
}

pub async fn seed_from_file(pool: &SqlitePool, path: impl AsRef<Path>) -> Result<SeedReport, AppError> {
    let path = path.as_ref();
    let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
        AppError::BadRequest(format!("Questions seed file not found: {} ({})", path.display(), e))
    })?;

    let specs = parse_specs(&raw)?;

    let mut tx = pool.begin().await?;
    let report = seed_questions(&mut tx, &specs).await?;
    tx.commit().await?;

    tracing::info!(
        questions_inserted = report.questions_inserted,
        questions_updated = report.questions_updated,
        options_inserted = report.options_inserted,
        options_updated = report.options_updated,
        options_removed = report.options_removed,
        "Seeding completed"
    );

    Ok(report)
}

/// Upserts questions by text and syncs their options by text.
pub async fn seed_questions(
    conn: &mut SqliteConnection,
    specs: &[QuestionSpec],
) -> Result<SeedReport, AppError> {
    let mut report = SeedReport::default();

    for spec in specs {
        let text = spec.text.trim();
        let question_type: QuestionType = spec
            .question_type
            .parse()
            .map_err(AppError::BadRequest)?;

        let existing: Option<(i64, String)> =
            sqlx::query_as("SELECT id, type FROM questions WHERE text = ?")
                .bind(text)
                .fetch_optional(&mut *conn)
                .await?;

        match existing {
            None => {
                let question_id: i64 =
                    sqlx::query_scalar("INSERT INTO questions (text, type) VALUES (?, ?) RETURNING id")
                        .bind(text)
                        .bind(question_type.as_str())
                        .fetch_one(&mut *conn)
                        .await?;

                for option in &spec.options {
                    insert_option(conn, question_id, option.text.trim(), option.is_correct).await?;
                }

                report.questions_inserted += 1;
                report.options_inserted += spec.options.len() as u32;
            }
            Some((question_id, stored_type)) => {
                let mut changed = false;

                if stored_type != question_type.as_str() {
                    sqlx::query("UPDATE questions SET type = ? WHERE id = ?")
                        .bind(question_type.as_str())
                        .bind(question_id)
                        .execute(&mut *conn)
                        .await?;
                    changed = true;
                }

                changed |= sync_options(conn, question_id, spec, &mut report).await?;

                if changed {
                    report.questions_updated += 1;
                }
            }
        }
    }

    Ok(report)
}

/// Returns whether any option changed.
async fn sync_options(
    conn: &mut SqliteConnection,
    question_id: i64,
    spec: &QuestionSpec,
    report: &mut SeedReport,
) -> Result<bool, AppError> {
    let existing: Vec<(i64, String, bool)> =
        sqlx::query_as("SELECT id, text, is_correct FROM options WHERE question_id = ?")
            .bind(question_id)
            .fetch_all(&mut *conn)
            .await?;

    let existing_by_text: HashMap<String, (i64, bool)> = existing
        .into_iter()
        .map(|(id, text, is_correct)| (text.trim().to_string(), (id, is_correct)))
        .collect();

    let mut seen = HashSet::new();
    let mut changed = false;

    for option in &spec.options {
        let text = option.text.trim();
        seen.insert(text.to_string());

        match existing_by_text.get(text) {
            None => {
                insert_option(conn, question_id, text, option.is_correct).await?;
                report.options_inserted += 1;
                changed = true;
            }
            Some(&(option_id, is_correct)) if is_correct != option.is_correct => {
                sqlx::query("UPDATE options SET is_correct = ? WHERE id = ?")
                    .bind(option.is_correct)
                    .bind(option_id)
                    .execute(&mut *conn)
                    .await?;
                report.options_updated += 1;
                changed = true;
            }
            Some(_) => {}
        }
    }

    for (text, (option_id, _)) in &existing_by_text {
        if !seen.contains(text) {
            sqlx::query("DELETE FROM options WHERE id = ?")
                .bind(*option_id)
                .execute(&mut *conn)
                .await?;
            report.options_removed += 1;
            changed = true;
        }
    }

    Ok(changed)
}

async fn insert_option(
    conn: &mut SqliteConnection,
    question_id: i64,
    text: &str,
    is_correct: bool,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO options (question_id, text, is_correct) VALUES (?, ?, ?)")
        .bind(question_id)
        .bind(text)
        .bind(is_correct)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Number of questions currently stored; used by the seed binary's summary line.
pub async fn question_count(pool: &SqlitePool) -> Result<i64, AppError> {
    let mut conn = pool.acquire().await?;
    Ok(store::questions::count(&mut conn).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_specs() {
        let specs = parse_specs(
            r#"[{"text": "Capital of France", "type": "Single",
                 "options": [{"text": "Paris", "is_correct": true}, {"text": "Berlin"}]}]"#,
        )
        .unwrap();
        assert_eq!(specs.len(), 1);
        assert!(!specs[0].options[1].is_correct);
    }

    #[test]
    fn test_parse_specs_rejects_bad_input() {
        assert!(parse_specs(r#"{"text": "not an array"}"#).is_err());
        assert!(parse_specs(r#"[{"text": "No options", "type": "single", "options": []}]"#).is_err());
        assert!(parse_specs(r#"[{"text": "", "type": "single", "options": [{"text": "A"}]}]"#).is_err());
    }
}
