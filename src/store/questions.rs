// src/store/questions.rs

use std::collections::HashMap;

use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::models::question::{Question, QuestionOption, QuestionType};

pub async fn count(conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM questions")
        .fetch_one(&mut *conn)
        .await
}

/// All questions ordered by id, options included.
pub async fn fetch_all(conn: &mut SqliteConnection) -> Result<Vec<Question>, sqlx::Error> {
    let mut questions = sqlx::query_as::<_, Question>(
        "SELECT id, text, type FROM questions ORDER BY id ASC",
    )
    .fetch_all(&mut *conn)
    .await?;

    attach_options(conn, &mut questions).await?;
    Ok(questions)
}

pub async fn fetch_page(
    conn: &mut SqliteConnection,
    limit: i64,
    offset: i64,
) -> Result<Vec<Question>, sqlx::Error> {
    let mut questions = sqlx::query_as::<_, Question>(
        "SELECT id, text, type FROM questions ORDER BY id ASC LIMIT ? OFFSET ?",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(&mut *conn)
    .await?;

    attach_options(conn, &mut questions).await?;
    Ok(questions)
}

/// Map of question id to its type, for the submission validator.
/// Questions whose stored type is not recognised are left out.
pub fn type_map(questions: &[Question]) -> HashMap<i64, QuestionType> {
    questions
        .iter()
        .filter_map(|q| match q.kind() {
            Some(kind) => Some((q.id, kind)),
            None => {
                tracing::warn!(question_id = q.id, question_type = %q.question_type, "Unknown question type");
                None
            }
        })
        .collect()
}

/// Loads the options of `questions` in one query and attaches them, ordered by id.
async fn attach_options(
    conn: &mut SqliteConnection,
    questions: &mut [Question],
) -> Result<(), sqlx::Error> {
    if questions.is_empty() {
        return Ok(());
    }

    let mut query_builder = QueryBuilder::<Sqlite>::new(
        "SELECT id, question_id, text, is_correct FROM options WHERE question_id IN (",
    );
    let mut separated = query_builder.separated(",");
    for q in questions.iter() {
        separated.push_bind(q.id);
    }
    separated.push_unseparated(") ORDER BY id ASC");

    let options: Vec<QuestionOption> = query_builder
        .build_query_as()
        .fetch_all(&mut *conn)
        .await?;

    let mut by_question: HashMap<i64, Vec<QuestionOption>> = HashMap::new();
    for option in options {
        by_question.entry(option.question_id).or_default().push(option);
    }

    for q in questions.iter_mut() {
        q.options = by_question.remove(&q.id).unwrap_or_default();
    }

    Ok(())
}
