// src/models/question.rs

use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

/// The two supported question kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    /// Exactly one option is expected.
    Single,
    /// A set of options, scored all-or-nothing.
    Multi,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Single => "single",
            QuestionType::Multi => "multi",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(QuestionType::Single),
            "multi" => Ok(QuestionType::Multi),
            other => Err(format!("Unsupported question type: {}", other)),
        }
    }
}

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow)]
pub struct Question {
    pub id: i64,

    /// The text content of the question.
    pub text: String,

    /// Question type: 'single' or 'multi'.
    /// Mapped from the database column 'type' since `type` is a reserved keyword in Rust.
    #[sqlx(rename = "type")]
    pub question_type: String,

    /// Options owned by this question, ordered by id.
    /// Loaded with a second query.
    #[sqlx(skip)]
    pub options: Vec<QuestionOption>,
}

impl Question {
    /// `None` when the stored type is not one we know how to score.
    pub fn kind(&self) -> Option<QuestionType> {
        self.question_type.parse().ok()
    }

    pub fn correct_option_ids(&self) -> BTreeSet<i64> {
        self.options
            .iter()
            .filter(|o| o.is_correct)
            .map(|o| o.id)
            .collect()
    }
}

/// Represents the 'options' table in the database.
#[derive(Debug, Clone, FromRow)]
pub struct QuestionOption {
    pub id: i64,
    pub question_id: i64,
    pub text: String,
    pub is_correct: bool,
}

/// DTO for sending a question to an exam taker (excludes correctness flags).
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: String,
    pub options: Vec<PublicOption>,
}

#[derive(Debug, Serialize)]
pub struct PublicOption {
    pub id: i64,
    pub text: String,
}

impl From<Question> for PublicQuestion {
    fn from(q: Question) -> Self {
        PublicQuestion {
            id: q.id,
            text: q.text,
            question_type: q.question_type,
            options: q
                .options
                .into_iter()
                .map(|o| PublicOption { id: o.id, text: o.text })
                .collect(),
        }
    }
}

/// One entry of the JSON question bank consumed by the seeder.
#[derive(Debug, Deserialize, Validate)]
pub struct QuestionSpec {
    #[validate(length(min = 1, max = 500))]
    pub text: String,
    #[serde(rename = "type")]
    #[validate(custom(function = validate_question_type))]
    pub question_type: String,
    #[validate(custom(function = validate_options))]
    pub options: Vec<OptionSpec>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OptionSpec {
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

fn validate_question_type(question_type: &str) -> Result<(), validator::ValidationError> {
    if question_type.parse::<QuestionType>().is_err() {
        return Err(validator::ValidationError::new("unsupported_question_type"));
    }
    Ok(())
}

fn validate_options(options: &[OptionSpec]) -> Result<(), validator::ValidationError> {
    if options.is_empty() {
        return Err(validator::ValidationError::new("options_cannot_be_empty"));
    }
    for opt in options {
        let text = opt.text.trim();
        if text.is_empty() {
            return Err(validator::ValidationError::new("option_text_missing"));
        }
        if text.len() > 500 {
            return Err(validator::ValidationError::new("option_too_long"));
        }
    }
    Ok(())
}
