//! Turns a JSON or form-encoded submission body into a `NormalizedSubmission`.
//!
//! Form keys `answer_<id>` and `q_<id>` (optionally suffixed with `[]`) both
//! carry selections. Keys with a non-numeric id are skipped.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::{
    exam::{FieldIssue, SubmissionError},
    models::submission::{AnswerSelection, NormalizedSubmission},
};

static ANSWER_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:answer|q)_(.*?)(?:\[\])?$").expect("answer key pattern is valid")
});

const ATTEMPT_KEY: &str = "attempt_id";
const ANSWERS_KEY: &str = "answers";

// `i64::MAX as f64` rounds up to 2^63, so the upper bound is exclusive.
const I64_FLOAT_MIN: f64 = i64::MIN as f64;
const I64_FLOAT_MAX: f64 = i64::MAX as f64;

/// Which decoder a request body needs, based on its `Content-Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Json,
    Form,
}

impl BodyKind {
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        match content_type {
            Some(ct) if ct.to_ascii_lowercase().contains("application/json") => BodyKind::Json,
            _ => BodyKind::Form,
        }
    }
}

pub fn normalize(kind: BodyKind, body: &[u8]) -> Result<NormalizedSubmission, SubmissionError> {
    match kind {
        BodyKind::Json => normalize_json(body),
        BodyKind::Form => {
            let pairs: Vec<(String, String)> = url::form_urlencoded::parse(body)
                .into_owned()
                .collect();
            normalize_form(&pairs)
        }
    }
}

pub fn normalize_json(body: &[u8]) -> Result<NormalizedSubmission, SubmissionError> {
    let value: Value = serde_json::from_slice(body).map_err(|e| {
        SubmissionError::MalformedPayload(format!("Request body is not valid JSON: {}", e))
    })?;

    match value {
        Value::Object(map) => normalize_object(map),
        _ => Err(SubmissionError::MalformedPayload(
            "JSON payload must be an object.".to_string(),
        )),
    }
}

fn normalize_object(mut map: Map<String, Value>) -> Result<NormalizedSubmission, SubmissionError> {
    let attempt_id = match map.remove(ATTEMPT_KEY) {
        Some(value) => coerce_attempt_id(&value)?,
        None => None,
    };

    let mut issues = Vec::new();
    let mut answers = Vec::new();

    match map.remove(ANSWERS_KEY) {
        None => {}
        Some(Value::Array(items)) => {
            for (index, item) in items.iter().enumerate() {
                if let Some(answer) = normalize_answer(index, item, &mut issues)? {
                    answers.push(answer);
                }
            }
        }
        Some(_) => issues.push(FieldIssue::new(ANSWERS_KEY, "answers must be a list.")),
    }

    Ok(NormalizedSubmission {
        attempt_id,
        answers,
        unknown_fields: map.keys().cloned().collect(),
        shape_issues: issues,
    })
}

/// Returns `Ok(None)` when the entry has a shape problem; the problem is pushed to `issues`.
/// Only unreadable option ids fail outright.
fn normalize_answer(
    index: usize,
    item: &Value,
    issues: &mut Vec<FieldIssue>,
) -> Result<Option<AnswerSelection>, SubmissionError> {
    let path = format!("answers[{}]", index);

    let Some(entry) = item.as_object() else {
        issues.push(FieldIssue::new(path, "Each answer must be an object."));
        return Ok(None);
    };

    let question_id = match entry.get("question_id") {
        None | Some(Value::Null) => {
            issues.push(FieldIssue::new(format!("{}.question_id", path), "Field required."));
            None
        }
        Some(value) => {
            let id = json_integer(value);
            if id.is_none() {
                issues.push(FieldIssue::new(
                    format!("{}.question_id", path),
                    "question_id must be an integer.",
                ));
            }
            id
        }
    };

    let selections_path = format!("{}.selected_option_ids", path);
    let selected_option_ids = match entry.get("selected_option_ids") {
        None | Some(Value::Null) => {
            issues.push(FieldIssue::new(selections_path, "Field required."));
            None
        }
        Some(Value::Array(values)) => {
            let mut ids = Vec::with_capacity(values.len());
            for value in values {
                let id = match value {
                    Value::String(s) => parse_option_id(s.trim())?,
                    other => json_integer(other).ok_or_else(|| {
                        SubmissionError::MalformedPayload(format!(
                            "Option id {} in {} is not an integer.",
                            other, selections_path
                        ))
                    })?,
                };
                ids.push(id);
            }
            Some(ids)
        }
        Some(Value::String(s)) => Some(split_option_ids(s)?),
        Some(_) => {
            issues.push(FieldIssue::new(
                selections_path,
                "selected_option_ids must be a list of option identifiers.",
            ));
            None
        }
    };

    Ok(question_id
        .zip(selected_option_ids)
        .map(|(question_id, selected_option_ids)| AnswerSelection {
            question_id,
            selected_option_ids,
        }))
}

pub fn normalize_form(pairs: &[(String, String)]) -> Result<NormalizedSubmission, SubmissionError> {
    let mut attempt_id = None;
    // Keys in first-seen order, each with all of its values.
    let mut grouped: Vec<(&str, i64, Vec<&str>)> = Vec::new();

    for (key, value) in pairs {
        if key == ATTEMPT_KEY {
            attempt_id.get_or_insert(value.as_str());
            continue;
        }

        let Some(question_id) = form_question_id(key) else {
            continue;
        };

        match grouped.iter_mut().find(|(k, _, _)| *k == key.as_str()) {
            Some((_, _, values)) => values.push(value),
            None => grouped.push((key.as_str(), question_id, vec![value.as_str()])),
        }
    }

    let attempt_id = match attempt_id.map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(raw.parse::<i64>().map_err(|_| SubmissionError::InvalidAttemptId)?),
    };

    let mut answers = Vec::with_capacity(grouped.len());
    for (_, question_id, values) in grouped {
        let mut selected_option_ids = Vec::new();
        for value in values {
            selected_option_ids.extend(split_option_ids(value)?);
        }
        answers.push(AnswerSelection {
            question_id,
            selected_option_ids,
        });
    }

    Ok(NormalizedSubmission {
        attempt_id,
        answers,
        unknown_fields: Vec::new(),
        shape_issues: Vec::new(),
    })
}

fn form_question_id(key: &str) -> Option<i64> {
    let raw_id = ANSWER_KEY.captures(key)?.get(1)?.as_str();
    if raw_id.is_empty() || !raw_id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw_id.parse().ok()
}

fn coerce_attempt_id(value: &Value) -> Result<Option<i64>, SubmissionError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| SubmissionError::InvalidAttemptId),
        other => json_integer(other)
            .map(Some)
            .ok_or(SubmissionError::InvalidAttemptId),
    }
}

/// Integers, integral floats within `i64` range and integer strings.
fn json_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && (I64_FLOAT_MIN..I64_FLOAT_MAX).contains(f))
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn split_option_ids(raw: &str) -> Result<Vec<i64>, SubmissionError> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(parse_option_id)
        .collect()
}

fn parse_option_id(token: &str) -> Result<i64, SubmissionError> {
    token.parse::<i64>().map_err(|_| {
        SubmissionError::MalformedPayload(format!("Option id '{}' is not an integer.", token))
    })
}
