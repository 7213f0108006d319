//! Public submission flow: deadline, validation and normalization of answers

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::error::{FormError, FormResult};
use crate::types::{AnswerValue, Answers, FieldRecord, FieldType, FormId, FormRecord};

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const EMAIL_MESSAGE: &str = "Enter a valid email address.";
pub const NUMBER_MESSAGE: &str = "Enter a valid number.";

/// Field id -> validation message
pub type FieldErrors = BTreeMap<String, String>;

/// A validated, normalized response ready to insert
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub form_id: FormId,
    pub answers: Answers,
    pub respondent_email: Option<String>,
}

/// Time left until a deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

/// Remaining time before the deadline, `None` once it has passed
pub fn countdown(deadline: DateTime<Utc>, now: DateTime<Utc>) -> Option<Countdown> {
    let remaining = (deadline - now).num_seconds();
    if remaining <= 0 {
        return None;
    }
    Some(Countdown {
        days: remaining / 86_400,
        hours: (remaining % 86_400) / 3_600,
        minutes: (remaining % 3_600) / 60,
        seconds: remaining % 60,
    })
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

fn text_of(value: Option<&AnswerValue>) -> String {
    value.and_then(AnswerValue::as_text).unwrap_or_default()
}

/// Numbers as a browser would accept them: finite decimal values only
pub fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Check every answerable field; section headings are skipped
pub fn validate_answers(fields: &[FieldRecord], answers: &Answers) -> FieldErrors {
    let mut errors = FieldErrors::new();

    for field in fields.iter().filter(|f| f.field_type.is_input()) {
        let key = field.answer_key();
        let value = answers.get(&key);
        let text = text_of(value);

        if field.required {
            let missing = match field.field_type {
                FieldType::Checkbox => !matches!(value, Some(AnswerValue::List(items)) if !items.is_empty()),
                _ => text.trim().is_empty(),
            };
            if missing {
                errors.insert(key, REQUIRED_MESSAGE.to_string());
                continue;
            }
        }

        if text.trim().is_empty() {
            continue;
        }

        match field.field_type {
            FieldType::Email if !is_valid_email(&text) => {
                errors.insert(key, EMAIL_MESSAGE.to_string());
            }
            FieldType::Number => match parse_number(&text) {
                None => {
                    errors.insert(key, NUMBER_MESSAGE.to_string());
                }
                Some(n) => {
                    if let Some(message) = bounds_message(field, n) {
                        errors.insert(key, message);
                    }
                }
            },
            _ => {}
        }
    }

    errors
}

fn bounds_message(field: &FieldRecord, n: f64) -> Option<String> {
    let options = field.options.as_ref()?;
    match (options.min, options.max) {
        (Some(min), _) if n < min => Some(format!("Enter a number no less than {}.", min)),
        (_, Some(max)) if n > max => Some(format!("Enter a number no greater than {}.", max)),
        _ => None,
    }
}

/// Build the stored answer map: checkbox answers become lists, numbers with
/// content become numeric, everything else is trimmed text
pub fn normalize_answers(fields: &[FieldRecord], answers: &Answers) -> Answers {
    let mut payload = Answers::new();

    for field in fields.iter().filter(|f| f.field_type.is_input()) {
        let key = field.answer_key();
        let value = answers.get(&key);
        let normalized = match field.field_type {
            FieldType::Checkbox => match value {
                Some(AnswerValue::List(items)) => AnswerValue::List(items.clone()),
                _ => AnswerValue::List(Vec::new()),
            },
            FieldType::Number => {
                let text = text_of(value);
                match parse_number(&text) {
                    Some(n) if !text.trim().is_empty() => AnswerValue::Number(n),
                    _ => AnswerValue::Text(text.trim().to_string()),
                }
            }
            _ => AnswerValue::Text(text_of(value).trim().to_string()),
        };
        payload.insert(key, normalized);
    }

    payload
}

/// Trimmed answer to the first email field, if any
pub fn respondent_email(fields: &[FieldRecord], payload: &Answers) -> Option<String> {
    let field = fields.iter().find(|f| f.field_type == FieldType::Email)?;
    let text = text_of(payload.get(&field.answer_key()));
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Run the whole client-side flow for one submission
pub fn prepare_submission(
    form: &FormRecord,
    fields: &[FieldRecord],
    answers: &Answers,
    now: DateTime<Utc>,
) -> FormResult<Submission> {
    if form.is_deadline_passed(now) {
        return Err(FormError::SubmissionClosed);
    }

    let errors = validate_answers(fields, answers);
    if !errors.is_empty() {
        return Err(FormError::Validation { errors });
    }

    let payload = normalize_answers(fields, answers);
    let respondent_email = respondent_email(fields, &payload);

    Ok(Submission {
        form_id: form.id,
        answers: payload,
        respondent_email,
    })
}
