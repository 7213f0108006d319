//! Responses dashboard: key columns, filtering and per-response detail

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};

use crate::types::{AnswerValue, FieldRecord, ResponseRecord};

/// Number of answer columns shown in the responses table
pub const KEY_FIELD_COUNT: usize = 3;

/// Placeholder for a missing or blank answer
pub const EMPTY_ANSWER: &str = "-";

/// First answerable fields worth a table column. Name and email are
/// already visible elsewhere so they are skipped.
pub fn key_fields(fields: &[FieldRecord]) -> Vec<&FieldRecord> {
    fields
        .iter()
        .filter(|f| f.field_type.is_input())
        .filter(|f| {
            let label = f.label.to_lowercase();
            label != "full name" && label != "email"
        })
        .take(KEY_FIELD_COUNT)
        .collect()
}

/// Display text for one answer
pub fn answer_text(field: &FieldRecord, response: &ResponseRecord) -> String {
    match response.answer(field) {
        Some(AnswerValue::List(items)) => items.join(", "),
        Some(AnswerValue::Text(text)) if text.is_empty() => EMPTY_ANSWER.to_string(),
        Some(AnswerValue::Text(text)) => text.clone(),
        Some(AnswerValue::Number(n)) => n.to_string(),
        None => EMPTY_ANSWER.to_string(),
    }
}

/// Search and date filters applied to the responses table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseFilter {
    pub search: Option<String>,
    /// Inclusive, from 00:00:00 UTC
    pub start_date: Option<NaiveDate>,
    /// Inclusive, through 23:59:59 UTC
    pub end_date: Option<NaiveDate>,
}

impl ResponseFilter {
    pub fn is_empty(&self) -> bool {
        self.search.as_deref().is_none_or(|s| s.trim().is_empty())
            && self.start_date.is_none()
            && self.end_date.is_none()
    }

    fn matches(&self, response: &ResponseRecord, first_key: Option<&FieldRecord>) -> bool {
        if let Some(start) = self.start_date {
            let min = Utc.from_utc_datetime(&start.and_time(NaiveTime::MIN));
            if response.submitted_at < min {
                return false;
            }
        }

        if let Some(end) = self.end_date {
            let max = end
                .and_hms_opt(23, 59, 59)
                .map(|t| Utc.from_utc_datetime(&t));
            if max.is_some_and(|max| response.submitted_at > max) {
                return false;
            }
        }

        let search = match self.search.as_deref() {
            Some(s) if !s.trim().is_empty() => s,
            _ => return true,
        };

        let first = first_key
            .map(|field| answer_text(field, response))
            .unwrap_or_default();
        let haystack = format!(
            "{} {}",
            response.respondent_email.as_deref().unwrap_or(""),
            first
        )
        .to_lowercase();
        haystack.contains(&search.to_lowercase())
    }
}

/// Apply a filter, keeping the input order
pub fn filter_responses<'a>(
    fields: &[FieldRecord],
    responses: &'a [ResponseRecord],
    filter: &ResponseFilter,
) -> Vec<&'a ResponseRecord> {
    let keys = key_fields(fields);
    let first_key = keys.first().copied();
    responses
        .iter()
        .filter(|r| filter.matches(r, first_key))
        .collect()
}

/// One row of the detail view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRow {
    pub label: String,
    pub answer: String,
}

/// Label and answer text for every answerable field of a response
pub fn response_detail(fields: &[FieldRecord], response: &ResponseRecord) -> Vec<DetailRow> {
    fields
        .iter()
        .filter(|f| f.field_type.is_input())
        .map(|f| DetailRow {
            label: f.label.clone(),
            answer: answer_text(f, response),
        })
        .collect()
}
