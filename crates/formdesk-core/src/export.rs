//! CSV export of responses

use std::sync::LazyLock;

use chrono::SecondsFormat;
use regex::Regex;

use crate::types::{AnswerValue, FieldRecord, ResponseRecord};

static LINE_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\r?\n").expect("valid regex"));
static NON_ALNUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));

/// Quote a cell, doubling inner quotes and flattening line breaks
pub fn escape_cell(value: &str) -> String {
    let flattened = LINE_BREAK.replace_all(value, " ");
    format!("\"{}\"", flattened.replace('"', "\"\""))
}

fn answer_cell(value: Option<&AnswerValue>) -> String {
    match value {
        Some(AnswerValue::List(items)) => escape_cell(&items.join("; ")),
        Some(AnswerValue::Text(text)) => escape_cell(text),
        Some(AnswerValue::Number(n)) => escape_cell(&n.to_string()),
        None => "\"\"".to_string(),
    }
}

/// Render responses as CSV. Section headings get no column.
pub fn responses_to_csv<'a, I>(fields: &[FieldRecord], responses: I) -> String
where
    I: IntoIterator<Item = &'a ResponseRecord>,
{
    let columns: Vec<&FieldRecord> = fields.iter().filter(|f| f.field_type.is_input()).collect();

    let header = std::iter::once("submitted_at")
        .chain(columns.iter().map(|f| f.label.as_str()))
        .map(escape_cell)
        .collect::<Vec<_>>()
        .join(",");

    let mut lines = vec![header];
    for response in responses {
        let submitted = response
            .submitted_at
            .to_rfc3339_opts(SecondsFormat::Millis, true);
        let row = std::iter::once(escape_cell(&submitted))
            .chain(columns.iter().map(|f| answer_cell(response.answer(f))))
            .collect::<Vec<_>>()
            .join(",");
        lines.push(row);
    }

    lines.join("\n")
}

/// Filesystem-friendly name derived from a form title
pub fn sanitize_filename(title: &str) -> String {
    let lowered = title.to_lowercase();
    let dashed = NON_ALNUM.replace_all(lowered.trim(), "-");
    let stripped = dashed.trim_matches('-');
    if stripped.is_empty() {
        "form".to_string()
    } else {
        stripped.to_string()
    }
}

pub fn export_filename(title: &str) -> String {
    format!("{}-responses.csv", sanitize_filename(title))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Answers, FieldId, FieldType, FormId, ResponseId};
    use chrono::{DateTime, Utc};

    fn field(label: &str, field_type: FieldType) -> FieldRecord {
        FieldRecord {
            id: FieldId::new(),
            form_id: FormId::new(),
            label: label.into(),
            field_type,
            required: false,
            help_text: None,
            options: None,
            sort_order: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_escape_cell() {
        assert_eq!(escape_cell("plain"), "\"plain\"");
        assert_eq!(escape_cell("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_cell("a\r\nb\nc"), "\"a b c\"");
    }

    #[test]
    fn test_csv_layout() {
        let name = field("Name", FieldType::ShortText);
        let section = field("Part 2", FieldType::SectionTitle);
        let roles = field("Roles", FieldType::Checkbox);
        let score = field("Score", FieldType::Number);
        let fields = vec![name.clone(), section, roles.clone(), score];

        let mut answers = Answers::new();
        answers.insert(name.answer_key(), "Ada".into());
        answers.insert(roles.answer_key(), vec!["Ops".to_string(), "Data".to_string()].into());
        let response = ResponseRecord {
            id: ResponseId::new(),
            form_id: FormId::new(),
            submitted_at: DateTime::parse_from_rfc3339("2026-03-01T10:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            respondent_email: None,
            answers,
        };

        let csv = responses_to_csv(&fields, [&response]);
        let lines: Vec<_> = csv.split('\n').collect();
        assert_eq!(lines[0], "\"submitted_at\",\"Name\",\"Roles\",\"Score\"");
        assert_eq!(
            lines[1],
            "\"2026-03-01T10:00:00.000Z\",\"Ada\",\"Ops; Data\",\"\""
        );
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_empty_export_is_header_only() {
        let fields = vec![field("Name", FieldType::ShortText)];
        let csv = responses_to_csv(&fields, std::iter::empty::<&ResponseRecord>());
        assert_eq!(csv, "\"submitted_at\",\"Name\"");
    }

    #[test]
    fn test_export_filename() {
        assert_eq!(
            export_filename("  Placement Cell 2026! "),
            "placement-cell-2026-responses.csv"
        );
        assert_eq!(export_filename("!!!"), "form-responses.csv");
        assert_eq!(export_filename(""), "form-responses.csv");
    }
}
