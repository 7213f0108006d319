//! Dynamic field rendering
//!
//! Maps each [`FieldType`] to the input widget used to collect it. The same
//! descriptors drive the builder preview and the public submission flow;
//! the `Display` impl is the terminal rendering used by the CLI.

use std::fmt;

use crate::error::{FormError, FormResult};
use crate::types::{AnswerValue, FieldRecord, FieldType};

/// Placeholder shown for an unselected dropdown
pub const SELECT_PLACEHOLDER: &str = "Select an option";

/// The widget a field is rendered as
#[derive(Debug, Clone, PartialEq)]
pub enum Widget {
    /// Single-line input (plain text or email)
    TextInput { email: bool, placeholder: &'static str },
    /// Multi-line input
    TextArea { placeholder: &'static str },
    NumberInput { min: Option<f64>, max: Option<f64> },
    DateInput,
    Dropdown { placeholder: &'static str, choices: Vec<String> },
    CheckboxGroup { choices: Vec<String> },
    /// Non-input heading separating groups of questions
    SectionHeading { description: Option<String> },
}

/// A field ready to be shown to a respondent
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedField {
    pub key: String,
    pub label: String,
    pub required: bool,
    pub help_text: Option<String>,
    pub widget: Widget,
}

impl RenderedField {
    pub fn is_input(&self) -> bool {
        !matches!(self.widget, Widget::SectionHeading { .. })
    }
}

/// Pick the widget for a field
pub fn render_field(field: &FieldRecord) -> RenderedField {
    let options = field.options.clone().unwrap_or_default();
    let widget = match field.field_type {
        FieldType::ShortText => Widget::TextInput {
            email: false,
            placeholder: "Your answer...",
        },
        FieldType::Email => Widget::TextInput {
            email: true,
            placeholder: "example@email.com",
        },
        FieldType::LongText => Widget::TextArea {
            placeholder: "Describe in detail...",
        },
        FieldType::Number => Widget::NumberInput {
            min: options.min,
            max: options.max,
        },
        FieldType::Date => Widget::DateInput,
        FieldType::Select => Widget::Dropdown {
            placeholder: SELECT_PLACEHOLDER,
            choices: options.choices,
        },
        FieldType::Checkbox => Widget::CheckboxGroup {
            choices: options.choices,
        },
        FieldType::SectionTitle => Widget::SectionHeading {
            description: options
                .section_description
                .filter(|d| !d.is_empty())
                .or_else(|| field.help_text.clone()),
        },
    };

    RenderedField {
        key: field.answer_key(),
        label: field.label.clone(),
        required: field.required && field.field_type.is_input(),
        help_text: field.help_text.clone().filter(|h| !h.is_empty()),
        widget,
    }
}

/// Render every field of a form in order
pub fn render_form(fields: &[FieldRecord]) -> Vec<RenderedField> {
    fields.iter().map(render_field).collect()
}

/// Turn raw terminal input into the value the widget would produce.
///
/// Empty input yields `None` (left blank). Dropdowns accept either a
/// choice or its 1-based number; checkbox groups take a comma-separated
/// list of choices or numbers. Anything else is kept as typed text and
/// checked later by submission validation.
pub fn parse_input(field: &FieldRecord, raw: &str) -> FormResult<Option<AnswerValue>> {
    let trimmed = raw.trim();
    match field.field_type {
        FieldType::SectionTitle => Ok(None),
        FieldType::Select => {
            if trimmed.is_empty() {
                return Ok(None);
            }
            resolve_choice(field, trimmed).map(|c| Some(AnswerValue::Text(c)))
        }
        FieldType::Checkbox => {
            let mut selected: Vec<String> = Vec::new();
            for part in trimmed.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                let choice = resolve_choice(field, part)?;
                if !selected.contains(&choice) {
                    selected.push(choice);
                }
            }
            Ok(Some(AnswerValue::List(selected)))
        }
        _ if trimmed.is_empty() => Ok(None),
        _ => Ok(Some(AnswerValue::Text(raw.to_string()))),
    }
}

fn resolve_choice(field: &FieldRecord, input: &str) -> FormResult<String> {
    let choices = field.choices();
    if let Some(choice) = choices.iter().find(|c| c.as_str() == input) {
        return Ok(choice.clone());
    }
    if let Some(choice) = input
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| choices.get(i))
    {
        return Ok(choice.clone());
    }
    Err(FormError::InvalidInput(format!(
        "'{}' is not an option for '{}'",
        input, field.label
    )))
}

impl fmt::Display for RenderedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Widget::SectionHeading { description } = &self.widget {
            writeln!(f, "== {} ==", self.label)?;
            if let Some(description) = description {
                writeln!(f, "{}", description)?;
            }
            return Ok(());
        }

        write!(f, "{}", self.label)?;
        if self.required {
            write!(f, " *")?;
        }
        writeln!(f)?;
        if let Some(help) = &self.help_text {
            writeln!(f, "  {}", help)?;
        }

        match &self.widget {
            Widget::TextInput { placeholder, .. } | Widget::TextArea { placeholder } => {
                writeln!(f, "  [{}]", placeholder)
            }
            Widget::NumberInput { min, max } => match (min, max) {
                (Some(min), Some(max)) => writeln!(f, "  [number {} - {}]", min, max),
                (Some(min), None) => writeln!(f, "  [number >= {}]", min),
                (None, Some(max)) => writeln!(f, "  [number <= {}]", max),
                (None, None) => writeln!(f, "  [number]"),
            },
            Widget::DateInput => writeln!(f, "  [YYYY-MM-DD]"),
            Widget::Dropdown { placeholder, choices } => {
                writeln!(f, "  {}:", placeholder)?;
                for (i, choice) in choices.iter().enumerate() {
                    writeln!(f, "    {}) {}", i + 1, choice)?;
                }
                Ok(())
            }
            Widget::CheckboxGroup { choices } => {
                for (i, choice) in choices.iter().enumerate() {
                    writeln!(f, "    [ ] {}) {}", i + 1, choice)?;
                }
                Ok(())
            }
            Widget::SectionHeading { .. } => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FieldId, FieldOptions, FormId};
    use chrono::Utc;

    fn field(field_type: FieldType, options: Option<FieldOptions>) -> FieldRecord {
        FieldRecord {
            id: FieldId::new(),
            form_id: FormId::new(),
            label: "Question".into(),
            field_type,
            required: true,
            help_text: None,
            options,
            sort_order: 0,
            created_at: Utc::now(),
        }
    }

    fn with_choices(field_type: FieldType) -> FieldRecord {
        field(
            field_type,
            Some(FieldOptions {
                choices: vec!["Red".into(), "Green".into(), "Blue".into()],
                ..Default::default()
            }),
        )
    }

    #[test]
    fn test_every_type_maps_to_a_widget() {
        for t in FieldType::ALL {
            let rendered = render_field(&field(t, None));
            assert_eq!(rendered.is_input(), t.is_input());
        }
    }

    #[test]
    fn test_email_widget() {
        let rendered = render_field(&field(FieldType::Email, None));
        assert_eq!(
            rendered.widget,
            Widget::TextInput {
                email: true,
                placeholder: "example@email.com"
            }
        );
    }

    #[test]
    fn test_section_heading_description_fallback() {
        let mut section = field(
            FieldType::SectionTitle,
            Some(FieldOptions {
                section_description: Some(String::new()),
                ..Default::default()
            }),
        );
        section.help_text = Some("From help".into());
        let rendered = render_field(&section);
        assert!(!rendered.required);
        assert_eq!(
            rendered.widget,
            Widget::SectionHeading {
                description: Some("From help".into())
            }
        );
    }

    #[test]
    fn test_number_bounds_carried() {
        let rendered = render_field(&field(
            FieldType::Number,
            Some(FieldOptions {
                min: Some(0.0),
                max: Some(10.0),
                ..Default::default()
            }),
        ));
        assert_eq!(
            rendered.widget,
            Widget::NumberInput {
                min: Some(0.0),
                max: Some(10.0)
            }
        );
        assert!(rendered.to_string().contains("[number 0 - 10]"));
    }

    #[test]
    fn test_parse_select_by_name_or_number() {
        let select = with_choices(FieldType::Select);
        assert_eq!(
            parse_input(&select, "Green").unwrap(),
            Some(AnswerValue::Text("Green".into()))
        );
        assert_eq!(
            parse_input(&select, "3").unwrap(),
            Some(AnswerValue::Text("Blue".into()))
        );
        assert_eq!(parse_input(&select, "  ").unwrap(), None);
        assert!(parse_input(&select, "Purple").is_err());
    }

    #[test]
    fn test_parse_checkbox_list() {
        let group = with_choices(FieldType::Checkbox);
        assert_eq!(
            parse_input(&group, "Red, 3, Red").unwrap(),
            Some(AnswerValue::List(vec!["Red".into(), "Blue".into()]))
        );
        assert_eq!(
            parse_input(&group, "").unwrap(),
            Some(AnswerValue::List(vec![]))
        );
    }

    #[test]
    fn test_parse_text_keeps_raw() {
        let text = field(FieldType::ShortText, None);
        assert_eq!(
            parse_input(&text, " hi ").unwrap(),
            Some(AnswerValue::Text(" hi ".into()))
        );
        assert_eq!(parse_input(&text, "").unwrap(), None);
    }

    #[test]
    fn test_display_marks_required() {
        let text = render_field(&field(FieldType::ShortText, None));
        assert!(text.to_string().starts_with("Question *"));
    }
}
