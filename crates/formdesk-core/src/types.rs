//! Core types for Formdesk

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::error::FormError;

macro_rules! ulid_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub Ulid);

        impl $name {
            /// Create a new id with the current timestamp
            pub fn new() -> Self {
                Self(Ulid::new())
            }

            /// Get the underlying ULID
            pub fn as_ulid(&self) -> &Ulid {
                &self.0
            }

            /// Convert to string representation (plain ULID)
            pub fn to_string_repr(&self) -> String {
                self.0.to_string()
            }

            /// Parse from string representation
            pub fn from_string(s: &str) -> Result<Self, ulid::DecodeError> {
                Ok(Self(Ulid::from_string(s)?))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "_{}"), self.0)
            }
        }
    };
}

ulid_id!(
    /// Unique identifier for a form
    FormId,
    "form"
);
ulid_id!(
    /// Unique identifier for a form field
    FieldId,
    "field"
);
ulid_id!(
    /// Unique identifier for a submitted response
    ResponseId,
    "response"
);
ulid_id!(
    /// Unique identifier for a user account
    UserId,
    "user"
);

/// Lifecycle state of a form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormStatus {
    #[default]
    Draft,
    Live,
    Closed,
}

impl FormStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormStatus::Draft => "draft",
            FormStatus::Live => "live",
            FormStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for FormStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormStatus {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(FormStatus::Draft),
            "live" => Ok(FormStatus::Live),
            "closed" => Ok(FormStatus::Closed),
            other => Err(FormError::InvalidInput(format!(
                "unknown status '{other}' (expected draft, live or closed)"
            ))),
        }
    }
}

/// The closed set of question kinds a form can contain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    ShortText,
    LongText,
    Email,
    Number,
    Date,
    Select,
    Checkbox,
    SectionTitle,
}

impl FieldType {
    pub const ALL: [FieldType; 8] = [
        FieldType::ShortText,
        FieldType::LongText,
        FieldType::Email,
        FieldType::Number,
        FieldType::Date,
        FieldType::Select,
        FieldType::Checkbox,
        FieldType::SectionTitle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::ShortText => "short_text",
            FieldType::LongText => "long_text",
            FieldType::Email => "email",
            FieldType::Number => "number",
            FieldType::Date => "date",
            FieldType::Select => "select",
            FieldType::Checkbox => "checkbox",
            FieldType::SectionTitle => "section_title",
        }
    }

    /// Label used for the "add field" palette
    pub fn palette_label(&self) -> &'static str {
        match self {
            FieldType::ShortText => "Short answer",
            FieldType::LongText => "Paragraph",
            FieldType::Email => "Email",
            FieldType::Number => "Number",
            FieldType::Date => "Date",
            FieldType::Select => "Dropdown",
            FieldType::Checkbox => "Checkboxes",
            FieldType::SectionTitle => "Section",
        }
    }

    /// Label prefix given to freshly added fields
    pub fn default_label(&self) -> &'static str {
        match self {
            FieldType::ShortText => "Short answer question",
            FieldType::LongText => "Long answer question",
            FieldType::Email => "Email address",
            FieldType::Number => "Number input",
            FieldType::Date => "Date input",
            FieldType::Select => "Select an option",
            FieldType::Checkbox => "Choose one or more",
            FieldType::SectionTitle => "Section heading",
        }
    }

    /// Section headings collect no answer
    pub fn is_input(&self) -> bool {
        !matches!(self, FieldType::SectionTitle)
    }

    pub fn has_choices(&self) -> bool {
        matches!(self, FieldType::Select | FieldType::Checkbox)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        FieldType::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| FormError::InvalidInput(format!("unknown field type '{s}'")))
    }
}

/// Type-specific field metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldOptions {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_description: Option<String>,
}

/// Theme settings stored with a form: preset id plus optional deadline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThemeSettings {
    #[serde(default)]
    pub preset: Option<String>,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
}

/// A stored form row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormRecord {
    pub id: FormId,
    pub owner_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub slug: String,
    pub is_public: bool,
    pub status: FormStatus,
    pub theme: ThemeSettings,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FormRecord {
    /// Anonymous callers may only see live, public forms
    pub fn is_publicly_accessible(&self) -> bool {
        self.status == FormStatus::Live && self.is_public
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.theme.deadline
    }

    pub fn is_deadline_passed(&self, now: DateTime<Utc>) -> bool {
        self.theme.deadline.is_some_and(|deadline| now > deadline)
    }
}

/// A stored field row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRecord {
    pub id: FieldId,
    pub form_id: FormId,
    pub label: String,
    pub field_type: FieldType,
    pub required: bool,
    pub help_text: Option<String>,
    pub options: Option<FieldOptions>,
    pub sort_order: u32,
    pub created_at: DateTime<Utc>,
}

impl FieldRecord {
    pub fn choices(&self) -> &[String] {
        self.options
            .as_ref()
            .map(|o| o.choices.as_slice())
            .unwrap_or(&[])
    }

    /// Key used for this field in a response's answer map
    pub fn answer_key(&self) -> String {
        self.id.to_string_repr()
    }
}

/// A single answer value as collected from a respondent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl AnswerValue {
    /// Raw string form, used by validation (lists have no string form)
    pub fn as_text(&self) -> Option<String> {
        match self {
            AnswerValue::Text(s) => Some(s.clone()),
            AnswerValue::Number(n) => Some(n.to_string()),
            AnswerValue::List(_) => None,
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        AnswerValue::Text(value.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        AnswerValue::Text(value)
    }
}

impl From<f64> for AnswerValue {
    fn from(value: f64) -> Self {
        AnswerValue::Number(value)
    }
}

impl From<Vec<String>> for AnswerValue {
    fn from(value: Vec<String>) -> Self {
        AnswerValue::List(value)
    }
}

/// Answer map keyed by field id (string form)
pub type Answers = BTreeMap<String, AnswerValue>;

/// A stored response row; immutable once inserted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub id: ResponseId,
    pub form_id: FormId,
    pub submitted_at: DateTime<Utc>,
    pub respondent_email: Option<String>,
    #[serde(default)]
    pub answers: Answers,
}

impl ResponseRecord {
    pub fn new(form_id: FormId, answers: Answers, respondent_email: Option<String>) -> Self {
        Self {
            id: ResponseId::new(),
            form_id,
            submitted_at: Utc::now(),
            respondent_email,
            answers,
        }
    }

    pub fn answer(&self, field: &FieldRecord) -> Option<&AnswerValue> {
        self.answers.get(&field.answer_key())
    }
}

/// Public profile row for a user account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub full_name: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    pub const DEFAULT_ROLE: &'static str = "admin";

    pub fn new(id: UserId, full_name: Option<String>) -> Self {
        Self {
            id,
            full_name,
            role: Self::DEFAULT_ROLE.to_string(),
            created_at: Utc::now(),
        }
    }
}

/// An authenticated session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub user_id: UserId,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Form plus its ordered fields
#[derive(Debug, Clone, PartialEq)]
pub struct FormBundle {
    pub form: FormRecord,
    pub fields: Vec<FieldRecord>,
}

/// Form, ordered fields and responses (newest first)
#[derive(Debug, Clone, PartialEq)]
pub struct ResponsesBundle {
    pub form: FormRecord,
    pub fields: Vec<FieldRecord>,
    pub responses: Vec<ResponseRecord>,
}

/// A form row with its response count, for the dashboard list
#[derive(Debug, Clone, PartialEq)]
pub struct FormOverview {
    pub form: FormRecord,
    pub response_count: usize,
}
