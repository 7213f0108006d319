//! Form builder state
//!
//! Holds an in-memory, ordered list of editable field descriptors plus the
//! form-level settings (title, slug, status, theme, deadline). The builder is
//! purely local; [`FormEngine::save_form`](crate::FormEngine::save_form)
//! serializes it into form and field rows.
//!
//! Field rows are rewritten wholesale on every save: `sort_order` is always
//! the field's index in the builder list.

use chrono::{DateTime, Utc};
use ulid::Ulid;

use crate::error::{FormError, FormResult};
use crate::slug::{random_suffix, slugify, FALLBACK_SUFFIX_LEN};
use crate::templates::{template_fields, FormTemplate};
use crate::themes::DEFAULT_THEME_ID;
use crate::types::{
    FieldId, FieldOptions, FieldRecord, FieldType, FormId, FormRecord, FormStatus,
};

/// Default title for a blank builder
pub const UNTITLED_FORM: &str = "Untitled Form";

/// Direction for [`FormBuilder::move_field`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// A field as edited in the builder
#[derive(Debug, Clone, PartialEq)]
pub struct EditableField {
    /// Builder-local identifier, stable while editing
    pub local_id: String,
    /// Row id once the field has been saved
    pub db_id: Option<FieldId>,
    pub label: String,
    pub field_type: FieldType,
    pub required: bool,
    pub help_text: String,
    pub choices: Vec<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub section_description: Option<String>,
}

fn local_id() -> String {
    format!("local-{}", Ulid::new().to_string().to_lowercase())
}

impl EditableField {
    /// A fresh field of the given type placed at `index`
    pub fn new(field_type: FieldType, index: usize) -> Self {
        Self {
            local_id: local_id(),
            db_id: None,
            label: format!("{} {}", field_type.default_label(), index + 1),
            field_type,
            required: field_type.is_input(),
            help_text: String::new(),
            choices: if field_type.has_choices() {
                vec!["Option 1".to_string(), "Option 2".to_string()]
            } else {
                Vec::new()
            },
            min: None,
            max: None,
            section_description: None,
        }
    }

    /// A field with explicit label and requiredness (used by templates)
    pub fn with_label(field_type: FieldType, label: &str, required: bool) -> Self {
        Self {
            label: label.to_string(),
            required,
            choices: Vec::new(),
            ..Self::new(field_type, 0)
        }
    }

    pub fn help(mut self, help_text: &str) -> Self {
        self.help_text = help_text.to_string();
        self
    }

    pub fn choices(mut self, choices: &[&str]) -> Self {
        self.choices = choices.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn bounds(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Resume editing a stored field
    pub fn from_record(record: &FieldRecord) -> Self {
        let options = record.options.clone().unwrap_or_default();
        Self {
            local_id: format!("local-{}", record.id.to_string_repr().to_lowercase()),
            db_id: Some(record.id),
            label: record.label.clone(),
            field_type: record.field_type,
            required: record.required,
            help_text: record.help_text.clone().unwrap_or_default(),
            choices: options.choices,
            min: options.min,
            max: options.max,
            section_description: options.section_description,
        }
    }

    /// Options persisted for this field's type.
    ///
    /// Choice lists drop blank entries but keep the surviving entries
    /// untrimmed. Number bounds are kept only when set. Section headings
    /// always carry a (possibly empty) description.
    pub fn options_payload(&self) -> Option<FieldOptions> {
        match self.field_type {
            FieldType::Select | FieldType::Checkbox => Some(FieldOptions {
                choices: self
                    .choices
                    .iter()
                    .filter(|choice| !choice.trim().is_empty())
                    .cloned()
                    .collect(),
                ..FieldOptions::default()
            }),
            FieldType::Number => Some(FieldOptions {
                min: self.min,
                max: self.max,
                ..FieldOptions::default()
            }),
            FieldType::SectionTitle => Some(FieldOptions {
                section_description: Some(self.section_description.clone().unwrap_or_default()),
                ..FieldOptions::default()
            }),
            _ => None,
        }
    }

    /// Options shown in the live preview; unlike the saved payload, blank
    /// choices are still listed while the user is typing them
    fn preview_options(&self) -> Option<FieldOptions> {
        match self.field_type {
            FieldType::Select | FieldType::Checkbox => Some(FieldOptions {
                choices: self.choices.clone(),
                ..FieldOptions::default()
            }),
            FieldType::SectionTitle => Some(FieldOptions {
                section_description: self.section_description.clone(),
                ..FieldOptions::default()
            }),
            _ => self.options_payload(),
        }
    }

    /// Row written for this field at position `index` of `form_id`
    pub fn to_record(&self, form_id: FormId, index: usize, now: DateTime<Utc>) -> FieldRecord {
        let help = self.help_text.trim();
        FieldRecord {
            id: self.db_id.unwrap_or_default(),
            form_id,
            label: self.label.clone(),
            field_type: self.field_type,
            required: self.field_type.is_input() && self.required,
            help_text: (!help.is_empty()).then(|| help.to_string()),
            options: self.options_payload(),
            sort_order: index as u32,
            created_at: now,
        }
    }
}

/// Everything the builder screen edits
#[derive(Debug, Clone, PartialEq)]
pub struct FormBuilder {
    /// Set once the form has been saved
    pub id: Option<FormId>,
    pub title: String,
    pub description: String,
    pub slug: String,
    pub status: FormStatus,
    pub is_public: bool,
    pub theme_preset: String,
    pub deadline: Option<DateTime<Utc>>,
    pub fields: Vec<EditableField>,
}

impl Default for FormBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FormBuilder {
    pub fn new() -> Self {
        Self {
            id: None,
            title: UNTITLED_FORM.to_string(),
            description: String::new(),
            slug: format!("form-{}", random_suffix(FALLBACK_SUFFIX_LEN)),
            status: FormStatus::Draft,
            is_public: true,
            theme_preset: DEFAULT_THEME_ID.to_string(),
            deadline: None,
            fields: Vec::new(),
        }
    }

    /// Load stored rows back into an editable builder
    pub fn from_records(form: &FormRecord, fields: &[FieldRecord]) -> Self {
        Self {
            id: Some(form.id),
            title: form.title.clone(),
            description: form.description.clone().unwrap_or_default(),
            slug: form.slug.clone(),
            status: form.status,
            is_public: form.is_public,
            theme_preset: form
                .theme
                .preset
                .clone()
                .unwrap_or_else(|| DEFAULT_THEME_ID.to_string()),
            deadline: form.theme.deadline,
            fields: fields.iter().map(EditableField::from_record).collect(),
        }
    }

    /// Change the title; unsaved forms keep their slug in step with it
    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
        if self.id.is_none() {
            self.slug = slugify(title);
        }
    }

    /// Fill an empty builder from a template. Returns false (and changes
    /// nothing) when the builder already has fields.
    pub fn apply_template(&mut self, template: &FormTemplate) -> bool {
        if !self.fields.is_empty() {
            return false;
        }
        self.title = template.title.to_string();
        self.description = template.description.to_string();
        self.slug = slugify(template.slug);
        self.fields = template_fields(Some(template.key));
        true
    }

    /// Append a new field; returns its local id
    pub fn add_field(&mut self, field_type: FieldType) -> String {
        let field = EditableField::new(field_type, self.fields.len());
        let id = field.local_id.clone();
        self.fields.push(field);
        id
    }

    pub fn field(&self, local_id: &str) -> Option<&EditableField> {
        self.fields.iter().find(|f| f.local_id == local_id)
    }

    /// Position of a field by local id, or by 1-based position string
    pub fn position_of(&self, key: &str) -> Option<usize> {
        if let Some(index) = self.fields.iter().position(|f| f.local_id == key) {
            return Some(index);
        }
        key.parse::<usize>()
            .ok()
            .filter(|n| *n >= 1 && *n <= self.fields.len())
            .map(|n| n - 1)
    }

    /// Apply an edit to one field
    pub fn update_field<F>(&mut self, local_id: &str, edit: F) -> FormResult<()>
    where
        F: FnOnce(&mut EditableField),
    {
        let field = self
            .fields
            .iter_mut()
            .find(|f| f.local_id == local_id)
            .ok_or_else(|| FormError::FieldNotFound(local_id.to_string()))?;
        edit(field);
        Ok(())
    }

    /// Swap a field with its neighbour. Unknown ids and moves past either
    /// end leave the list untouched and return false.
    pub fn move_field(&mut self, local_id: &str, direction: MoveDirection) -> bool {
        let Some(index) = self.fields.iter().position(|f| f.local_id == local_id) else {
            return false;
        };
        let target = match direction {
            MoveDirection::Up => index.checked_sub(1),
            MoveDirection::Down => Some(index + 1).filter(|t| *t < self.fields.len()),
        };
        match target {
            Some(target) => {
                let item = self.fields.remove(index);
                self.fields.insert(target, item);
                true
            }
            None => false,
        }
    }

    pub fn remove_field(&mut self, local_id: &str) -> bool {
        let before = self.fields.len();
        self.fields.retain(|f| f.local_id != local_id);
        self.fields.len() != before
    }

    /// Check the builder can be saved
    pub fn validate(&self) -> FormResult<()> {
        if self.title.trim().is_empty() {
            return Err(FormError::InvalidInput("Form title is required.".to_string()));
        }
        Ok(())
    }

    /// Slug that will be written on save
    pub fn effective_slug(&self) -> String {
        if self.slug.is_empty() {
            slugify(&self.title)
        } else {
            slugify(&self.slug)
        }
    }

    /// Relative public link for this form
    pub fn public_path(&self) -> String {
        format!("/f/{}", self.effective_slug())
    }

    /// Field rows written on save, ordered by position
    pub fn field_records(&self, form_id: FormId, now: DateTime<Utc>) -> Vec<FieldRecord> {
        self.fields
            .iter()
            .enumerate()
            .map(|(index, field)| field.to_record(form_id, index, now))
            .collect()
    }

    /// Render-ready rows for the live preview
    pub fn preview_fields(&self) -> Vec<FieldRecord> {
        let form_id = self.id.unwrap_or_default();
        let now = Utc::now();
        self.fields
            .iter()
            .enumerate()
            .map(|(index, field)| FieldRecord {
                id: field.db_id.unwrap_or_default(),
                form_id,
                label: field.label.clone(),
                field_type: field.field_type,
                required: field.field_type.is_input() && field.required,
                help_text: (!field.help_text.is_empty()).then(|| field.help_text.clone()),
                options: field.preview_options(),
                sort_order: index as u32,
                created_at: now,
            })
            .collect()
    }
}
