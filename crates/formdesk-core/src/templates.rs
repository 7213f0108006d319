//! Built-in form templates

use crate::builder::EditableField;
use crate::types::FieldType;

/// Metadata describing a template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormTemplate {
    pub key: &'static str,
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub slug: &'static str,
}

pub const FORM_TEMPLATES: [FormTemplate; 3] = [
    FormTemplate {
        key: "student",
        name: "Student Application / Feedback",
        title: "Student Application / Feedback Form",
        description: "Collect academic and placement-related details from students.",
        slug: "student-application-feedback-form",
    },
    FormTemplate {
        key: "placement-coordinator",
        name: "Student Placement Coordinator Application",
        title: "Student Placement Coordinator Application",
        description: "Collect applications for the student placement coordinator team.",
        slug: "student-placement-coordinator-application",
    },
    FormTemplate {
        key: "recruitment",
        name: "Placement Cell Recruitment",
        title: "Placement Cell Member Recruitment 2026",
        description: "Application form for joining the placement cell coordination team.",
        slug: "placement-cell-member-recruitment",
    },
];

const BRANCHES: &[&str] = &["CSE", "IT", "ECE", "ENTC", "Mechanical", "Civil"];
const YEARS: &[&str] = &["First", "Second", "Third", "Final"];

pub fn template_by_key(key: &str) -> Option<&'static FormTemplate> {
    FORM_TEMPLATES.iter().find(|t| t.key == key)
}

/// Fresh field list for a template; unknown or missing keys give the
/// student template
pub fn template_fields(key: Option<&str>) -> Vec<EditableField> {
    match key {
        Some("placement-coordinator") => placement_coordinator_fields(),
        Some("recruitment") => recruitment_fields(),
        _ => student_fields(),
    }
}

fn student_fields() -> Vec<EditableField> {
    use FieldType::*;
    vec![
        EditableField::with_label(ShortText, "Full Name", true),
        EditableField::with_label(Email, "Institutional Email", true)
            .help("Use your institute-issued email id."),
        EditableField::with_label(Select, "Program / Branch", true).choices(BRANCHES),
        EditableField::with_label(Select, "Year", true).choices(YEARS),
        EditableField::with_label(Number, "CGPA / Percentage", false)
            .help("Enter CGPA or percentage.")
            .bounds(Some(0.0), Some(100.0)),
        EditableField::with_label(LongText, "Why are you applying for this position/course?", true),
        EditableField::with_label(LongText, "Any previous relevant experience?", false),
        EditableField::with_label(ShortText, "How can we contact you (phone, etc.)?", true),
    ]
}

fn placement_coordinator_fields() -> Vec<EditableField> {
    use FieldType::*;
    vec![
        EditableField::with_label(ShortText, "Full Name", true),
        EditableField::with_label(ShortText, "College Roll Number", true),
        EditableField::with_label(Email, "Institutional Email", true),
        EditableField::with_label(Select, "Program / Branch", true).choices(BRANCHES),
        EditableField::with_label(Select, "Current Year", true).choices(YEARS),
        EditableField::with_label(Number, "Current CGPA", true)
            .help("Enter your latest CGPA out of 10.")
            .bounds(Some(0.0), Some(10.0)),
        EditableField::with_label(Checkbox, "Roles you are interested in", true).choices(&[
            "Placement Operations",
            "Corporate Outreach",
            "Data and Analytics",
            "Events and Engagement",
            "Communication and Design",
        ]),
        EditableField::with_label(
            LongText,
            "Why do you want to be a Student Placement Coordinator?",
            true,
        ),
        EditableField::with_label(
            LongText,
            "Describe any relevant leadership or coordination experience.",
            true,
        ),
        EditableField::with_label(Select, "Availability (hours per week)", true)
            .choices(&["Less than 5", "5-10", "10-15", "15+"]),
        EditableField::with_label(ShortText, "Contact Number", true),
    ]
}

fn recruitment_fields() -> Vec<EditableField> {
    use FieldType::*;
    vec![
        EditableField::with_label(ShortText, "Full Name", true),
        EditableField::with_label(Email, "Email address", true),
        EditableField::with_label(Number, "WhatsApp Number", true).bounds(Some(0.0), None),
        EditableField::with_label(ShortText, "Enrollment Number", true),
        EditableField::with_label(Select, "Department/Branch", true)
            .choices(&["CSE", "IT", "ECE", "ME", "CE", "Aero", "Design", "Other"]),
        EditableField::with_label(Select, "Current Year of Study", true)
            .choices(&["1st Year", "2nd Year", "3rd Year"]),
        EditableField::with_label(ShortText, "Club Name & Role", true)
            .help("If you're not from any Club type *NA*"),
        EditableField::with_label(LongText, "Why do you want to join the Placement Cell?", true)
            .help("Describe your motivation and what you aim to achieve."),
        EditableField::with_label(LongText, "Relevant Experience", true)
            .help("Any previous leadership roles or event management experience."),
    ]
}
