//! End-to-end tests for the FormEngine
//!
//! Each test runs a full admin/respondent cycle against a temporary data
//! directory: sign up, build and publish a form, submit responses and read
//! them back through the dashboard helpers.

use chrono::{Duration, Utc};
use formdesk_core::dashboard::{answer_text, ResponseFilter};
use formdesk_core::{
    export_filename, filter_responses, responses_to_csv, template_by_key, AnswerValue, Answers,
    EngineConfig, FieldType, FormBuilder, FormEngine, FormError, FormStatus,
};
use tempfile::tempdir;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter("formdesk_core=debug")
        .try_init()
        .ok();
}

async fn signed_in_engine(dir: &std::path::Path) -> FormEngine {
    let mut engine = FormEngine::new(dir).await.unwrap();
    engine
        .sign_up("admin@example.com", "secret1", Some("Admin"))
        .await
        .unwrap();
    engine
}

/// A live survey with a required name, an email and a checkbox group
fn survey_builder() -> FormBuilder {
    let mut builder = FormBuilder::new();
    builder.set_title("Club Survey");
    builder.status = FormStatus::Live;

    let name = builder.add_field(FieldType::ShortText);
    builder
        .update_field(&name, |f| f.label = "Full Name".into())
        .unwrap();
    let email = builder.add_field(FieldType::Email);
    builder
        .update_field(&email, |f| {
            f.label = "Email".into();
            f.required = false;
        })
        .unwrap();
    let roles = builder.add_field(FieldType::Checkbox);
    builder
        .update_field(&roles, |f| {
            f.label = "Roles".into();
            f.choices = vec!["Ops".into(), "Design".into()];
        })
        .unwrap();
    builder
}

fn answers_for(fields: &[formdesk_core::FieldRecord], values: &[(&str, AnswerValue)]) -> Answers {
    let mut answers = Answers::new();
    for (label, value) in values {
        let field = fields.iter().find(|f| f.label == *label).unwrap();
        answers.insert(field.answer_key(), value.clone());
    }
    answers
}

#[tokio::test]
async fn test_full_submission_cycle() {
    init_tracing();
    let dir = tempdir().unwrap();
    let mut engine = signed_in_engine(dir.path()).await;

    let saved = engine.save_form(&survey_builder()).await.unwrap();
    assert_eq!(saved.form.slug, "club-survey");
    engine.sign_out().await.unwrap();

    // Respondent flow, signed out
    let public = engine.public_form_by_slug("club-survey").await.unwrap();
    assert_eq!(public.fields.len(), 3);

    let answers = answers_for(
        &public.fields,
        &[
            ("Full Name", "  Ada Lovelace ".into()),
            ("Email", " ada@uni.edu ".into()),
            ("Roles", vec!["Ops".to_string()].into()),
        ],
    );
    let response = engine.submit_public("club-survey", &answers).await.unwrap();
    assert_eq!(response.respondent_email.as_deref(), Some("ada@uni.edu"));

    // Anonymous callers cannot read responses
    assert!(engine.responses_bundle(&saved.form.id).await.is_err());

    engine.sign_in("admin@example.com", "secret1").await.unwrap();
    let bundle = engine.responses_bundle(&saved.form.id).await.unwrap();
    assert_eq!(bundle.responses.len(), 1);

    let name_field = &bundle.fields[0];
    assert_eq!(answer_text(name_field, &bundle.responses[0]), "Ada Lovelace");

    let overview = engine.forms_overview().await.unwrap();
    assert_eq!(overview.len(), 1);
    assert_eq!(overview[0].response_count, 1);
}

#[tokio::test]
async fn test_validation_errors_block_insert() {
    let dir = tempdir().unwrap();
    let mut engine = signed_in_engine(dir.path()).await;
    let saved = engine.save_form(&survey_builder()).await.unwrap();
    engine.sign_out().await.unwrap();

    let answers = answers_for(&saved.fields, &[("Email", "nope".into())]);
    match engine.submit_public("club-survey", &answers).await {
        Err(FormError::Validation { errors }) => {
            // required name and checkbox group, malformed email
            assert_eq!(errors.len(), 3);
            assert_eq!(
                errors[&saved.fields[1].answer_key()],
                "Enter a valid email address."
            );
        }
        other => panic!("expected validation failure, got {other:?}"),
    }

    engine.sign_in("admin@example.com", "secret1").await.unwrap();
    let bundle = engine.responses_bundle(&saved.form.id).await.unwrap();
    assert!(bundle.responses.is_empty());
}

#[tokio::test]
async fn test_deadline_closes_form() {
    let dir = tempdir().unwrap();
    let mut engine = signed_in_engine(dir.path()).await;

    let mut builder = survey_builder();
    builder.deadline = Some(Utc::now() - Duration::minutes(5));
    let saved = engine.save_form(&builder).await.unwrap();
    engine.sign_out().await.unwrap();

    let answers = answers_for(
        &saved.fields,
        &[
            ("Full Name", "Ada".into()),
            ("Roles", vec!["Ops".to_string()].into()),
        ],
    );
    assert!(matches!(
        engine.submit_public("club-survey", &answers).await,
        Err(FormError::SubmissionClosed)
    ));
    assert!(matches!(
        engine
            .submit_response(&saved.form.id, Answers::new(), None)
            .await,
        Err(FormError::SubmissionClosed)
    ));
}

#[tokio::test]
async fn test_slug_conflicts_get_suffix() {
    let dir = tempdir().unwrap();
    let engine = signed_in_engine(dir.path()).await;

    let first = engine.save_form(&survey_builder()).await.unwrap();
    let second = engine.save_form(&survey_builder()).await.unwrap();

    assert_eq!(first.form.slug, "club-survey");
    assert!(second.form.slug.starts_with("club-survey-"));
    assert_eq!(second.form.slug.len(), "club-survey-".len() + 4);
}

#[tokio::test]
async fn test_slug_conflict_surfaces_when_attempts_run_out() {
    let dir = tempdir().unwrap();
    let config = EngineConfig {
        slug_attempts: 1,
        ..EngineConfig::new(dir.path())
    };
    let mut engine = FormEngine::with_config(config).await.unwrap();
    engine
        .sign_up("admin@example.com", "secret1", None)
        .await
        .unwrap();

    engine.save_form(&survey_builder()).await.unwrap();
    match engine.save_form(&survey_builder()).await {
        Err(FormError::SlugConflict(slug)) => assert_eq!(slug, "club-survey"),
        other => panic!("expected slug conflict, got {other:?}"),
    }
    assert_eq!(engine.forms_overview().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_non_conflict_insert_errors_are_not_retried() {
    let dir = tempdir().unwrap();
    let mut engine = signed_in_engine(dir.path()).await;
    let saved = engine.save_form(&survey_builder()).await.unwrap();
    engine.sign_out().await.unwrap();

    engine
        .sign_up("other@example.com", "secret1", None)
        .await
        .unwrap();
    assert!(matches!(
        engine.duplicate_form(&saved.form.id).await,
        Err(FormError::Unauthorized(_))
    ));

    engine.sign_out().await.unwrap();
    engine.sign_in("admin@example.com", "secret1").await.unwrap();
    assert_eq!(engine.forms_overview().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_deadline_check_only_applies_to_public_forms() {
    let dir = tempdir().unwrap();
    let engine = signed_in_engine(dir.path()).await;

    let mut builder = survey_builder();
    builder.is_public = false;
    builder.deadline = Some(Utc::now() - Duration::minutes(5));
    let saved = engine.save_form(&builder).await.unwrap();

    // A private form is invisible to the anonymous insert, so the policy
    // rejects it before any deadline applies
    assert!(matches!(
        engine
            .submit_response(&saved.form.id, Answers::new(), None)
            .await,
        Err(FormError::Unauthorized(_))
    ));
}

#[tokio::test]
async fn test_update_rewrites_fields_and_keeps_ids() {
    let dir = tempdir().unwrap();
    let engine = signed_in_engine(dir.path()).await;
    let saved = engine.save_form(&survey_builder()).await.unwrap();

    let mut builder = FormBuilder::from_records(&saved.form, &saved.fields);
    let last = builder.fields[2].local_id.clone();
    builder.remove_field(&last);
    builder.add_field(FieldType::Number);
    builder.set_title("Renamed Survey");
    let updated = engine.save_form(&builder).await.unwrap();

    // Saved forms keep their slug when retitled
    assert_eq!(updated.form.slug, "club-survey");
    assert_eq!(updated.form.title, "Renamed Survey");
    assert_eq!(updated.fields.len(), 3);
    assert_eq!(updated.fields[0].id, saved.fields[0].id);
    assert_eq!(updated.fields[1].id, saved.fields[1].id);
    assert_ne!(updated.fields[2].id, saved.fields[2].id);
    let orders: Vec<u32> = updated.fields.iter().map(|f| f.sort_order).collect();
    assert_eq!(orders, vec![0, 1, 2]);

    let reloaded = engine.form_builder_data(&saved.form.id).await.unwrap();
    assert_eq!(reloaded.fields, updated.fields);
}

#[tokio::test]
async fn test_duplicate_form() {
    let dir = tempdir().unwrap();
    let mut engine = signed_in_engine(dir.path()).await;
    let saved = engine.save_form(&survey_builder()).await.unwrap();

    engine.sign_out().await.unwrap();
    let answers = answers_for(
        &saved.fields,
        &[
            ("Full Name", "Ada".into()),
            ("Roles", vec!["Ops".to_string()].into()),
        ],
    );
    engine.submit_public("club-survey", &answers).await.unwrap();
    engine.sign_in("admin@example.com", "secret1").await.unwrap();

    let copy = engine.duplicate_form(&saved.form.id).await.unwrap();
    assert_eq!(copy.form.title, "Club Survey (Copy)");
    assert_eq!(copy.form.status, FormStatus::Draft);
    assert!(copy.form.slug.starts_with("club-survey-copy-"));
    assert_eq!(copy.fields.len(), saved.fields.len());
    assert!(copy.fields.iter().all(|f| f.form_id == copy.form.id));

    let copy_responses = engine.responses_bundle(&copy.form.id).await.unwrap();
    assert!(copy_responses.responses.is_empty());
}

#[tokio::test]
async fn test_delete_form_cascades() {
    let dir = tempdir().unwrap();
    let engine = signed_in_engine(dir.path()).await;
    let saved = engine.save_form(&survey_builder()).await.unwrap();

    engine.delete_form(&saved.form.id).await.unwrap();
    assert!(matches!(
        engine.form_builder_data(&saved.form.id).await,
        Err(FormError::FormNotFound(_))
    ));
    assert!(engine.forms_overview().await.unwrap().is_empty());
    assert!(engine.public_form_by_slug("club-survey").await.is_err());
}

#[tokio::test]
async fn test_overview_newest_first() {
    let dir = tempdir().unwrap();
    let engine = signed_in_engine(dir.path()).await;

    let mut older = FormBuilder::new();
    older.set_title("Older");
    let older = engine.save_form(&older).await.unwrap();
    let mut newer = FormBuilder::new();
    newer.set_title("Newer");
    engine.save_form(&newer).await.unwrap();

    // Touching the older form moves it to the top
    let touched = FormBuilder::from_records(&older.form, &older.fields);
    engine.save_form(&touched).await.unwrap();

    let titles: Vec<_> = engine
        .forms_overview()
        .await
        .unwrap()
        .into_iter()
        .map(|o| o.form.title)
        .collect();
    assert_eq!(titles, vec!["Older", "Newer"]);
}

#[tokio::test]
async fn test_template_form_export() {
    let dir = tempdir().unwrap();
    let mut engine = signed_in_engine(dir.path()).await;

    let mut builder = FormBuilder::new();
    assert!(builder.apply_template(template_by_key("recruitment").unwrap()));
    builder.status = FormStatus::Live;
    let saved = engine.save_form(&builder).await.unwrap();
    assert_eq!(saved.form.slug, "placement-cell-member-recruitment");

    engine.sign_out().await.unwrap();
    let mut answers = Answers::new();
    for field in &saved.fields {
        let value: AnswerValue = match field.field_type {
            FieldType::Email => "ada@uni.edu".into(),
            FieldType::Number => "9876543210".into(),
            FieldType::Select => field.choices()[0].clone().into(),
            _ => "Line one\nline \"two\"".into(),
        };
        answers.insert(field.answer_key(), value);
    }
    engine
        .submit_public(&saved.form.slug, &answers)
        .await
        .unwrap();

    engine.sign_in("admin@example.com", "secret1").await.unwrap();
    let bundle = engine.responses_bundle(&saved.form.id).await.unwrap();
    let kept = filter_responses(
        &bundle.fields,
        &bundle.responses,
        &ResponseFilter {
            search: Some("ADA@".into()),
            ..Default::default()
        },
    );
    assert_eq!(kept.len(), 1);

    let csv = responses_to_csv(&bundle.fields, kept);
    let lines: Vec<_> = csv.split('\n').collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("\"submitted_at\",\"Full Name\",\"Email address\""));
    assert!(lines[1].contains("\"Line one line \"\"two\"\"\""));
    assert!(lines[1].contains("\"9876543210\""));
    assert_eq!(
        export_filename(&bundle.form.title),
        "placement-cell-member-recruitment-2026-responses.csv"
    );
}

#[tokio::test]
async fn test_profile_roundtrip() {
    let dir = tempdir().unwrap();
    let mut engine = signed_in_engine(dir.path()).await;
    assert_eq!(
        engine.profile().and_then(|p| p.full_name.as_deref()),
        Some("Admin")
    );

    engine.update_profile(Some("Ada")).await.unwrap();
    let refreshed = engine.refetch_profile().await.unwrap().unwrap();
    assert_eq!(refreshed.full_name.as_deref(), Some("Ada"));
    assert_eq!(refreshed.role, "admin");
}
