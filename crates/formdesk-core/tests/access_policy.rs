//! Row-level access tests across owners, other users and anonymous callers
//!
//! One engine switches identities by signing in and out, the way a shared
//! workstation would.

use formdesk_core::{Answers, FieldType, FormBuilder, FormEngine, FormError, FormStatus};
use tempfile::tempdir;

const OWNER: &str = "owner@example.com";
const OTHER: &str = "other@example.com";
const PASSWORD: &str = "secret1";

async fn engine_with_two_users(dir: &std::path::Path) -> FormEngine {
    let mut engine = FormEngine::new(dir).await.unwrap();
    engine.sign_up(OTHER, PASSWORD, None).await.unwrap();
    engine.sign_out().await.unwrap();
    engine.sign_up(OWNER, PASSWORD, None).await.unwrap();
    engine
}

fn builder(title: &str, status: FormStatus, is_public: bool) -> FormBuilder {
    let mut builder = FormBuilder::new();
    builder.set_title(title);
    builder.status = status;
    builder.is_public = is_public;
    let id = builder.add_field(FieldType::ShortText);
    builder.update_field(&id, |f| f.required = false).unwrap();
    builder
}

#[tokio::test]
async fn test_owner_sees_own_draft_by_slug() {
    let dir = tempdir().unwrap();
    let engine = engine_with_two_users(dir.path()).await;
    engine
        .save_form(&builder("Draft Form", FormStatus::Draft, false))
        .await
        .unwrap();

    let bundle = engine.public_form_by_slug("draft-form").await.unwrap();
    assert_eq!(bundle.form.status, FormStatus::Draft);
    assert_eq!(bundle.fields.len(), 1);
}

#[tokio::test]
async fn test_draft_and_private_hidden_from_others() {
    let dir = tempdir().unwrap();
    let mut engine = engine_with_two_users(dir.path()).await;
    let draft = engine
        .save_form(&builder("Draft Form", FormStatus::Draft, true))
        .await
        .unwrap();
    engine
        .save_form(&builder("Private Form", FormStatus::Live, false))
        .await
        .unwrap();

    engine.sign_out().await.unwrap();
    for slug in ["draft-form", "private-form"] {
        assert!(matches!(
            engine.public_form_by_slug(slug).await,
            Err(FormError::FormNotFound(_))
        ));
    }

    engine.sign_in(OTHER, PASSWORD).await.unwrap();
    assert!(engine.public_form_by_slug("draft-form").await.is_err());
    assert!(matches!(
        engine.form_builder_data(&draft.form.id).await,
        Err(FormError::FormNotFound(_))
    ));
    assert!(engine.forms_overview().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_other_user_cannot_modify_live_form() {
    let dir = tempdir().unwrap();
    let mut engine = engine_with_two_users(dir.path()).await;
    let live = engine
        .save_form(&builder("Live Form", FormStatus::Live, true))
        .await
        .unwrap();

    engine.sign_out().await.unwrap();
    engine.sign_in(OTHER, PASSWORD).await.unwrap();

    // Readable, but not writable
    let bundle = engine.form_builder_data(&live.form.id).await.unwrap();
    let mut hijack = FormBuilder::from_records(&bundle.form, &bundle.fields);
    hijack.set_title("Hijacked");
    assert!(matches!(
        engine.save_form(&hijack).await,
        Err(FormError::Unauthorized(_))
    ));
    assert!(matches!(
        engine.delete_form(&live.form.id).await,
        Err(FormError::Unauthorized(_))
    ));
    assert!(matches!(
        engine.duplicate_form(&live.form.id).await,
        Err(FormError::Unauthorized(_))
    ));
    assert!(matches!(
        engine.responses_bundle(&live.form.id).await,
        Err(FormError::Unauthorized(_))
    ));

    // The other user's own overview does not list it
    assert!(engine.forms_overview().await.unwrap().is_empty());

    engine.sign_out().await.unwrap();
    engine.sign_in(OWNER, PASSWORD).await.unwrap();
    let reloaded = engine.form_builder_data(&live.form.id).await.unwrap();
    assert_eq!(reloaded.form.title, "Live Form");
}

#[tokio::test]
async fn test_responses_only_accepted_for_live_public_forms() {
    let dir = tempdir().unwrap();
    let engine = engine_with_two_users(dir.path()).await;

    let closed = engine
        .save_form(&builder("Closed Form", FormStatus::Closed, true))
        .await
        .unwrap();
    let private = engine
        .save_form(&builder("Private Form", FormStatus::Live, false))
        .await
        .unwrap();
    let live = engine
        .save_form(&builder("Live Form", FormStatus::Live, true))
        .await
        .unwrap();

    // Response inserts run anonymously even for the signed-in owner
    for form in [&closed, &private] {
        assert!(matches!(
            engine.submit_response(&form.form.id, Answers::new(), None).await,
            Err(FormError::Unauthorized(_))
        ));
    }
    engine
        .submit_response(&live.form.id, Answers::new(), None)
        .await
        .unwrap();

    let overview = engine.forms_overview().await.unwrap();
    let counts: Vec<_> = overview
        .iter()
        .map(|o| (o.form.title.as_str(), o.response_count))
        .collect();
    assert!(counts.contains(&("Live Form", 1)));
    assert!(counts.contains(&("Closed Form", 0)));
}

#[tokio::test]
async fn test_anonymous_overview_requires_login() {
    let dir = tempdir().unwrap();
    let mut engine = engine_with_two_users(dir.path()).await;
    engine.sign_out().await.unwrap();

    let err = engine.forms_overview().await.unwrap_err();
    assert_eq!(err.to_string(), "You must be logged in to view your forms");
    assert!(matches!(
        engine.update_profile(Some("Nobody")).await,
        Err(FormError::NotAuthenticated(_))
    ));
}
