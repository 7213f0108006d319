//! Formdesk Engine - the main orchestrator
//!
//! The FormEngine coordinates:
//! - Storage behind the policy-enforcing [`Backend`]
//! - Authentication and the persisted session
//! - Form CRUD driven by the [`FormBuilder`]
//! - Public submission and the responses dashboard
//!
//! Every query runs as the currently signed-in user, or anonymously when
//! nobody is signed in.
//!
//! # Example
//!
//! ```ignore
//! use formdesk_core::{FieldType, FormBuilder, FormEngine};
//!
//! let mut engine = FormEngine::new("~/.formdesk/data").await?;
//! engine.sign_in("admin@example.com", "secret").await?;
//!
//! let mut builder = FormBuilder::new();
//! builder.set_title("Club Signup");
//! builder.add_field(FieldType::Email);
//! let saved = engine.save_form(&builder).await?;
//! ```

use std::path::Path;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::auth::{AuthEvent, AuthProvider, AuthUser};
use crate::backend::Backend;
use crate::builder::FormBuilder;
use crate::config::EngineConfig;
use crate::error::{FormError, FormResult};
use crate::policy::{self, Caller};
use crate::slug::{attempt_slug, random_suffix, slugify, CONFLICT_SUFFIX_LEN};
use crate::storage::Storage;
use crate::submission::prepare_submission;
use crate::types::{
    Answers, FieldId, FieldRecord, FormBundle, FormId, FormOverview, FormRecord, FormStatus,
    ResponseRecord, ResponsesBundle, Session, ThemeSettings, UserProfile,
};

/// Summary of an engine instance, for `formdesk info`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineInfo {
    pub data_dir: String,
    pub database: String,
    pub public_base_url: String,
    pub signed_in_as: Option<String>,
    pub form_count: usize,
}

pub struct FormEngine {
    config: EngineConfig,
    backend: Backend,
    auth: AuthProvider,
}

impl FormEngine {
    /// Create an engine with default settings in `data_dir`
    pub async fn new(data_dir: impl AsRef<Path>) -> FormResult<Self> {
        Self::with_config(EngineConfig::new(data_dir.as_ref())).await
    }

    /// Create an engine from explicit configuration
    ///
    /// Creates the data directory if needed, opens the database and restores
    /// any persisted, unexpired session.
    pub async fn with_config(config: EngineConfig) -> FormResult<Self> {
        info!(data_dir = ?config.data_dir, "Initializing FormEngine");
        std::fs::create_dir_all(&config.data_dir)?;

        let storage = Storage::new(config.database_path())?;
        let backend = Backend::new(storage);
        let mut auth = AuthProvider::new(backend.clone(), config.session_ttl);
        auth.restore()?;

        Ok(Self {
            config,
            backend,
            auth,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    pub fn caller(&self) -> Caller {
        self.auth.caller()
    }

    fn require_user(&self, action: &str) -> FormResult<Caller> {
        match self.caller() {
            Caller::Anonymous => Err(FormError::NotAuthenticated(action.to_string())),
            caller => Ok(caller),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Auth
    // ═══════════════════════════════════════════════════════════════════════

    pub async fn sign_up(
        &mut self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> FormResult<Session> {
        self.auth.sign_up(email, password, full_name)
    }

    pub async fn sign_in(&mut self, email: &str, password: &str) -> FormResult<Session> {
        self.auth.sign_in(email, password)
    }

    pub async fn sign_out(&mut self) -> FormResult<()> {
        self.auth.sign_out()
    }

    pub async fn refetch_profile(&mut self) -> FormResult<Option<UserProfile>> {
        Ok(self.auth.refetch_profile()?.cloned())
    }

    pub async fn update_profile(&mut self, full_name: Option<&str>) -> FormResult<UserProfile> {
        self.auth.update_profile(full_name)
    }

    pub fn user(&self) -> Option<AuthUser> {
        self.auth.user()
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.auth.profile()
    }

    pub fn session(&self) -> Option<&Session> {
        self.auth.session()
    }

    pub fn subscribe_auth(&self) -> tokio::sync::broadcast::Receiver<AuthEvent> {
        self.auth.subscribe()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Forms
    // ═══════════════════════════════════════════════════════════════════════

    /// The caller's own forms, most recently updated first, with response counts
    pub async fn forms_overview(&self) -> FormResult<Vec<FormOverview>> {
        let caller = self.require_user("view your forms")?;

        let mut forms: Vec<FormRecord> = self
            .backend
            .select_forms(caller)?
            .into_iter()
            .filter(|f| caller.owns(f))
            .collect();
        forms.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        forms
            .into_iter()
            .map(|form| {
                let response_count = self.backend.count_responses(caller, &form.id)?;
                Ok(FormOverview {
                    form,
                    response_count,
                })
            })
            .collect()
    }

    /// Create or update a form from builder state and rewrite its fields.
    ///
    /// New forms retry slug conflicts up to `slug_attempts` times with a
    /// random suffix; any other error is returned immediately.
    pub async fn save_form(&self, builder: &FormBuilder) -> FormResult<FormBundle> {
        builder.validate()?;

        let now = Utc::now();
        let description = builder.description.trim();
        let theme = ThemeSettings {
            preset: Some(builder.theme_preset.clone()),
            deadline: builder.deadline,
        };
        let caller = self.caller();

        let form = match builder.id {
            Some(form_id) => {
                let existing = self
                    .backend
                    .select_form(caller, &form_id)?
                    .ok_or_else(|| FormError::FormNotFound(form_id.to_string()))?;
                let payload = FormRecord {
                    title: builder.title.trim().to_string(),
                    description: (!description.is_empty()).then(|| description.to_string()),
                    slug: builder.effective_slug(),
                    status: builder.status,
                    is_public: builder.is_public,
                    theme,
                    updated_at: now,
                    ..existing
                };
                let updated = self.backend.update_form(caller, &payload)?;
                info!(%form_id, slug = %updated.slug, "Form updated");
                updated
            }
            None => {
                let caller = self.require_user("create a form")?;
                let owner_id = caller
                    .user_id()
                    .ok_or_else(|| FormError::NotAuthenticated("create a form".into()))?;
                let payload = FormRecord {
                    id: FormId::new(),
                    owner_id,
                    title: builder.title.trim().to_string(),
                    description: (!description.is_empty()).then(|| description.to_string()),
                    slug: builder.effective_slug(),
                    is_public: builder.is_public,
                    status: builder.status,
                    theme,
                    created_at: now,
                    updated_at: now,
                };
                let inserted = self.insert_with_slug_retry(caller, payload)?;
                info!(form_id = %inserted.id, slug = %inserted.slug, "Form created");
                inserted
            }
        };

        let fields = builder.field_records(form.id, now);
        self.backend.replace_fields(caller, &form.id, &fields)?;
        debug!(form_id = %form.id, count = fields.len(), "Fields replaced");

        Ok(FormBundle { form, fields })
    }

    fn insert_with_slug_retry(&self, caller: Caller, payload: FormRecord) -> FormResult<FormRecord> {
        let base = payload.slug.clone();
        let attempts = self.config.slug_attempts.max(1) as usize;
        let mut last_conflict = None;

        for attempt in 0..attempts {
            let candidate = FormRecord {
                slug: attempt_slug(&base, attempt),
                ..payload.clone()
            };
            match self.backend.insert_form(caller, &candidate) {
                Ok(()) => return Ok(candidate),
                Err(FormError::SlugConflict(slug)) => {
                    debug!(%slug, attempt, "Slug taken, retrying");
                    last_conflict = Some(FormError::SlugConflict(slug));
                }
                Err(e) => return Err(e),
            }
        }

        warn!(slug = %base, attempts, "Giving up on slug after repeated conflicts");
        Err(last_conflict.unwrap_or(FormError::SlugConflict(base)))
    }

    /// Delete a form with its fields and responses. Owner only.
    pub async fn delete_form(&self, form_id: &FormId) -> FormResult<()> {
        self.backend.delete_form(self.caller(), form_id)?;
        info!(%form_id, "Form deleted");
        Ok(())
    }

    /// Copy a form and its fields as a new draft. Responses are not copied.
    pub async fn duplicate_form(&self, form_id: &FormId) -> FormResult<FormBundle> {
        let caller = self.require_user("duplicate a form")?;
        let original = self
            .backend
            .select_form(caller, form_id)?
            .ok_or_else(|| FormError::FormNotFound(form_id.to_string()))?;
        let source_fields = self.backend.select_fields(caller, form_id)?;

        let now = Utc::now();
        let base = slugify(&format!("{}-copy", original.slug));
        let payload = FormRecord {
            id: FormId::new(),
            owner_id: original.owner_id,
            title: format!("{} (Copy)", original.title),
            description: original.description.clone(),
            slug: format!("{}-{}", base, random_suffix(CONFLICT_SUFFIX_LEN)),
            is_public: original.is_public,
            status: FormStatus::Draft,
            theme: original.theme.clone(),
            created_at: now,
            updated_at: now,
        };
        let copy = self.insert_with_slug_retry(caller, payload)?;

        let fields: Vec<FieldRecord> = source_fields
            .into_iter()
            .map(|field| FieldRecord {
                id: FieldId::new(),
                form_id: copy.id,
                created_at: now,
                ..field
            })
            .collect();
        self.backend.replace_fields(caller, &copy.id, &fields)?;

        info!(source = %form_id, copy = %copy.id, "Form duplicated");
        Ok(FormBundle { form: copy, fields })
    }

    /// Form and ordered fields for editing
    pub async fn form_builder_data(&self, form_id: &FormId) -> FormResult<FormBundle> {
        let caller = self.caller();
        let form = self
            .backend
            .select_form(caller, form_id)?
            .ok_or_else(|| FormError::FormNotFound(form_id.to_string()))?;
        let fields = self.backend.select_fields(caller, form_id)?;
        Ok(FormBundle { form, fields })
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Public submission
    // ═══════════════════════════════════════════════════════════════════════

    /// Resolve a public link.
    ///
    /// Signed-out callers only ever see live, public forms; an owner can
    /// open their own drafts and private forms.
    pub async fn public_form_by_slug(&self, slug: &str) -> FormResult<FormBundle> {
        let caller = self.caller();
        let form = self
            .backend
            .select_form_by_slug(caller, slug)?
            .filter(|f| caller.is_authenticated() || f.is_publicly_accessible())
            .ok_or_else(|| FormError::FormNotFound(slug.to_string()))?;

        policy::check_client_visibility(caller, &form)?;

        let fields = self.backend.select_fields(caller, &form.id)?;
        Ok(FormBundle { form, fields })
    }

    /// Insert a prepared response. Runs anonymously regardless of who is
    /// signed in, so only live, public forms accept it.
    pub async fn submit_response(
        &self,
        form_id: &FormId,
        answers: Answers,
        respondent_email: Option<String>,
    ) -> FormResult<ResponseRecord> {
        // Server-side deadline check, read with the same anonymous caller
        // the insert runs as
        if let Some(form) = self.backend.select_form(Caller::Anonymous, form_id)? {
            if form.is_deadline_passed(Utc::now()) {
                return Err(FormError::SubmissionClosed);
            }
        }

        let response = ResponseRecord::new(*form_id, answers, respondent_email);
        self.backend.insert_response(Caller::Anonymous, &response)?;
        info!(%form_id, response_id = %response.id, "Response submitted");
        Ok(response)
    }

    /// Full public flow: fetch by slug, check the deadline, validate,
    /// normalize and insert
    pub async fn submit_public(&self, slug: &str, answers: &Answers) -> FormResult<ResponseRecord> {
        let bundle = self.public_form_by_slug(slug).await?;
        let submission = prepare_submission(&bundle.form, &bundle.fields, answers, Utc::now())?;
        self.submit_response(
            &submission.form_id,
            submission.answers,
            submission.respondent_email,
        )
        .await
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Responses
    // ═══════════════════════════════════════════════════════════════════════

    /// Form, ordered fields and responses newest first. Owner only.
    pub async fn responses_bundle(&self, form_id: &FormId) -> FormResult<ResponsesBundle> {
        let caller = self.caller();
        let form = self
            .backend
            .select_form(caller, form_id)?
            .ok_or_else(|| FormError::FormNotFound(form_id.to_string()))?;
        if !policy::can_read_responses(caller, &form) {
            return Err(FormError::Unauthorized(format!(
                "only the owner can view responses to form {}",
                form_id
            )));
        }
        let fields = self.backend.select_fields(caller, form_id)?;
        let responses = self.backend.select_responses(caller, form_id)?;
        Ok(ResponsesBundle {
            form,
            fields,
            responses,
        })
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Info
    // ═══════════════════════════════════════════════════════════════════════

    pub async fn info(&self) -> FormResult<EngineInfo> {
        let caller = self.caller();
        let form_count = match caller {
            Caller::Anonymous => 0,
            caller => self
                .backend
                .select_forms(caller)?
                .iter()
                .filter(|f| caller.owns(f))
                .count(),
        };
        Ok(EngineInfo {
            data_dir: self.config.data_dir.display().to_string(),
            database: self.config.database_path().display().to_string(),
            public_base_url: self.config.public_base_url.clone(),
            signed_in_as: self.auth.user().map(|u| u.email),
            form_count,
        })
    }

    /// Absolute public link for a form
    pub fn public_url(&self, form: &FormRecord) -> String {
        self.config.public_url(&form.slug)
    }
}
