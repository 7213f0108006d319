//! Policy-enforcing query layer
//!
//! Every query runs as a [`Caller`]. Reads silently drop rows the caller may
//! not see, the way row-level security does; writes against a visible row
//! the caller may not modify fail with `Unauthorized`.

use tracing::{debug, warn};

use crate::error::{FormError, FormResult};
use crate::policy::{self, Caller};
use crate::storage::Storage;
use crate::types::{FieldRecord, FormId, FormRecord, ResponseRecord, UserId, UserProfile};

#[derive(Clone)]
pub struct Backend {
    storage: Storage,
}

impl Backend {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    // ═══════════════════════════════════════════════════════════════════════
    // forms
    // ═══════════════════════════════════════════════════════════════════════

    /// Every form the caller can read
    pub fn select_forms(&self, caller: Caller) -> FormResult<Vec<FormRecord>> {
        Ok(self
            .storage
            .list_forms()?
            .into_iter()
            .filter(|f| policy::can_read_form(caller, f))
            .collect())
    }

    pub fn select_form(&self, caller: Caller, form_id: &FormId) -> FormResult<Option<FormRecord>> {
        Ok(self
            .storage
            .load_form(form_id)?
            .filter(|f| policy::can_read_form(caller, f)))
    }

    pub fn select_form_by_slug(&self, caller: Caller, slug: &str) -> FormResult<Option<FormRecord>> {
        match self.storage.form_id_by_slug(slug)? {
            Some(id) => self.select_form(caller, &id),
            None => Ok(None),
        }
    }

    pub fn insert_form(&self, caller: Caller, form: &FormRecord) -> FormResult<()> {
        if !caller.is_authenticated() {
            return Err(FormError::NotAuthenticated("create forms".into()));
        }
        if !policy::can_insert_form(caller, form) {
            warn!(form_id = %form.id, "Rejected form insert for another owner");
            return Err(FormError::Unauthorized(
                "new row violates row-level security policy for forms".into(),
            ));
        }
        self.storage.insert_form(form)
    }

    /// Load a form the caller is about to modify
    fn writable_form(&self, caller: Caller, form_id: &FormId) -> FormResult<FormRecord> {
        let form = self
            .select_form(caller, form_id)?
            .ok_or_else(|| FormError::FormNotFound(form_id.to_string()))?;
        if !policy::can_write_form(caller, &form) {
            return Err(FormError::Unauthorized(format!(
                "only the owner can modify form {}",
                form_id
            )));
        }
        Ok(form)
    }

    /// Update a form row. Owner and creation time are kept from the stored row.
    pub fn update_form(&self, caller: Caller, form: &FormRecord) -> FormResult<FormRecord> {
        let existing = self.writable_form(caller, &form.id)?;
        let updated = FormRecord {
            owner_id: existing.owner_id,
            created_at: existing.created_at,
            ..form.clone()
        };
        self.storage.update_form(&updated)?;
        Ok(updated)
    }

    pub fn delete_form(&self, caller: Caller, form_id: &FormId) -> FormResult<()> {
        self.writable_form(caller, form_id)?;
        self.storage.delete_form(form_id)?;
        debug!(%form_id, "Form row deleted with its fields and responses");
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // form_fields
    // ═══════════════════════════════════════════════════════════════════════

    /// Fields of a readable form; empty when the form is not visible
    pub fn select_fields(&self, caller: Caller, form_id: &FormId) -> FormResult<Vec<FieldRecord>> {
        match self.storage.load_form(form_id)? {
            Some(form) if policy::can_read_fields(caller, &form) => {
                self.storage.list_fields(form_id)
            }
            _ => Ok(Vec::new()),
        }
    }

    pub fn replace_fields(
        &self,
        caller: Caller,
        form_id: &FormId,
        fields: &[FieldRecord],
    ) -> FormResult<()> {
        let form = self.writable_form(caller, form_id)?;
        if !policy::can_write_fields(caller, &form) {
            return Err(FormError::Unauthorized(format!(
                "only the owner can edit fields of form {}",
                form_id
            )));
        }
        if fields.iter().any(|f| f.form_id != *form_id) {
            return Err(FormError::InvalidInput(
                "field rows must belong to the form being saved".into(),
            ));
        }
        self.storage.replace_fields(form_id, fields)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // responses
    // ═══════════════════════════════════════════════════════════════════════

    pub fn insert_response(&self, caller: Caller, response: &ResponseRecord) -> FormResult<()> {
        let allowed = self
            .storage
            .load_form(&response.form_id)?
            .is_some_and(|form| policy::can_insert_response(caller, &form));
        if !allowed {
            warn!(form_id = %response.form_id, "Rejected response insert");
            return Err(FormError::Unauthorized(
                "new row violates row-level security policy for responses".into(),
            ));
        }
        self.storage.insert_response(response)
    }

    /// Responses newest first; empty unless the caller owns the form
    pub fn select_responses(
        &self,
        caller: Caller,
        form_id: &FormId,
    ) -> FormResult<Vec<ResponseRecord>> {
        match self.storage.load_form(form_id)? {
            Some(form) if policy::can_read_responses(caller, &form) => {
                self.storage.list_responses(form_id)
            }
            _ => Ok(Vec::new()),
        }
    }

    pub fn count_responses(&self, caller: Caller, form_id: &FormId) -> FormResult<usize> {
        match self.storage.load_form(form_id)? {
            Some(form) if policy::can_read_responses(caller, &form) => {
                self.storage.count_responses(form_id)
            }
            _ => Ok(0),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // profiles
    // ═══════════════════════════════════════════════════════════════════════

    pub fn select_profile(&self, caller: Caller, user_id: &UserId) -> FormResult<Option<UserProfile>> {
        if !policy::can_access_profile(caller, *user_id) {
            return Ok(None);
        }
        self.storage.load_profile(user_id)
    }

    pub fn update_profile(&self, caller: Caller, profile: &UserProfile) -> FormResult<()> {
        if !policy::can_access_profile(caller, profile.id) {
            return Err(FormError::Unauthorized("profiles can only be edited by their owner".into()));
        }
        self.storage.save_profile(profile)
    }
}
