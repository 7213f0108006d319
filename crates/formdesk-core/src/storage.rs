//! Persistent storage using redb.
//!
//! This module provides ACID-compliant storage for:
//! - Forms, with a unique slug index
//! - Form fields (keyed under their form)
//! - Responses (keyed under their form)
//! - Accounts, profiles and the current session
//!
//! Storage performs no access checks; see [`crate::backend`] for the
//! policy-enforcing layer.

use crate::error::FormError;
use crate::types::{FormId, FormRecord};
use parking_lot::RwLock;
use redb::{Database, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Arc;

// Submodules
mod accounts;
mod fields;
mod responses;

use accounts::{ACCOUNTS_TABLE, PROFILES_TABLE, SESSION_TABLE};
use fields::FIELDS_TABLE;
use responses::RESPONSES_TABLE;

pub use accounts::Account;

// Table definitions
const FORMS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("forms");
/// slug -> form id
const SLUGS_TABLE: TableDefinition<&str, &str> = TableDefinition::new("form_slugs");

/// Storage layer using redb for ACID-compliant persistence
#[derive(Clone)]
pub struct Storage {
    db: Arc<RwLock<Database>>,
}

/// Key of a row stored under its form: `<form ulid>/<row id>`
pub(crate) fn scoped_key(form_id: &FormId, id: &str) -> String {
    format!("{}/{}", form_id.to_string_repr(), id)
}

pub(crate) fn form_prefix(form_id: &FormId) -> String {
    format!("{}/", form_id.to_string_repr())
}

/// Keys starting with `prefix`, in key order
pub(crate) fn prefixed_keys<T>(table: &T, prefix: &str) -> Result<Vec<String>, FormError>
where
    T: ReadableTable<&'static str, &'static [u8]>,
{
    let mut keys = Vec::new();
    for entry in table.range(prefix..)? {
        let (key, _) = entry?;
        if !key.value().starts_with(prefix) {
            break;
        }
        keys.push(key.value().to_string());
    }
    Ok(keys)
}

/// Values whose keys start with `prefix`, in key order
pub(crate) fn prefixed_values<T>(table: &T, prefix: &str) -> Result<Vec<Vec<u8>>, FormError>
where
    T: ReadableTable<&'static str, &'static [u8]>,
{
    let mut values = Vec::new();
    for entry in table.range(prefix..)? {
        let (key, value) = entry?;
        if !key.value().starts_with(prefix) {
            break;
        }
        values.push(value.value().to_vec());
    }
    Ok(values)
}

impl Storage {
    /// Create a new storage instance at the given path.
    ///
    /// This will:
    /// - Create the database directory if it doesn't exist
    /// - Initialize the database file
    /// - Create all required tables
    pub fn new(path: impl AsRef<Path>) -> Result<Self, FormError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::create(path)?;

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(FORMS_TABLE)?;
            let _ = write_txn.open_table(SLUGS_TABLE)?;
            let _ = write_txn.open_table(FIELDS_TABLE)?;
            let _ = write_txn.open_table(RESPONSES_TABLE)?;
            let _ = write_txn.open_table(ACCOUNTS_TABLE)?;
            let _ = write_txn.open_table(PROFILES_TABLE)?;
            let _ = write_txn.open_table(SESSION_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self {
            db: Arc::new(RwLock::new(db)),
        })
    }

    /// Get a reference to the shared database handle
    pub fn db_handle(&self) -> Arc<RwLock<Database>> {
        self.db.clone()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Form Operations
    // ═══════════════════════════════════════════════════════════════════════

    /// Insert a new form and claim its slug.
    ///
    /// Fails with `SlugConflict` if another form already holds the slug;
    /// nothing is written in that case.
    pub fn insert_form(&self, form: &FormRecord) -> Result<(), FormError> {
        let db = self.db.read();
        let write_txn = db.begin_write()?;
        {
            let mut slugs = write_txn.open_table(SLUGS_TABLE)?;
            if slugs.get(form.slug.as_str())?.is_some() {
                return Err(FormError::SlugConflict(form.slug.clone()));
            }
            let id = form.id.to_string_repr();
            slugs.insert(form.slug.as_str(), id.as_str())?;

            let mut forms = write_txn.open_table(FORMS_TABLE)?;
            let data = serde_json::to_vec(form)?;
            forms.insert(id.as_str(), data.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Overwrite an existing form, moving its slug claim if the slug changed.
    pub fn update_form(&self, form: &FormRecord) -> Result<(), FormError> {
        let db = self.db.read();
        let write_txn = db.begin_write()?;
        {
            let mut forms = write_txn.open_table(FORMS_TABLE)?;
            let id = form.id.to_string_repr();
            let previous: FormRecord = match forms.get(id.as_str())? {
                Some(v) => serde_json::from_slice(v.value())?,
                None => return Err(FormError::FormNotFound(form.id.to_string())),
            };

            if previous.slug != form.slug {
                let mut slugs = write_txn.open_table(SLUGS_TABLE)?;
                let holder = slugs.get(form.slug.as_str())?.map(|v| v.value().to_string());
                if holder.is_some_and(|holder| holder != id) {
                    return Err(FormError::SlugConflict(form.slug.clone()));
                }
                slugs.remove(previous.slug.as_str())?;
                slugs.insert(form.slug.as_str(), id.as_str())?;
            }

            let data = serde_json::to_vec(form)?;
            forms.insert(id.as_str(), data.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Load a single form by ID.
    ///
    /// Returns `None` if no form with the given ID exists.
    pub fn load_form(&self, form_id: &FormId) -> Result<Option<FormRecord>, FormError> {
        let db = self.db.read();
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(FORMS_TABLE)?;
        let key = form_id.to_string_repr();

        match table.get(key.as_str())? {
            Some(v) => Ok(Some(serde_json::from_slice(v.value())?)),
            None => Ok(None),
        }
    }

    /// Resolve a slug to the form holding it
    pub fn form_id_by_slug(&self, slug: &str) -> Result<Option<FormId>, FormError> {
        let db = self.db.read();
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(SLUGS_TABLE)?;

        match table.get(slug)? {
            Some(v) => FormId::from_string(v.value())
                .map(Some)
                .map_err(|e| FormError::Storage(format!("corrupt slug index for '{slug}': {e}"))),
            None => Ok(None),
        }
    }

    pub fn slug_exists(&self, slug: &str) -> Result<bool, FormError> {
        Ok(self.form_id_by_slug(slug)?.is_some())
    }

    /// List every stored form
    pub fn list_forms(&self) -> Result<Vec<FormRecord>, FormError> {
        let db = self.db.read();
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(FORMS_TABLE)?;

        let mut forms = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            forms.push(serde_json::from_slice(value.value())?);
        }
        Ok(forms)
    }

    /// Delete a form together with its slug, fields and responses.
    ///
    /// Returns `false` if the form did not exist.
    pub fn delete_form(&self, form_id: &FormId) -> Result<bool, FormError> {
        let db = self.db.read();
        let write_txn = db.begin_write()?;
        let existed;
        {
            let mut forms = write_txn.open_table(FORMS_TABLE)?;
            let key = form_id.to_string_repr();
            let removed: Option<FormRecord> = match forms.remove(key.as_str())? {
                Some(v) => Some(serde_json::from_slice(v.value())?),
                None => None,
            };
            existed = removed.is_some();

            if let Some(form) = removed {
                let mut slugs = write_txn.open_table(SLUGS_TABLE)?;
                slugs.remove(form.slug.as_str())?;
            }

            let prefix = form_prefix(form_id);
            let mut fields = write_txn.open_table(FIELDS_TABLE)?;
            for key in prefixed_keys(&fields, &prefix)? {
                fields.remove(key.as_str())?;
            }
            let mut responses = write_txn.open_table(RESPONSES_TABLE)?;
            for key in prefixed_keys(&responses, &prefix)? {
                responses.remove(key.as_str())?;
            }
        }
        write_txn.commit()?;
        Ok(existed)
    }
}
