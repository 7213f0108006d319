//! Account Storage - credentials, profiles and the persisted session
//!
//! Accounts are keyed by normalized email, profiles by user id. The session
//! table holds at most one row, the session of whoever last signed in on
//! this data directory.

use chrono::{DateTime, Utc};
use redb::{ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};

use crate::error::FormError;
use crate::types::{Session, UserId, UserProfile};

use super::Storage;

pub(crate) const ACCOUNTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("accounts");
pub(crate) const PROFILES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("profiles");
pub(crate) const SESSION_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("session");

const CURRENT_SESSION_KEY: &str = "current";

/// Credentials for a user account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub user_id: UserId,
    pub email: String,
    /// Argon2 PHC string
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl Storage {
    /// Create an account together with its profile row.
    ///
    /// Fails with `EmailTaken` if the email is already registered.
    pub fn insert_account(&self, account: &Account, profile: &UserProfile) -> Result<(), FormError> {
        let db = self.db_handle();
        let db_guard = db.read();
        let write_txn = db_guard.begin_write()?;
        {
            let mut accounts = write_txn.open_table(ACCOUNTS_TABLE)?;
            if accounts.get(account.email.as_str())?.is_some() {
                return Err(FormError::EmailTaken(account.email.clone()));
            }
            let data = serde_json::to_vec(account)?;
            accounts.insert(account.email.as_str(), data.as_slice())?;

            let mut profiles = write_txn.open_table(PROFILES_TABLE)?;
            let key = profile.id.to_string_repr();
            let data = serde_json::to_vec(profile)?;
            profiles.insert(key.as_str(), data.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Look up an account by (normalized) email
    pub fn load_account(&self, email: &str) -> Result<Option<Account>, FormError> {
        let db = self.db_handle();
        let db_guard = db.read();
        let read_txn = db_guard.begin_read()?;
        let table = read_txn.open_table(ACCOUNTS_TABLE)?;

        if let Some(data) = table.get(email)? {
            Ok(Some(serde_json::from_slice(data.value())?))
        } else {
            Ok(None)
        }
    }

    /// Save a profile, overwriting any existing row for the user
    pub fn save_profile(&self, profile: &UserProfile) -> Result<(), FormError> {
        let db = self.db_handle();
        let db_guard = db.read();
        let write_txn = db_guard.begin_write()?;
        {
            let mut table = write_txn.open_table(PROFILES_TABLE)?;
            let key = profile.id.to_string_repr();
            let data = serde_json::to_vec(profile)?;
            table.insert(key.as_str(), data.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Load a profile by user id
    ///
    /// Returns `None` if no profile exists for the user.
    pub fn load_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, FormError> {
        let db = self.db_handle();
        let db_guard = db.read();
        let read_txn = db_guard.begin_read()?;
        let table = read_txn.open_table(PROFILES_TABLE)?;
        let key = user_id.to_string_repr();

        if let Some(data) = table.get(key.as_str())? {
            Ok(Some(serde_json::from_slice(data.value())?))
        } else {
            Ok(None)
        }
    }

    /// Persist the current session, replacing any previous one
    pub fn save_session(&self, session: &Session) -> Result<(), FormError> {
        let db = self.db_handle();
        let db_guard = db.read();
        let write_txn = db_guard.begin_write()?;
        {
            let mut table = write_txn.open_table(SESSION_TABLE)?;
            let data = serde_json::to_vec(session)?;
            table.insert(CURRENT_SESSION_KEY, data.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn load_session(&self) -> Result<Option<Session>, FormError> {
        let db = self.db_handle();
        let db_guard = db.read();
        let read_txn = db_guard.begin_read()?;
        let table = read_txn.open_table(SESSION_TABLE)?;

        if let Some(data) = table.get(CURRENT_SESSION_KEY)? {
            Ok(Some(serde_json::from_slice(data.value())?))
        } else {
            Ok(None)
        }
    }

    /// Remove the persisted session. Succeeds if there is none.
    pub fn clear_session(&self) -> Result<(), FormError> {
        let db = self.db_handle();
        let db_guard = db.read();
        let write_txn = db_guard.begin_write()?;
        {
            let mut table = write_txn.open_table(SESSION_TABLE)?;
            table.remove(CURRENT_SESSION_KEY)?;
        }
        write_txn.commit()?;
        Ok(())
    }
}
