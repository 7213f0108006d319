//! Authentication and session state
//!
//! [`AuthProvider`] owns the current session and the signed-in user's
//! profile. The session is persisted so a later process on the same data
//! directory is still signed in; [`AuthProvider::restore`] picks it up and
//! discards it once expired. Every state change is announced on a
//! broadcast channel.

use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use chrono::{Duration, Utc};
use rand::RngCore;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::error::{FormError, FormResult};
use crate::policy::Caller;
use crate::storage::Account;
use crate::submission::is_valid_email;
use crate::types::{Session, UserId, UserProfile};

/// Shortest password accepted at sign-up
pub const MIN_PASSWORD_LEN: usize = 6;

const AUTH_CHANNEL_CAPACITY: usize = 32;
const TOKEN_BYTES: usize = 32;

/// Auth state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn { user_id: UserId, email: String },
    SignedOut,
    ProfileUpdated { user_id: UserId },
}

/// The signed-in user as seen by the rest of the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: UserId,
    pub email: String,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn hash_password(password: &str) -> FormResult<String> {
    let mut salt_bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| FormError::Credential(e.to_string()))?;
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| FormError::Credential(e.to_string()))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, stored: &str) -> FormResult<bool> {
    let parsed =
        PasswordHash::new(stored).map_err(|e| FormError::Credential(format!("invalid stored hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

fn new_access_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub struct AuthProvider {
    backend: Backend,
    session_ttl: Duration,
    session: Option<Session>,
    profile: Option<UserProfile>,
    events: broadcast::Sender<AuthEvent>,
}

impl AuthProvider {
    pub fn new(backend: Backend, session_ttl: Duration) -> Self {
        let (events, _) = broadcast::channel(AUTH_CHANNEL_CAPACITY);
        Self {
            backend,
            session_ttl,
            session: None,
            profile: None,
            events,
        }
    }

    /// Load the persisted session, dropping it if it has expired
    pub fn restore(&mut self) -> FormResult<Option<&Session>> {
        let stored = self.backend.storage().load_session()?;
        match stored {
            Some(session) if session.is_expired(Utc::now()) => {
                debug!(user_id = %session.user_id, "Discarding expired session");
                self.backend.storage().clear_session()?;
                self.session = None;
                self.profile = None;
            }
            Some(session) => {
                debug!(user_id = %session.user_id, "Restored session");
                self.session = Some(session);
                self.refetch_profile()?;
            }
            None => {
                self.session = None;
                self.profile = None;
            }
        }
        Ok(self.session.as_ref())
    }

    /// Register a new account and sign it in
    pub fn sign_up(
        &mut self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> FormResult<Session> {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(FormError::InvalidInput(format!(
                "'{}' is not a valid email address",
                email
            )));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(FormError::InvalidInput(format!(
                "Password should be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let user_id = UserId::new();
        let account = Account {
            user_id,
            email: email.clone(),
            password_hash: hash_password(password)?,
            created_at: Utc::now(),
        };
        let full_name = full_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(String::from);
        let profile = UserProfile::new(user_id, full_name);

        self.backend.storage().insert_account(&account, &profile)?;
        info!(%user_id, "Account created");

        self.sign_in(&email, password)
    }

    pub fn sign_in(&mut self, email: &str, password: &str) -> FormResult<Session> {
        let email = normalize_email(email);
        let account = match self.backend.storage().load_account(&email)? {
            Some(account) => account,
            None => {
                debug!("Sign-in for unknown email");
                return Err(FormError::InvalidCredentials);
            }
        };
        if !verify_password(password, &account.password_hash)? {
            warn!(user_id = %account.user_id, "Sign-in with wrong password");
            return Err(FormError::InvalidCredentials);
        }

        let now = Utc::now();
        let expires_at = now.checked_add_signed(self.session_ttl).ok_or_else(|| {
            FormError::InvalidInput(format!(
                "session lifetime of {} hours is out of range",
                self.session_ttl.num_hours()
            ))
        })?;
        let session = Session {
            access_token: new_access_token(),
            user_id: account.user_id,
            email: account.email.clone(),
            created_at: now,
            expires_at,
        };
        self.backend.storage().save_session(&session)?;
        self.session = Some(session.clone());
        self.refetch_profile()?;

        info!(user_id = %account.user_id, "Signed in");
        let _ = self.events.send(AuthEvent::SignedIn {
            user_id: account.user_id,
            email: account.email,
        });
        Ok(session)
    }

    pub fn sign_out(&mut self) -> FormResult<()> {
        self.backend.storage().clear_session()?;
        if let Some(session) = self.session.take() {
            info!(user_id = %session.user_id, "Signed out");
        }
        self.profile = None;
        let _ = self.events.send(AuthEvent::SignedOut);
        Ok(())
    }

    /// Reload the signed-in user's profile. A missing row leaves it `None`.
    pub fn refetch_profile(&mut self) -> FormResult<Option<&UserProfile>> {
        self.profile = match self.user_id() {
            Some(id) => self.backend.select_profile(Caller::User(id), &id)?,
            None => None,
        };
        Ok(self.profile.as_ref())
    }

    /// Set the signed-in user's display name (blank clears it)
    pub fn update_profile(&mut self, full_name: Option<&str>) -> FormResult<UserProfile> {
        let user_id = self
            .user_id()
            .ok_or_else(|| FormError::NotAuthenticated("update your profile".into()))?;

        let mut profile = match self.backend.select_profile(Caller::User(user_id), &user_id)? {
            Some(profile) => profile,
            None => UserProfile::new(user_id, None),
        };
        profile.full_name = full_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(String::from);

        self.backend.update_profile(Caller::User(user_id), &profile)?;
        self.profile = Some(profile.clone());
        debug!(%user_id, "Profile updated");
        let _ = self.events.send(AuthEvent::ProfileUpdated { user_id });
        Ok(profile)
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn user(&self) -> Option<AuthUser> {
        self.session.as_ref().map(|s| AuthUser {
            id: s.user_id,
            email: s.email.clone(),
        })
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.session.as_ref().map(|s| s.user_id)
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    /// Identity queries run as
    pub fn caller(&self) -> Caller {
        Caller::from(self.user_id())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}
