//! Engine configuration with environment overrides

use std::path::PathBuf;

use chrono::{Duration, Utc};
use tracing::warn;

pub const ENV_DATA_DIR: &str = "FORMDESK_DATA_DIR";
pub const ENV_PUBLIC_URL: &str = "FORMDESK_PUBLIC_URL";
pub const ENV_SESSION_HOURS: &str = "FORMDESK_SESSION_HOURS";

/// Base URL public links are printed against
pub const DEFAULT_PUBLIC_URL: &str = "http://localhost:5173";
/// Insert attempts when creating a form whose slug may collide
pub const DEFAULT_SLUG_ATTEMPTS: u32 = 5;
pub const DEFAULT_SESSION_HOURS: i64 = 24 * 7;

/// Database file name inside the data directory
pub const DATABASE_FILE: &str = "formdesk.redb";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub data_dir: PathBuf,
    pub public_base_url: String,
    pub slug_attempts: u32,
    pub session_ttl: Duration,
}

impl EngineConfig {
    /// Defaults for the given data directory
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            public_base_url: DEFAULT_PUBLIC_URL.to_string(),
            slug_attempts: DEFAULT_SLUG_ATTEMPTS,
            session_ttl: Duration::hours(DEFAULT_SESSION_HOURS),
        }
    }

    /// Defaults overridden by `FORMDESK_*` environment variables
    pub fn from_env(default_data_dir: impl Into<PathBuf>) -> Self {
        Self::from_lookup(default_data_dir, |key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) but reading from `lookup`.
    /// Invalid values are logged and ignored.
    pub fn from_lookup<F>(default_data_dir: impl Into<PathBuf>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::new(default_data_dir);

        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.trim().is_empty()) {
            cfg.data_dir = PathBuf::from(dir);
        }

        if let Some(url) = lookup(ENV_PUBLIC_URL) {
            let url = url.trim().trim_end_matches('/');
            if url.is_empty() {
                warn!(var = ENV_PUBLIC_URL, "Ignoring empty public URL");
            } else {
                cfg.public_base_url = url.to_string();
            }
        }

        if let Some(raw) = lookup(ENV_SESSION_HOURS) {
            // Sessions must be able to expire at a representable instant
            let ttl = raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|hours| *hours > 0)
                .and_then(Duration::try_hours)
                .filter(|ttl| Utc::now().checked_add_signed(*ttl).is_some());
            match ttl {
                Some(ttl) => cfg.session_ttl = ttl,
                None => warn!(var = ENV_SESSION_HOURS, value = %raw, "Ignoring invalid session lifetime"),
            }
        }

        cfg
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }

    /// Full public link for a slug
    pub fn public_url(&self, slug: &str) -> String {
        format!("{}/f/{}", self.public_base_url, slug)
    }
}
