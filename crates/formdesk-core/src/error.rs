//! Error types for Formdesk

use std::collections::BTreeMap;

use thiserror::Error;

/// Main error type for Formdesk operations
#[derive(Error, Debug)]
pub enum FormError {
    /// Form was not found (or is not visible to the caller)
    #[error("Form not found: {0}")]
    FormNotFound(String),

    /// Field was not found in the builder or form
    #[error("Field not found: {0}")]
    FieldNotFound(String),

    /// Another form already uses this slug
    #[error("Slug already in use: {0}")]
    SlugConflict(String),

    /// Caller is not allowed to perform the operation on this row
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Operation requires a signed-in user
    #[error("You must be logged in to {0}")]
    NotAuthenticated(String),

    /// Form exists but is private, draft or closed for this caller
    #[error("Form not available (Private or Draft)")]
    FormUnavailable,

    /// The form deadline has passed
    #[error("Submission closed: the deadline for this form has passed")]
    SubmissionClosed,

    /// One or more answers failed validation (field id -> message)
    #[error("Validation failed for {} field(s)", errors.len())]
    Validation { errors: BTreeMap<String, String> },

    /// Email/password pair did not match an account
    #[error("Invalid login credentials")]
    InvalidCredentials,

    /// An account with this email already exists
    #[error("User already registered: {0}")]
    EmailTaken(String),

    /// Malformed user input (ids, dates, choices)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Error during storage operations (redb)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Database creation/opening error
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    /// Transaction error
    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    /// Table error
    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    /// Storage operation error
    #[error("Storage operation error: {0}")]
    StorageOp(#[from] redb::StorageError),

    /// Commit error
    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    /// Error during serialization/deserialization
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Password hashing failed
    #[error("Credential error: {0}")]
    Credential(String),

    /// General I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for FormError {
    fn from(err: serde_json::Error) -> Self {
        FormError::Serialization(err.to_string())
    }
}

/// Result type alias using FormError
pub type FormResult<T> = Result<T, FormError>;
