//! Formdesk Core Library
//!
//! Form building, publishing and response collection.
//!
//! ## Overview
//!
//! Administrators design forms (fields, themes, deadlines), publish them
//! under a public slug and review the responses collected from anonymous
//! respondents. Data lives in an embedded redb database; access to every
//! row goes through row-level policies evaluated for the calling user.
//!
//! ## Quick Start
//!
//! ```ignore
//! use formdesk_core::{Answers, FieldType, FormBuilder, FormEngine, FormStatus};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut engine = FormEngine::new("~/.formdesk/data").await?;
//!     engine.sign_up("admin@example.com", "secret1", Some("Admin")).await?;
//!
//!     let mut builder = FormBuilder::new();
//!     builder.set_title("Club Signup");
//!     builder.add_field(FieldType::Email);
//!     builder.status = FormStatus::Live;
//!     let saved = engine.save_form(&builder).await?;
//!
//!     println!("Share {}", engine.public_url(&saved.form));
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod backend;
pub mod builder;
pub mod config;
pub mod dashboard;
pub mod engine;
pub mod error;
pub mod export;
pub mod policy;
pub mod render;
pub mod slug;
pub mod storage;
pub mod submission;
pub mod templates;
pub mod themes;
pub mod types;

// Re-exports
pub use auth::{AuthEvent, AuthProvider, AuthUser};
pub use backend::Backend;
pub use builder::{EditableField, FormBuilder, MoveDirection};
pub use config::EngineConfig;
pub use dashboard::{filter_responses, key_fields, ResponseFilter};
pub use engine::{EngineInfo, FormEngine};
pub use error::{FormError, FormResult};
pub use export::{export_filename, responses_to_csv};
pub use policy::Caller;
pub use render::{render_field, render_form, RenderedField, Widget};
pub use slug::slugify;
pub use storage::Storage;
pub use submission::{prepare_submission, Submission};
pub use templates::{template_by_key, FormTemplate, FORM_TEMPLATES};
pub use themes::{theme_by_id, ThemePreset, THEME_PRESETS};
pub use types::*;
