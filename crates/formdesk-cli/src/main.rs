//! Formdesk CLI
//!
//! Thin wrapper around formdesk-core functions for command-line usage.
//!
//! ## Usage
//!
//! ```bash
//! # Create an account (the session is kept for later commands)
//! formdesk auth signup admin@example.com --password secret1 --name "Admin"
//!
//! # Start a form from a template and publish it
//! formdesk form create "Club Signup" --template student
//! formdesk form publish club-signup
//!
//! # Add and arrange fields
//! formdesk field add club-signup select --label "Year" --choices "First,Second"
//! formdesk field move club-signup 3 up
//!
//! # Fill the form in as a respondent
//! formdesk auth signout
//! formdesk submit club-signup --answer "Full Name=Ada" --answer "Year=2"
//!
//! # Review and export responses
//! formdesk responses list club-signup --search ada --from 2026-01-01
//! formdesk responses export club-signup
//! ```

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use clap::{Args, Parser, Subcommand};
use formdesk_core::dashboard::{answer_text, key_fields, response_detail};
use formdesk_core::render::parse_input;
use formdesk_core::submission::countdown;
use formdesk_core::{
    export_filename, filter_responses, render_form, responses_to_csv, template_by_key,
    theme_by_id, Answers, EditableField, EngineConfig, FieldType, FormBuilder, FormBundle,
    FormEngine, FormError, FormId, FormRecord, FormStatus, MoveDirection, ResponseFilter,
    FORM_TEMPLATES, THEME_PRESETS,
};
use tokio::io::AsyncBufReadExt;

/// Formdesk - build forms, publish links, collect responses
#[derive(Parser)]
#[command(name = "formdesk")]
#[command(version)]
#[command(about = "Formdesk - build forms, publish links, collect responses")]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Data directory (default: ~/.formdesk/data, or FORMDESK_DATA_DIR)
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show engine information
    Info,

    /// Account and session management
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },

    /// Form management
    Form {
        #[command(subcommand)]
        action: FormAction,
    },

    /// Field management within a form
    Field {
        #[command(subcommand)]
        action: FieldAction,
    },

    /// Built-in form templates
    Template {
        #[command(subcommand)]
        action: CatalogAction,
    },

    /// Theme presets
    Theme {
        #[command(subcommand)]
        action: CatalogAction,
    },

    /// Fill in a published form
    Submit {
        /// Public slug of the form
        slug: String,

        /// Answer as LABEL=VALUE (label or 1-based position; repeatable)
        #[arg(short, long = "answer")]
        answers: Vec<String>,

        /// Prompt for every field on stdin
        #[arg(short, long)]
        interactive: bool,
    },

    /// Review collected responses
    Responses {
        #[command(subcommand)]
        action: ResponsesAction,
    },
}

#[derive(Subcommand)]
enum AuthAction {
    /// Create an account and sign in
    Signup {
        email: String,
        #[arg(short, long)]
        password: String,
        /// Full name for the profile
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Sign in with email and password
    Signin {
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Sign out and forget the session
    Signout,
    /// Show the signed-in user
    Whoami,
    /// Show the profile, or update the full name
    Profile {
        /// New full name (empty clears it)
        #[arg(short, long)]
        name: Option<String>,
    },
}

#[derive(Subcommand)]
enum FormAction {
    /// Create a new form
    Create {
        /// Form title (defaults to the template title, or "Untitled Form")
        title: Option<String>,
        /// Start from a built-in template
        #[arg(short, long)]
        template: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// List your forms
    List,
    /// Show form settings and fields
    Show {
        /// Form ID or slug
        form: String,
    },
    /// Change form settings
    Set {
        /// Form ID or slug
        form: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        slug: Option<String>,
        /// draft, live or closed
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        public: Option<bool>,
        /// Theme preset id
        #[arg(long)]
        theme: Option<String>,
        /// RFC 3339 timestamp, YYYY-MM-DD (end of day, UTC) or "none"
        #[arg(long)]
        deadline: Option<String>,
    },
    /// Set a form live
    Publish {
        /// Form ID or slug
        form: String,
    },
    /// Delete a form with its fields and responses
    Delete {
        /// Form ID or slug
        form: String,
    },
    /// Copy a form and its fields as a new draft
    Duplicate {
        /// Form ID or slug
        form: String,
    },
    /// Render the form as respondents see it
    Preview {
        /// Form ID or slug
        form: String,
    },
    /// Print the public link
    Link {
        /// Form ID or slug
        form: String,
    },
}

/// Field properties settable from the command line
#[derive(Args)]
struct FieldArgs {
    #[arg(short, long)]
    label: Option<String>,
    #[arg(long)]
    required: Option<bool>,
    #[arg(long)]
    help_text: Option<String>,
    /// Comma-separated choices (select, checkbox)
    #[arg(long)]
    choices: Option<String>,
    #[arg(long)]
    min: Option<f64>,
    #[arg(long)]
    max: Option<f64>,
    /// Description shown under a section heading
    #[arg(long)]
    description: Option<String>,
}

impl FieldArgs {
    fn apply(&self, field: &mut EditableField) {
        if let Some(label) = &self.label {
            field.label = label.clone();
        }
        if let Some(required) = self.required {
            field.required = required;
        }
        if let Some(help) = &self.help_text {
            field.help_text = help.clone();
        }
        if let Some(choices) = &self.choices {
            field.choices = choices.split(',').map(|c| c.trim().to_string()).collect();
        }
        if self.min.is_some() {
            field.min = self.min;
        }
        if self.max.is_some() {
            field.max = self.max;
        }
        if let Some(description) = &self.description {
            field.section_description = Some(description.clone());
        }
    }
}

#[derive(Subcommand)]
enum FieldAction {
    /// Append a field
    Add {
        /// Form ID or slug
        form: String,
        /// short_text, long_text, email, number, date, select, checkbox, section_title
        field_type: String,
        #[command(flatten)]
        props: FieldArgs,
    },
    /// List fields in order
    List {
        /// Form ID or slug
        form: String,
    },
    /// Change a field
    Update {
        /// Form ID or slug
        form: String,
        /// Field ID or 1-based position
        field: String,
        #[command(flatten)]
        props: FieldArgs,
    },
    /// Move a field up or down by one
    Move {
        /// Form ID or slug
        form: String,
        /// Field ID or 1-based position
        field: String,
        /// up or down
        direction: String,
    },
    /// Remove a field
    Remove {
        /// Form ID or slug
        form: String,
        /// Field ID or 1-based position
        field: String,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List the available entries
    List,
}

/// Search and date filters shared by list and export
#[derive(Args)]
struct FilterArgs {
    /// Case-insensitive search over email and the first key field
    #[arg(short, long)]
    search: Option<String>,
    /// Earliest submission date (YYYY-MM-DD)
    #[arg(long)]
    from: Option<String>,
    /// Latest submission date (YYYY-MM-DD)
    #[arg(long)]
    to: Option<String>,
}

impl FilterArgs {
    fn to_filter(&self) -> Result<ResponseFilter> {
        Ok(ResponseFilter {
            search: self.search.clone(),
            start_date: self.from.as_deref().map(parse_date).transpose()?,
            end_date: self.to.as_deref().map(parse_date).transpose()?,
        })
    }
}

#[derive(Subcommand)]
enum ResponsesAction {
    /// List responses, newest first
    List {
        /// Form ID or slug
        form: String,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Show every answer of one response
    Show {
        /// Form ID or slug
        form: String,
        /// Response ID
        response: String,
    },
    /// Write the (filtered) responses to a CSV file
    Export {
        /// Form ID or slug
        form: String,
        #[command(flatten)]
        filter: FilterArgs,
        /// Output path (default: <title>-responses.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Get the default data directory (~/.formdesk/data)
fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".formdesk")
        .join("data")
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| anyhow!("Invalid date '{}' (expected YYYY-MM-DD): {}", s, e))
}

/// Parse a deadline; a bare date means the end of that day in UTC
fn parse_deadline(s: &str) -> Result<Option<DateTime<Utc>>> {
    if s.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    let end_of_day = parse_date(s)?
        .and_hms_opt(23, 59, 59)
        .ok_or_else(|| anyhow!("Invalid deadline '{}'", s))?;
    Ok(Some(Utc.from_utc_datetime(&end_of_day)))
}

fn parse_direction(s: &str) -> Result<MoveDirection> {
    match s.to_lowercase().as_str() {
        "up" => Ok(MoveDirection::Up),
        "down" => Ok(MoveDirection::Down),
        _ => anyhow::bail!("Invalid direction '{}'. Must be one of: up, down", s),
    }
}

/// Parse a form ID, with or without the `form_` prefix
fn parse_form_id(s: &str) -> Option<FormId> {
    FormId::from_string(s.strip_prefix("form_").unwrap_or(s)).ok()
}

/// Load a form by ID or by one of the caller's slugs
async fn resolve_form(engine: &FormEngine, key: &str) -> Result<FormBundle> {
    if let Some(id) = parse_form_id(key) {
        return Ok(engine.form_builder_data(&id).await?);
    }
    let overview = engine.forms_overview().await?;
    match overview.into_iter().find(|o| o.form.slug == key) {
        Some(entry) => Ok(engine.form_builder_data(&entry.form.id).await?),
        None => anyhow::bail!("Form not found: {}", key),
    }
}

/// Load a form into a builder, apply `edit` and save it
async fn edit_form<F>(engine: &FormEngine, key: &str, edit: F) -> Result<FormBundle>
where
    F: FnOnce(&mut FormBuilder) -> Result<()>,
{
    let bundle = resolve_form(engine, key).await?;
    let mut builder = FormBuilder::from_records(&bundle.form, &bundle.fields);
    edit(&mut builder)?;
    Ok(engine.save_form(&builder).await?)
}

/// Builder-local id of a field given by position or stored ID
fn resolve_field(builder: &FormBuilder, key: &str) -> Result<String> {
    if let Some(index) = builder.position_of(key) {
        return Ok(builder.fields[index].local_id.clone());
    }
    let wanted = key.strip_prefix("field_").unwrap_or(key);
    builder
        .fields
        .iter()
        .find(|f| {
            f.db_id
                .is_some_and(|id| id.to_string_repr().eq_ignore_ascii_case(wanted))
        })
        .map(|f| f.local_id.clone())
        .ok_or_else(|| anyhow!("Field not found: {}", key))
}

fn print_form_summary(engine: &FormEngine, form: &FormRecord) {
    println!("  ID: {}", form.id.to_string_repr());
    println!("  Slug: {}", form.slug);
    println!("  Status: {}", form.status);
    println!("  Link: {}", engine.public_url(form));
}

fn print_fields(bundle: &FormBundle) {
    if bundle.fields.is_empty() {
        println!("No fields in this form.");
        return;
    }
    println!("Fields ({}):", bundle.fields.len());
    for (index, field) in bundle.fields.iter().enumerate() {
        let required = if field.required { " *" } else { "" };
        println!(
            "  {}. [{}] {}{}  ({})",
            index + 1,
            field.field_type,
            field.label,
            required,
            field.id.to_string_repr()
        );
        if !field.choices().is_empty() {
            println!("       choices: {}", field.choices().join(", "));
        }
    }
}

fn print_deadline(form: &FormRecord) {
    let Some(deadline) = form.deadline() else {
        return;
    };
    match countdown(deadline, Utc::now()) {
        Some(left) => println!(
            "Closes in {}d {}h {}m {}s ({})",
            left.days,
            left.hours,
            left.minutes,
            left.seconds,
            deadline.to_rfc3339()
        ),
        None => println!("Submissions closed ({})", deadline.to_rfc3339()),
    }
}

/// Map a LABEL=VALUE pair onto the field it names
fn apply_answer(bundle: &FormBundle, answers: &mut Answers, pair: &str) -> Result<()> {
    let (key, raw) = pair
        .split_once('=')
        .ok_or_else(|| anyhow!("Invalid answer '{}' (expected LABEL=VALUE)", pair))?;
    let key = key.trim();
    let field = bundle
        .fields
        .iter()
        .find(|f| f.label.eq_ignore_ascii_case(key))
        .or_else(|| {
            key.parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| bundle.fields.get(i))
        })
        .filter(|f| f.field_type.is_input())
        .ok_or_else(|| anyhow!("No question '{}' on this form", key))?;

    if let Some(value) = parse_input(field, raw)? {
        answers.insert(field.answer_key(), value);
    }
    Ok(())
}

/// Prompt for every field on stdin, re-asking on unparseable input
async fn prompt_answers(bundle: &FormBundle, answers: &mut Answers) -> Result<()> {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    for (field, rendered) in bundle.fields.iter().zip(render_form(&bundle.fields)) {
        print!("{}", rendered);
        if !rendered.is_input() {
            continue;
        }
        loop {
            print!("> ");
            std::io::Write::flush(&mut std::io::stdout())?;
            let line = lines.next_line().await?.unwrap_or_default();
            match parse_input(field, &line) {
                Ok(Some(value)) => {
                    answers.insert(field.answer_key(), value);
                    break;
                }
                Ok(None) => break,
                Err(e) => println!("{}", e),
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let mut config = EngineConfig::from_env(default_data_dir());
    if let Some(dir) = cli.data_dir {
        config = config.with_data_dir(dir);
    }
    tracing::debug!(data_dir = ?config.data_dir, public_url = %config.public_base_url, "Loaded configuration");
    let mut engine = FormEngine::with_config(config).await?;

    match cli.command {
        Commands::Info => {
            let info = engine.info().await?;

            println!("Formdesk v{}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Data directory: {}", info.data_dir);
            println!("Database: {}", info.database);
            println!("Public URL: {}", info.public_base_url);
            println!();
            match info.signed_in_as {
                Some(email) => {
                    println!("Signed in as: {}", email);
                    println!("Forms: {}", info.form_count);
                }
                None => println!("Not signed in"),
            }
        }

        Commands::Auth { action } => match action {
            AuthAction::Signup {
                email,
                password,
                name,
            } => {
                let session = engine.sign_up(&email, &password, name.as_deref()).await?;
                println!("Account created: {}", session.email);
                println!("  User ID: {}", session.user_id.to_string_repr());
            }

            AuthAction::Signin { email, password } => {
                let session = engine.sign_in(&email, &password).await?;
                println!("Signed in as {}", session.email);
                println!("  Session expires: {}", session.expires_at.to_rfc3339());
            }

            AuthAction::Signout => {
                engine.sign_out().await?;
                println!("Signed out.");
            }

            AuthAction::Whoami => match engine.user() {
                Some(user) => {
                    println!("Signed in as {}", user.email);
                    println!("  User ID: {}", user.id.to_string_repr());
                    if let Some(name) = engine.profile().and_then(|p| p.full_name.as_deref()) {
                        println!("  Name: {}", name);
                    }
                }
                None => println!("Not signed in."),
            },

            AuthAction::Profile { name } => {
                let profile = match name {
                    Some(name) => engine.update_profile(Some(name.as_str())).await?,
                    None => engine
                        .refetch_profile()
                        .await?
                        .ok_or_else(|| anyhow!("You must be logged in to view your profile"))?,
                };
                println!("Profile:");
                println!("  Name: {}", profile.full_name.as_deref().unwrap_or("(not set)"));
                println!("  Role: {}", profile.role);
                println!("  Member since: {}", profile.created_at.format("%Y-%m-%d"));
            }
        },

        Commands::Form { action } => match action {
            FormAction::Create {
                title,
                template,
                description,
            } => {
                let mut builder = FormBuilder::new();
                if let Some(key) = template {
                    let template = template_by_key(&key)
                        .ok_or_else(|| anyhow!("Unknown template '{}'", key))?;
                    builder.apply_template(template);
                }
                if let Some(title) = title {
                    builder.set_title(&title);
                }
                if let Some(description) = description {
                    builder.description = description;
                }

                let saved = engine.save_form(&builder).await?;
                println!("Created form: {}", saved.form.title);
                print_form_summary(&engine, &saved.form);
                println!("  Fields: {}", saved.fields.len());
            }

            FormAction::List => {
                let forms = engine.forms_overview().await?;
                if forms.is_empty() {
                    println!("No forms found.");
                } else {
                    println!("Forms ({}):", forms.len());
                    println!();
                    for entry in forms {
                        let visibility = if entry.form.is_public { "" } else { " [private]" };
                        println!(
                            "  {} {:<6} {}{}  /f/{}  ({} responses)",
                            entry.form.id.to_string_repr(),
                            entry.form.status,
                            entry.form.title,
                            visibility,
                            entry.form.slug,
                            entry.response_count
                        );
                    }
                }
            }

            FormAction::Show { form } => {
                let bundle = resolve_form(&engine, &form).await?;
                let theme = theme_by_id(bundle.form.theme.preset.as_deref());
                println!("Form: {}", bundle.form.title);
                print_form_summary(&engine, &bundle.form);
                println!("  Public: {}", if bundle.form.is_public { "Yes" } else { "No" });
                println!("  Theme: {} ({})", theme.label, theme.id);
                if let Some(description) = &bundle.form.description {
                    println!("  Description: {}", description);
                }
                println!("  Updated: {}", bundle.form.updated_at.to_rfc3339());
                print_deadline(&bundle.form);
                println!();
                print_fields(&bundle);
            }

            FormAction::Set {
                form,
                title,
                description,
                slug,
                status,
                public,
                theme,
                deadline,
            } => {
                let status = status.as_deref().map(str::parse::<FormStatus>).transpose()?;
                let deadline = deadline.as_deref().map(parse_deadline).transpose()?;
                if let Some(theme) = &theme {
                    if !THEME_PRESETS.iter().any(|p| p.id == theme) {
                        anyhow::bail!("Unknown theme '{}'", theme);
                    }
                }

                let saved = edit_form(&engine, &form, |builder| {
                    if let Some(title) = title {
                        builder.set_title(&title);
                    }
                    if let Some(description) = description {
                        builder.description = description;
                    }
                    if let Some(slug) = slug {
                        builder.slug = slug;
                    }
                    if let Some(status) = status {
                        builder.status = status;
                    }
                    if let Some(public) = public {
                        builder.is_public = public;
                    }
                    if let Some(theme) = theme {
                        builder.theme_preset = theme;
                    }
                    if let Some(deadline) = deadline {
                        builder.deadline = deadline;
                    }
                    Ok(())
                })
                .await?;
                println!("Updated form: {}", saved.form.title);
                print_form_summary(&engine, &saved.form);
            }

            FormAction::Publish { form } => {
                let saved = edit_form(&engine, &form, |builder| {
                    builder.status = FormStatus::Live;
                    Ok(())
                })
                .await?;
                println!("Published: {}", saved.form.title);
                println!("  Link: {}", engine.public_url(&saved.form));
                if !saved.form.is_public {
                    println!("  Note: the form is private; only you can open it.");
                }
            }

            FormAction::Delete { form } => {
                let bundle = resolve_form(&engine, &form).await?;
                engine.delete_form(&bundle.form.id).await?;
                println!("Deleted form: {}", bundle.form.title);
            }

            FormAction::Duplicate { form } => {
                let bundle = resolve_form(&engine, &form).await?;
                let copy = engine.duplicate_form(&bundle.form.id).await?;
                println!("Duplicated form: {}", copy.form.title);
                print_form_summary(&engine, &copy.form);
            }

            FormAction::Preview { form } => {
                let bundle = resolve_form(&engine, &form).await?;
                println!("{}", bundle.form.title);
                if let Some(description) = &bundle.form.description {
                    println!("{}", description);
                }
                print_deadline(&bundle.form);
                println!();
                for rendered in render_form(&bundle.fields) {
                    println!("{}", rendered);
                }
            }

            FormAction::Link { form } => {
                let bundle = resolve_form(&engine, &form).await?;
                println!("{}", engine.public_url(&bundle.form));
            }
        },

        Commands::Field { action } => match action {
            FieldAction::Add {
                form,
                field_type,
                props,
            } => {
                let field_type: FieldType = field_type.parse()?;
                let saved = edit_form(&engine, &form, |builder| {
                    let id = builder.add_field(field_type);
                    builder.update_field(&id, |f| props.apply(f))?;
                    Ok(())
                })
                .await?;
                let added = saved
                    .fields
                    .last()
                    .ok_or_else(|| anyhow!("Field was not saved"))?;
                println!("Added field: {}", added.label);
                println!("  ID: {}", added.id.to_string_repr());
                println!("  Position: {}", saved.fields.len());
            }

            FieldAction::List { form } => {
                let bundle = resolve_form(&engine, &form).await?;
                print_fields(&bundle);
            }

            FieldAction::Update { form, field, props } => {
                let saved = edit_form(&engine, &form, |builder| {
                    let id = resolve_field(builder, &field)?;
                    builder.update_field(&id, |f| props.apply(f))?;
                    Ok(())
                })
                .await?;
                println!("Updated field {} of {}", field, saved.form.title);
            }

            FieldAction::Move {
                form,
                field,
                direction,
            } => {
                let direction = parse_direction(&direction)?;
                let mut moved = false;
                let saved = edit_form(&engine, &form, |builder| {
                    let id = resolve_field(builder, &field)?;
                    moved = builder.move_field(&id, direction);
                    Ok(())
                })
                .await?;
                if moved {
                    print_fields(&saved);
                } else {
                    println!("Field {} is already at the edge; nothing moved.", field);
                }
            }

            FieldAction::Remove { form, field } => {
                let saved = edit_form(&engine, &form, |builder| {
                    let id = resolve_field(builder, &field)?;
                    builder.remove_field(&id);
                    Ok(())
                })
                .await?;
                println!("Removed field {}", field);
                println!("  Remaining: {}", saved.fields.len());
            }
        },

        Commands::Template {
            action: CatalogAction::List,
        } => {
            println!("Templates ({}):", FORM_TEMPLATES.len());
            for template in FORM_TEMPLATES.iter() {
                println!("  {:<22} {}", template.key, template.name);
            }
        }

        Commands::Theme {
            action: CatalogAction::List,
        } => {
            println!("Themes ({}):", THEME_PRESETS.len());
            for preset in THEME_PRESETS.iter() {
                let dark = if preset.is_dark { " [dark]" } else { "" };
                println!("  {:<20} {}{}", preset.id, preset.label, dark);
            }
        }

        Commands::Submit {
            slug,
            answers,
            interactive,
        } => {
            let bundle = engine.public_form_by_slug(&slug).await?;
            println!("{}", bundle.form.title);
            print_deadline(&bundle.form);

            let mut collected = Answers::new();
            if interactive {
                println!();
                prompt_answers(&bundle, &mut collected).await?;
            }
            for pair in &answers {
                apply_answer(&bundle, &mut collected, pair)?;
            }

            match engine.submit_public(&slug, &collected).await {
                Ok(response) => {
                    println!("Response submitted. Thank you!");
                    println!("  ID: {}", response.id.to_string_repr());
                }
                Err(FormError::Validation { errors }) => {
                    println!("Please fix the following:");
                    for field in &bundle.fields {
                        if let Some(message) = errors.get(&field.answer_key()) {
                            println!("  {}: {}", field.label, message);
                        }
                    }
                    anyhow::bail!("Submission rejected ({} field(s) invalid)", errors.len());
                }
                Err(e) => return Err(e.into()),
            }
        }

        Commands::Responses { action } => match action {
            ResponsesAction::List { form, filter } => {
                let form = resolve_form(&engine, &form).await?;
                let bundle = engine.responses_bundle(&form.form.id).await?;
                let filter = filter.to_filter()?;
                let rows = filter_responses(&bundle.fields, &bundle.responses, &filter);

                if rows.is_empty() {
                    println!("No responses found.");
                } else {
                    let keys = key_fields(&bundle.fields);
                    println!(
                        "Responses ({} of {}):",
                        rows.len(),
                        bundle.responses.len()
                    );
                    println!();
                    for response in rows {
                        let summary: Vec<String> =
                            keys.iter().map(|f| answer_text(f, response)).collect();
                        println!(
                            "  {}  {}  {}  {}",
                            response.id.to_string_repr(),
                            response.submitted_at.format("%Y-%m-%d %H:%M"),
                            response.respondent_email.as_deref().unwrap_or("-"),
                            summary.join(" | ")
                        );
                    }
                }
            }

            ResponsesAction::Show { form, response } => {
                let form = resolve_form(&engine, &form).await?;
                let bundle = engine.responses_bundle(&form.form.id).await?;
                let wanted = response.strip_prefix("response_").unwrap_or(&response);
                let record = bundle
                    .responses
                    .iter()
                    .find(|r| r.id.to_string_repr().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| anyhow!("Response not found: {}", response))?;

                println!("Response {}", record.id.to_string_repr());
                println!("  Submitted: {}", record.submitted_at.to_rfc3339());
                println!(
                    "  Email: {}",
                    record.respondent_email.as_deref().unwrap_or("-")
                );
                println!();
                for row in response_detail(&bundle.fields, record) {
                    println!("{}", row.label);
                    println!("  {}", row.answer);
                }
            }

            ResponsesAction::Export {
                form,
                filter,
                output,
            } => {
                let form = resolve_form(&engine, &form).await?;
                let bundle = engine.responses_bundle(&form.form.id).await?;
                let filter = filter.to_filter()?;
                let rows = filter_responses(&bundle.fields, &bundle.responses, &filter);
                let count = rows.len();
                let csv = responses_to_csv(&bundle.fields, rows);

                let path =
                    output.unwrap_or_else(|| PathBuf::from(export_filename(&bundle.form.title)));
                tokio::fs::write(&path, csv).await?;
                println!("Exported {} response(s) to {}", count, path.display());
            }
        },
    }

    Ok(())
}
