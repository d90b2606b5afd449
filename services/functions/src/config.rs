//! services/functions/src/config.rs
//!
//! Defines the functions' configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables when a function
//! starts. The `.env` file is used for local development. Settings a handler
//! cannot work without are checked per invocation with [`Config::require`],
//! so a missing one becomes a 500 response instead of a failed cold start.

use std::path::PathBuf;
use tracing::Level;

pub const UPLOADS_BUCKET_NAME: &str = "UPLOADS_BUCKET_NAME";
pub const EXTRACTED_BUCKET_NAME: &str = "EXTRACTED_BUCKET_NAME";
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const QUIZ_RESULTS_TABLE: &str = "QUIZ_RESULTS_TABLE";
pub const PROGRESS_TABLE: &str = "PROGRESS_TABLE";
pub const FIREBASE_PROJECT_ID: &str = "FIREBASE_PROJECT_ID";
pub const GOOGLE_APPLICATION_CREDENTIALS: &str = "GOOGLE_APPLICATION_CREDENTIALS";
pub const BUCKET_NAME: &str = "BUCKET_NAME";

const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";

/// A custom error type for configuration failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} not configured")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub log_level: Level,
    pub uploads_bucket: Option<String>,
    pub extracted_bucket: Option<String>,
    pub openai_api_key: Option<String>,
    pub summary_model: String,
    pub flashcard_model: String,
    pub quiz_model: String,
    pub quiz_results_table: Option<String>,
    pub progress_table: Option<String>,
    pub firebase_project_id: Option<String>,
    pub google_application_credentials: Option<PathBuf>,
    pub papers_bucket: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Storage locations (all optional until a handler needs them) ---
        let uploads_bucket = optional_var(UPLOADS_BUCKET_NAME);
        let extracted_bucket = optional_var(EXTRACTED_BUCKET_NAME);
        let papers_bucket = optional_var(BUCKET_NAME);
        let quiz_results_table = optional_var(QUIZ_RESULTS_TABLE);
        let progress_table = optional_var(PROGRESS_TABLE);

        // --- Language model settings ---
        let openai_api_key = optional_var(OPENAI_API_KEY);
        let summary_model =
            optional_var("SUMMARY_MODEL").unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string());
        let flashcard_model =
            optional_var("FLASHCARD_MODEL").unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string());
        let quiz_model =
            optional_var("QUIZ_MODEL").unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string());

        // --- Identity provider ---
        let firebase_project_id = optional_var(FIREBASE_PROJECT_ID);
        let google_application_credentials =
            optional_var(GOOGLE_APPLICATION_CREDENTIALS).map(PathBuf::from);

        Ok(Self {
            log_level,
            uploads_bucket,
            extracted_bucket,
            openai_api_key,
            summary_model,
            flashcard_model,
            quiz_model,
            quiz_results_table,
            progress_table,
            firebase_project_id,
            google_application_credentials,
            papers_bucket,
        })
    }

    /// Returns a setting, or a port built from one, that a handler cannot run
    /// without. `var` names the environment variable behind it.
    pub fn require<'a, T: ?Sized>(value: Option<&'a T>, var: &str) -> Result<&'a T, ConfigError> {
        value.ok_or_else(|| ConfigError::MissingVar(var.to_string()))
    }
}

/// Reads a variable, treating an empty value the same as an absent one.
fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
