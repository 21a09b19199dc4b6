//! Localized message configuration
//!
//! The engine itself is locale-agnostic: every user-facing sentence comes from
//! a [`Messages`] bundle. English defaults are built in; a host can override
//! them from a locale file and environment variables through [`Settings::load`].

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Environment variable naming an optional locale file (JSON, TOML or YAML)
pub const LOCALE_FILE_VAR: &str = "SCHEMAFLOW_LOCALE_FILE";

/// Prefix for per-message environment overrides, e.g.
/// `SCHEMAFLOW__MESSAGES__CREATED_TABLE`
pub const ENV_PREFIX: &str = "SCHEMAFLOW";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load environment variables: {0}")]
    EnvLoad(#[from] dotenvy::Error),

    #[error("Failed to load message bundle: {0}")]
    Load(#[from] config::ConfigError),
}

/// Reasons reported when a revert is refused
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevertMessages {
    pub cannot_revert_foreign_key: String,
    pub cannot_revert_deleted_column: String,
}

impl Default for RevertMessages {
    fn default() -> Self {
        Self {
            cannot_revert_foreign_key: "Cannot revert this foreign key change because the referenced table or columns no longer exist.".to_string(),
            cannot_revert_deleted_column: "Cannot restore this column because a change that depends on it must be reverted first.".to_string(),
        }
    }
}

/// Templates used by the change describer.
///
/// Placeholders: `{name}` (qualified table name or object name), `{changes}`
/// (joined property descriptions), and `{property}`, `{old}`, `{new}` inside
/// `property_changed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub created_table: String,
    pub deleted_table: String,
    pub modified_table: String,
    pub added_column: String,
    pub deleted_column: String,
    pub modified_column: String,
    pub added_foreign_key: String,
    pub deleted_foreign_key: String,
    pub modified_foreign_key: String,
    pub property_changed: String,
    pub property_separator: String,
    pub revert: RevertMessages,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            created_table: "Created table {name}".to_string(),
            deleted_table: "Deleted table {name}".to_string(),
            modified_table: "Modified table {name}: {changes}".to_string(),
            added_column: "Added column '{name}'".to_string(),
            deleted_column: "Deleted column '{name}'".to_string(),
            modified_column: "Modified column '{name}': {changes}".to_string(),
            added_foreign_key: "Added foreign key '{name}'".to_string(),
            deleted_foreign_key: "Deleted foreign key '{name}'".to_string(),
            modified_foreign_key: "Modified foreign key '{name}': {changes}".to_string(),
            property_changed: "{property} changed from '{old}' to '{new}'".to_string(),
            property_separator: ", ".to_string(),
            revert: RevertMessages::default(),
        }
    }
}

/// Complete engine settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub messages: Messages,
}

impl Settings {
    /// Load settings from `.env`, the locale file and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env is fine; a malformed one is reported
        ignore_missing(dotenvy::dotenv())?;

        let locale_file = std::env::var(LOCALE_FILE_VAR).ok();
        Self::load_from(locale_file.as_deref().map(Path::new))
    }

    /// Layer the built-in defaults, an optional locale file, then
    /// `SCHEMAFLOW__*` environment overrides
    pub fn load_from(locale_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&Settings::default())?);

        if let Some(path) = locale_file {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }
}

fn ignore_missing<T>(result: dotenvy::Result<T>) -> Result<(), ConfigError> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e.into()),
    }
}
