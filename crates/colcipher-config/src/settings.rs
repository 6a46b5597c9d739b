//! Tool settings and the crate error type.
//!
//! [`Settings`] is the contents of `.colcipher/config.yaml`. It is loaded
//! with [`load_settings`], which layers built-in defaults, the YAML file and
//! `COLCIPHER_*` environment variables (highest priority), and saved with
//! [`save_settings`].

use std::path::Path;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::StoreError;

/// Name of the settings file inside the project directory.
pub const SETTINGS_FILE: &str = "config.yaml";

/// Prefix of environment variables that override settings.
pub const ENV_PREFIX: &str = "COLCIPHER_";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file could not be read or written.
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// The settings file contained invalid YAML.
    #[error("failed to parse config file: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Layered settings could not be extracted.
    #[error("failed to load settings: {0}")]
    Load(#[from] Box<figment::Error>),

    /// The `.colcipher/` directory was not found.
    #[error("no .colcipher directory found (run 'colc init' first)")]
    ProjectDirNotFound,

    /// The key-value store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A stored document could not be encoded or decoded.
    #[error("corrupt stored value for '{key}': {source}")]
    Corrupt {
        key: String,
        source: serde_json::Error,
    },

    /// A configuration value was invalid.
    #[error("invalid configuration value for key '{key}': {reason}")]
    InvalidValue {
        /// The configuration key that had an invalid value.
        key: String,
        /// A description of why the value is invalid.
        reason: String,
    },

    /// A formula failed validation and was not saved.
    #[error("invalid formula: {}", errors.join("; "))]
    InvalidFormula { errors: Vec<String> },

    #[error("formula not found: {0}")]
    FormulaNotFound(String),

    #[error("formula already exists: {0}")]
    DuplicateFormula(String),

    #[error("no column mapping for source column '{0}'")]
    MappingNotFound(String),

    /// The passkey was missing or wrong.
    #[error("access denied: a valid passkey is required (use --passkey or COLCIPHER_PASSKEY)")]
    AccessDenied,
}

/// A specialized `Result` type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Tool settings from `.colcipher/config.yaml`.
///
/// Field names are snake_case so YAML keys and environment variables line up:
/// `history_limit` in the file, `COLCIPHER_HISTORY_LIMIT` in the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Store file name, relative to the project directory.
    #[serde(default = "default_store")]
    pub store: String,

    /// Number of processing runs kept in history.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Sample used by `colc formula test` when none is given.
    #[serde(default)]
    pub sample: Option<String>,

    /// Output JSON instead of human-readable text.
    #[serde(default)]
    pub json: bool,

    /// Failed rows kept per run record.
    #[serde(default = "default_max_failures")]
    pub max_failures: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store: default_store(),
            history_limit: default_history_limit(),
            sample: None,
            json: false,
            max_failures: default_max_failures(),
        }
    }
}

fn default_store() -> String {
    "colcipher.db".to_string()
}

fn default_history_limit() -> usize {
    20
}

fn default_max_failures() -> usize {
    100
}

/// Load settings for the given `.colcipher/` directory.
///
/// A missing or empty settings file yields the defaults, still subject to
/// environment overrides.
///
/// # Errors
///
/// Returns [`ConfigError::Load`] if the file is not valid YAML or a value has
/// the wrong type.
pub fn load_settings(project_dir: &Path) -> Result<Settings> {
    let path = project_dir.join(SETTINGS_FILE);

    let mut figment = Figment::from(Serialized::defaults(Settings::default()));
    if path.exists() && !std::fs::read_to_string(&path)?.trim().is_empty() {
        figment = figment.merge(Yaml::file(&path));
    }
    figment = figment.merge(Env::prefixed(ENV_PREFIX).only(&[
        "store",
        "history_limit",
        "sample",
        "json",
        "max_failures",
    ]));

    let settings: Settings = figment.extract().map_err(Box::new)?;
    Ok(settings)
}

/// Save settings to `config.yaml` inside the given `.colcipher/` directory.
///
/// The directory is created if it does not exist.
pub fn save_settings(project_dir: &Path, settings: &Settings) -> Result<()> {
    std::fs::create_dir_all(project_dir)?;
    let yaml = serde_yaml::to_string(settings)?;
    std::fs::write(project_dir.join(SETTINGS_FILE), yaml)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_settings_yaml() {
        let yaml = serde_yaml::to_string(&Settings::default()).unwrap();
        insta::assert_snapshot!(yaml, @r"
        store: colcipher.db
        history_limit: 20
        sample: null
        json: false
        max_failures: 100
        ");
    }

    #[test]
    fn load_missing_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings(dir.path()).unwrap();
        assert_eq!(settings.store, "colcipher.db");
        assert_eq!(settings.max_failures, 100);
    }

    #[test]
    fn load_empty_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), "\n").unwrap();
        assert_eq!(load_settings(dir.path()).unwrap().store, "colcipher.db");
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), "sample: hello-42\njson: true\n").unwrap();
        let settings = load_settings(dir.path()).unwrap();
        assert_eq!(settings.sample.as_deref(), Some("hello-42"));
        assert!(settings.json);
        assert_eq!(settings.history_limit, 20);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join(".colcipher");
        let settings = Settings {
            store: "other.db".into(),
            max_failures: 5,
            ..Settings::default()
        };
        save_settings(&project, &settings).unwrap();
        assert_eq!(load_settings(&project).unwrap().store, "other.db");
        assert_eq!(load_settings(&project).unwrap().max_failures, 5);
    }

    #[test]
    fn invalid_yaml_type_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), "history_limit: lots\n").unwrap();
        assert!(matches!(load_settings(dir.path()), Err(ConfigError::Load(_))));
    }
}
