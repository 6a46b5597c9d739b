//! Runtime context for command execution.
//!
//! [`RuntimeContext`] holds the global flags; [`Project`] is an opened
//! `.colcipher/` directory with its settings and configuration manager.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colcipher_config::access;
use colcipher_config::project_dir::{PROJECT_DIR_NAME, find_project_dir, find_project_dir_or_error};
use colcipher_config::{ConfigError, ConfigManager, Settings, SqliteStore, load_settings};
use colcipher_formula::FormulaEngine;
use tracing::debug;

use crate::cli::GlobalArgs;

/// Runtime context passed to every command handler.
///
/// Constructed once in `main` after CLI parsing, before command dispatch.
#[derive(Debug)]
pub struct RuntimeContext {
    /// Explicit project directory from `--dir` / `COLCIPHER_DIR`.
    pub dir: Option<PathBuf>,

    /// Whether to produce JSON output.
    pub json: bool,

    /// Passkey offered for mutating commands.
    pub passkey: Option<String>,

    pub verbose: bool,

    /// Quiet mode: suppress non-essential output.
    pub quiet: bool,
}

impl RuntimeContext {
    /// Build a `RuntimeContext` from parsed global arguments.
    ///
    /// `json` is also switched on by `json: true` in the project settings.
    pub fn from_global_args(global: &GlobalArgs) -> Self {
        let mut ctx = Self {
            dir: global.dir.clone(),
            json: global.json,
            passkey: global.passkey.clone().filter(|p| !p.is_empty()),
            verbose: global.verbose,
            quiet: global.quiet,
        };
        if !ctx.json {
            if let Some(settings) = ctx.resolve_project_dir().and_then(|d| load_settings(&d).ok()) {
                ctx.json = settings.json;
            }
        }
        ctx
    }

    /// The `.colcipher/` directory `--dir` points at, without touching the
    /// filesystem. `None` when no `--dir` was given.
    pub fn explicit_project_dir(&self) -> Option<PathBuf> {
        self.dir.as_deref().map(as_project_dir)
    }

    /// The explicit directory if given, otherwise discovery from the
    /// current directory.
    pub fn resolve_project_dir(&self) -> Option<PathBuf> {
        if let Some(dir) = self.explicit_project_dir() {
            return Some(dir);
        }
        let cwd = env::current_dir().ok()?;
        find_project_dir(&cwd)
    }

    /// Opens the project, failing when it has not been initialised.
    pub fn open_project(&self) -> Result<Project> {
        let dir = match self.explicit_project_dir() {
            Some(dir) if dir.is_dir() => dir,
            Some(_) => return Err(ConfigError::ProjectDirNotFound.into()),
            None => {
                let cwd = env::current_dir().context("failed to get current directory")?;
                find_project_dir_or_error(&cwd)?
            }
        };
        Project::open(dir)
    }

    /// Fails unless `--passkey` unlocks the project.
    pub fn require_access(&self, project: &Project) -> Result<()> {
        access::require_access(project.manager.store(), self.passkey.as_deref())?;
        Ok(())
    }
}

/// Normalises a user-supplied directory to the `.colcipher/` directory.
pub fn as_project_dir(path: &Path) -> PathBuf {
    if path.ends_with(PROJECT_DIR_NAME) {
        path.to_path_buf()
    } else {
        path.join(PROJECT_DIR_NAME)
    }
}

/// An opened project.
pub struct Project {
    pub dir: PathBuf,
    pub settings: Settings,
    pub manager: ConfigManager<SqliteStore>,
    pub engine: FormulaEngine,
}

impl Project {
    pub fn open(dir: PathBuf) -> Result<Self> {
        let settings = load_settings(&dir)
            .with_context(|| format!("failed to load settings from {}", dir.display()))?;
        let store_path = dir.join(&settings.store);
        debug!(path = %store_path.display(), "opening project store");
        let store = SqliteStore::open(&store_path)
            .with_context(|| format!("failed to open store: {}", store_path.display()))?;
        let manager = ConfigManager::load(store)
            .context("failed to load configuration")?
            .with_history_limit(settings.history_limit);
        Ok(Self {
            dir,
            settings,
            manager,
            engine: FormulaEngine::new(),
        })
    }
}
