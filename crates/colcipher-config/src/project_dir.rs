//! Discovery and management of the `.colcipher/` directory.
//!
//! The `.colcipher/` directory holds the settings file and the store of a
//! colcipher project. It is found by walking up from the working directory,
//! or taken from `COLCIPHER_DIR` when that is set.

use std::path::{Path, PathBuf};

use crate::settings::ConfigError;

/// The name of the project metadata directory.
pub const PROJECT_DIR_NAME: &str = ".colcipher";

/// Environment variable that overrides directory discovery.
pub const PROJECT_DIR_ENV: &str = "COLCIPHER_DIR";

/// Walk up the directory tree from `start` looking for a `.colcipher/`
/// directory.
///
/// `COLCIPHER_DIR` is checked first and wins when it names an existing
/// directory. Returns `None` if the filesystem root is reached.
///
/// # Examples
///
/// ```no_run
/// use colcipher_config::project_dir::find_project_dir;
/// use std::path::Path;
///
/// if let Some(dir) = find_project_dir(Path::new(".")) {
///     println!("Found project dir at {}", dir.display());
/// }
/// ```
pub fn find_project_dir(start: &Path) -> Option<PathBuf> {
    if let Ok(env_dir) = std::env::var(PROJECT_DIR_ENV) {
        let env_path = PathBuf::from(&env_dir);
        if env_path.is_dir() {
            return Some(env_path);
        }
    }
    search_upwards(start)
}

fn search_upwards(start: &Path) -> Option<PathBuf> {
    let start = start.canonicalize().ok()?;

    let mut current = start.as_path();
    loop {
        let candidate = current.join(PROJECT_DIR_NAME);
        if candidate.is_dir() {
            return Some(candidate);
        }
        match current.parent() {
            Some(parent) if parent != current => current = parent,
            _ => return None,
        }
    }
}

/// Like [`find_project_dir`], but a missing directory is an error.
///
/// # Errors
///
/// Returns [`ConfigError::ProjectDirNotFound`] if no `.colcipher/` directory
/// is found.
pub fn find_project_dir_or_error(start: &Path) -> Result<PathBuf, ConfigError> {
    find_project_dir(start).ok_or(ConfigError::ProjectDirNotFound)
}

/// Ensure a `.colcipher/` directory exists at `path`.
///
/// If `path` is not itself named `.colcipher`, a `.colcipher/` subdirectory
/// is created under it. Returns the path of the `.colcipher/` directory.
pub fn ensure_project_dir(path: &Path) -> Result<PathBuf, ConfigError> {
    let dir = if path.ends_with(PROJECT_DIR_NAME) {
        path.to_path_buf()
    } else {
        path.join(PROJECT_DIR_NAME)
    };
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
