//! `colc init` -- create a `.colcipher/` project directory.

use std::env;
use std::fs;

use anyhow::{Context, Result};
use colcipher_config::project_dir::ensure_project_dir;
use colcipher_config::settings::SETTINGS_FILE;
use colcipher_config::{Settings, save_settings};

use crate::cli::InitArgs;
use crate::context::{Project, RuntimeContext};
use crate::output::output_json;

/// Default gitignore content for the `.colcipher` directory.
const GITIGNORE_CONTENT: &str = r#"# colcipher store files
*.db
*.db-journal
*.db-wal
*.db-shm
"#;

/// Execute the `colc init` command.
pub fn run(ctx: &RuntimeContext, args: &InitArgs) -> Result<()> {
    let target = match ctx.explicit_project_dir() {
        Some(dir) => dir,
        None => env::current_dir().context("failed to get current directory")?,
    };
    let dir = ensure_project_dir(&target)
        .with_context(|| format!("failed to create directory: {}", target.display()))?;

    let settings_path = dir.join(SETTINGS_FILE);
    let wrote_settings = args.force || !settings_path.exists();
    if wrote_settings {
        save_settings(&dir, &Settings::default())
            .with_context(|| format!("failed to write {}", settings_path.display()))?;
    }

    let gitignore_path = dir.join(".gitignore");
    if !gitignore_path.exists() {
        fs::write(&gitignore_path, GITIGNORE_CONTENT).with_context(|| {
            format!("failed to create .gitignore: {}", gitignore_path.display())
        })?;
    }

    // Opening the store seeds the default formulas on first use.
    let project = Project::open(dir.clone())?;
    let formulas = project.manager.formulas().len();

    if ctx.json {
        output_json(&serde_json::json!({
            "dir": dir.display().to_string(),
            "store": dir.join(&project.settings.store).display().to_string(),
            "settings_written": wrote_settings,
            "formulas": formulas,
        }));
    } else if !ctx.quiet {
        println!();
        println!("colc initialized successfully!");
        println!();
        println!("  Directory: {}", dir.display());
        println!("  Store:     {}", dir.join(&project.settings.store).display());
        println!("  Formulas:  {}", formulas);
        println!();
        println!("Run `colc formula list` to see the available formulas.");
        println!();
    }
    Ok(())
}
