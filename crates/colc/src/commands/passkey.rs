//! `colc passkey` -- set, clear and check the project passkey.

use anyhow::Result;
use colcipher_config::{ConfigError, access};
use colcipher_ui::styles::{render_muted, render_verdict};

use crate::cli::{PasskeyArgs, PasskeyCommands, PasskeySetArgs};
use crate::context::RuntimeContext;
use crate::output::output_json;

/// Execute the `colc passkey` command.
pub fn run(ctx: &RuntimeContext, args: &PasskeyArgs) -> Result<()> {
    match &args.command {
        PasskeyCommands::Set(a) => run_set(ctx, a),
        PasskeyCommands::Clear => run_clear(ctx),
        PasskeyCommands::Check => run_check(ctx),
    }
}

fn run_set(ctx: &RuntimeContext, args: &PasskeySetArgs) -> Result<()> {
    let project = ctx.open_project()?;
    // Changing an existing passkey needs the current one.
    ctx.require_access(&project)?;
    access::set_passkey(project.manager.store(), &args.new)?;

    if ctx.json {
        output_json(&serde_json::json!({ "protected": true }));
    } else if !ctx.quiet {
        println!("Passkey set. Mutating commands now need --passkey.");
    }
    Ok(())
}

fn run_clear(ctx: &RuntimeContext) -> Result<()> {
    let project = ctx.open_project()?;
    ctx.require_access(&project)?;
    access::clear_passkey(project.manager.store())?;

    if ctx.json {
        output_json(&serde_json::json!({ "protected": false }));
    } else if !ctx.quiet {
        println!("Passkey cleared.");
    }
    Ok(())
}

fn run_check(ctx: &RuntimeContext) -> Result<()> {
    let project = ctx.open_project()?;
    let store = project.manager.store();
    let protected = access::is_protected(store)?;
    let accepted = access::verify(store, ctx.passkey.as_deref())?;

    if ctx.json {
        output_json(&serde_json::json!({
            "protected": protected,
            "accepted": accepted,
        }));
    } else if !protected {
        println!("{}", render_muted("No passkey set; all commands are allowed."));
    } else {
        let label = if accepted { "passkey accepted" } else { "passkey rejected" };
        println!("{}", render_verdict(accepted, label));
    }

    if !accepted {
        return Err(ConfigError::AccessDenied.into());
    }
    Ok(())
}
