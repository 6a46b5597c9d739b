//! `colc config` -- show, get and set pipeline configuration.

use anyhow::{Result, bail};
use colcipher_config::access;
use colcipher_ui::styles::{render_category, render_muted, render_separator};

use crate::cli::{ConfigArgs, ConfigCommands, ConfigGetArgs, ConfigSetArgs};
use crate::context::RuntimeContext;
use crate::output::output_json;

/// Execute the `colc config` command.
pub fn run(ctx: &RuntimeContext, args: &ConfigArgs) -> Result<()> {
    match &args.command {
        ConfigCommands::Show => run_show(ctx),
        ConfigCommands::Get(a) => run_get(ctx, a),
        ConfigCommands::Set(a) => run_set(ctx, a),
    }
}

fn run_show(ctx: &RuntimeContext) -> Result<()> {
    let project = ctx.open_project()?;
    let pipeline = project.manager.pipeline();
    let protected = access::is_protected(project.manager.store())?;

    if ctx.json {
        output_json(&serde_json::json!({
            "pipeline": pipeline,
            "settings": project.settings,
            "protected": protected,
        }));
        return Ok(());
    }

    println!("{}", render_category("Pipeline"));
    println!("{}", render_separator());
    for (key, value) in pipeline.entries() {
        let shown = if value.is_empty() {
            render_muted("(unset)")
        } else {
            value
        };
        println!("  {:<24} {}", key, shown);
    }
    println!("  {:<24} {}", "mappings", pipeline.column_mappings.len());
    println!();

    let settings = &project.settings;
    println!("{}", render_category("Settings"));
    println!("{}", render_separator());
    println!("  {:<24} {}", "dir", project.dir.display());
    println!("  {:<24} {}", "store", settings.store);
    println!("  {:<24} {}", "history_limit", settings.history_limit);
    println!("  {:<24} {}", "max_failures", settings.max_failures);
    println!(
        "  {:<24} {}",
        "sample",
        settings.sample.as_deref().unwrap_or("(default)")
    );
    println!("  {:<24} {}", "json", settings.json);
    println!("  {:<24} {}", "protected", protected);
    Ok(())
}

fn run_get(ctx: &RuntimeContext, args: &ConfigGetArgs) -> Result<()> {
    let project = ctx.open_project()?;
    let Some(value) = project.manager.pipeline().get_value(&args.key) else {
        bail!("unknown config key: {}", args.key);
    };

    if ctx.json {
        output_json(&serde_json::json!({ "key": args.key, "value": value }));
    } else {
        println!("{}", value);
    }
    Ok(())
}

fn run_set(ctx: &RuntimeContext, args: &ConfigSetArgs) -> Result<()> {
    let mut project = ctx.open_project()?;
    ctx.require_access(&project)?;

    if args.key == "default_formula" && !args.value.trim().is_empty() {
        project.manager.require_formula(args.value.trim())?;
    }
    project
        .manager
        .update_pipeline(|p| p.set_value(&args.key, &args.value))?;
    let value = project
        .manager
        .pipeline()
        .get_value(&args.key)
        .unwrap_or_default();

    if ctx.json {
        output_json(&serde_json::json!({ "key": args.key, "value": value }));
    } else if !ctx.quiet {
        println!("Set {} = {}", args.key, value);
    }
    Ok(())
}
