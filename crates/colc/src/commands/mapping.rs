//! `colc mapping` -- list, add and remove column mappings.

use anyhow::Result;
use colcipher_core::mapping::ColumnMapping;
use colcipher_ui::styles::{ICON_ARROW, render_fail, render_muted};

use crate::cli::{MappingAddArgs, MappingArgs, MappingCommands, MappingRemoveArgs};
use crate::context::RuntimeContext;
use crate::output::{output_json, output_table};

/// Execute the `colc mapping` command.
pub fn run(ctx: &RuntimeContext, args: &MappingArgs) -> Result<()> {
    match &args.command {
        MappingCommands::List => run_list(ctx),
        MappingCommands::Add(a) => run_add(ctx, a),
        MappingCommands::Remove(a) => run_remove(ctx, a),
    }
}

fn run_list(ctx: &RuntimeContext) -> Result<()> {
    let project = ctx.open_project()?;
    let pipeline = project.manager.pipeline();

    if ctx.json {
        output_json(&pipeline.column_mappings);
        return Ok(());
    }
    if pipeline.column_mappings.is_empty() {
        println!("No column mappings. Add one with `colc mapping add <column>`.");
        return Ok(());
    }

    let default = pipeline.default_formula_id.as_deref();
    let rows: Vec<Vec<String>> = pipeline
        .column_mappings
        .iter()
        .map(|m| {
            vec![
                m.source_column.clone(),
                m.effective_target().to_string(),
                formula_cell(m, default, |id| project.manager.formula(id).is_some()),
            ]
        })
        .collect();
    output_table(&["SOURCE", "TARGET", "FORMULA"], &rows);
    Ok(())
}

/// Describes how a mapping resolves: passthrough, explicit, inherited or
/// missing.
fn formula_cell(
    mapping: &ColumnMapping,
    default: Option<&str>,
    exists: impl Fn(&str) -> bool,
) -> String {
    if !mapping.encode {
        return "(copy)".to_string();
    }
    match (mapping.formula_id.as_deref(), mapping.resolve_formula(default)) {
        (_, None) => "(none)".to_string(),
        (_, Some(id)) if !exists(id) => format!("{id} (missing)"),
        (Some(_), Some(id)) => id.to_string(),
        (None, Some(id)) => format!("{id} (default)"),
    }
}

fn run_add(ctx: &RuntimeContext, args: &MappingAddArgs) -> Result<()> {
    let mut project = ctx.open_project()?;
    ctx.require_access(&project)?;

    if let Some(id) = &args.formula {
        project.manager.require_formula(id)?;
    }

    let mut mapping = ColumnMapping::new(args.source.clone());
    if let Some(target) = &args.target {
        mapping = mapping.target(target.clone());
    }
    if let Some(id) = &args.formula {
        mapping = mapping.formula(id.clone());
    }
    if args.no_encode {
        mapping = mapping.passthrough();
    }

    let replaced = project
        .manager
        .update_pipeline(|p| Ok(p.upsert_mapping(mapping.clone())))?;

    let unresolved = mapping.encode
        && mapping
            .resolve_formula(project.manager.pipeline().default_formula_id.as_deref())
            .is_none();

    if ctx.json {
        output_json(&serde_json::json!({
            "mapping": mapping,
            "replaced": replaced,
        }));
    } else if !ctx.quiet {
        let verb = if replaced { "Updated" } else { "Added" };
        println!(
            "{} mapping: {} {} {}",
            verb,
            mapping.source_column,
            ICON_ARROW,
            mapping.effective_target()
        );
        if unresolved {
            println!(
                "  {}",
                render_fail("no formula given and no default_formula set; rows will fail")
            );
        } else if !mapping.encode {
            println!("  {}", render_muted("value is copied without encoding"));
        }
    }
    Ok(())
}

fn run_remove(ctx: &RuntimeContext, args: &MappingRemoveArgs) -> Result<()> {
    let mut project = ctx.open_project()?;
    ctx.require_access(&project)?;

    let removed = project
        .manager
        .update_pipeline(|p| p.remove_mapping(&args.source))?;

    if ctx.json {
        output_json(&removed);
    } else if !ctx.quiet {
        println!("Removed mapping: {}", removed.source_column);
    }
    Ok(())
}
