//! `colc formula` -- list, show, add, edit, remove, import, validate and test
//! encoding formulas.

use anyhow::{Context, Result, bail};
use colcipher_config::ConfigError;
use colcipher_core::enums::Algorithm;
use colcipher_core::formula::{EncodingFormula, FormulaBuilder, FormulaParameters};
use colcipher_formula::parser::load_formulas;
use colcipher_formula::selftest::{EXTENDED_SAMPLES, test_formula_samples};
use colcipher_formula::{DEFAULT_SAMPLE, FormulaValidation};
use colcipher_ui::styles::{render_formula_compact, render_warn, render_warn_icon};

use crate::cli::{
    FormulaAddArgs, FormulaArgs, FormulaCommands, FormulaEditArgs, FormulaFields,
    FormulaIdArgs, FormulaImportArgs, FormulaTestArgs, FormulaValidateArgs,
};
use crate::context::RuntimeContext;
use crate::output::{
    output_json, output_table, print_formula, print_test_result, print_validation,
};

/// Execute the `colc formula` command.
pub fn run(ctx: &RuntimeContext, args: &FormulaArgs) -> Result<()> {
    match &args.command {
        FormulaCommands::List => run_list(ctx),
        FormulaCommands::Show(a) => run_show(ctx, a),
        FormulaCommands::Add(a) => run_add(ctx, a),
        FormulaCommands::Edit(a) => run_edit(ctx, a),
        FormulaCommands::Remove(a) => run_remove(ctx, a),
        FormulaCommands::Import(a) => run_import(ctx, a),
        FormulaCommands::Validate(a) => run_validate(ctx, a),
        FormulaCommands::Test(a) => run_test(ctx, a),
    }
}

fn run_list(ctx: &RuntimeContext) -> Result<()> {
    let project = ctx.open_project()?;
    let formulas = project.manager.formulas();

    if ctx.json {
        output_json(&formulas);
        return Ok(());
    }
    if formulas.is_empty() {
        println!("No formulas defined. Add one with `colc formula add`.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = formulas
        .iter()
        .map(|f| {
            vec![
                f.id.clone(),
                f.algorithm.to_string(),
                f.name.clone(),
                f.parameter_summary(),
            ]
        })
        .collect();
    output_table(&["ID", "ALGORITHM", "NAME", "PARAMETERS"], &rows);
    Ok(())
}

fn run_show(ctx: &RuntimeContext, args: &FormulaIdArgs) -> Result<()> {
    let project = ctx.open_project()?;
    let formula = project.manager.require_formula(&args.id)?;

    if ctx.json {
        output_json(formula);
    } else {
        print_formula(formula);
        let used_by = project.manager.mappings_using(&formula.id);
        if !used_by.is_empty() {
            let columns: Vec<&str> = used_by.iter().map(|m| m.source_column.as_str()).collect();
            println!("  used by:     {}", columns.join(", "));
        }
    }
    Ok(())
}

fn run_add(ctx: &RuntimeContext, args: &FormulaAddArgs) -> Result<()> {
    let mut project = ctx.open_project()?;
    ctx.require_access(&project)?;

    let parameters = apply_fields(FormulaParameters::new(), &args.fields)?;
    let formula = FormulaBuilder::new(args.name.clone())
        .id(args.id.clone().unwrap_or_default())
        .description(args.fields.description.clone().unwrap_or_default())
        .algorithm(args.algorithm.as_str())
        .parameters(parameters)
        .build();

    let added = project.manager.add_formula(formula)?.clone();
    let validation = project.engine.validate(&added);

    if ctx.json {
        output_json(&added);
    } else if !ctx.quiet {
        println!("Added formula: {}", render_formula_compact(&added));
        print_warnings(&validation);
    }
    Ok(())
}

fn run_edit(ctx: &RuntimeContext, args: &FormulaEditArgs) -> Result<()> {
    let mut project = ctx.open_project()?;
    ctx.require_access(&project)?;

    let mut formula = project.manager.require_formula(&args.id)?.clone();
    if let Some(name) = &args.name {
        formula.name = name.clone();
    }
    if let Some(description) = &args.fields.description {
        formula.description = description.clone();
    }
    if let Some(algorithm) = &args.algorithm {
        let algorithm = Algorithm::from(algorithm.as_str());
        if algorithm != formula.algorithm {
            formula.algorithm = algorithm;
            formula.parameters = FormulaParameters::new();
        }
    }
    formula.parameters = apply_fields(formula.parameters, &args.fields)?;

    let updated = project.manager.update_formula(&args.id, formula)?.clone();
    let validation = project.engine.validate(&updated);

    if ctx.json {
        output_json(&updated);
    } else if !ctx.quiet {
        println!("Updated formula: {}", render_formula_compact(&updated));
        print_warnings(&validation);
    }
    Ok(())
}

fn run_remove(ctx: &RuntimeContext, args: &FormulaIdArgs) -> Result<()> {
    let mut project = ctx.open_project()?;
    ctx.require_access(&project)?;

    let dangling: Vec<String> = project
        .manager
        .mappings_using(&args.id)
        .iter()
        .map(|m| m.source_column.clone())
        .collect();
    let removed = project.manager.remove_formula(&args.id)?;

    if ctx.json {
        output_json(&serde_json::json!({
            "removed": removed.id,
            "dangling_mappings": dangling,
        }));
    } else if !ctx.quiet {
        println!("Removed formula: {}", removed.id);
        if !dangling.is_empty() {
            println!(
                "{} {}",
                render_warn_icon(),
                render_warn(&format!(
                    "mappings still reference it and will fail at run time: {}",
                    dangling.join(", ")
                ))
            );
        }
    }
    Ok(())
}

fn run_import(ctx: &RuntimeContext, args: &FormulaImportArgs) -> Result<()> {
    let mut project = ctx.open_project()?;
    ctx.require_access(&project)?;

    let formulas = load_formulas(&args.file)
        .with_context(|| format!("failed to load formulas from {}", args.file.display()))?;

    let mut added = Vec::new();
    let mut replaced = Vec::new();
    let mut skipped = Vec::new();
    for formula in formulas {
        let exists = !formula.id.is_empty() && project.manager.formula(&formula.id).is_some();
        if exists && !args.replace {
            skipped.push(formula.id);
            continue;
        }
        let id = label(&formula);
        let result = if exists {
            project.manager.update_formula(&id, formula).map(|f| f.id.clone())
        } else {
            project.manager.add_formula(formula).map(|f| f.id.clone())
        };
        match result {
            Ok(id) if exists => replaced.push(id),
            Ok(id) => added.push(id),
            Err(ConfigError::InvalidFormula { errors }) => {
                bail!("formula '{}' is invalid: {}", id, errors.join("; "))
            }
            Err(e) => return Err(e.into()),
        }
    }

    if ctx.json {
        output_json(&serde_json::json!({
            "added": added,
            "replaced": replaced,
            "skipped": skipped,
        }));
    } else if !ctx.quiet {
        println!(
            "Imported {} formula(s), replaced {}, skipped {}",
            added.len(),
            replaced.len(),
            skipped.len()
        );
        if !skipped.is_empty() {
            println!(
                "  {}",
                render_warn(&format!(
                    "already present (use --replace): {}",
                    skipped.join(", ")
                ))
            );
        }
    }
    Ok(())
}

fn run_validate(ctx: &RuntimeContext, args: &FormulaValidateArgs) -> Result<()> {
    let project = ctx.open_project()?;

    let formulas: Vec<EncodingFormula> = match (&args.file, &args.id) {
        (Some(file), _) => load_formulas(file)
            .with_context(|| format!("failed to load formulas from {}", file.display()))?,
        (None, Some(id)) => vec![project.manager.require_formula(id)?.clone()],
        (None, None) => bail!("a formula ID or --file is required"),
    };

    let results: Vec<(String, FormulaValidation)> = formulas
        .iter()
        .map(|f| (label(f), project.engine.validate(f)))
        .collect();
    let invalid = results.iter().filter(|(_, v)| !v.is_valid).count();

    if ctx.json {
        let entries: Vec<serde_json::Value> = results
            .iter()
            .map(|(label, v)| serde_json::json!({ "formula": label, "validation": v }))
            .collect();
        output_json(&entries);
    } else {
        for (label, validation) in &results {
            print_validation(label, validation);
        }
    }

    if invalid > 0 {
        bail!("{} of {} formula(s) invalid", invalid, results.len());
    }
    Ok(())
}

fn run_test(ctx: &RuntimeContext, args: &FormulaTestArgs) -> Result<()> {
    let project = ctx.open_project()?;
    let formula = project.manager.require_formula(&args.id)?;

    let sample = args
        .sample
        .as_deref()
        .or(project.settings.sample.as_deref())
        .unwrap_or(DEFAULT_SAMPLE);
    let mut samples = vec![sample];
    if args.extended {
        samples.extend(EXTENDED_SAMPLES.iter().copied().filter(|s| *s != sample));
    }
    let results = test_formula_samples(&project.engine, formula, &samples);

    if ctx.json {
        output_json(&serde_json::json!({
            "formula": formula.id,
            "results": results,
        }));
    } else {
        println!("{}", render_formula_compact(formula));
        for result in &results {
            print_test_result(result);
        }
    }

    let failed: Vec<&str> = results
        .iter()
        .filter(|r| !r.is_reversible)
        .map(|r| r.original.as_str())
        .collect();
    if !failed.is_empty() {
        bail!(
            "formula '{}' is not reversible for: {}",
            formula.id,
            failed.join(", ")
        );
    }
    Ok(())
}

/// Applies the command-line parameter flags on top of `params`.
fn apply_fields(mut params: FormulaParameters, fields: &FormulaFields) -> Result<FormulaParameters> {
    if let Some(shift) = fields.shift {
        params = params.with_shift(shift);
    }
    if !fields.map.is_empty() {
        let pairs = fields
            .map
            .iter()
            .map(String::as_str)
            .map(parse_map_entry)
            .collect::<Result<Vec<_>>>()?;
        params = params.with_mapping(pairs);
    }
    if let Some(function) = &fields.function {
        params = params.with_function(function.clone());
    }
    if fields.reverse_order {
        params = params.with_reverse_order(true);
    }
    Ok(params)
}

/// Parses a `FROM=TO` pair of single characters.
fn parse_map_entry(entry: &str) -> Result<(char, char)> {
    let Some((from, to)) = entry.split_once('=') else {
        bail!("invalid --map entry '{}': expected FROM=TO", entry);
    };
    let mut from_chars = from.chars();
    let mut to_chars = to.chars();
    match (from_chars.next(), from_chars.next(), to_chars.next(), to_chars.next()) {
        (Some(f), None, Some(t), None) => Ok((f, t)),
        _ => bail!(
            "invalid --map entry '{}': both sides must be a single character",
            entry
        ),
    }
}

fn label(formula: &EncodingFormula) -> String {
    match (formula.id.is_empty(), formula.name.is_empty()) {
        (false, _) => formula.id.clone(),
        (true, false) => formula.name.clone(),
        (true, true) => "(unnamed)".to_string(),
    }
}

fn print_warnings(validation: &FormulaValidation) {
    for warning in &validation.warnings {
        println!("  {} {}", render_warn_icon(), render_warn(warning));
    }
}
