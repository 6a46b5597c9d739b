//! `colc stats` -- processing dashboard over the run history.

use anyhow::Result;
use colcipher_config::access;
use colcipher_pipeline::Dashboard;
use colcipher_ui::styles::{
    render_category, render_fail_icon, render_muted, render_rate, render_separator,
};
use colcipher_ui::terminal::{is_tty, terminal_width, truncate};

use crate::cli::StatsArgs;
use crate::context::RuntimeContext;
use crate::output::{output_json, output_table};

/// Execute the `colc stats` command.
pub fn run(ctx: &RuntimeContext, args: &StatsArgs) -> Result<()> {
    let project = ctx.open_project()?;
    let manager = &project.manager;
    let dashboard = Dashboard::from_history(manager.history());
    let protected = access::is_protected(manager.store())?;

    if ctx.json {
        let mut value = serde_json::to_value(&dashboard)?;
        if let Some(obj) = value.as_object_mut() {
            obj.insert("formulas".into(), manager.formulas().len().into());
            obj.insert(
                "mappings".into(),
                manager.pipeline().column_mappings.len().into(),
            );
            obj.insert("protected".into(), protected.into());
            if args.history {
                obj.insert("history".into(), serde_json::to_value(manager.history())?);
            }
        }
        output_json(&value);
        return Ok(());
    }

    println!("{}", render_category("Overview"));
    println!("{}", render_separator());
    println!("  Formulas:        {}", manager.formulas().len());
    println!("  Column mappings: {}", manager.pipeline().column_mappings.len());
    println!(
        "  Default formula: {}",
        manager
            .pipeline()
            .default_formula_id
            .as_deref()
            .unwrap_or("(none)")
    );
    println!("  Protected:       {}", if protected { "yes" } else { "no" });
    println!();

    println!("{}", render_category("Processing"));
    println!("{}", render_separator());
    if dashboard.runs == 0 {
        println!("  {}", render_muted("No runs recorded yet. Start one with `colc run`."));
        return Ok(());
    }
    let totals = &dashboard.totals;
    println!("  Runs:            {}", dashboard.runs);
    println!("  Total rows:      {}", totals.total_rows);
    println!("  Processed rows:  {}", totals.processed_rows);
    println!("  Failed rows:     {}", totals.failed_rows);
    println!("  Encoded values:  {}", totals.encoded_values);
    println!("  Success rate:    {}", render_rate(dashboard.success_rate));

    if let Some(last) = &dashboard.last_run {
        println!();
        println!("{}", render_category("Last run"));
        println!("{}", render_separator());
        println!(
            "  Finished:        {}",
            last.finished_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        println!("  Source:          {}", last.source);
        println!("  Destination:     {}", last.destination);
        println!(
            "  Rows:            {} total, {} failed ({})",
            last.stats.total_rows,
            last.stats.failed_rows,
            render_rate(last.stats.success_rate())
        );
        for (column, reasons) in &dashboard.failure_reasons {
            for (reason, count) in reasons {
                println!("    {} {}: {} x{}", render_fail_icon(), column, reason, count);
            }
        }

        if args.failures {
            println!();
            if last.failures.is_empty() {
                println!("  {}", render_muted("No failed rows."));
            } else {
                let rows: Vec<Vec<String>> = last
                    .failures
                    .iter()
                    .flat_map(|f| {
                        f.errors.iter().map(move |e| {
                            vec![
                                f.line.to_string(),
                                f.row_id.clone().unwrap_or_else(|| "-".to_string()),
                                if e.column.is_empty() {
                                    "(row)".to_string()
                                } else {
                                    e.column.clone()
                                },
                                fit(&e.reason),
                            ]
                        })
                    })
                    .collect();
                output_table(&["LINE", "ROW ID", "COLUMN", "REASON"], &rows);
                if last.failures_truncated {
                    println!(
                        "  {}",
                        render_muted("(only the first failed rows of the run were kept)")
                    );
                }
            }
        }
    }

    if args.history {
        println!();
        println!("{}", render_category("History"));
        println!("{}", render_separator());
        let rows: Vec<Vec<String>> = manager
            .history()
            .iter()
            .rev()
            .map(|r| {
                vec![
                    r.started_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                    r.stats.total_rows.to_string(),
                    r.stats.failed_rows.to_string(),
                    format!("{:.1}%", r.stats.success_rate()),
                    fit(&r.source),
                ]
            })
            .collect();
        output_table(&["STARTED", "ROWS", "FAILED", "SUCCESS", "SOURCE"], &rows);
    }
    Ok(())
}

/// Shortens free-text table cells to the terminal width on a TTY.
fn fit(s: &str) -> String {
    if is_tty() {
        truncate(s, terminal_width().saturating_sub(40).max(20))
    } else {
        s.to_string()
    }
}
