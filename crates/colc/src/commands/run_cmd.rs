//! `colc run` -- process the source through the configured mappings.

use std::path::PathBuf;

use anyhow::{Context, Result};
use colcipher_core::run::RunRecord;
use colcipher_pipeline::{PipelineError, Processor, run_files};
use colcipher_ui::styles::{render_fail, render_muted, render_rate, render_verdict, render_warn};

use crate::cli::RunArgs;
use crate::context::RuntimeContext;
use crate::output::output_json;

/// Execute the `colc run` command.
pub fn run(ctx: &RuntimeContext, args: &RunArgs) -> Result<()> {
    let mut project = ctx.open_project()?;
    if !args.dry_run {
        ctx.require_access(&project)?;
    }

    let pipeline = project.manager.pipeline().clone();
    let input = match &args.input {
        Some(path) => path.clone(),
        None if !pipeline.source.path.is_empty() => PathBuf::from(&pipeline.source.path),
        None => return Err(PipelineError::NoSource.into()),
    };
    let output = match (&args.output, args.dry_run) {
        (_, true) => None,
        (Some(path), false) => Some(path.clone()),
        (None, false) if !pipeline.destination.path.is_empty() => {
            Some(PathBuf::from(&pipeline.destination.path))
        }
        (None, false) => return Err(PipelineError::NoDestination.into()),
    };

    let record = {
        let processor = Processor::new(&project.engine, project.manager.formulas(), &pipeline)
            .with_max_failures(project.settings.max_failures);
        run_files(&processor, &input, output.as_deref())
            .with_context(|| format!("processing {} failed", input.display()))?
    };

    if !record.dry_run {
        project
            .manager
            .record_run(record.clone())
            .context("failed to record run history")?;
    }

    if ctx.json {
        output_json(&record);
    } else if !ctx.quiet {
        print_summary(&record);
    }
    Ok(())
}

fn print_summary(record: &RunRecord) {
    let stats = &record.stats;
    let label = if record.dry_run { "Dry run complete" } else { "Run complete" };
    println!("{}", render_verdict(stats.failed_rows == 0, label));
    println!("  source:      {}", record.source);
    if record.dry_run {
        println!("  destination: {}", render_muted("(not written)"));
    } else {
        println!("  destination: {}", record.destination);
    }
    println!(
        "  rows:        {} total, {} processed, {} failed",
        stats.total_rows, stats.processed_rows, stats.failed_rows
    );
    println!("  encoded:     {} values in {} batch(es)", stats.encoded_values, stats.batches);
    println!("  success:     {}", render_rate(stats.success_rate()));
    println!("  duration:    {} ms", stats.duration_ms);

    if !record.failures.is_empty() {
        println!();
        for failed in record.failures.iter().take(5) {
            for error in &failed.errors {
                let column = if error.column.is_empty() { "(row)" } else { &error.column };
                println!(
                    "  {} line {}: {}: {}",
                    render_fail("fail"),
                    failed.line,
                    column,
                    error.reason
                );
            }
        }
        let hidden = stats.failed_rows.saturating_sub(5);
        if hidden > 0 {
            let hint = if record.dry_run {
                format!("{hidden} more failed row(s) not shown")
            } else {
                format!("{hidden} more failed row(s); see `colc stats --failures`")
            };
            println!("  {}", render_warn(&hint));
        }
    }
}
