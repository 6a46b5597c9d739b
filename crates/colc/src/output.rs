//! Output formatting helpers for the `colc` CLI.

use std::io::{self, Write};

use colcipher_core::formula::EncodingFormula;
use colcipher_formula::{FormulaTestResult, FormulaValidation};
use colcipher_ui::styles::{
    render_algorithm, render_bold, render_fail, render_muted, render_verdict, render_warn,
    render_warn_icon,
};
use serde::Serialize;

/// Print a value as pretty-printed JSON to stdout.
///
/// Terminates the process with exit code 1 if serialization fails.
pub fn output_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            // Ignore broken pipe errors (e.g., piped to `head`)
            let _ = writeln!(handle, "{}", json);
        }
        Err(e) => {
            eprintln!("Error: failed to serialize JSON: {}", e);
            std::process::exit(1);
        }
    }
}

/// Print a simple table with headers and rows.
///
/// Column widths are computed from the data, counted in characters.
pub fn output_table(headers: &[&str], rows: &[Vec<String>]) {
    if rows.is_empty() {
        return;
    }

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    for (i, header) in headers.iter().enumerate() {
        if i > 0 {
            let _ = write!(handle, "  ");
        }
        let _ = write!(handle, "{:<width$}", header, width = widths[i]);
    }
    let _ = writeln!(handle);

    for (i, width) in widths.iter().enumerate() {
        if i > 0 {
            let _ = write!(handle, "  ");
        }
        let _ = write!(handle, "{}", "-".repeat(*width));
    }
    let _ = writeln!(handle);

    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i > 0 {
                let _ = write!(handle, "  ");
            }
            if i < widths.len() && i + 1 < row.len() {
                let _ = write!(handle, "{:<width$}", cell, width = widths[i]);
            } else {
                let _ = write!(handle, "{}", cell);
            }
        }
        let _ = writeln!(handle);
    }
}

/// Multi-line formula display for `colc formula show`.
pub fn print_formula(formula: &EncodingFormula) {
    println!("{}  {}", render_bold(&formula.id), formula.name);
    println!(
        "  algorithm:   {} {}",
        render_algorithm(&formula.algorithm),
        render_muted(&format!("({})", formula.algorithm.describe()))
    );
    if !formula.description.is_empty() {
        println!("  description: {}", formula.description);
    }
    if formula.parameters.is_empty() {
        println!("  parameters:  {}", render_muted("(none)"));
    } else {
        println!("  parameters:");
        for (key, value) in formula.parameters.iter() {
            println!("    {key}: {value}");
        }
    }
    println!(
        "  created:     {}",
        formula.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
}

/// Prints a validation verdict with its errors and warnings.
pub fn print_validation(label: &str, validation: &FormulaValidation) {
    let verdict = if validation.is_valid { "valid" } else { "invalid" };
    println!("{} {}", render_verdict(validation.is_valid, verdict), label);
    for error in &validation.errors {
        println!("  {}", render_fail(error));
    }
    for warning in &validation.warnings {
        println!("  {} {}", render_warn_icon(), render_warn(warning));
    }
}

/// Prints one self-test round trip.
pub fn print_test_result(result: &FormulaTestResult) {
    println!("  original: {}", result.original);
    println!("  encoded:  {}", result.encoded);
    println!("  decoded:  {}", result.decoded);
    let verdict = if result.is_reversible {
        "reversible"
    } else {
        "NOT reversible"
    };
    println!("  {}", render_verdict(result.is_reversible, verdict));
}
