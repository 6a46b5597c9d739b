//! `colc encode` / `colc decode` -- transform values with a formula.

use anyhow::{Context, Result};
use colcipher_core::formula::EncodingFormula;
use colcipher_formula::{FormulaEngine, TransformError};
use serde::Serialize;

use crate::cli::CodecArgs;
use crate::context::RuntimeContext;
use crate::output::output_json;

#[derive(Debug, Clone, Copy)]
enum Direction {
    Encode,
    Decode,
}

impl Direction {
    fn as_str(self) -> &'static str {
        match self {
            Self::Encode => "encode",
            Self::Decode => "decode",
        }
    }

    fn apply(self, engine: &FormulaEngine, value: &str, formula: &EncodingFormula) -> String {
        match self {
            Self::Encode => engine.encode(value, formula),
            Self::Decode => engine.decode(value, formula),
        }
    }

    fn try_apply(
        self,
        engine: &FormulaEngine,
        value: &str,
        formula: &EncodingFormula,
    ) -> std::result::Result<String, TransformError> {
        match self {
            Self::Encode => engine.try_encode(value, formula),
            Self::Decode => engine.try_decode(value, formula),
        }
    }
}

#[derive(Serialize)]
struct CodecResult<'a> {
    input: &'a str,
    output: String,
}

/// Execute the `colc encode` command.
pub fn run_encode(ctx: &RuntimeContext, args: &CodecArgs) -> Result<()> {
    run(ctx, args, Direction::Encode)
}

/// Execute the `colc decode` command.
pub fn run_decode(ctx: &RuntimeContext, args: &CodecArgs) -> Result<()> {
    run(ctx, args, Direction::Decode)
}

fn run(ctx: &RuntimeContext, args: &CodecArgs, direction: Direction) -> Result<()> {
    let project = ctx.open_project()?;
    let formula = project.manager.require_formula(&args.formula)?;

    let mut results = Vec::with_capacity(args.values.len());
    for value in &args.values {
        let output = if args.strict {
            direction
                .try_apply(&project.engine, value, formula)
                .with_context(|| {
                    format!("failed to {} '{}' with {}", direction.as_str(), value, formula.id)
                })?
        } else {
            direction.apply(&project.engine, value, formula)
        };
        results.push(CodecResult {
            input: value,
            output,
        });
    }

    if ctx.json {
        output_json(&serde_json::json!({
            "formula": formula.id,
            "operation": direction.as_str(),
            "results": results,
        }));
    } else {
        for r in &results {
            println!("{}", r.output);
        }
    }
    Ok(())
}
