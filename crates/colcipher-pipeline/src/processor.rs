//! [`Processor`]: applies column mappings to rows in batches.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use chrono::Utc;
use colcipher_config::PipelineConfig;
use colcipher_core::formula::EncodingFormula;
use colcipher_core::jsonl::{self, JsonlError, Row};
use colcipher_core::mapping::ColumnMapping;
use colcipher_core::run::{ColumnFailure, FailedRow, ProcessingStats, RunRecord};
use colcipher_formula::FormulaEngine;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{PipelineError, Result};

/// Failed rows kept by default.
pub const DEFAULT_MAX_FAILURES: usize = 100;

/// Result of [`Processor::run`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOutcome {
    pub stats: ProcessingStats,
    /// The first failed rows, up to the processor's cap.
    pub failures: Vec<FailedRow>,
    pub failures_truncated: bool,
}

/// How one formula id resolves for this run.
enum Resolved<'a> {
    Ready(&'a EncodingFormula),
    Invalid(String),
}

/// Applies the column mappings of a [`PipelineConfig`] to rows.
///
/// Formulas are looked up and validated once, on construction. The output
/// row holds exactly the mapped columns, under their target field names.
pub struct Processor<'a> {
    engine: &'a FormulaEngine,
    config: &'a PipelineConfig,
    formulas: HashMap<&'a str, Resolved<'a>>,
    max_failures: usize,
}

impl<'a> Processor<'a> {
    pub fn new(
        engine: &'a FormulaEngine,
        formulas: &'a [EncodingFormula],
        config: &'a PipelineConfig,
    ) -> Self {
        let formulas = formulas
            .iter()
            .map(|f| {
                let validation = engine.validate(f);
                let resolved = if validation.is_valid {
                    Resolved::Ready(f)
                } else {
                    Resolved::Invalid(validation.errors.join("; "))
                };
                (f.id.as_str(), resolved)
            })
            .collect();
        Self {
            engine,
            config,
            formulas,
            max_failures: DEFAULT_MAX_FAILURES,
        }
    }

    /// Caps how many failed rows are kept in the outcome.
    pub fn with_max_failures(mut self, max: usize) -> Self {
        self.max_failures = max;
        self
    }

    /// Transforms one row, returning the output row and any column failures.
    pub fn transform_row(&self, row: &Row) -> (Row, Vec<ColumnFailure>) {
        let (out, failures, _) = self.transform_counted(row);
        (out, failures)
    }

    fn transform_counted(&self, row: &Row) -> (Row, Vec<ColumnFailure>, usize) {
        let mut out = Row::new();
        let mut failures = Vec::new();
        let mut encoded = 0;
        for mapping in &self.config.column_mappings {
            let target = mapping.effective_target().to_string();
            let Some(value) = row.get(&mapping.source_column) else {
                failures.push(failure(mapping, None, "column not found in row"));
                continue;
            };
            if !mapping.encode {
                out.insert(target, value.clone());
                continue;
            }
            match self.encode_value(mapping, value) {
                Ok(Value::Null) => {
                    out.insert(target, Value::Null);
                }
                Ok(value) => {
                    encoded += 1;
                    out.insert(target, value);
                }
                Err(f) => {
                    out.insert(target, value.clone());
                    failures.push(f);
                }
            }
        }
        (out, failures, encoded)
    }

    fn encode_value(&self, mapping: &ColumnMapping, value: &Value) -> std::result::Result<Value, ColumnFailure> {
        let formula_id = mapping.resolve_formula(self.config.default_formula_id.as_deref());
        let Some(formula_id) = formula_id else {
            return Err(failure(mapping, None, "no formula configured"));
        };
        let formula = match self.formulas.get(formula_id) {
            Some(Resolved::Ready(f)) => *f,
            Some(Resolved::Invalid(errors)) => {
                return Err(failure(mapping, Some(formula_id), &format!("invalid formula: {errors}")));
            }
            None => return Err(failure(mapping, Some(formula_id), "formula not found")),
        };

        let text = match value {
            Value::Null => return Ok(Value::Null),
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Array(_) | Value::Object(_) => {
                return Err(failure(mapping, Some(formula_id), "unsupported value type"));
            }
        };
        self.engine
            .try_encode(&text, formula)
            .map(Value::String)
            .map_err(|e| failure(mapping, Some(formula_id), &e.to_string()))
    }

    /// Streams every row from `reader` to `writer` in batches.
    ///
    /// Lines that are not JSON objects count as failed rows and are not
    /// written. I/O errors abort the run.
    pub fn run<R: BufRead, W: Write>(&self, reader: R, writer: &mut W) -> Result<RunOutcome> {
        if self.config.column_mappings.is_empty() {
            return Err(PipelineError::NoMappings);
        }
        let started = Instant::now();
        let batch_size = self.config.source.batch_size.max(1);
        let mut outcome = RunOutcome::default();
        let mut batch: Vec<(usize, Row)> = Vec::with_capacity(batch_size);

        for item in jsonl::read_rows(reader) {
            match item {
                Ok(entry) => {
                    batch.push(entry);
                    if batch.len() == batch_size {
                        self.flush_batch(&mut batch, writer, &mut outcome)?;
                    }
                }
                Err(JsonlError::Io(e)) => return Err(JsonlError::Io(e).into()),
                Err(e) => {
                    // Rows read before this line are settled first so failures
                    // stay in source order.
                    if !batch.is_empty() {
                        self.flush_batch(&mut batch, writer, &mut outcome)?;
                    }
                    let line = e.line().unwrap_or(0);
                    warn!(line, error = %e, "skipping unreadable source line");
                    outcome.stats.total_rows += 1;
                    self.record_failure(
                        &mut outcome,
                        FailedRow {
                            line,
                            row_id: None,
                            errors: vec![ColumnFailure {
                                column: String::new(),
                                formula_id: None,
                                reason: e.to_string(),
                            }],
                            original: Row::new(),
                        },
                    );
                }
            }
        }
        if !batch.is_empty() {
            self.flush_batch(&mut batch, writer, &mut outcome)?;
        }
        writer.flush().map_err(JsonlError::Io)?;

        outcome.stats.duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(
            total = outcome.stats.total_rows,
            processed = outcome.stats.processed_rows,
            failed = outcome.stats.failed_rows,
            "processing finished"
        );
        Ok(outcome)
    }

    fn flush_batch<W: Write>(
        &self,
        batch: &mut Vec<(usize, Row)>,
        writer: &mut W,
        outcome: &mut RunOutcome,
    ) -> Result<()> {
        outcome.stats.batches += 1;
        debug!(batch = outcome.stats.batches, rows = batch.len(), "processing batch");
        let mut written = Vec::with_capacity(batch.len());
        for (line, row) in batch.drain(..) {
            outcome.stats.total_rows += 1;
            let (out, errors, encoded) = self.transform_counted(&row);
            outcome.stats.encoded_values += encoded;
            written.push(out);

            if errors.is_empty() {
                outcome.stats.processed_rows += 1;
            } else {
                let row_id = row.get("id").map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                });
                self.record_failure(
                    outcome,
                    FailedRow {
                        line,
                        row_id,
                        errors,
                        original: row,
                    },
                );
            }
        }
        jsonl::write_rows(writer, &written)?;
        Ok(())
    }

    fn record_failure(&self, outcome: &mut RunOutcome, failed: FailedRow) {
        outcome.stats.failed_rows += 1;
        if outcome.failures.len() < self.max_failures {
            outcome.failures.push(failed);
        } else {
            outcome.failures_truncated = true;
        }
    }
}

fn failure(mapping: &ColumnMapping, formula_id: Option<&str>, reason: &str) -> ColumnFailure {
    ColumnFailure {
        column: mapping.source_column.clone(),
        formula_id: formula_id.map(str::to_string),
        reason: reason.to_string(),
    }
}

/// Runs `processor` from the file at `input` to the file at `output`.
///
/// With `output` set to `None` the rows are processed but discarded, which
/// is how dry runs work. Returns the record to append to the run history.
pub fn run_files(processor: &Processor<'_>, input: &Path, output: Option<&Path>) -> Result<RunRecord> {
    let started_at = Utc::now();
    let reader = File::open(input).map(BufReader::new).map_err(|source| PipelineError::Open {
        path: input.to_path_buf(),
        source,
    })?;
    info!(input = %input.display(), output = ?output, "starting run");

    let outcome = match output {
        Some(path) => {
            let file = File::create(path).map_err(|source| PipelineError::Open {
                path: path.to_path_buf(),
                source,
            })?;
            let mut writer = BufWriter::new(file);
            processor.run(reader, &mut writer)?
        }
        None => processor.run(reader, &mut io::sink())?,
    };

    Ok(RunRecord {
        started_at,
        finished_at: Utc::now(),
        source: input.display().to_string(),
        destination: output.map(|p| p.display().to_string()).unwrap_or_default(),
        dry_run: output.is_none(),
        stats: outcome.stats,
        failures: outcome.failures,
        failures_truncated: outcome.failures_truncated,
    })
}
