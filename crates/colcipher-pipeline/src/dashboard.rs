//! Aggregates over the run history, as shown by `colc stats`.

use std::collections::BTreeMap;

use colcipher_core::run::{ProcessingStats, RunRecord};
use serde::Serialize;

/// Totals across a run history plus the most recent run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub runs: usize,
    /// Summed counters over all runs (`durationMs` included).
    pub totals: ProcessingStats,
    pub success_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_run: Option<RunRecord>,
    /// Failure reasons of the last run, keyed by column, with counts.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub failure_reasons: BTreeMap<String, BTreeMap<String, usize>>,
}

impl Dashboard {
    /// Builds the dashboard from a history ordered oldest first.
    pub fn from_history(history: &[RunRecord]) -> Self {
        let mut totals = ProcessingStats::default();
        for run in history {
            let s = &run.stats;
            totals.total_rows += s.total_rows;
            totals.processed_rows += s.processed_rows;
            totals.failed_rows += s.failed_rows;
            totals.encoded_values += s.encoded_values;
            totals.batches += s.batches;
            totals.duration_ms += s.duration_ms;
        }

        let last_run = history.last().cloned();
        let mut failure_reasons: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
        if let Some(run) = &last_run {
            for failure in run.failures.iter().flat_map(|f| &f.errors) {
                let column = if failure.column.is_empty() {
                    "(row)".to_string()
                } else {
                    failure.column.clone()
                };
                *failure_reasons
                    .entry(column)
                    .or_default()
                    .entry(failure.reason.clone())
                    .or_default() += 1;
            }
        }

        Self {
            runs: history.len(),
            success_rate: totals.success_rate(),
            totals,
            last_run,
            failure_reasons,
        }
    }
}
