//! Processing run results -- statistics and failed rows shown on the dashboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::jsonl::Row;

/// Counters for one processing run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingStats {
    pub total_rows: usize,
    /// Rows where every mapped column transformed cleanly.
    pub processed_rows: usize,
    /// Rows with at least one column failure. Still written, see [`FailedRow`].
    pub failed_rows: usize,
    /// Individual values passed through the formula engine successfully.
    pub encoded_values: usize,
    pub batches: usize,
    pub duration_ms: u64,
}

impl ProcessingStats {
    /// Share of rows processed without failure, in percent. 100 for an empty run.
    pub fn success_rate(&self) -> f64 {
        if self.total_rows == 0 {
            return 100.0;
        }
        self.processed_rows as f64 * 100.0 / self.total_rows as f64
    }
}

/// Why one column of a row could not be transformed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnFailure {
    pub column: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula_id: Option<String>,
    pub reason: String,
}

/// A row that failed transformation in at least one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedRow {
    /// 1-based line in the source file.
    pub line: usize,
    /// Value of the row's `id` column, when it has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_id: Option<String>,
    pub errors: Vec<ColumnFailure>,
    /// The source row as read.
    pub original: Row,
}

/// Summary of one run, kept in the run history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRecord {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub source: String,
    pub destination: String,
    #[serde(default)]
    pub dry_run: bool,
    pub stats: ProcessingStats,
    #[serde(default)]
    pub failures: Vec<FailedRow>,
    /// `true` when more rows failed than were kept in `failures`.
    #[serde(default)]
    pub failures_truncated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_rate_of_empty_run() {
        assert_eq!(ProcessingStats::default().success_rate(), 100.0);
    }

    #[test]
    fn success_rate_counts_processed_rows() {
        let stats = ProcessingStats {
            total_rows: 8,
            processed_rows: 6,
            failed_rows: 2,
            ..Default::default()
        };
        assert_eq!(stats.success_rate(), 75.0);
    }

    #[test]
    fn failed_row_serializes_camel_case() {
        let row = FailedRow {
            line: 3,
            row_id: Some("42".into()),
            errors: vec![ColumnFailure {
                column: "email".into(),
                formula_id: None,
                reason: "column missing".into(),
            }],
            original: Row::new(),
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["rowId"], "42");
        assert_eq!(json["errors"][0]["column"], "email");
        assert!(json["errors"][0].get("formulaId").is_none());
    }
}
