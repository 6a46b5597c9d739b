//! Column mappings -- which source columns are copied and which are encoded.

use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// Maps one source column to one destination field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMapping {
    pub source_column: String,

    /// Destination field name; empty means "same as the source column".
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub target_field: String,

    /// Whether the value is passed through the formula engine.
    #[serde(default = "default_true")]
    pub encode: bool,

    /// Formula to apply; `None` falls back to the pipeline default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula_id: Option<String>,
}

impl ColumnMapping {
    /// An encoding mapping that keeps the column name.
    pub fn new(source_column: impl Into<String>) -> Self {
        Self {
            source_column: source_column.into(),
            target_field: String::new(),
            encode: true,
            formula_id: None,
        }
    }

    pub fn target(mut self, target_field: impl Into<String>) -> Self {
        self.target_field = target_field.into();
        self
    }

    pub fn formula(mut self, formula_id: impl Into<String>) -> Self {
        self.formula_id = Some(formula_id.into());
        self
    }

    pub fn passthrough(mut self) -> Self {
        self.encode = false;
        self
    }

    /// The destination field name actually written.
    pub fn effective_target(&self) -> &str {
        if self.target_field.is_empty() {
            &self.source_column
        } else {
            &self.target_field
        }
    }

    /// The formula this mapping resolves to, given the pipeline default.
    pub fn resolve_formula<'a>(&'a self, default_formula: Option<&'a str>) -> Option<&'a str> {
        self.formula_id.as_deref().or(default_formula)
    }
}
