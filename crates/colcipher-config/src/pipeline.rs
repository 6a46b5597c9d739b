//! Pipeline configuration: where rows come from, where they go, and which
//! columns are encoded with which formula.

use colcipher_core::mapping::ColumnMapping;
use serde::{Deserialize, Serialize};

use crate::settings::{ConfigError, Result};

/// Keys accepted by [`PipelineConfig::set_value`] and
/// [`PipelineConfig::get_value`].
pub const CONFIG_KEYS: &[&str] = &[
    "source.path",
    "source.table",
    "source.batch_size",
    "destination.path",
    "destination.collection",
    "default_formula",
];

/// The row source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceConfig {
    /// JSON Lines file rows are read from.
    #[serde(default)]
    pub path: String,

    /// Logical table name, recorded in run history.
    #[serde(default)]
    pub table: String,

    /// Rows per batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            table: String::new(),
            batch_size: default_batch_size(),
        }
    }
}

fn default_batch_size() -> usize {
    100
}

/// The destination collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationConfig {
    /// JSON Lines file encoded rows are written to.
    #[serde(default)]
    pub path: String,

    #[serde(default)]
    pub collection: String,
}

/// Everything the processing loop needs besides the formulas themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfig {
    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub destination: DestinationConfig,

    /// Formula used by mappings that do not name one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_formula_id: Option<String>,

    #[serde(default)]
    pub column_mappings: Vec<ColumnMapping>,
}

impl PipelineConfig {
    /// Sets one dotted key. An empty value clears `default_formula`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidValue`] for an unknown key or a batch size that
    /// is not a positive integer.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "source.path" => self.source.path = value.to_string(),
            "source.table" => self.source.table = value.to_string(),
            "source.batch_size" => {
                self.source.batch_size = match value.trim().parse::<usize>() {
                    Ok(n) if n > 0 => n,
                    _ => {
                        return Err(ConfigError::InvalidValue {
                            key: key.to_string(),
                            reason: format!("expected a positive integer, got '{value}'"),
                        });
                    }
                }
            }
            "destination.path" => self.destination.path = value.to_string(),
            "destination.collection" => self.destination.collection = value.to_string(),
            "default_formula" => {
                self.default_formula_id = Some(value.trim().to_string()).filter(|v| !v.is_empty())
            }
            _ => {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    reason: format!("unknown key (expected one of: {})", CONFIG_KEYS.join(", ")),
                });
            }
        }
        Ok(())
    }

    /// Reads one dotted key, `None` for unknown keys.
    pub fn get_value(&self, key: &str) -> Option<String> {
        let value = match key {
            "source.path" => self.source.path.clone(),
            "source.table" => self.source.table.clone(),
            "source.batch_size" => self.source.batch_size.to_string(),
            "destination.path" => self.destination.path.clone(),
            "destination.collection" => self.destination.collection.clone(),
            "default_formula" => self.default_formula_id.clone().unwrap_or_default(),
            _ => return None,
        };
        Some(value)
    }

    /// All keys with their current values, in [`CONFIG_KEYS`] order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        CONFIG_KEYS
            .iter()
            .map(|&k| (k, self.get_value(k).unwrap_or_default()))
            .collect()
    }

    pub fn mapping(&self, source_column: &str) -> Option<&ColumnMapping> {
        self.column_mappings
            .iter()
            .find(|m| m.source_column == source_column)
    }

    /// Adds a mapping or replaces the one for the same source column.
    ///
    /// Returns `true` when an existing mapping was replaced.
    pub fn upsert_mapping(&mut self, mapping: ColumnMapping) -> bool {
        match self
            .column_mappings
            .iter_mut()
            .find(|m| m.source_column == mapping.source_column)
        {
            Some(existing) => {
                *existing = mapping;
                true
            }
            None => {
                self.column_mappings.push(mapping);
                false
            }
        }
    }

    /// Removes the mapping for `source_column`.
    pub fn remove_mapping(&mut self, source_column: &str) -> Result<ColumnMapping> {
        let idx = self
            .column_mappings
            .iter()
            .position(|m| m.source_column == source_column)
            .ok_or_else(|| ConfigError::MappingNotFound(source_column.to_string()))?;
        Ok(self.column_mappings.remove(idx))
    }

    /// Formula ids referenced by mappings or the default, deduplicated.
    pub fn referenced_formulas(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        let default = self.default_formula_id.as_deref();
        for m in self.column_mappings.iter().filter(|m| m.encode) {
            if let Some(id) = m.resolve_formula(default) {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
        if let Some(id) = default {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }
}
