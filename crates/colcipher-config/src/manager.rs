//! [`ConfigManager`]: the single owner of persisted formulas, pipeline
//! configuration and run history.
//!
//! State is loaded from the [`KeyValueStore`] once, on construction, and
//! every successful mutation writes the affected document straight back.
//! A mutation that fails validation leaves both memory and store untouched.

use colcipher_core::formula::{EncodingFormula, default_formulas};
use colcipher_core::idgen::unique_formula_id;
use colcipher_core::mapping::ColumnMapping;
use colcipher_core::run::RunRecord;
use colcipher_formula::validate_formula;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::pipeline::PipelineConfig;
use crate::settings::{ConfigError, Result};
use crate::store::KeyValueStore;

/// Store key holding the formula collection.
pub const FORMULAS_KEY: &str = "formulas";
/// Store key holding the [`PipelineConfig`].
pub const PIPELINE_KEY: &str = "pipeline_config";
/// Store key holding the run history, newest last.
pub const HISTORY_KEY: &str = "run_history";

/// Default number of runs kept in history.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Owns the formula collection, pipeline configuration and run history.
#[derive(Debug)]
pub struct ConfigManager<S: KeyValueStore> {
    store: S,
    formulas: Vec<EncodingFormula>,
    pipeline: PipelineConfig,
    history: Vec<RunRecord>,
    history_limit: usize,
}

impl<S: KeyValueStore> ConfigManager<S> {
    /// Loads all state from `store`.
    ///
    /// A store without a formula collection is seeded with the built-in
    /// defaults, which are written back immediately.
    pub fn load(store: S) -> Result<Self> {
        let formulas = match read_json::<Vec<EncodingFormula>>(&store, FORMULAS_KEY)? {
            Some(formulas) => formulas,
            None => {
                let defaults = default_formulas();
                write_json(&store, FORMULAS_KEY, &defaults)?;
                info!(count = defaults.len(), "seeded default formulas");
                defaults
            }
        };
        let pipeline = read_json(&store, PIPELINE_KEY)?.unwrap_or_default();
        let history = read_json(&store, HISTORY_KEY)?.unwrap_or_default();
        debug!(formulas = formulas.len(), "configuration loaded");

        Ok(Self {
            store,
            formulas,
            pipeline,
            history,
            history_limit: DEFAULT_HISTORY_LIMIT,
        })
    }

    /// Caps the run history at `limit` entries (at least one).
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit.max(1);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    // -- Formulas ------------------------------------------------------------

    pub fn formulas(&self) -> &[EncodingFormula] {
        &self.formulas
    }

    pub fn formula(&self, id: &str) -> Option<&EncodingFormula> {
        self.formulas.iter().find(|f| f.id == id)
    }

    /// Like [`ConfigManager::formula`], but a missing id is an error.
    pub fn require_formula(&self, id: &str) -> Result<&EncodingFormula> {
        self.formula(id)
            .ok_or_else(|| ConfigError::FormulaNotFound(id.to_string()))
    }

    /// Adds a formula and persists the collection.
    ///
    /// An empty id is replaced with a generated `fm-` id. The formula must
    /// pass validation and its id must not already exist.
    pub fn add_formula(&mut self, mut formula: EncodingFormula) -> Result<&EncodingFormula> {
        if formula.id.trim().is_empty() {
            let formulas = &self.formulas;
            formula.id = unique_formula_id(&formula.name, formula.created_at, |candidate| {
                formulas.iter().any(|f| f.id == candidate)
            })
            .ok_or_else(|| ConfigError::DuplicateFormula(formula.name.clone()))?;
        }
        if self.formula(&formula.id).is_some() {
            return Err(ConfigError::DuplicateFormula(formula.id));
        }
        check_valid(&formula)?;

        let mut next = self.formulas.clone();
        next.push(formula);
        self.save_formulas(next)?;
        info!(id = %self.formulas[self.formulas.len() - 1].id, "formula added");
        Ok(&self.formulas[self.formulas.len() - 1])
    }

    /// Replaces the formula with `id`, keeping its id and creation time.
    pub fn update_formula(&mut self, id: &str, mut formula: EncodingFormula) -> Result<&EncodingFormula> {
        let idx = self
            .formulas
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| ConfigError::FormulaNotFound(id.to_string()))?;
        formula.id = id.to_string();
        formula.created_at = self.formulas[idx].created_at;
        check_valid(&formula)?;

        let mut next = self.formulas.clone();
        next[idx] = formula;
        self.save_formulas(next)?;
        info!(id, "formula updated");
        Ok(&self.formulas[idx])
    }

    /// Deletes the formula with `id`.
    ///
    /// Mappings that reference it are left alone; see
    /// [`ConfigManager::mappings_using`].
    pub fn remove_formula(&mut self, id: &str) -> Result<EncodingFormula> {
        let idx = self
            .formulas
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| ConfigError::FormulaNotFound(id.to_string()))?;
        let mut next = self.formulas.clone();
        let removed = next.remove(idx);
        self.save_formulas(next)?;
        info!(id, "formula removed");
        Ok(removed)
    }

    /// Mappings that resolve to formula `id`, including through the
    /// pipeline default.
    pub fn mappings_using(&self, id: &str) -> Vec<&ColumnMapping> {
        let default = self.pipeline.default_formula_id.as_deref();
        self.pipeline
            .column_mappings
            .iter()
            .filter(|m| m.encode && m.resolve_formula(default) == Some(id))
            .collect()
    }

    fn save_formulas(&mut self, formulas: Vec<EncodingFormula>) -> Result<()> {
        write_json(&self.store, FORMULAS_KEY, &formulas)?;
        self.formulas = formulas;
        Ok(())
    }

    // -- Pipeline ------------------------------------------------------------

    pub fn pipeline(&self) -> &PipelineConfig {
        &self.pipeline
    }

    /// Applies `edit` to a copy of the pipeline configuration and persists
    /// it if the closure succeeds.
    pub fn update_pipeline<T, F>(&mut self, edit: F) -> Result<T>
    where
        F: FnOnce(&mut PipelineConfig) -> Result<T>,
    {
        let mut next = self.pipeline.clone();
        let out = edit(&mut next)?;
        write_json(&self.store, PIPELINE_KEY, &next)?;
        self.pipeline = next;
        debug!("pipeline configuration saved");
        Ok(out)
    }

    // -- Run history ---------------------------------------------------------

    /// All recorded runs, oldest first.
    pub fn history(&self) -> &[RunRecord] {
        &self.history
    }

    pub fn last_run(&self) -> Option<&RunRecord> {
        self.history.last()
    }

    /// Appends a run and drops the oldest entries beyond the history limit.
    pub fn record_run(&mut self, record: RunRecord) -> Result<()> {
        let mut next = self.history.clone();
        next.push(record);
        if next.len() > self.history_limit {
            let excess = next.len() - self.history_limit;
            next.drain(..excess);
        }
        write_json(&self.store, HISTORY_KEY, &next)?;
        self.history = next;
        Ok(())
    }
}

fn check_valid(formula: &EncodingFormula) -> Result<()> {
    let validation = validate_formula(formula);
    if validation.is_valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidFormula {
            errors: validation.errors,
        })
    }
}

fn read_json<T: DeserializeOwned>(store: &impl KeyValueStore, key: &str) -> Result<Option<T>> {
    match store.get(key)? {
        None => Ok(None),
        Some(bytes) => serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| ConfigError::Corrupt {
                key: key.to_string(),
                source,
            }),
    }
}

fn write_json<T: Serialize + ?Sized>(store: &impl KeyValueStore, key: &str, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec(value).map_err(|source| ConfigError::Corrupt {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &bytes)?;
    Ok(())
}
