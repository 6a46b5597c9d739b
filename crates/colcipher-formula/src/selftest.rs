//! Round-trip self-test for formulas.

use colcipher_core::formula::EncodingFormula;
use serde::Serialize;

use crate::engine::FormulaEngine;

/// Probe string used when the caller supplies no sample.
pub const DEFAULT_SAMPLE: &str = "Test123ABC";

/// Extra probes used by [`test_formula_samples`] alongside the default one.
pub const EXTENDED_SAMPLES: &[&str] = &[
    DEFAULT_SAMPLE,
    "hello, world!",
    "user.name+tag@example.com",
    "+1 (555) 010-9999",
    "x",
];

/// What happened to one sample on its way through encode and decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaTestResult {
    pub original: String,
    pub encoded: String,
    pub decoded: String,
    pub is_reversible: bool,
}

/// Encodes `sample`, decodes the result and reports whether it came back intact.
pub fn test_formula(
    engine: &FormulaEngine,
    formula: &EncodingFormula,
    sample: Option<&str>,
) -> FormulaTestResult {
    let original = sample.unwrap_or(DEFAULT_SAMPLE).to_string();
    let encoded = engine.encode(&original, formula);
    let decoded = engine.decode(&encoded, formula);
    FormulaTestResult {
        is_reversible: original == decoded,
        original,
        encoded,
        decoded,
    }
}

/// Runs [`test_formula`] once per sample.
pub fn test_formula_samples(
    engine: &FormulaEngine,
    formula: &EncodingFormula,
    samples: &[&str],
) -> Vec<FormulaTestResult> {
    samples
        .iter()
        .map(|s| test_formula(engine, formula, Some(s)))
        .collect()
}
