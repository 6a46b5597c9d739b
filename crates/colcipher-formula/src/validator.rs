//! Formula validation.
//!
//! Every rule is evaluated independently and all failures are collected. The
//! result is data, never an error: `encode`/`decode` do not re-check these
//! rules, so callers validate before putting a formula into production.

use colcipher_core::enums::Algorithm;
use colcipher_core::formula::{CUSTOM_FUNCTION, CUSTOM_MAPPING, EncodingFormula, SHIFT_VALUE};
use serde::Serialize;

use crate::algorithms;

/// Outcome of [`validate_formula`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
    /// Advisory findings that do not make the formula invalid.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Checks that a formula carries the fields and parameters its algorithm needs.
pub fn validate_formula(formula: &EncodingFormula) -> FormulaValidation {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if formula.id.trim().is_empty() {
        errors.push("Formula ID is required".to_string());
    }
    if formula.name.trim().is_empty() {
        errors.push("Formula name is required".to_string());
    }

    let algorithm = &formula.algorithm;
    if algorithm.is_unset() {
        errors.push("Algorithm is required".to_string());
    } else if !algorithm.is_known() {
        errors.push(format!("Unknown algorithm: {algorithm}"));
    }
    match algorithm {
        Algorithm::Caesar | Algorithm::PositionShift => check_shift(formula, &mut errors),
        Algorithm::CustomMapping => check_mapping(formula, &mut errors, &mut warnings),
        Algorithm::Custom => check_function(formula, &mut errors),
        Algorithm::DigitReversal | Algorithm::Unknown(_) => {}
    }

    FormulaValidation {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}

fn check_shift(formula: &EncodingFormula, errors: &mut Vec<String>) {
    let params = &formula.parameters;
    if !params.contains(SHIFT_VALUE) {
        errors.push(format!(
            "Shift value is required for {} algorithm",
            formula.algorithm
        ));
    }
    match params.shift_value() {
        Ok(Some(_)) => {}
        Ok(None) => errors.push("Shift value must be a number".to_string()),
        Err(e) => errors.push(format!("Shift value {}", e.reason)),
    }
}

fn check_mapping(formula: &EncodingFormula, errors: &mut Vec<String>, warnings: &mut Vec<String>) {
    let params = &formula.parameters;
    if !params.contains(CUSTOM_MAPPING) {
        errors.push("Custom mapping is required for custom_mapping algorithm".to_string());
    }
    match params.custom_mapping() {
        Ok(Some(pairs)) if !pairs.is_empty() => {
            let inverse = algorithms::inverse_table(&pairs);
            for target in algorithms::ambiguous_targets(&pairs) {
                let winner = inverse.get(&target).copied().unwrap_or(target);
                warnings.push(format!(
                    "Custom mapping is not reversible: '{target}' is produced by more than one \
                     character and decodes to '{winner}'"
                ));
            }
        }
        Ok(_) => errors.push("Custom mapping must not be empty".to_string()),
        Err(_) => errors.push("Custom mapping entries must map single characters".to_string()),
    }
}

fn check_function(formula: &EncodingFormula, errors: &mut Vec<String>) {
    let params = &formula.parameters;
    if !params.contains(CUSTOM_FUNCTION) {
        errors.push("Custom function is required for custom algorithm".to_string());
    }
    match params.custom_function() {
        Ok(Some(name)) if !name.trim().is_empty() => {}
        Ok(_) => errors.push("Custom function must not be empty".to_string()),
        Err(_) => errors.push("Custom function must be a string".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colcipher_core::formula::{FormulaBuilder, FormulaParameters, default_formulas};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn named(algorithm: Algorithm) -> FormulaBuilder {
        FormulaBuilder::new("Name").id("id-1").algorithm(algorithm)
    }

    #[test]
    fn null_algorithm_reports_required() {
        let f: EncodingFormula =
            serde_json::from_value(json!({"id": "x", "name": "X", "algorithm": null, "parameters": null}))
                .unwrap();
        let v = validate_formula(&f);
        assert!(!v.is_valid);
        assert_eq!(v.errors, vec!["Algorithm is required".to_string()]);
    }

    #[test]
    fn defaults_are_valid() {
        for f in default_formulas() {
            let v = validate_formula(&f);
            assert!(v.is_valid, "{}: {:?}", f.id, v.errors);
        }
    }

    #[test]
    fn empty_caesar_reports_four_errors() {
        let f = FormulaBuilder::new("").algorithm(Algorithm::Caesar).build();
        let v = validate_formula(&f);
        assert!(!v.is_valid);
        assert_eq!(
            v.errors,
            vec![
                "Formula ID is required",
                "Formula name is required",
                "Shift value is required for caesar algorithm",
                "Shift value must be a number",
            ]
        );
    }

    #[test]
    fn missing_algorithm() {
        let f = FormulaBuilder::new("n").id("i").build();
        assert_eq!(validate_formula(&f).errors, vec!["Algorithm is required"]);
    }

    #[test]
    fn unknown_algorithm() {
        let f = named(Algorithm::from("vigenere")).build();
        assert_eq!(validate_formula(&f).errors, vec!["Unknown algorithm: vigenere"]);
    }

    #[test]
    fn non_numeric_shift() {
        let mut p = FormulaParameters::new();
        p.insert(SHIFT_VALUE, json!("3"));
        let f = named(Algorithm::PositionShift).parameters(p).build();
        assert_eq!(validate_formula(&f).errors, vec!["Shift value must be a number"]);
    }

    #[test]
    fn fractional_shift() {
        let mut p = FormulaParameters::new();
        p.insert(SHIFT_VALUE, json!(2.5));
        let f = named(Algorithm::Caesar).parameters(p).build();
        assert_eq!(validate_formula(&f).errors, vec!["Shift value must be an integer"]);
    }

    #[test]
    fn digit_reversal_needs_nothing() {
        let f = named(Algorithm::DigitReversal).build();
        assert!(validate_formula(&f).is_valid);
    }

    #[test]
    fn mapping_missing_and_empty() {
        let f = named(Algorithm::CustomMapping).build();
        assert_eq!(
            validate_formula(&f).errors,
            vec![
                "Custom mapping is required for custom_mapping algorithm",
                "Custom mapping must not be empty",
            ]
        );

        let f = named(Algorithm::CustomMapping)
            .mapping(Vec::<(char, char)>::new())
            .build();
        assert_eq!(validate_formula(&f).errors, vec!["Custom mapping must not be empty"]);
    }

    #[test]
    fn mapping_malformed_entries() {
        let mut p = FormulaParameters::new();
        p.insert(CUSTOM_MAPPING, json!({"ab": "c"}));
        let f = named(Algorithm::CustomMapping).parameters(p).build();
        assert_eq!(
            validate_formula(&f).errors,
            vec!["Custom mapping entries must map single characters"]
        );
    }

    #[test]
    fn non_injective_mapping_warns_but_is_valid() {
        let f = named(Algorithm::CustomMapping)
            .mapping([('a', 'b'), ('c', 'b')])
            .build();
        let v = validate_formula(&f);
        assert!(v.is_valid);
        assert_eq!(v.warnings.len(), 1);
        assert!(v.warnings[0].contains("decodes to 'c'"));
    }

    #[test]
    fn custom_function_rules() {
        let f = named(Algorithm::Custom).build();
        assert_eq!(
            validate_formula(&f).errors,
            vec![
                "Custom function is required for custom algorithm",
                "Custom function must not be empty",
            ]
        );

        let f = named(Algorithm::Custom).function("  ").build();
        assert_eq!(validate_formula(&f).errors, vec!["Custom function must not be empty"]);

        let mut p = FormulaParameters::new();
        p.insert(CUSTOM_FUNCTION, json!(42));
        let f = named(Algorithm::Custom).parameters(p).build();
        assert_eq!(validate_formula(&f).errors, vec!["Custom function must be a string"]);
    }

    #[test]
    fn serializes_camel_case() {
        let v = validate_formula(&named(Algorithm::DigitReversal).build());
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json, json!({"isValid": true, "errors": []}));
    }
}
