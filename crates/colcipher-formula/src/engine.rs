//! The formula engine: fail-open encode/decode over the algorithm registry.

use std::sync::LazyLock;

use colcipher_core::enums::Algorithm;
use colcipher_core::formula::EncodingFormula;
use tracing::warn;

use crate::registry::{AlgorithmRegistry, TransformRegistry};
use crate::selftest::{self, FormulaTestResult};
use crate::types::TransformError;
use crate::validator::{self, FormulaValidation};

/// Engine shared by the free [`encode`] / [`decode`] functions.
static DEFAULT_ENGINE: LazyLock<FormulaEngine> = LazyLock::new(FormulaEngine::new);

/// Encodes and decodes values with encoding formulas.
///
/// Holds no mutable state; one engine can serve any number of threads.
#[derive(Debug, Clone, Default)]
pub struct FormulaEngine {
    registry: AlgorithmRegistry,
}

impl FormulaEngine {
    /// An engine with the built-in custom transforms registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine whose `custom` algorithm resolves names from `transforms`.
    pub fn with_transforms(transforms: TransformRegistry) -> Self {
        Self {
            registry: AlgorithmRegistry::new(transforms),
        }
    }

    pub fn transforms(&self) -> &TransformRegistry {
        self.registry.transforms()
    }

    /// Encodes `value`, surfacing any failure.
    pub fn try_encode(
        &self,
        value: &str,
        formula: &EncodingFormula,
    ) -> Result<String, TransformError> {
        if value.is_empty() {
            return Ok(String::new());
        }
        self.registry
            .codec(&formula.algorithm)?
            .encode(value, &formula.parameters)
    }

    /// Decodes `value`, surfacing any failure.
    pub fn try_decode(
        &self,
        value: &str,
        formula: &EncodingFormula,
    ) -> Result<String, TransformError> {
        if value.is_empty() {
            return Ok(String::new());
        }
        self.registry
            .codec(&formula.algorithm)?
            .decode(value, &formula.parameters)
    }

    /// Encodes `value` with `formula`.
    ///
    /// Never fails: on any internal error the input is returned unchanged and
    /// the error is logged at `warn` level.
    pub fn encode(&self, value: &str, formula: &EncodingFormula) -> String {
        self.try_encode(value, formula)
            .unwrap_or_else(|e| fail_open("encode", value, formula, &e))
    }

    /// Decodes `value` with `formula`, with the same failure policy as
    /// [`FormulaEngine::encode`].
    pub fn decode(&self, value: &str, formula: &EncodingFormula) -> String {
        self.try_decode(value, formula)
            .unwrap_or_else(|e| fail_open("decode", value, formula, &e))
    }

    /// Validates `formula`, adding a warning when a `custom` formula names a
    /// transform this engine does not know.
    pub fn validate(&self, formula: &EncodingFormula) -> FormulaValidation {
        let mut result = validator::validate_formula(formula);
        if formula.algorithm == Algorithm::Custom {
            if let Ok(Some(name)) = formula.parameters.custom_function() {
                if !name.trim().is_empty() && !self.transforms().contains(name) {
                    result.warnings.push(format!(
                        "Custom function '{}' is not a registered transform (available: {})",
                        name,
                        self.transforms().names().join(", ")
                    ));
                }
            }
        }
        result
    }

    /// Round-trips `sample` (or the default probe) through the formula.
    pub fn test_formula(&self, formula: &EncodingFormula, sample: Option<&str>) -> FormulaTestResult {
        selftest::test_formula(self, formula, sample)
    }
}

fn fail_open(op: &str, value: &str, formula: &EncodingFormula, error: &TransformError) -> String {
    warn!(
        op,
        formula_id = %formula.id,
        algorithm = %formula.algorithm,
        %error,
        "transform failed, passing value through unchanged"
    );
    value.to_string()
}

/// Encodes with the default engine. See [`FormulaEngine::encode`].
pub fn encode(value: &str, formula: &EncodingFormula) -> String {
    DEFAULT_ENGINE.encode(value, formula)
}

/// Decodes with the default engine. See [`FormulaEngine::decode`].
pub fn decode(value: &str, formula: &EncodingFormula) -> String {
    DEFAULT_ENGINE.decode(value, formula)
}

#[cfg(test)]
mod tests {
    use super::*;
    use colcipher_core::formula::FormulaBuilder;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn formula(algorithm: Algorithm) -> FormulaBuilder {
        FormulaBuilder::new("test").id("t").algorithm(algorithm)
    }

    #[test]
    fn caesar_example() {
        let f = formula(Algorithm::Caesar).shift(3).build();
        assert_eq!(encode("ABC123XYZ", &f), "DEF456ABC");
        assert_eq!(decode("DEF456ABC", &f), "ABC123XYZ");
    }

    #[test]
    fn position_shift_example() {
        let f = formula(Algorithm::PositionShift).shift(2).build();
        assert_eq!(encode("ABCDE", &f), "CDEAB");
        assert_eq!(decode("CDEAB", &f), "ABCDE");
    }

    #[test]
    fn digit_reversal_example() {
        let f = formula(Algorithm::DigitReversal).build();
        assert_eq!(encode("AB-12", &f), "21-BA");
        assert_eq!(decode("21-BA", &f), "AB-12");
        assert_eq!(encode("21-BA", &f), "AB-12");
    }

    #[test]
    fn unknown_algorithm_fails_open() {
        let f = formula(Algorithm::from("vigenere")).build();
        assert_eq!(encode("X", &f), "X");
        assert_eq!(decode("X", &f), "X");
        let engine = FormulaEngine::new();
        assert!(matches!(
            engine.try_encode("X", &f),
            Err(TransformError::UnknownAlgorithm(_))
        ));
    }

    #[test]
    fn malformed_parameter_fails_open() {
        let mut f = formula(Algorithm::Caesar).build();
        f.parameters.insert("shiftValue", serde_json::json!({"oops": true}));
        assert_eq!(encode("abc", &f), "abc");
    }

    #[test]
    fn empty_value_short_circuits() {
        let f = formula(Algorithm::from("nope")).build();
        let engine = FormulaEngine::new();
        assert_eq!(engine.try_encode("", &f), Ok(String::new()));
    }

    #[test]
    fn custom_mapping_non_injective_decode() {
        let f = formula(Algorithm::CustomMapping)
            .mapping([('a', 'b'), ('c', 'b')])
            .build();
        assert_eq!(encode("abc", &f), "bbb");
        assert_eq!(decode("b", &f), "c");
    }

    #[test]
    fn custom_unregistered_decodes_to_identity() {
        let f = formula(Algorithm::Custom).function("missing").build();
        assert_eq!(encode("secret", &f), "secret");
        assert_eq!(decode("secret", &f), "secret");
    }

    #[test]
    fn custom_with_injected_registry() {
        let mut transforms = TransformRegistry::new();
        transforms.register(
            "upper",
            crate::registry::FnTransform {
                encode: |s| s.to_ascii_uppercase(),
                decode: |s| s.to_ascii_lowercase(),
            },
        );
        let engine = FormulaEngine::with_transforms(transforms);
        let f = formula(Algorithm::Custom).function("upper").build();
        assert_eq!(engine.encode("abc", &f), "ABC");
        assert_eq!(engine.decode("ABC", &f), "abc");
        // Built-ins are not present in an injected registry.
        let rot = formula(Algorithm::Custom).function("rot13").build();
        assert_eq!(engine.encode("abc", &rot), "abc");
    }

    #[test]
    fn validate_warns_on_unregistered_custom() {
        let engine = FormulaEngine::new();
        let f = formula(Algorithm::Custom).function("nope").build();
        let v = engine.validate(&f);
        assert!(v.is_valid);
        assert_eq!(v.warnings.len(), 1);
        assert!(v.warnings[0].contains("'nope'"));

        let f = formula(Algorithm::Custom).function("rot13").build();
        assert!(engine.validate(&f).warnings.is_empty());
    }

    #[test]
    fn engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FormulaEngine>();
    }

    proptest! {
        #[test]
        fn roundtrip_law(
            s in "[ -~]{0,48}",
            shift in -1000i64..1000,
            alg in prop::sample::select(vec![
                Algorithm::Caesar,
                Algorithm::DigitReversal,
                Algorithm::PositionShift,
            ]),
        ) {
            let f = formula(alg).shift(shift).build();
            prop_assert_eq!(decode(&encode(&s, &f), &f), s);
        }

        #[test]
        fn injective_mapping_roundtrips(s in "[a-f ]{0,32}") {
            let f = formula(Algorithm::CustomMapping)
                .mapping([('a', 'd'), ('b', 'e'), ('c', 'f'), ('d', 'a'), ('e', 'b'), ('f', 'c')])
                .build();
            prop_assert_eq!(decode(&encode(&s, &f), &f), s);
        }
    }
}
