//! EncodingFormula -- the descriptor that selects an algorithm and its parameters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::enums::Algorithm;

/// Parameter key for the integer shift used by `caesar` and `position_shift`.
pub const SHIFT_VALUE: &str = "shiftValue";
/// Parameter key for the character substitution table of `custom_mapping`.
pub const CUSTOM_MAPPING: &str = "customMapping";
/// Parameter key naming the registered transform of `custom`.
pub const CUSTOM_FUNCTION: &str = "customFunction";
/// Informational flag carried by `digit_reversal` formulas.
pub const REVERSE_ORDER: &str = "reverseOrder";

/// A parameter was present but had the wrong shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("parameter '{key}' {reason}")]
pub struct ParameterError {
    pub key: &'static str,
    pub reason: String,
}

impl ParameterError {
    fn new(key: &'static str, reason: impl Into<String>) -> Self {
        Self {
            key,
            reason: reason.into(),
        }
    }
}

/// Algorithm-specific parameter bag.
///
/// Stored as an insertion-ordered JSON object so descriptors round-trip
/// through persistence unchanged, including keys this version does not know.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FormulaParameters(Map<String, Value>);

impl<'de> Deserialize<'de> for FormulaParameters {
    /// `null` reads as an empty bag.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = Option::<Map<String, Value>>::deserialize(deserializer)?;
        Ok(Self(map.unwrap_or_default()))
    }
}

impl FormulaParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw access to a parameter value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// The shift value, `None` when absent.
    ///
    /// Integral floats (`3.0`) are accepted; anything else is an error.
    pub fn shift_value(&self) -> Result<Option<i64>, ParameterError> {
        let Some(value) = self.0.get(SHIFT_VALUE) else {
            return Ok(None);
        };
        if let Some(n) = value.as_i64() {
            return Ok(Some(n));
        }
        match value.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(Some(f as i64)),
            Some(_) => Err(ParameterError::new(SHIFT_VALUE, "must be an integer")),
            None => Err(ParameterError::new(SHIFT_VALUE, "must be a number")),
        }
    }

    /// The substitution table in insertion order, `None` when absent.
    ///
    /// Every key and value must be exactly one character.
    pub fn custom_mapping(&self) -> Result<Option<Vec<(char, char)>>, ParameterError> {
        let Some(value) = self.0.get(CUSTOM_MAPPING) else {
            return Ok(None);
        };
        let Some(object) = value.as_object() else {
            return Err(ParameterError::new(CUSTOM_MAPPING, "must be an object"));
        };
        let mut pairs = Vec::with_capacity(object.len());
        for (key, mapped) in object {
            let from = single_char(key);
            let to = mapped.as_str().and_then(single_char);
            match (from, to) {
                (Some(from), Some(to)) => pairs.push((from, to)),
                _ => {
                    return Err(ParameterError::new(
                        CUSTOM_MAPPING,
                        format!("entry '{key}' must map one character to one character"),
                    ));
                }
            }
        }
        Ok(Some(pairs))
    }

    /// The registered transform name, `None` when absent.
    pub fn custom_function(&self) -> Result<Option<&str>, ParameterError> {
        match self.0.get(CUSTOM_FUNCTION) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(ParameterError::new(CUSTOM_FUNCTION, "must be a string")),
        }
    }

    pub fn reverse_order(&self) -> bool {
        self.0
            .get(REVERSE_ORDER)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn with_shift(mut self, shift: i64) -> Self {
        self.insert(SHIFT_VALUE, Value::from(shift));
        self
    }

    pub fn with_mapping<I>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (char, char)>,
    {
        let table: Map<String, Value> = pairs
            .into_iter()
            .map(|(from, to)| (from.to_string(), Value::String(to.to_string())))
            .collect();
        self.insert(CUSTOM_MAPPING, Value::Object(table));
        self
    }

    pub fn with_function(mut self, name: impl Into<String>) -> Self {
        self.insert(CUSTOM_FUNCTION, Value::String(name.into()));
        self
    }

    pub fn with_reverse_order(mut self, reverse: bool) -> Self {
        self.insert(REVERSE_ORDER, Value::Bool(reverse));
        self
    }
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// A named, parameterized, reversible string transform descriptor.
///
/// Field names serialize in camelCase (`createdAt`, `shiftValue` inside
/// parameters) to stay compatible with descriptors exported by the web console.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodingFormula {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default)]
    pub algorithm: Algorithm,

    #[serde(default)]
    pub parameters: FormulaParameters,

    /// Set once at creation, carried unchanged through edits.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Default for EncodingFormula {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            description: String::new(),
            algorithm: Algorithm::default(),
            parameters: FormulaParameters::default(),
            created_at: Utc::now(),
        }
    }
}

impl EncodingFormula {
    /// One-line parameter summary for listings, e.g. `shiftValue=3`.
    pub fn parameter_summary(&self) -> String {
        if self.parameters.is_empty() {
            return "-".to_string();
        }
        self.parameters
            .iter()
            .map(|(k, v)| match v {
                Value::Object(m) => format!("{k}={{{} entries}}", m.len()),
                Value::String(s) => format!("{k}={s}"),
                other => format!("{k}={other}"),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Builder for [`EncodingFormula`].
pub struct FormulaBuilder {
    formula: EncodingFormula,
}

impl FormulaBuilder {
    /// Creates a new builder with the given display name.
    pub fn new(name: impl Into<String>) -> Self {
        let mut formula = EncodingFormula::default();
        formula.name = name.into();
        Self { formula }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.formula.id = id.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.formula.description = description.into();
        self
    }

    pub fn algorithm(mut self, algorithm: impl Into<Algorithm>) -> Self {
        self.formula.algorithm = algorithm.into();
        self
    }

    pub fn parameters(mut self, parameters: FormulaParameters) -> Self {
        self.formula.parameters = parameters;
        self
    }

    pub fn shift(mut self, shift: i64) -> Self {
        self.formula.parameters = self.formula.parameters.with_shift(shift);
        self
    }

    pub fn mapping<I>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (char, char)>,
    {
        self.formula.parameters = self.formula.parameters.with_mapping(pairs);
        self
    }

    pub fn function(mut self, name: impl Into<String>) -> Self {
        self.formula.parameters = self.formula.parameters.with_function(name);
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.formula.created_at = at;
        self
    }

    pub fn build(self) -> EncodingFormula {
        self.formula
    }
}

/// Formulas seeded into an empty formula collection.
pub fn default_formulas() -> Vec<EncodingFormula> {
    vec![
        FormulaBuilder::new("Caesar Shift (+3)")
            .id("caesar-3")
            .description("Shift letters and digits forward by 3")
            .algorithm(Algorithm::Caesar)
            .shift(3)
            .build(),
        FormulaBuilder::new("Digit Reversal")
            .id("digit-reversal")
            .description("Reverse the order of all letters and digits")
            .algorithm(Algorithm::DigitReversal)
            .parameters(FormulaParameters::new().with_reverse_order(true))
            .build(),
        FormulaBuilder::new("Position Shift (2)")
            .id("position-shift-2")
            .description("Rotate every value left by two characters")
            .algorithm(Algorithm::PositionShift)
            .shift(2)
            .build(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn null_algorithm_and_parameters_load_as_empty() {
        let f: EncodingFormula =
            serde_json::from_str(r#"{"id":"a","name":"b","algorithm":null,"parameters":null}"#)
                .unwrap();
        assert!(f.algorithm.is_unset());
        assert!(f.parameters.is_empty());

        let many: Vec<EncodingFormula> =
            serde_json::from_str(r#"[{"id":"a","algorithm":null},{"id":"c","algorithm":"caesar"}]"#)
                .unwrap();
        assert_eq!(many.len(), 2);
        assert_eq!(many[1].algorithm, Algorithm::Caesar);
    }

    #[test]
    fn deserialize_console_descriptor() {
        let json = r#"{
            "id": "f1",
            "name": "Shift",
            "algorithm": "caesar",
            "parameters": {"shiftValue": 5},
            "createdAt": "2024-03-01T10:00:00Z"
        }"#;
        let f: EncodingFormula = serde_json::from_str(json).unwrap();
        assert_eq!(f.id, "f1");
        assert_eq!(f.algorithm, Algorithm::Caesar);
        assert_eq!(f.parameters.shift_value(), Ok(Some(5)));
        assert_eq!(f.created_at.to_rfc3339(), "2024-03-01T10:00:00+00:00");
    }

    #[test]
    fn missing_fields_default() {
        let f: EncodingFormula = serde_json::from_str("{}").unwrap();
        assert!(f.id.is_empty());
        assert!(f.algorithm.is_unset());
        assert!(f.parameters.is_empty());
    }

    #[test]
    fn serializes_camel_case() {
        let f = FormulaBuilder::new("x").id("x").algorithm(Algorithm::Caesar).shift(1).build();
        let v = serde_json::to_value(&f).unwrap();
        assert!(v.get("createdAt").is_some());
        assert_eq!(v["parameters"]["shiftValue"], 1);
        assert!(v.get("description").is_none());
    }

    #[test]
    fn shift_value_shapes() {
        let mut p = FormulaParameters::new();
        assert_eq!(p.shift_value(), Ok(None));
        p.insert(SHIFT_VALUE, serde_json::json!(4.0));
        assert_eq!(p.shift_value(), Ok(Some(4)));
        p.insert(SHIFT_VALUE, serde_json::json!(1.5));
        assert!(p.shift_value().is_err());
        p.insert(SHIFT_VALUE, serde_json::json!("3"));
        assert!(p.shift_value().is_err());
    }

    #[test]
    fn mapping_keeps_insertion_order() {
        let p = FormulaParameters::new().with_mapping([('z', 'a'), ('a', 'z'), ('m', 'n')]);
        assert_eq!(
            p.custom_mapping().unwrap(),
            Some(vec![('z', 'a'), ('a', 'z'), ('m', 'n')])
        );
    }

    #[test]
    fn mapping_rejects_multi_char_entries() {
        let mut p = FormulaParameters::new();
        p.insert(CUSTOM_MAPPING, serde_json::json!({"ab": "c"}));
        assert!(p.custom_mapping().is_err());
        p.insert(CUSTOM_MAPPING, serde_json::json!({"a": 1}));
        assert!(p.custom_mapping().is_err());
        p.insert(CUSTOM_MAPPING, serde_json::json!(["a"]));
        assert!(p.custom_mapping().is_err());
    }

    #[test]
    fn function_must_be_string() {
        let mut p = FormulaParameters::new().with_function("rot13");
        assert_eq!(p.custom_function(), Ok(Some("rot13")));
        p.insert(CUSTOM_FUNCTION, serde_json::json!(7));
        assert!(p.custom_function().is_err());
    }

    #[test]
    fn defaults_have_stable_ids() {
        let ids: Vec<String> = default_formulas().into_iter().map(|f| f.id).collect();
        assert_eq!(ids, vec!["caesar-3", "digit-reversal", "position-shift-2"]);
    }

    #[test]
    fn parameter_summary_formats() {
        let f = FormulaBuilder::new("m")
            .algorithm(Algorithm::CustomMapping)
            .mapping([('a', 'b'), ('c', 'd')])
            .build();
        assert_eq!(f.parameter_summary(), "customMapping={2 entries}");
        let f = FormulaBuilder::new("c").algorithm(Algorithm::Caesar).shift(3).build();
        assert_eq!(f.parameter_summary(), "shiftValue=3");
    }
}
