//! Parse formula descriptor files (JSON and TOML).
//!
//! A file holds either a single formula or a collection: a JSON array, or a
//! TOML document with a `[[formulas]]` array of tables.

use std::path::Path;

use colcipher_core::formula::EncodingFormula;
use serde::Deserialize;

use crate::types::FormulaError;

#[derive(Deserialize)]
#[serde(untagged)]
enum FormulaDocument {
    Many(Vec<EncodingFormula>),
    Wrapped { formulas: Vec<EncodingFormula> },
    One(EncodingFormula),
}

impl FormulaDocument {
    fn into_vec(self) -> Vec<EncodingFormula> {
        match self {
            Self::Many(v) | Self::Wrapped { formulas: v } => v,
            Self::One(f) => vec![f],
        }
    }
}

/// Parse a single formula from a JSON string.
pub fn parse_json(content: &str) -> Result<EncodingFormula, FormulaError> {
    serde_json::from_str(content).map_err(|e| FormulaError::Parse(e.to_string()))
}

/// Parse a single formula from a TOML string.
pub fn parse_toml(content: &str) -> Result<EncodingFormula, FormulaError> {
    toml::from_str(content).map_err(|e| FormulaError::Parse(e.to_string()))
}

/// Parse one or many formulas from a JSON string.
pub fn parse_json_many(content: &str) -> Result<Vec<EncodingFormula>, FormulaError> {
    serde_json::from_str::<FormulaDocument>(content)
        .map(FormulaDocument::into_vec)
        .map_err(|e| FormulaError::Parse(e.to_string()))
}

/// Parse one or many formulas from a TOML string.
pub fn parse_toml_many(content: &str) -> Result<Vec<EncodingFormula>, FormulaError> {
    toml::from_str::<FormulaDocument>(content)
        .map(FormulaDocument::into_vec)
        .map_err(|e| FormulaError::Parse(e.to_string()))
}

/// Load formulas from a file (auto-detect TOML vs JSON by extension).
pub fn load_formulas(path: &Path) -> Result<Vec<EncodingFormula>, FormulaError> {
    let content = std::fs::read_to_string(path)?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => parse_toml_many(&content),
        Some("json") => parse_json_many(&content),
        // Try JSON first, then TOML
        _ => parse_json_many(&content).or_else(|_| parse_toml_many(&content)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colcipher_core::enums::Algorithm;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_json_single() {
        let json = r#"{"id": "c5", "name": "Caesar 5", "algorithm": "caesar",
                       "parameters": {"shiftValue": 5}}"#;
        let f = parse_json(json).unwrap();
        assert_eq!(f.id, "c5");
        assert_eq!(f.algorithm, Algorithm::Caesar);
        assert_eq!(f.parameters.shift_value(), Ok(Some(5)));
    }

    #[test]
    fn parse_json_array() {
        let json = r#"[
            {"id": "a", "name": "A", "algorithm": "digit_reversal"},
            {"id": "b", "name": "B", "algorithm": "custom", "parameters": {"customFunction": "rot13"}}
        ]"#;
        let v = parse_json_many(json).unwrap();
        assert_eq!(v.len(), 2);
        assert_eq!(v[1].parameters.custom_function(), Ok(Some("rot13")));
    }

    #[test]
    fn parse_toml_collection_with_mapping() {
        let toml_str = r#"
[[formulas]]
id = "swap"
name = "Swap vowels"
algorithm = "custom_mapping"

[formulas.parameters.customMapping]
a = "e"
e = "a"

[[formulas]]
id = "rot"
name = "Rotate"
algorithm = "position_shift"
parameters = { shiftValue = -1 }
"#;
        let v = parse_toml_many(toml_str).unwrap();
        assert_eq!(v.len(), 2);
        assert_eq!(
            v[0].parameters.custom_mapping().unwrap(),
            Some(vec![('a', 'e'), ('e', 'a')])
        );
        assert_eq!(v[1].parameters.shift_value(), Ok(Some(-1)));
    }

    #[test]
    fn parse_toml_single() {
        let f = parse_toml("id = \"d\"\nname = \"D\"\nalgorithm = \"digit_reversal\"\n").unwrap();
        assert_eq!(f.algorithm, Algorithm::DigitReversal);
    }

    #[test]
    fn parse_error_is_reported() {
        assert!(matches!(parse_json("{not json"), Err(FormulaError::Parse(_))));
    }

    #[test]
    fn load_detects_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.toml");
        std::fs::write(&path, "id = \"d\"\nname = \"D\"\nalgorithm = \"digit_reversal\"\n").unwrap();
        assert_eq!(load_formulas(&path).unwrap().len(), 1);

        let path = dir.path().join("f.formula");
        std::fs::write(&path, r#"[{"id": "x", "name": "X", "algorithm": "caesar"}]"#).unwrap();
        assert_eq!(load_formulas(&path).unwrap()[0].id, "x");
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = load_formulas(Path::new("/nonexistent/formulas.json")).unwrap_err();
        assert!(matches!(err, FormulaError::Io(_)));
    }
}
