//! The closed set of encoding algorithms.
//!
//! `Algorithm` serializes as its snake_case tag. Tags outside the known set
//! deserialize into [`Algorithm::Unknown`] rather than failing, so a formula
//! written by a newer tool still loads and simply degrades at encode time.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Algorithm tag of an encoding formula.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Caesar,
    DigitReversal,
    PositionShift,
    CustomMapping,
    Custom,
    /// Any other tag, including the empty string for a missing algorithm.
    Unknown(String),
}

impl Algorithm {
    /// All known algorithms, in display order.
    pub const KNOWN: [Algorithm; 5] = [
        Algorithm::Caesar,
        Algorithm::DigitReversal,
        Algorithm::PositionShift,
        Algorithm::CustomMapping,
        Algorithm::Custom,
    ];

    /// Returns the wire tag.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Caesar => "caesar",
            Self::DigitReversal => "digit_reversal",
            Self::PositionShift => "position_shift",
            Self::CustomMapping => "custom_mapping",
            Self::Custom => "custom",
            Self::Unknown(s) => s.as_str(),
        }
    }

    /// Returns `true` for one of the five known algorithms.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }

    /// Returns `true` if no algorithm tag was given at all.
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unknown(s) if s.trim().is_empty())
    }

    /// Returns `true` if the algorithm reads `shiftValue`.
    pub fn uses_shift(&self) -> bool {
        matches!(self, Self::Caesar | Self::PositionShift)
    }

    /// Short human description, used by `colc formula list`.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Caesar => "rotate letters and digits by a fixed shift",
            Self::DigitReversal => "reverse the order of alphanumeric characters",
            Self::PositionShift => "rotate the whole string left by a fixed offset",
            Self::CustomMapping => "substitute characters from a mapping table",
            Self::Custom => "named transform from the trusted registry",
            Self::Unknown(_) => "unknown algorithm",
        }
    }
}

impl Default for Algorithm {
    fn default() -> Self {
        Self::Unknown(String::new())
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Algorithm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Algorithm {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // `null` is treated like a missing tag.
        let s = Option::<String>::deserialize(deserializer)?;
        Ok(s.map(Self::from).unwrap_or_default())
    }
}

impl From<&str> for Algorithm {
    fn from(s: &str) -> Self {
        match s {
            "caesar" => Self::Caesar,
            "digit_reversal" => Self::DigitReversal,
            "position_shift" => Self::PositionShift,
            "custom_mapping" => Self::CustomMapping,
            "custom" => Self::Custom,
            other => Self::Unknown(other.to_owned()),
        }
    }
}

impl From<String> for Algorithm {
    fn from(s: String) -> Self {
        match Self::from(s.as_str()) {
            Self::Unknown(_) => Self::Unknown(s),
            known => known,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn known_tags_roundtrip_through_json() {
        for alg in Algorithm::KNOWN {
            let json = serde_json::to_string(&alg).unwrap();
            assert_eq!(json, format!("\"{}\"", alg.as_str()));
            let back: Algorithm = serde_json::from_str(&json).unwrap();
            assert_eq!(back, alg);
        }
    }

    #[test]
    fn null_tag_is_unset() {
        let alg: Algorithm = serde_json::from_str("null").unwrap();
        assert!(alg.is_unset());
        assert_eq!(alg, Algorithm::default());
    }

    #[test]
    fn unknown_tag_is_preserved() {
        let alg: Algorithm = serde_json::from_str("\"vigenere\"").unwrap();
        assert_eq!(alg, Algorithm::Unknown("vigenere".into()));
        assert!(!alg.is_known());
        assert!(!alg.is_unset());
        assert_eq!(serde_json::to_string(&alg).unwrap(), "\"vigenere\"");
    }

    #[test]
    fn default_is_unset() {
        assert!(Algorithm::default().is_unset());
        assert!(Algorithm::from("  ").is_unset());
    }

    #[test]
    fn shift_algorithms() {
        assert!(Algorithm::Caesar.uses_shift());
        assert!(Algorithm::PositionShift.uses_shift());
        assert!(!Algorithm::DigitReversal.uses_shift());
        assert!(!Algorithm::CustomMapping.uses_shift());
    }
}
