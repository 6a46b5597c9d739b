//! Algorithm registry and the trusted custom transform registry.
//!
//! Every [`Algorithm`] tag resolves to a [`Codec`]: an encode/decode pair over
//! `(value, parameters)`. The `custom` algorithm resolves its transform by
//! name from a [`TransformRegistry`] filled in by the embedding program; no
//! transform source is ever evaluated at runtime.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use colcipher_core::enums::Algorithm;
use colcipher_core::formula::FormulaParameters;

use crate::algorithms;
use crate::types::TransformError;

/// An encode/decode pair for one algorithm.
///
/// Implementations must satisfy `decode(encode(x, p), p) == x` for valid
/// parameters, except where an algorithm documents otherwise.
pub trait Codec: Send + Sync {
    fn encode(&self, value: &str, params: &FormulaParameters) -> Result<String, TransformError>;
    fn decode(&self, value: &str, params: &FormulaParameters) -> Result<String, TransformError>;
}

/// A user-extensible transform registered under a name.
///
/// Transforms are registered as encode/decode pairs so that `custom`
/// formulas can be decoded.
pub trait CustomTransform: Send + Sync {
    fn encode(&self, value: &str) -> Result<String, TransformError>;
    fn decode(&self, value: &str) -> Result<String, TransformError>;
}

/// A [`CustomTransform`] built from two plain functions.
#[derive(Clone, Copy)]
pub struct FnTransform {
    pub encode: fn(&str) -> String,
    pub decode: fn(&str) -> String,
}

impl FnTransform {
    /// A transform that is its own inverse.
    pub fn involution(f: fn(&str) -> String) -> Self {
        Self {
            encode: f,
            decode: f,
        }
    }
}

impl CustomTransform for FnTransform {
    fn encode(&self, value: &str) -> Result<String, TransformError> {
        Ok((self.encode)(value))
    }

    fn decode(&self, value: &str) -> Result<String, TransformError> {
        Ok((self.decode)(value))
    }
}

fn reverse_chars(value: &str) -> String {
    value.chars().rev().collect()
}

fn rot13(value: &str) -> String {
    algorithms::rotate_ascii(value, 13, 0)
}

/// Named custom transforms, keyed by the `customFunction` parameter.
#[derive(Clone, Default)]
pub struct TransformRegistry {
    transforms: HashMap<String, Arc<dyn CustomTransform>>,
}

impl TransformRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the transforms shipped with colcipher:
    /// `reverse`, `swap_case`, `rot13` and `atbash`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("reverse", FnTransform::involution(reverse_chars));
        registry.register("swap_case", FnTransform::involution(algorithms::swap_ascii_case));
        registry.register("rot13", FnTransform::involution(rot13));
        registry.register("atbash", FnTransform::involution(algorithms::atbash));
        registry
    }

    /// Registers (or replaces) a transform under `name`.
    pub fn register<T>(&mut self, name: impl Into<String>, transform: T)
    where
        T: CustomTransform + 'static,
    {
        self.transforms.insert(name.into(), Arc::new(transform));
    }

    pub fn get(&self, name: &str) -> Option<&dyn CustomTransform> {
        self.transforms.get(name).map(|t| t.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.transforms.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.transforms.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformRegistry")
            .field("transforms", &self.names())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Built-in codecs
// ---------------------------------------------------------------------------

struct CaesarCodec;

impl Codec for CaesarCodec {
    fn encode(&self, value: &str, params: &FormulaParameters) -> Result<String, TransformError> {
        let shift = params.shift_value()?.unwrap_or(0);
        Ok(algorithms::caesar_encode(value, shift))
    }

    fn decode(&self, value: &str, params: &FormulaParameters) -> Result<String, TransformError> {
        let shift = params.shift_value()?.unwrap_or(0);
        Ok(algorithms::caesar_decode(value, shift))
    }
}

/// Self-inverse: encode and decode are the same transform.
struct DigitReversalCodec;

impl Codec for DigitReversalCodec {
    fn encode(&self, value: &str, _params: &FormulaParameters) -> Result<String, TransformError> {
        Ok(algorithms::reverse_alphanumerics(value))
    }

    fn decode(&self, value: &str, params: &FormulaParameters) -> Result<String, TransformError> {
        self.encode(value, params)
    }
}

struct PositionShiftCodec;

impl Codec for PositionShiftCodec {
    fn encode(&self, value: &str, params: &FormulaParameters) -> Result<String, TransformError> {
        let shift = params.shift_value()?.unwrap_or(0);
        Ok(algorithms::rotate_left(value, shift))
    }

    fn decode(&self, value: &str, params: &FormulaParameters) -> Result<String, TransformError> {
        let shift = params.shift_value()?.unwrap_or(0);
        Ok(algorithms::rotate_right(value, shift))
    }
}

struct CustomMappingCodec;

impl Codec for CustomMappingCodec {
    fn encode(&self, value: &str, params: &FormulaParameters) -> Result<String, TransformError> {
        let pairs = params.custom_mapping()?.unwrap_or_default();
        Ok(algorithms::substitute(value, &algorithms::forward_table(&pairs)))
    }

    fn decode(&self, value: &str, params: &FormulaParameters) -> Result<String, TransformError> {
        let pairs = params.custom_mapping()?.unwrap_or_default();
        Ok(algorithms::substitute(value, &algorithms::inverse_table(&pairs)))
    }
}

struct CustomCodec {
    transforms: TransformRegistry,
}

impl CustomCodec {
    fn resolve(&self, params: &FormulaParameters) -> Result<&dyn CustomTransform, TransformError> {
        let name = params.custom_function()?.unwrap_or_default();
        self.transforms
            .get(name)
            .ok_or_else(|| TransformError::UnregisteredTransform(name.to_string()))
    }
}

impl Codec for CustomCodec {
    fn encode(&self, value: &str, params: &FormulaParameters) -> Result<String, TransformError> {
        self.resolve(params)?.encode(value)
    }

    fn decode(&self, value: &str, params: &FormulaParameters) -> Result<String, TransformError> {
        self.resolve(params)?.decode(value)
    }
}

// ---------------------------------------------------------------------------
// Algorithm registry
// ---------------------------------------------------------------------------

/// Maps each known algorithm to its codec.
#[derive(Clone)]
pub struct AlgorithmRegistry {
    codecs: HashMap<Algorithm, Arc<dyn Codec>>,
    transforms: TransformRegistry,
}

impl AlgorithmRegistry {
    /// Registers the five built-in codecs, with `custom` backed by `transforms`.
    pub fn new(transforms: TransformRegistry) -> Self {
        let mut codecs: HashMap<Algorithm, Arc<dyn Codec>> = HashMap::new();
        codecs.insert(Algorithm::Caesar, Arc::new(CaesarCodec));
        codecs.insert(Algorithm::DigitReversal, Arc::new(DigitReversalCodec));
        codecs.insert(Algorithm::PositionShift, Arc::new(PositionShiftCodec));
        codecs.insert(Algorithm::CustomMapping, Arc::new(CustomMappingCodec));
        codecs.insert(
            Algorithm::Custom,
            Arc::new(CustomCodec {
                transforms: transforms.clone(),
            }),
        );
        Self { codecs, transforms }
    }

    /// Looks up the codec for an algorithm tag.
    pub fn codec(&self, algorithm: &Algorithm) -> Result<&dyn Codec, TransformError> {
        self.codecs
            .get(algorithm)
            .map(|c| c.as_ref())
            .ok_or_else(|| TransformError::UnknownAlgorithm(algorithm.as_str().to_string()))
    }

    pub fn transforms(&self) -> &TransformRegistry {
        &self.transforms
    }
}

impl Default for AlgorithmRegistry {
    fn default() -> Self {
        Self::new(TransformRegistry::with_builtins())
    }
}

impl fmt::Debug for AlgorithmRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut algorithms: Vec<&str> = self.codecs.keys().map(Algorithm::as_str).collect();
        algorithms.sort_unstable();
        f.debug_struct("AlgorithmRegistry")
            .field("algorithms", &algorithms)
            .field("transforms", &self.transforms)
            .finish()
    }
}
