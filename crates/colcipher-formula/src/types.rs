//! Error types for transforms and formula files.

use colcipher_core::formula::ParameterError;

/// Why a transform could not be applied.
///
/// Only surfaced by `try_encode` / `try_decode`; the fail-open entry points
/// log it and return the input unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    #[error("unknown algorithm: '{0}'")]
    UnknownAlgorithm(String),

    #[error("invalid parameter: {0}")]
    Parameter(#[from] ParameterError),

    #[error("custom transform not registered: '{0}'")]
    UnregisteredTransform(String),

    #[error("custom transform failed: {0}")]
    Failed(String),
}

/// Errors that can occur while loading formula descriptors.
#[derive(Debug, thiserror::Error)]
pub enum FormulaError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
