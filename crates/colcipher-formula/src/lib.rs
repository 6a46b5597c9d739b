//! Formula engine for the colcipher system.
//!
//! A formula names one of a closed set of reversible string transforms plus
//! its parameters. The engine encodes and decodes values with it, never
//! failing visibly: any internal error returns the input unchanged and is
//! reported through `tracing`. Problems are meant to be caught up front with
//! [`validate_formula`] and [`test_formula`].

pub mod algorithms;
pub mod engine;
pub mod parser;
pub mod registry;
pub mod selftest;
pub mod types;
pub mod validator;

pub use engine::{FormulaEngine, decode, encode};
pub use registry::{CustomTransform, TransformRegistry};
pub use selftest::{DEFAULT_SAMPLE, FormulaTestResult, test_formula};
pub use types::{FormulaError, TransformError};
pub use validator::{FormulaValidation, validate_formula};
