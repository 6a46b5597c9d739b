//! The processing loop of the colcipher system.
//!
//! A [`Processor`] streams rows from a JSON Lines source in batches, applies
//! the configured column mappings through the formula engine and writes the
//! transformed rows out. Rows whose columns cannot all be transformed are
//! still written and are reported back as failures, together with the run
//! statistics shown by the dashboard.

pub mod dashboard;
pub mod error;
pub mod processor;

pub use dashboard::Dashboard;
pub use error::{PipelineError, Result};
pub use processor::{Processor, RunOutcome, run_files};
