//! Pipeline error types.

use std::path::PathBuf;

use colcipher_core::jsonl::JsonlError;

/// Errors that abort a processing run.
///
/// Per-row transform problems are not errors; they are collected as
/// [`FailedRow`](colcipher_core::run::FailedRow)s.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("no source path configured (set source.path or pass --input)")]
    NoSource,

    #[error("no destination path configured (set destination.path or pass --output)")]
    NoDestination,

    #[error("no column mappings configured")]
    NoMappings,

    /// A source or destination file could not be opened.
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Reading or writing rows failed mid-run.
    #[error(transparent)]
    Jsonl(#[from] JsonlError),
}

/// Convenience alias used throughout the pipeline crate.
pub type Result<T> = std::result::Result<T, PipelineError>;
