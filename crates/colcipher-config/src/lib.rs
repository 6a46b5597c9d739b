//! Configuration management for the colcipher system.
//!
//! This crate owns everything the formula engine deliberately does not:
//! the `.colcipher/` project directory and its settings file, the key-value
//! store that persists formulas, pipeline configuration and run history,
//! the [`ConfigManager`](manager::ConfigManager) that mutates them, and the
//! passkey gate in front of mutating operations.

pub mod access;
pub mod manager;
pub mod pipeline;
pub mod project_dir;
pub mod settings;
pub mod store;

pub use manager::ConfigManager;
pub use pipeline::PipelineConfig;
pub use settings::{ConfigError, Result, Settings, load_settings, save_settings};
pub use store::{KeyValueStore, MemoryStore, SqliteStore, StoreError};
