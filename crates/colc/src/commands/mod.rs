//! Command handlers, one module per top-level subcommand.

pub mod codec;
pub mod completion;
pub mod config_cmd;
pub mod formula;
pub mod init;
pub mod mapping;
pub mod passkey;
pub mod run_cmd;
pub mod stats;
pub mod version;
