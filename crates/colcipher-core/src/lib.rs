//! Core types for the colcipher system.
//!
//! Formula descriptors, column mappings, id generation and JSON Lines row I/O.
//! Nothing in this crate performs a transform; see `colcipher-formula`.

pub mod enums;
pub mod formula;
pub mod idgen;
pub mod jsonl;
pub mod mapping;
pub mod run;
