//! Terminal styling for colcipher CLI output.
//!
//! Colour helpers for pass/warn/fail reporting and terminal detection that
//! honours `NO_COLOR`, `CLICOLOR` and `CLICOLOR_FORCE`.

pub mod styles;
pub mod terminal;
