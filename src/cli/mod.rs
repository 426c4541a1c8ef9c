//! Command-line interface for lex.

mod commands;
pub mod helpers;

pub use commands::{is_verbose, run};
