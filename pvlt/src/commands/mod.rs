//! Subcommand implementations.

pub mod translate;
pub mod validate;
