//! Subcommand implementations.

pub mod compile;
pub mod resolve;
pub mod run;
