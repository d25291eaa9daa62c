//! CLI subcommand implementations.

pub mod config;
pub mod inspect;
pub mod run;
