//! Data models shared across the tally pipeline.

pub mod config;
pub mod document;
