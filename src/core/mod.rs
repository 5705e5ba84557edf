//! Core types: errors, configuration, size/duration parsing, path handling.

pub mod config;
pub mod errors;
pub mod paths;
pub mod units;
