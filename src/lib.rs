#![forbid(unsafe_code)]

//! sizechecker: disk-usage threshold checks with rate-limited notifications.
//!
//! A check measures either the bytes used below a directory or the bytes
//! available on its filesystem, compares the result against a limit, and on
//! violation notifies Discord and/or Pushover. Each destination is gated by a
//! lock-protected cooldown record so cron-driven runs do not spam.
//!
//! # Library usage
//!
//! Use the [`prelude`] for convenient access to the most common types:
//!
//! ```rust,no_run
//! use sizechecker::prelude::*;
//! ```
//!
//! Individual modules can also be imported directly:
//!
//! ```rust,no_run
//! use sizechecker::core::config::Config;
//! use sizechecker::notify::cooldown::CooldownGate;
//! ```

pub mod prelude;

pub mod check;
pub mod core;
pub mod logger;
pub mod notify;
pub mod platform;
pub mod probe;
pub mod threshold;
