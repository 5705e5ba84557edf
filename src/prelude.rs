//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use sizechecker::prelude::*;
//! ```

// Core
pub use crate::core::config::Config;
pub use crate::core::errors::{Result, SizeCheckError};
pub use crate::core::units::{format_size, parse_duration, parse_limit};

// Platform
pub use crate::platform::pal::{FsStats, Platform, detect_platform};

// Probe
pub use crate::probe::{ProbeMode, probe};
pub use crate::threshold::{Verdict, evaluate};

// Notify
pub use crate::notify::Notifier;
pub use crate::notify::cooldown::{CooldownGate, CooldownPermit, Reservation};
pub use crate::notify::dispatch::{DestinationReport, DispatchOutcome, dispatch};

// Check
pub use crate::check::{CheckConfig, CheckReport, CheckRequest, run_check};
