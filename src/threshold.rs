//! Threshold evaluation: compare a probe result against the operator's limit.
//!
//! Used mode treats reaching the limit as a violation (`observed >= limit`).
//! Available mode only flags strictly less than the limit (`observed < limit`).

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use bytesize::ByteSize;
use serde::Serialize;

use crate::core::units::format_size;
use crate::probe::ProbeMode;

/// Outcome of a single threshold comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub mode: ProbeMode,
    pub path: PathBuf,
    pub observed_bytes: u64,
    pub limit_bytes: u64,
    pub violated: bool,
    pub message: String,
}

#[must_use]
pub fn evaluate(observed: u64, limit: ByteSize, mode: ProbeMode, path: &Path) -> Verdict {
    let observed_size = format_size(observed);
    let limit_size = format_size(limit.as_u64());
    let (violated, message) = match mode {
        ProbeMode::Used => {
            if observed >= limit.as_u64() {
                (
                    true,
                    format!(
                        "Warning: {observed_size} used in {}, which is beyond the limit of {limit_size}.",
                        path.display()
                    ),
                )
            } else {
                (
                    false,
                    format!(
                        "Used space is within acceptable limits: {observed_size} used of {limit_size}."
                    ),
                )
            }
        }
        ProbeMode::Available => {
            if observed < limit.as_u64() {
                (
                    true,
                    format!(
                        "Warning: Only {observed_size} available in {}, which is below the limit of {limit_size}.",
                        path.display()
                    ),
                )
            } else {
                (false, format!("Sufficient space: {observed_size} available."))
            }
        }
    };

    Verdict {
        mode,
        path: path.to_path_buf(),
        observed_bytes: observed,
        limit_bytes: limit.as_u64(),
        violated,
        message,
    }
}
