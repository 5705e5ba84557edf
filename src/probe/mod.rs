//! Size probe: used space under a directory, or available space on its filesystem.

pub mod walker;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, SizeCheckError};
use crate::platform::pal::Platform;

/// Which quantity the probe measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeMode {
    /// Recursive sum of file sizes below the root (`--runtype u`).
    Used,
    /// Bytes available on the filesystem holding the root (`--runtype a`).
    Available,
}

impl FromStr for ProbeMode {
    type Err = SizeCheckError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "u" => Ok(Self::Used),
            "a" => Ok(Self::Available),
            other => Err(SizeCheckError::InvalidConfig {
                details: format!(
                    "runtype must be 'u' for used space or 'a' for available space, got {other:?}"
                ),
            }),
        }
    }
}

impl fmt::Display for ProbeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Used => write!(f, "used"),
            Self::Available => write!(f, "available"),
        }
    }
}

/// Measure `root` in the given mode. The root must already be validated as a directory.
pub fn probe(root: &Path, mode: ProbeMode, platform: &dyn Platform) -> Result<u64> {
    match mode {
        ProbeMode::Used => walker::used_space(root),
        ProbeMode::Available => platform.fs_stats(root).map(|stats| stats.available_bytes),
    }
}
