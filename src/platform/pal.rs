//! PAL trait and platform-specific implementations.

#![allow(missing_docs)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, SizeCheckError};

/// Filesystem statistics for the filesystem containing a path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FsStats {
    /// Bytes available to unprivileged users (`f_bavail * f_frsize`).
    pub available_bytes: u64,
}

/// OS abstraction used by the available-space probe.
pub trait Platform: Send + Sync {
    fn fs_stats(&self, path: &Path) -> Result<FsStats>;
}

/// Unix implementation backed by `statvfs(3)`.
#[cfg(unix)]
#[derive(Debug, Default)]
pub struct StatvfsPlatform;

#[cfg(unix)]
impl Platform for StatvfsPlatform {
    #[allow(clippy::useless_conversion)]
    fn fs_stats(&self, path: &Path) -> Result<FsStats> {
        let stat = nix::sys::statvfs::statvfs(path).map_err(|error| SizeCheckError::FsStats {
            path: path.to_path_buf(),
            details: error.to_string(),
        })?;
        let fragment = u64::from(stat.fragment_size());
        Ok(FsStats {
            available_bytes: u64::from(stat.blocks_available()).saturating_mul(fragment),
        })
    }
}

/// In-memory mock implementation for deterministic tests.
///
/// Stats are keyed by path prefix; the longest matching prefix wins.
#[derive(Debug, Clone, Default)]
pub struct MockPlatform {
    stats_by_prefix: HashMap<PathBuf, FsStats>,
}

impl MockPlatform {
    #[must_use]
    pub fn new(stats_by_prefix: HashMap<PathBuf, FsStats>) -> Self {
        Self { stats_by_prefix }
    }

    /// A platform that reports the same stats for every path.
    #[must_use]
    pub fn uniform(stats: FsStats) -> Self {
        Self::new(HashMap::from([(PathBuf::from("/"), stats)]))
    }
}

impl Platform for MockPlatform {
    fn fs_stats(&self, path: &Path) -> Result<FsStats> {
        self.stats_by_prefix
            .iter()
            .filter(|(prefix, _)| path.starts_with(prefix))
            .max_by_key(|(prefix, _)| prefix.as_os_str().len())
            .map(|(_, stats)| stats.clone())
            .ok_or_else(|| SizeCheckError::FsStats {
                path: path.to_path_buf(),
                details: "mock stats not found".to_string(),
            })
    }
}

/// Detect active platform implementation.
pub fn detect_platform() -> Result<Box<dyn Platform>> {
    #[cfg(unix)]
    {
        Ok(Box::new(StatvfsPlatform))
    }
    #[cfg(not(unix))]
    {
        Err(SizeCheckError::UnsupportedPlatform {
            details: "filesystem statistics require a Unix statvfs".to_string(),
        })
    }
}
