//! Per-destination notification cooldown backed by lock-protected timestamp files.
//!
//! Every destination maps to one record file named after the SHA-256 of the
//! destination string. The file holds the UNIX time of the last successful
//! send as decimal text. All reads and writes happen under an exclusive
//! `flock`, so overlapping runs serialize on the same destination. Lock
//! acquisition blocks without a timeout.
//!
//! Two APIs are offered:
//! - [`CooldownGate::should_notify`] + [`CooldownGate::record_notification`]:
//!   check and record under two separate lock acquisitions.
//! - [`CooldownGate::reserve`]: check and, after a successful send, record
//!   under a single held lock via [`CooldownPermit::commit`].

#![allow(missing_docs)]

use std::fmt::Write as _;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::core::errors::{Result, SizeCheckError};

/// File-name prefix of every cooldown record.
pub const RECORD_PREFIX: &str = "disk_space_checker_last_notification_";

#[cfg(unix)]
type LockedFile = nix::fcntl::Flock<File>;
#[cfg(not(unix))]
type LockedFile = File;

/// Result of a gate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Deny { remaining: Duration },
}

impl GateDecision {
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Outcome of [`CooldownGate::reserve`].
#[derive(Debug)]
pub enum Reservation {
    /// Cooldown elapsed; the record stays locked until the permit is dropped or committed.
    Granted(CooldownPermit),
    Denied { remaining: Duration },
}

/// Exclusive hold on a destination's record, obtained from [`CooldownGate::reserve`].
///
/// Dropping the permit releases the lock and leaves the record untouched.
pub struct CooldownPermit {
    file: LockedFile,
    path: PathBuf,
}

impl std::fmt::Debug for CooldownPermit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CooldownPermit")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl CooldownPermit {
    /// Record the current time as the last notification, then release the lock.
    pub fn commit(mut self) -> Result<()> {
        let file: &mut File = &mut self.file;
        write_timestamp(file, &self.path, Utc::now())
    }
}

/// Cooldown gate rooted at a state directory (the OS temp dir by default).
#[derive(Debug, Clone)]
pub struct CooldownGate {
    state_dir: PathBuf,
}

impl CooldownGate {
    #[must_use]
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            state_dir: state_dir.into(),
        }
    }

    #[must_use]
    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    /// Deterministic record path for `destination`.
    #[must_use]
    pub fn record_path(&self, destination: &str) -> PathBuf {
        let digest = Sha256::digest(destination.as_bytes());
        let mut name = String::with_capacity(RECORD_PREFIX.len() + digest.len() * 2);
        name.push_str(RECORD_PREFIX);
        for b in digest.iter() {
            let _ = write!(name, "{b:02x}");
        }
        self.state_dir.join(name)
    }

    /// Whether `cooldown` has elapsed since the last recorded notification.
    ///
    /// An empty or unparseable record counts as "never notified". The record
    /// is never written here.
    pub fn should_notify(&self, destination: &str, cooldown: Duration) -> Result<bool> {
        let path = self.record_path(destination);
        let mut locked = open_locked(&path)?;
        let file: &mut File = &mut locked;
        let decision = read_decision(file, &path, cooldown, Utc::now())?;
        Ok(decision.is_allowed())
    }

    /// Overwrite the record with the current time.
    pub fn record_notification(&self, destination: &str) -> Result<()> {
        let path = self.record_path(destination);
        let mut locked = open_locked(&path)?;
        let file: &mut File = &mut locked;
        write_timestamp(file, &path, Utc::now())
    }

    /// Check the cooldown and, when allowed, keep the record locked for the caller.
    pub fn reserve(&self, destination: &str, cooldown: Duration) -> Result<Reservation> {
        let path = self.record_path(destination);
        let mut locked = open_locked(&path)?;
        let file: &mut File = &mut locked;
        match read_decision(file, &path, cooldown, Utc::now())? {
            GateDecision::Allow => Ok(Reservation::Granted(CooldownPermit { file: locked, path })),
            GateDecision::Deny { remaining } => Ok(Reservation::Denied { remaining }),
        }
    }
}

fn open_locked(path: &Path) -> Result<LockedFile> {
    let mut options = OpenOptions::new();
    options.read(true).write(true).create(true).truncate(false);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt as _;
        options.mode(0o644);
    }
    let file = options
        .open(path)
        .map_err(|source| SizeCheckError::io(path, source))?;
    lock_exclusive(file, path)
}

#[cfg(unix)]
fn lock_exclusive(file: File, path: &Path) -> Result<LockedFile> {
    #[allow(deprecated)]
    nix::fcntl::Flock::lock(file, nix::fcntl::FlockArg::LockExclusive).map_err(|(_file, e)| {
        SizeCheckError::Lock {
            path: path.to_path_buf(),
            details: e.to_string(),
        }
    })
}

#[cfg(not(unix))]
fn lock_exclusive(file: File, _path: &Path) -> Result<LockedFile> {
    Ok(file)
}

fn read_decision(
    file: &mut File,
    path: &Path,
    cooldown: Duration,
    now: DateTime<Utc>,
) -> Result<GateDecision> {
    let mut raw = Vec::new();
    file.read_to_end(&mut raw)
        .map_err(|source| SizeCheckError::io(path, source))?;
    Ok(decide(&raw, cooldown, now))
}

fn decide(raw: &[u8], cooldown: Duration, now: DateTime<Utc>) -> GateDecision {
    let text = String::from_utf8_lossy(raw);
    let Some(last_sent) = text
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
    else {
        return GateDecision::Allow;
    };

    // A record from the future counts as just sent.
    let elapsed = (now - last_sent).to_std().unwrap_or(Duration::ZERO);
    if elapsed >= cooldown {
        GateDecision::Allow
    } else {
        GateDecision::Deny {
            remaining: cooldown - elapsed,
        }
    }
}

fn write_timestamp(file: &mut File, path: &Path, now: DateTime<Utc>) -> Result<()> {
    let io_err = |source: std::io::Error| SizeCheckError::io(path, source);
    file.set_len(0).map_err(io_err)?;
    file.seek(SeekFrom::Start(0)).map_err(io_err)?;
    file.write_all(now.timestamp().to_string().as_bytes())
        .map_err(io_err)?;
    file.flush().map_err(io_err)
}
