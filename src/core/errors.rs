//! SZC-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, SizeCheckError>;

/// Top-level error type for sizechecker.
#[derive(Debug, Error)]
pub enum SizeCheckError {
    #[error("[SZC-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[SZC-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[SZC-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[SZC-1004] invalid size limit {input:?}: {details}")]
    InvalidLimit { input: String, details: String },

    #[error("[SZC-1005] invalid duration {input:?}: {details}")]
    InvalidDuration { input: String, details: String },

    #[error("[SZC-1101] unsupported platform: {details}")]
    UnsupportedPlatform { details: String },

    #[error("[SZC-2001] filesystem stats failure for {path}: {details}")]
    FsStats { path: PathBuf, details: String },

    #[error("[SZC-2002] {path} is not a directory")]
    NotADirectory { path: PathBuf },

    #[error("[SZC-2003] cannot traverse {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[SZC-3001] failed to lock {path}: {details}")]
    Lock { path: PathBuf, details: String },

    #[error("[SZC-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[SZC-3101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[SZC-4001] {provider} delivery failed: {details}")]
    Send {
        provider: &'static str,
        details: String,
    },

    #[error("[SZC-4002] {provider} credentials missing: {details}")]
    MissingCredentials {
        provider: &'static str,
        details: String,
    },
}

impl SizeCheckError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "SZC-1001",
            Self::MissingConfig { .. } => "SZC-1002",
            Self::ConfigParse { .. } => "SZC-1003",
            Self::InvalidLimit { .. } => "SZC-1004",
            Self::InvalidDuration { .. } => "SZC-1005",
            Self::UnsupportedPlatform { .. } => "SZC-1101",
            Self::FsStats { .. } => "SZC-2001",
            Self::NotADirectory { .. } => "SZC-2002",
            Self::Walk { .. } => "SZC-2003",
            Self::Lock { .. } => "SZC-3001",
            Self::Io { .. } => "SZC-3002",
            Self::Serialization { .. } => "SZC-3101",
            Self::Send { .. } => "SZC-4001",
            Self::MissingCredentials { .. } => "SZC-4002",
        }
    }

    /// Whether the error came from bad operator input rather than the environment.
    #[must_use]
    pub const fn is_usage(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig { .. }
                | Self::MissingConfig { .. }
                | Self::ConfigParse { .. }
                | Self::InvalidLimit { .. }
                | Self::InvalidDuration { .. }
        )
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<serde_json::Error> for SizeCheckError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for SizeCheckError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
