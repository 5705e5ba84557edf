//! Configuration system: TOML file + env var overrides + smart defaults.
//!
//! Command-line flags sit on top of this layer; the values here only supply
//! what the flags leave unspecified.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, SizeCheckError};
use crate::core::units::parse_duration;

/// Default Pushover message endpoint.
pub const PUSHOVER_API_URL: &str = "https://api.pushover.net/1/messages.json";

/// Full sizechecker configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Directory holding per-destination cooldown records.
    pub state_dir: PathBuf,
    /// Default cooldown (Go-style duration) when `--cooldown` is absent.
    pub cooldown: String,
    pub discord: DiscordConfig,
    pub pushover: PushoverConfig,
    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_dir: env::temp_dir(),
            cooldown: "1m".to_string(),
            discord: DiscordConfig::default(),
            pushover: PushoverConfig::default(),
            log: LogConfig::default(),
        }
    }
}

/// Discord webhook presentation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DiscordConfig {
    /// Overrides the webhook's configured display name.
    pub username: Option<String>,
}

/// Pushover API settings. Credentials always come from the environment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PushoverConfig {
    pub api_url: String,
    pub title: String,
    /// Pushover priority, -2 (lowest) through 2 (emergency).
    pub priority: i8,
}

impl Default for PushoverConfig {
    fn default() -> Self {
        Self {
            api_url: PUSHOVER_API_URL.to_string(),
            title: "sizechecker".to_string(),
            priority: 0,
        }
    }
}

/// Activity log settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    /// Append-only JSONL activity log. Disabled when unset.
    pub jsonl_path: Option<PathBuf>,
}

impl Config {
    /// Default config path: `~/.config/sizechecker/config.toml`.
    #[must_use]
    pub fn default_path() -> PathBuf {
        let home = env::var_os("HOME").map_or_else(|| PathBuf::from("/tmp"), PathBuf::from);
        home.join(".config").join("sizechecker").join("config.toml")
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// Missing config file is not an error when loading from default path; defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);
        let is_explicit_path = path.is_some();

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf)
                .map_err(|source| SizeCheckError::io(&path_buf, source))?;
            toml::from_str(&raw)?
        } else if is_explicit_path {
            return Err(SizeCheckError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.apply_env_overrides_from(env_var);
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parsed form of [`Config::cooldown`].
    pub fn cooldown_duration(&self) -> Result<Duration> {
        parse_duration(&self.cooldown)
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F)
    where
        F: FnMut(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("SIZECHECKER_STATE_DIR") {
            self.state_dir = PathBuf::from(raw);
        }
        if let Some(raw) = lookup("SIZECHECKER_COOLDOWN") {
            self.cooldown = raw;
        }
        if let Some(raw) = lookup("SIZECHECKER_PUSHOVER_API_URL") {
            self.pushover.api_url = raw;
        }
        if let Some(raw) = lookup("SIZECHECKER_LOG_JSONL") {
            self.log.jsonl_path = Some(PathBuf::from(raw));
        }
    }

    fn validate(&self) -> Result<()> {
        if self.state_dir.as_os_str().is_empty() {
            return Err(SizeCheckError::InvalidConfig {
                details: "state_dir must not be empty".to_string(),
            });
        }

        self.cooldown_duration()
            .map_err(|e| SizeCheckError::InvalidConfig {
                details: format!("cooldown: {e}"),
            })?;

        let url = self.pushover.api_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(SizeCheckError::InvalidConfig {
                details: format!("pushover.api_url must be an http(s) URL, got {url:?}"),
            });
        }

        if !(-2..=2).contains(&self.pushover.priority) {
            return Err(SizeCheckError::InvalidConfig {
                details: format!(
                    "pushover.priority must be in [-2,2], got {}",
                    self.pushover.priority
                ),
            });
        }

        if self
            .discord
            .username
            .as_deref()
            .is_some_and(|name| name.trim().is_empty())
        {
            return Err(SizeCheckError::InvalidConfig {
                details: "discord.username must not be blank when set".to_string(),
            });
        }

        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}
