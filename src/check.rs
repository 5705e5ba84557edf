//! One complete check: probe, compare, and notify on violation.
//!
//! Raw operator input is validated into a [`CheckConfig`] before anything
//! touches the filesystem, so a bad limit or runtype never triggers a probe.

#![allow(missing_docs)]

use std::path::PathBuf;
use std::time::Duration;

use bytesize::ByteSize;
use serde::Serialize;

use crate::core::config::Config;
use crate::core::errors::{Result, SizeCheckError};
use crate::core::paths::resolve_check_root;
use crate::core::units::{parse_duration, parse_limit};
use crate::logger::jsonl::{EventType, JsonlConfig, JsonlWriter, LogEntry, Severity};
use crate::notify::Notifier;
use crate::notify::cooldown::CooldownGate;
use crate::notify::discord::DiscordNotifier;
use crate::notify::dispatch::{DestinationReport, DispatchOutcome, dispatch};
use crate::notify::pushover::PushoverNotifier;
use crate::platform::pal::Platform;
use crate::probe::{ProbeMode, probe};
use crate::threshold::{Verdict, evaluate};

/// Unvalidated operator input, as typed on the command line.
#[derive(Debug, Clone, Default)]
pub struct CheckRequest {
    pub path: PathBuf,
    pub limit: String,
    pub runtype: String,
    /// Falls back to `Config::cooldown` when absent.
    pub cooldown: Option<String>,
    pub discord: Option<String>,
    pub pushover: Option<String>,
}

/// Validated, immutable settings for one run.
#[derive(Debug, Clone)]
pub struct CheckConfig {
    pub root: PathBuf,
    pub mode: ProbeMode,
    pub limit: ByteSize,
    pub cooldown: Duration,
    pub discord: Option<String>,
    pub pushover: Option<String>,
    pub settings: Config,
}

impl CheckConfig {
    /// Validate `request` against the layered `settings`.
    ///
    /// Validation order is limit, runtype, cooldown, then the directory.
    pub fn resolve(request: CheckRequest, settings: Config) -> Result<Self> {
        let limit = parse_limit(&request.limit)?;
        let mode: ProbeMode = request.runtype.parse()?;
        let cooldown = match request.cooldown.as_deref() {
            Some(raw) => parse_duration(raw)?,
            None => settings.cooldown_duration()?,
        };
        let root = resolve_check_root(&request.path)?;

        Ok(Self {
            root,
            mode,
            limit,
            cooldown,
            discord: request.discord.filter(|d| !d.is_empty()),
            pushover: request.pushover.filter(|p| !p.is_empty()),
            settings,
        })
    }

    /// Whether any notification destination is configured.
    #[must_use]
    pub const fn has_destinations(&self) -> bool {
        self.discord.is_some() || self.pushover.is_some()
    }
}

/// Everything a run produced.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    #[serde(flatten)]
    pub verdict: Verdict,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notifications: Vec<DestinationReport>,
}

impl CheckReport {
    #[must_use]
    pub const fn violated(&self) -> bool {
        self.verdict.violated
    }
}

/// Run one check. Only probe failures are returned as errors; notification
/// problems are reported per destination in [`CheckReport::notifications`].
pub fn run_check(config: &CheckConfig, platform: &dyn Platform) -> Result<CheckReport> {
    let mut log = open_activity_log(&config.settings);

    let observed = match probe(&config.root, config.mode, platform) {
        Ok(bytes) => bytes,
        Err(err) => {
            log.write_entry(&probe_entry(config, None, EventType::Error).error(&err));
            log.flush();
            return Err(err);
        }
    };

    let verdict = evaluate(observed, config.limit, config.mode, &config.root);
    log.write_entry(
        &probe_entry(config, Some(&verdict), EventType::CheckCompleted).details(&verdict.message),
    );

    let notifications = if verdict.violated {
        notify(config, &verdict.message, &mut log)
    } else {
        Vec::new()
    };

    log.flush();
    Ok(CheckReport {
        verdict,
        notifications,
    })
}

fn notify(config: &CheckConfig, message: &str, log: &mut JsonlWriter) -> Vec<DestinationReport> {
    let mut reports = Vec::new();
    let mut notifiers: Vec<Box<dyn Notifier>> = Vec::new();

    if let Some(url) = &config.discord {
        match DiscordNotifier::new(url.as_str(), config.settings.discord.username.clone()) {
            Ok(notifier) => notifiers.push(Box::new(notifier)),
            Err(err) => reports.push(setup_failure("discord", &err, log)),
        }
    }
    if let Some(token) = &config.pushover {
        match PushoverNotifier::from_env(token.as_str(), &config.settings.pushover) {
            Ok(notifier) => notifiers.push(Box::new(notifier)),
            Err(err) => reports.push(setup_failure("pushover", &err, log)),
        }
    }

    let gate = CooldownGate::new(&config.settings.state_dir);
    reports.extend(dispatch(&gate, &notifiers, message, config.cooldown, log));
    reports
}

fn setup_failure(
    provider: &'static str,
    err: &SizeCheckError,
    log: &mut JsonlWriter,
) -> DestinationReport {
    log.write_entry(
        &LogEntry::new(EventType::NotificationFailed, Severity::Warning)
            .provider(provider)
            .error(err),
    );
    DestinationReport {
        provider,
        outcome: DispatchOutcome::SendFailed {
            error: err.to_string(),
        },
    }
}

fn open_activity_log(settings: &Config) -> JsonlWriter {
    settings.log.jsonl_path.as_ref().map_or_else(JsonlWriter::disabled, |path| {
        JsonlWriter::open(JsonlConfig::new(path.clone()))
    })
}

fn probe_entry(config: &CheckConfig, verdict: Option<&Verdict>, event: EventType) -> LogEntry {
    let severity = match (&event, verdict) {
        (EventType::Error, _) => Severity::Critical,
        (_, Some(v)) if v.violated => Severity::Warning,
        _ => Severity::Info,
    };
    let mut entry = LogEntry::new(event, severity);
    entry.path = Some(config.root.display().to_string());
    entry.mode = Some(config.mode.to_string());
    entry.limit_bytes = Some(config.limit.as_u64());
    if let Some(v) = verdict {
        entry.observed_bytes = Some(v.observed_bytes);
        entry.violated = Some(v.violated);
    }
    entry
}
