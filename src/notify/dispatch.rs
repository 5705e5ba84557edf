//! Per-destination notification dispatch behind the cooldown gate.
//!
//! Failures never escape: each destination ends up with a [`DispatchOutcome`]
//! and an activity-log line, and the remaining destinations still run.

use std::time::Duration;

use serde::Serialize;

use super::Notifier;
use super::cooldown::{CooldownGate, Reservation};
use crate::core::units::format_duration;
use crate::logger::jsonl::{EventType, JsonlWriter, LogEntry, Severity};

/// What happened for one destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// Delivered and the cooldown record was updated.
    Sent,
    /// Delivered, but writing the cooldown record failed.
    SentUnrecorded { error: String },
    /// Suppressed by the cooldown window.
    RateLimited { remaining_secs: u64 },
    /// The provider rejected or never received the message.
    SendFailed { error: String },
    /// The cooldown record could not be opened or locked; nothing was sent.
    GateFailed { error: String },
}

/// Outcome paired with the provider that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DestinationReport {
    pub provider: &'static str,
    #[serde(flatten)]
    pub outcome: DispatchOutcome,
}

/// Send `message` to every notifier the gate allows, in order.
pub fn dispatch(
    gate: &CooldownGate,
    notifiers: &[Box<dyn Notifier>],
    message: &str,
    cooldown: Duration,
    log: &mut JsonlWriter,
) -> Vec<DestinationReport> {
    notifiers
        .iter()
        .map(|notifier| DestinationReport {
            provider: notifier.name(),
            outcome: dispatch_one(gate, notifier.as_ref(), message, cooldown, log),
        })
        .collect()
}

fn dispatch_one(
    gate: &CooldownGate,
    notifier: &dyn Notifier,
    message: &str,
    cooldown: Duration,
    log: &mut JsonlWriter,
) -> DispatchOutcome {
    let provider = notifier.name();

    let permit = match gate.reserve(notifier.destination(), cooldown) {
        Ok(Reservation::Granted(permit)) => permit,
        Ok(Reservation::Denied { remaining }) => {
            log.write_entry(
                &LogEntry::new(EventType::NotificationSkipped, Severity::Info)
                    .provider(provider)
                    .details(format!(
                        "rate limited, next notification allowed in {}",
                        format_duration(remaining)
                    )),
            );
            return DispatchOutcome::RateLimited {
                remaining_secs: remaining.as_secs(),
            };
        }
        Err(err) => {
            log.write_entry(
                &LogEntry::new(EventType::GateError, Severity::Warning)
                    .provider(provider)
                    .error(&err),
            );
            return DispatchOutcome::GateFailed {
                error: err.to_string(),
            };
        }
    };

    if let Err(err) = notifier.send(message) {
        // Dropping the permit releases the lock without touching the record.
        drop(permit);
        log.write_entry(
            &LogEntry::new(EventType::NotificationFailed, Severity::Warning)
                .provider(provider)
                .error(&err),
        );
        return DispatchOutcome::SendFailed {
            error: err.to_string(),
        };
    }

    match permit.commit() {
        Ok(()) => {
            log.write_entry(
                &LogEntry::new(EventType::NotificationSent, Severity::Info).provider(provider),
            );
            DispatchOutcome::Sent
        }
        Err(err) => {
            log.write_entry(
                &LogEntry::new(EventType::GateError, Severity::Warning)
                    .provider(provider)
                    .error(&err),
            );
            DispatchOutcome::SentUnrecorded {
                error: err.to_string(),
            }
        }
    }
}
