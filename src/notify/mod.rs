//! Violation notifications: provider channels, cooldown gate, and dispatch.
//!
//! Each provider is a [`Notifier`]. Dispatch consults the cooldown gate per
//! destination and never lets a provider failure abort the run.

pub mod cooldown;
pub mod discord;
pub mod dispatch;
pub mod pushover;

use crate::core::errors::Result;

/// A notification channel that can deliver a violation message.
pub trait Notifier {
    /// Short provider name used in logs (`discord`, `pushover`).
    fn name(&self) -> &'static str;

    /// Cooldown key identifying this destination.
    fn destination(&self) -> &str;

    /// Deliver `message`. An `Ok` means the provider accepted it.
    fn send(&self, message: &str) -> Result<()>;
}

/// Blocking HTTP client shared by the webhook providers.
pub(crate) fn http_client() -> Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .user_agent(concat!("sizechecker/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| crate::core::errors::SizeCheckError::Send {
            provider: "http",
            details: format!("failed to build HTTP client: {e}"),
        })
}
