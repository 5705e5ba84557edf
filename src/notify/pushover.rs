//! Pushover provider.
//!
//! The `-o` token names the destination and keys its cooldown record. The API
//! credentials are read from `PUSHOVER_APITOKEN` and `PUSHOVER_USERKEY`.

use reqwest::blocking::Client;

use super::{Notifier, http_client};
use crate::core::config::PushoverConfig;
use crate::core::errors::{Result, SizeCheckError};

const PROVIDER: &str = "pushover";

/// Environment variable holding the application API token.
pub const TOKEN_ENV: &str = "PUSHOVER_APITOKEN";
/// Environment variable holding the recipient user key.
pub const USER_ENV: &str = "PUSHOVER_USERKEY";

/// Posts violation messages to the Pushover messages API.
#[derive(Debug, Clone)]
pub struct PushoverNotifier {
    client: Client,
    destination: String,
    api_url: String,
    title: String,
    priority: i8,
    token: Option<String>,
    user: Option<String>,
}

impl PushoverNotifier {
    /// Build a notifier with explicit credentials.
    pub fn new(
        destination: impl Into<String>,
        settings: &PushoverConfig,
        token: Option<String>,
        user: Option<String>,
    ) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            destination: destination.into(),
            api_url: settings.api_url.clone(),
            title: settings.title.clone(),
            priority: settings.priority,
            token: token.filter(|t| !t.trim().is_empty()),
            user: user.filter(|u| !u.trim().is_empty()),
        })
    }

    /// Build a notifier whose credentials come from the process environment.
    ///
    /// Missing variables are not an error here; [`Notifier::send`] reports them.
    pub fn from_env(destination: impl Into<String>, settings: &PushoverConfig) -> Result<Self> {
        Self::new(
            destination,
            settings,
            std::env::var(TOKEN_ENV).ok(),
            std::env::var(USER_ENV).ok(),
        )
    }

    fn credentials(&self) -> Result<(&str, &str)> {
        let missing: Vec<&str> = [
            (TOKEN_ENV, self.token.is_none()),
            (USER_ENV, self.user.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();

        match (self.token.as_deref(), self.user.as_deref()) {
            (Some(token), Some(user)) => Ok((token, user)),
            _ => Err(SizeCheckError::MissingCredentials {
                provider: PROVIDER,
                details: format!("set {}", missing.join(" and ")),
            }),
        }
    }
}

impl Notifier for PushoverNotifier {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn destination(&self) -> &str {
        &self.destination
    }

    fn send(&self, message: &str) -> Result<()> {
        let (token, user) = self.credentials()?;
        let priority = self.priority.to_string();
        let form = [
            ("token", token),
            ("user", user),
            ("message", message),
            ("title", self.title.as_str()),
            ("priority", priority.as_str()),
        ];

        self.client
            .post(&self.api_url)
            .form(&form)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map(drop)
            .map_err(|e| SizeCheckError::Send {
                provider: PROVIDER,
                details: e.to_string(),
            })
    }
}
