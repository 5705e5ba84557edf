//! Discord webhook provider.

use reqwest::blocking::Client;
use serde::Serialize;

use super::{Notifier, http_client};
use crate::core::errors::{Result, SizeCheckError};

const PROVIDER: &str = "discord";

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<&'a str>,
}

/// Posts violation messages to a Discord webhook URL.
#[derive(Debug, Clone)]
pub struct DiscordNotifier {
    client: Client,
    webhook_url: String,
    username: Option<String>,
}

impl DiscordNotifier {
    /// Build a notifier for `webhook_url`. The URL doubles as the cooldown key.
    pub fn new(webhook_url: impl Into<String>, username: Option<String>) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            webhook_url: webhook_url.into(),
            username,
        })
    }
}

impl Notifier for DiscordNotifier {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn destination(&self) -> &str {
        &self.webhook_url
    }

    fn send(&self, message: &str) -> Result<()> {
        let payload = WebhookPayload {
            content: message,
            username: self.username.as_deref(),
        };

        self.client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map(drop)
            .map_err(|e| SizeCheckError::Send {
                provider: PROVIDER,
                details: e.to_string(),
            })
    }
}
