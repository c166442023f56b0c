//! Delivers slot summaries: always to the log, and to a JSON webhook when one
//! is configured. Repeat sends are throttled by a [`NotificationGate`].

use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use vaxslot_client::{compose_summary, NotificationGate, SlotMatch};
use vaxslot_core::AppConfig;

pub(crate) struct Notifier {
    gate: NotificationGate,
    webhook: Option<Webhook>,
}

struct Webhook {
    client: Client,
    url: String,
}

impl Notifier {
    pub(crate) fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let webhook = match &config.notify_webhook_url {
            Some(url) => Some(Webhook {
                client: Client::builder()
                    .timeout(Duration::from_secs(config.request_timeout_secs))
                    .build()?,
                url: url.clone(),
            }),
            None => None,
        };
        Ok(Self {
            gate: NotificationGate::from_secs(config.notify_min_interval_secs),
            webhook,
        })
    }

    /// Sends a summary of `matches` unless it is empty or the previous send
    /// was too recent. Returns whether a notification went out.
    pub(crate) async fn notify(&mut self, matches: &[SlotMatch]) -> anyhow::Result<bool> {
        if matches.is_empty() {
            return Ok(false);
        }

        let now = Utc::now();
        if !self.gate.should_send(now) {
            tracing::info!(
                last_sent = ?self.gate.last_sent(),
                "not sending notification, previous one was too recent"
            );
            return Ok(false);
        }

        let body = compose_summary(matches);
        tracing::info!(matches = matches.len(), "{body}");

        if let Some(webhook) = &self.webhook {
            webhook
                .client
                .post(&webhook.url)
                .json(&serde_json::json!({ "text": body }))
                .send()
                .await?
                .error_for_status()?;
        }

        self.gate.record_sent(now);
        Ok(true)
    }
}
