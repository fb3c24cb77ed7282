//! Slack alert delivery via a workflow webhook.
//!
//! Delivery is best-effort: a send never returns an error, only whether the
//! webhook accepted the message. The receiving workflow owns retries.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

/// Outbound notification transport.
#[async_trait]
pub trait Notify: Send + Sync {
    /// Deliver `message` to one recipient. Returns whether the transport
    /// accepted it.
    async fn send(&self, slack_user_id: &str, message: &str) -> bool;
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    message: &'a str,
    slack_user_id: &'a str,
}

/// Posts alert payloads to a Slack workflow webhook.
#[derive(Clone)]
pub struct SlackWebhookNotifier {
    http: Client,
    webhook_url: Option<String>,
}

impl SlackWebhookNotifier {
    /// `webhook_url = None` disables delivery; sends are skipped and
    /// reported as failed.
    pub fn new(http: Client, webhook_url: Option<String>) -> Self {
        Self { http, webhook_url }
    }
}

#[async_trait]
impl Notify for SlackWebhookNotifier {
    async fn send(&self, slack_user_id: &str, message: &str) -> bool {
        let Some(url) = &self.webhook_url else {
            warn!("WORKFLOW_WEBHOOK_URL not set — Slack messages will be skipped");
            return false;
        };

        let result = self
            .http
            .post(url)
            .json(&WebhookPayload {
                message,
                slack_user_id,
            })
            .send()
            .await;

        match result {
            Ok(resp) if resp.status().is_success() => {
                debug!(slack_user_id, "Slack message delivered");
                true
            }
            Ok(resp) => {
                let status = resp.status();
                let body = resp
                    .text()
                    .await
                    .unwrap_or_else(|_| "<no body>".to_string());
                warn!(%status, body, "Slack webhook rejected message; Slack will retry downstream");
                false
            }
            Err(e) => {
                warn!(error = %e, "Slack webhook request failed");
                false
            }
        }
    }
}
