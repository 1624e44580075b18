use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{error, info, instrument};

use crate::notify::Notifier;

#[derive(Debug, Serialize)]
pub struct AlertPayload<'a> {
    pub subject: &'a str,
    pub message: &'a str,
    pub destination: &'a str,
}

/// Delivers alerts as a JSON POST to a fixed webhook.
#[derive(Clone)]
pub struct WebhookNotifier {
    http: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: String) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self { http, url })
    }

    async fn post(&self, payload: &AlertPayload<'_>) -> Result<(), reqwest::Error> {
        self.http
            .post(&self.url)
            .json(payload)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    #[instrument(skip(self, message), fields(url = %self.url))]
    async fn send(&self, message: &str, subject: &str, destination: &str) {
        let payload = AlertPayload {
            subject,
            message,
            destination,
        };

        match self.post(&payload).await {
            Ok(()) => info!("alert delivered"),
            Err(e) => error!(error = %e, "alert delivery failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    fn payload_serializes_flat() {
        let payload = AlertPayload {
            subject: "Bitcoin price alert",
            message: "down 12%",
            destination: "ops@example.com",
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "subject": "Bitcoin price alert",
                "message": "down 12%",
                "destination": "ops@example.com"
            })
        );
    }

    #[tokio::test]
    #[traced_test]
    async fn unreachable_webhook_is_swallowed_and_logged() {
        // Port 9 (discard) on loopback is not listening in test environments.
        let notifier = WebhookNotifier::new("http://127.0.0.1:9/hook".into()).unwrap();

        notifier.send("msg", "subject", "dest").await;

        assert!(logs_contain("alert delivery failed"));
    }
}
