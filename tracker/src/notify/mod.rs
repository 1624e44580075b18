//! Alerting port.
//!
//! Delivery is best-effort: `send` never returns an error and each
//! implementation logs its own failures.

pub mod webhook;

use async_trait::async_trait;
use tracing::warn;

pub use webhook::WebhookNotifier;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str, subject: &str, destination: &str);
}

/// Writes alerts to the log. Used when no transport is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, message: &str, subject: &str, destination: &str) {
        warn!(target: "alert", subject, destination, message, "price alert");
    }
}
