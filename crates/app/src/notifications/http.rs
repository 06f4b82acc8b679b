//! HTTP notifier for the mail worker.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{Notification, NotificationError, Notifier};

/// Configuration for the mail worker endpoint.
#[derive(Debug, Clone)]
pub struct HttpNotifierConfig {
    /// Endpoint accepting notification JSON, e.g. `"http://mailer:8080/emails"`.
    pub url: String,

    /// Optional bearer token sent with every request.
    pub token: Option<String>,

    /// Per-request timeout.
    pub timeout: Duration,
}

/// Posts notifications as JSON to a mail worker.
#[derive(Debug, Clone)]
pub struct HttpNotifier {
    config: HttpNotifierConfig,
    http: Client,
}

impl HttpNotifier {
    /// Create a new notifier from the given configuration.
    #[must_use]
    pub fn new(config: HttpNotifierConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn send(&self, notification: Notification) -> Result<(), NotificationError> {
        let mut request = self
            .http
            .post(&self.config.url)
            .timeout(self.config.timeout)
            .json(&notification);

        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(NotificationError::Rejected {
                status: status.as_u16(),
            });
        }

        debug!(recipient = %notification.recipient, "notification queued");

        Ok(())
    }
}
