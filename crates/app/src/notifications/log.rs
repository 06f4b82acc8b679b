//! Logging notifier.

use async_trait::async_trait;
use tracing::info;

use super::{Notification, NotificationError, Notifier};

/// Writes notifications to the log instead of delivering them.
///
/// Used when no mail endpoint is configured, e.g. in local development.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: Notification) -> Result<(), NotificationError> {
        info!(
            recipient = %notification.recipient,
            subject = %notification.subject,
            assignment_uuid = ?notification.assignment,
            "notification not delivered; no notifier endpoint configured"
        );

        Ok(())
    }
}
