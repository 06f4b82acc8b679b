//! Learner Notifications
//!
//! Assignment, reminder and revocation emails are handed to a [`Notifier`]
//! after the ledger change has been committed. Delivery is best effort: a
//! failed send is reported back per item and never undoes the change.

mod errors;
mod http;
mod log;
pub mod messages;

use async_trait::async_trait;
use mockall::automock;
use serde::Serialize;

use crate::domain::coupons::records::AssignmentUuid;

pub use errors::NotificationError;
pub use http::{HttpNotifier, HttpNotifierConfig};
pub use log::LogNotifier;
pub use messages::EmailSubjects;

/// A rendered email addressed to one learner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Learner email address.
    pub recipient: String,

    /// Assignment the email is about, when there is a single one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment: Option<AssignmentUuid>,

    /// Email subject.
    pub subject: String,

    /// Rendered email body.
    pub body: String,
}

#[automock]
#[async_trait]
/// Delivery channel for learner emails.
pub trait Notifier: Send + Sync {
    /// Queue `notification` for delivery.
    async fn send(&self, notification: Notification) -> Result<(), NotificationError>;
}
