//! Notification errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("email dispatch failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("email dispatch rejected with status {status}")]
    Rejected { status: u16 },
}
