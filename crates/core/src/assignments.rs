//! Offer Assignments

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle state of an offer assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentStatus {
    /// Slot earmarked for the email, not yet redeemed.
    Assigned,

    /// The earmarked slot was consumed at checkout.
    Redeemed,

    /// An administrator withdrew the earmark before redemption.
    Revoked,
}

/// Error returned when parsing an unknown assignment status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown assignment status: {0}")]
pub struct UnknownAssignmentStatus(pub String);

impl AssignmentStatus {
    /// Stable identifier used for storage and over the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Assigned => "ASSIGNED",
            Self::Redeemed => "REDEEMED",
            Self::Revoked => "REVOKED",
        }
    }

    /// Whether no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        match self {
            Self::Assigned => false,
            Self::Redeemed | Self::Revoked => true,
        }
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssignmentStatus {
    type Err = UnknownAssignmentStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ASSIGNED" => Ok(Self::Assigned),
            "REDEEMED" => Ok(Self::Redeemed),
            "REVOKED" => Ok(Self::Revoked),
            other => Err(UnknownAssignmentStatus(other.to_string())),
        }
    }
}

/// Canonical form of a learner email: trimmed and lower-cased.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
