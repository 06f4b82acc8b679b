//! Usage Types

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Slot count used for vouchers without an explicit `max_uses`.
pub const UNLIMITED_MAX_USES: u32 = 10_000;

/// How the redemption slots of a voucher may be consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UsageType {
    /// One slot, one redemption.
    SingleUse,

    /// Any customer may consume any number of the slots.
    MultiUse,

    /// A customer may hold or consume at most one slot.
    OncePerCustomer,

    /// A single customer is earmarked every slot of the code.
    MultiUsePerCustomer,
}

/// Error returned when parsing an unknown usage type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown usage type: {0}")]
pub struct UnknownUsageType(pub String);

/// Error returned when `max_uses` is not allowed for a usage type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MaxUsesError {
    /// Zero is never a usable capacity.
    #[error("max_uses must be greater than zero")]
    Zero,

    /// Single use vouchers always have exactly one slot.
    #[error("max_uses cannot be set above 1 for single use vouchers")]
    SingleUse,

    /// Multi-use per customer vouchers earmark every slot at once.
    #[error("max_uses is required for multi-use per customer vouchers")]
    Required,
}

impl UsageType {
    /// Stable identifier used for storage and over the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SingleUse => "SINGLE_USE",
            Self::MultiUse => "MULTI_USE",
            Self::OncePerCustomer => "ONCE_PER_CUSTOMER",
            Self::MultiUsePerCustomer => "MULTI_USE_PER_CUSTOMER",
        }
    }

    /// Human readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SingleUse => "Single use",
            Self::MultiUse => "Multi-use",
            Self::OncePerCustomer => "Once per customer",
            Self::MultiUsePerCustomer => "Multi-use per customer",
        }
    }

    /// Total redemption slots of a voucher with this usage type.
    #[must_use]
    pub const fn total_slots(self, max_uses: Option<u32>) -> u32 {
        match (self, max_uses) {
            (Self::SingleUse, _) | (Self::OncePerCustomer, None) => 1,
            (Self::MultiUse | Self::MultiUsePerCustomer, None) => UNLIMITED_MAX_USES,
            (Self::OncePerCustomer | Self::MultiUse | Self::MultiUsePerCustomer, Some(max)) => max,
        }
    }

    /// Slot units a single email takes when assigned a voucher with `capacity` slots.
    #[must_use]
    pub const fn slots_per_email(self, capacity: u32) -> u32 {
        match self {
            Self::MultiUsePerCustomer => capacity,
            Self::SingleUse | Self::MultiUse | Self::OncePerCustomer => 1,
        }
    }

    /// Whether an email may hold at most one active slot on a code.
    #[must_use]
    pub const fn is_per_customer(self) -> bool {
        matches!(self, Self::OncePerCustomer | Self::MultiUsePerCustomer)
    }

    /// Validate a requested `max_uses` against this usage type.
    ///
    /// # Errors
    ///
    /// Returns [`MaxUsesError`] for zero, for anything but 1 on single use
    /// vouchers, and for a missing value on multi-use per customer vouchers.
    pub const fn validate_max_uses(self, max_uses: Option<u32>) -> Result<(), MaxUsesError> {
        match (self, max_uses) {
            (_, Some(0)) => Err(MaxUsesError::Zero),
            (Self::MultiUsePerCustomer, None) => Err(MaxUsesError::Required),
            (Self::SingleUse, Some(max)) if max > 1 => Err(MaxUsesError::SingleUse),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for UsageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UsageType {
    type Err = UnknownUsageType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "SINGLE_USE" => Ok(Self::SingleUse),
            "MULTI_USE" => Ok(Self::MultiUse),
            "ONCE_PER_CUSTOMER" => Ok(Self::OncePerCustomer),
            "MULTI_USE_PER_CUSTOMER" => Ok(Self::MultiUsePerCustomer),
            other => Err(UnknownUsageType(other.to_string())),
        }
    }
}
