//! Slot Availability

use serde::{Deserialize, Serialize};

use crate::voucher::VoucherState;

/// Slot counters of a single voucher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Availability {
    /// Capacity of the voucher.
    pub total: u32,

    /// Active (unredeemed) assignments.
    pub assigned: u32,

    /// Recorded redemptions.
    pub redeemed: u32,
}

impl Availability {
    /// Slots taken by assignments or redemptions.
    #[must_use]
    pub const fn used(&self) -> u32 {
        self.assigned.saturating_add(self.redeemed)
    }

    /// Slots still free, never negative.
    #[must_use]
    pub const fn available(&self) -> u32 {
        self.total.saturating_sub(self.used())
    }
}

/// Compute the slot counters of `voucher`.
#[must_use]
pub fn compute_availability(voucher: &VoucherState) -> Availability {
    voucher.availability()
}
