//! Redemption Authorization

use jiff::Timestamp;

use crate::{errors::LedgerError, usage::UsageType, voucher::VoucherState};

/// How an authorized redemption consumes its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedemptionPlan {
    /// Consume the earmarked slot of the assignment at this index.
    Assigned(usize),

    /// Consume a free slot.
    Open,
}

/// Decide whether `email` may redeem `voucher` at `now`.
///
/// # Errors
///
/// Returns [`LedgerError::NotYetActive`] or [`LedgerError::Expired`] outside
/// the window, [`LedgerError::AlreadyRedeemed`] for a repeat once-per-customer
/// redemption, [`LedgerError::ClaimedByAnotherCustomer`] when another email
/// holds or redeemed a multi-use per customer code,
/// [`LedgerError::AssignmentRequired`] when the voucher needs an
/// assignment the email does not hold, and [`LedgerError::Exhausted`] when no
/// free slot remains.
pub fn authorize_redemption(
    voucher: &VoucherState,
    email: &str,
    now: Timestamp,
) -> Result<RedemptionPlan, LedgerError> {
    voucher.window.check(now)?;

    if voucher.usage == UsageType::OncePerCustomer && voucher.redemptions_by(email) > 0 {
        return Err(LedgerError::AlreadyRedeemed);
    }

    if voucher.usage == UsageType::MultiUsePerCustomer && voucher.is_claimed_by_other(email) {
        return Err(LedgerError::ClaimedByAnotherCustomer);
    }

    if let Some(index) = voucher.oldest_open_assignment(email) {
        return Ok(RedemptionPlan::Assigned(index));
    }

    if voucher.requires_assignment {
        return Err(LedgerError::AssignmentRequired);
    }

    if voucher.availability().available() == 0 {
        return Err(LedgerError::Exhausted);
    }

    Ok(RedemptionPlan::Open)
}
