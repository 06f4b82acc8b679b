//! Assignment Planning
//!
//! Spreads a batch of emails over the codes of a coupon. Codes are filled in
//! the order given, each one before the next is used, and the batch either
//! fits entirely or is rejected with [`LedgerError::InsufficientSlots`].

use rustc_hash::FxHashSet;

use crate::{errors::LedgerError, voucher::VoucherState};

/// Slots to create for one email on one voucher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedAssignment {
    /// Index of the voucher in the planner input.
    pub voucher: usize,

    /// Email receiving the slots.
    pub email: String,

    /// Assignment rows to create.
    pub slots: u32,
}

#[derive(Debug)]
struct Candidate<'a> {
    voucher: &'a VoucherState,
    available: u32,
    planned: FxHashSet<&'a str>,
}

impl<'a> Candidate<'a> {
    fn new(voucher: &'a VoucherState) -> Self {
        Self {
            voucher,
            available: voucher.availability().available(),
            planned: FxHashSet::default(),
        }
    }

    fn slots_needed(&self) -> u32 {
        self.voucher.usage.slots_per_email(self.voucher.capacity)
    }

    fn accepts(&self, email: &str) -> bool {
        if self.available < self.slots_needed() {
            return false;
        }

        if !self.voucher.usage.is_per_customer() {
            return true;
        }

        !(self.planned.contains(email)
            || self.voucher.holds(email)
            || self.voucher.redemptions_by(email) > 0)
    }

    fn take(&mut self, email: &'a str) -> u32 {
        let slots = self.slots_needed();

        self.available = self.available.saturating_sub(slots);
        self.planned.insert(email);

        slots
    }
}

/// Plan slots for every email, preserving input order.
///
/// # Errors
///
/// Returns [`LedgerError::InsufficientSlots`] when any email cannot be placed.
/// No partial plan is returned.
pub fn plan_assignments(
    vouchers: &[VoucherState],
    emails: &[String],
) -> Result<Vec<PlannedAssignment>, LedgerError> {
    let mut candidates: Vec<Candidate<'_>> = vouchers.iter().map(Candidate::new).collect();
    let mut plan = Vec::with_capacity(emails.len());

    for email in emails {
        let index = candidates
            .iter()
            .position(|candidate| candidate.accepts(email))
            .ok_or(LedgerError::InsufficientSlots)?;

        let slots = candidates
            .get_mut(index)
            .map(|candidate| candidate.take(email))
            .ok_or(LedgerError::InsufficientSlots)?;

        plan.push(PlannedAssignment {
            voucher: index,
            email: email.clone(),
            slots,
        });
    }

    Ok(plan)
}

/// Slots a batch of emails needs on a voucher with the given rules.
#[must_use]
pub fn required_slots(voucher: &VoucherState, emails: usize) -> u64 {
    u64::from(voucher.usage.slots_per_email(voucher.capacity))
        .saturating_mul(u64::try_from(emails).unwrap_or(u64::MAX))
}
