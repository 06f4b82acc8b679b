//! Voucher State

use smallvec::SmallVec;

use crate::{
    assignments::AssignmentStatus, availability::Availability, usage::UsageType,
    validity::ValidityWindow,
};

/// An assignment row as seen by the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentEntry {
    /// Normalised learner email.
    pub email: String,

    /// Current lifecycle state.
    pub status: AssignmentStatus,
}

/// Everything the ledger needs to decide about one voucher code.
///
/// Assignments are kept oldest first. Emails are expected in their
/// normalised form (see [`crate::assignments::normalize_email`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoucherState {
    /// Voucher code.
    pub code: String,

    /// Usage rules of the code.
    pub usage: UsageType,

    /// Total slots of the code.
    pub capacity: u32,

    /// Redemption window.
    pub window: ValidityWindow,

    /// Whether redemption needs an open assignment.
    pub requires_assignment: bool,

    /// Assignment rows, oldest first.
    pub assignments: Vec<AssignmentEntry>,

    /// One email per recorded redemption.
    pub redemptions: Vec<String>,
}

impl VoucherState {
    /// A fresh voucher with an always-open window and open redemption.
    #[must_use]
    pub fn new(code: impl Into<String>, usage: UsageType, max_uses: Option<u32>) -> Self {
        Self {
            code: code.into(),
            usage,
            capacity: usage.total_slots(max_uses),
            window: ValidityWindow::unbounded(),
            requires_assignment: false,
            assignments: Vec::new(),
            redemptions: Vec::new(),
        }
    }

    /// Replace the redemption window.
    #[must_use]
    pub fn with_window(mut self, window: ValidityWindow) -> Self {
        self.window = window;
        self
    }

    /// Set whether redemption needs an open assignment.
    #[must_use]
    pub fn requiring_assignment(mut self, requires_assignment: bool) -> Self {
        self.requires_assignment = requires_assignment;
        self
    }

    /// Append an assignment row.
    #[must_use]
    pub fn with_assignment(mut self, email: impl Into<String>, status: AssignmentStatus) -> Self {
        self.assignments.push(AssignmentEntry {
            email: email.into(),
            status,
        });
        self
    }

    /// Append a redemption.
    #[must_use]
    pub fn with_redemption(mut self, email: impl Into<String>) -> Self {
        self.redemptions.push(email.into());
        self
    }

    /// Current slot counters.
    #[must_use]
    pub fn availability(&self) -> Availability {
        Availability {
            total: self.capacity,
            assigned: count(self.open_assignments()),
            redeemed: count(self.redemptions.iter()),
        }
    }

    /// Distinct emails holding an open assignment, in assignment order.
    #[must_use]
    pub fn active_holders(&self) -> SmallVec<[&str; 4]> {
        let mut holders: SmallVec<[&str; 4]> = SmallVec::new();

        for entry in self.open_assignments() {
            if !holders.contains(&entry.email.as_str()) {
                holders.push(entry.email.as_str());
            }
        }

        holders
    }

    /// Whether `email` holds an open assignment.
    #[must_use]
    pub fn holds(&self, email: &str) -> bool {
        self.open_assignments().any(|entry| entry.email == email)
    }

    /// Whether any assignment on the code is open or was redeemed.
    #[must_use]
    pub fn is_earmarked(&self) -> bool {
        self.assignments
            .iter()
            .any(|entry| entry.status != AssignmentStatus::Revoked)
    }

    /// Whether anyone but `email` holds an open assignment or redeemed the code.
    #[must_use]
    pub fn is_claimed_by_other(&self, email: &str) -> bool {
        self.redemptions.iter().any(|redeemer| redeemer != email)
            || self.open_assignments().any(|entry| entry.email != email)
    }

    /// Number of redemptions recorded for `email`.
    #[must_use]
    pub fn redemptions_by(&self, email: &str) -> u32 {
        count(self.redemptions.iter().filter(|redeemer| *redeemer == email))
    }

    /// Index of the oldest open assignment for `email`.
    #[must_use]
    pub fn oldest_open_assignment(&self, email: &str) -> Option<usize> {
        self.assignments
            .iter()
            .position(|entry| entry.status == AssignmentStatus::Assigned && entry.email == email)
    }

    /// Redeemed and non-revoked assignment counts for `email`.
    #[must_use]
    pub fn assignment_counts(&self, email: &str) -> AssignmentCounts {
        let mut counts = AssignmentCounts::default();

        for entry in self.assignments.iter().filter(|entry| entry.email == email) {
            match entry.status {
                AssignmentStatus::Redeemed => {
                    counts.redeemed = counts.redeemed.saturating_add(1);
                    counts.total = counts.total.saturating_add(1);
                }
                AssignmentStatus::Assigned => counts.total = counts.total.saturating_add(1),
                AssignmentStatus::Revoked => {}
            }
        }

        counts
    }

    fn open_assignments(&self) -> impl Iterator<Item = &AssignmentEntry> {
        self.assignments
            .iter()
            .filter(|entry| entry.status == AssignmentStatus::Assigned)
    }
}

/// Assignment counts of one email on one code, used by reminders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AssignmentCounts {
    /// Assignments already redeemed.
    pub redeemed: u32,

    /// Assignments not revoked.
    pub total: u32,
}

fn count<I: Iterator>(iter: I) -> u32 {
    u32::try_from(iter.count()).unwrap_or(u32::MAX)
}
