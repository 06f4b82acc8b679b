//! Validity Windows

use jiff::Timestamp;

use crate::errors::LedgerError;

/// Period during which a voucher can be redeemed; start inclusive, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidityWindow {
    /// First instant the voucher is usable.
    pub start: Timestamp,

    /// First instant the voucher is no longer usable.
    pub end: Timestamp,
}

impl ValidityWindow {
    /// Create a window from its bounds.
    #[must_use]
    pub const fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    /// A window that is always open.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            start: Timestamp::MIN,
            end: Timestamp::MAX,
        }
    }

    /// Whether the bounds describe a non-empty period.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.start < self.end
    }

    /// Whether `now` falls inside the window.
    #[must_use]
    pub fn contains(&self, now: Timestamp) -> bool {
        self.start <= now && now < self.end
    }

    /// Whether the window closed before `now`.
    #[must_use]
    pub fn has_ended(&self, now: Timestamp) -> bool {
        now >= self.end
    }

    /// Check that `now` falls inside the window.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotYetActive`] before the start and
    /// [`LedgerError::Expired`] from the end onwards.
    pub fn check(&self, now: Timestamp) -> Result<(), LedgerError> {
        if now < self.start {
            return Err(LedgerError::NotYetActive);
        }

        if self.has_ended(now) {
            return Err(LedgerError::Expired);
        }

        Ok(())
    }
}
