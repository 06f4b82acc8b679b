//! Ledger Errors

use thiserror::Error;

use crate::usage::MaxUsesError;

/// Rule violations raised by ledger decisions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The codes in scope cannot hold every requested email.
    #[error("Not enough available codes for assignment!")]
    InsufficientSlots,

    /// The code does not belong to the coupon in scope.
    #[error("Code {code} is not associated with this Coupon")]
    CodeNotAssociated {
        /// Offending code.
        code: String,
    },

    /// No open assignment exists for the pair.
    #[error("No assignments exist for user {email} and code {code}")]
    NoAssignmentExists {
        /// Learner email.
        email: String,

        /// Voucher code.
        code: String,
    },

    /// The validity window has not opened yet.
    #[error("This coupon code is not yet valid.")]
    NotYetActive,

    /// The validity window has closed.
    #[error("This coupon code has expired.")]
    Expired,

    /// Every slot is consumed.
    #[error("This coupon has already been used")]
    Exhausted,

    /// The voucher can only be redeemed through an assignment.
    #[error("This code is not assigned to you.")]
    AssignmentRequired,

    /// A once-per-customer code was already redeemed by this email.
    #[error("You have already redeemed this coupon code.")]
    AlreadyRedeemed,

    /// A multi-use per customer code already belongs to someone else.
    #[error("This coupon code is reserved for another customer.")]
    ClaimedByAnotherCustomer,

    /// `max_uses` does not fit the usage type.
    #[error(transparent)]
    InvalidMaxUses(#[from] MaxUsesError),

    /// The requested page lies outside the result set.
    #[error("Invalid page.")]
    InvalidPage,
}
