//! Coupons service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;
use vouchers::LedgerError;

/// Check constraint keeping redemptions within a voucher's capacity.
const CAPACITY_CONSTRAINT: &str = "vouchers_redemptions_within_capacity";

/// Unique key allowing one redemption per voucher and order.
const ORDER_CONSTRAINT: &str = "voucher_applications_order_key";

const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";

#[derive(Debug, Error)]
pub enum CouponsServiceError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("coupon already exists")]
    AlreadyExists,

    #[error("coupon not found")]
    NotFound,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("start_at must be before end_at")]
    InvalidWindow,

    #[error("quantity must be between 1 and {max}")]
    InvalidQuantity { max: u32 },

    #[error("at least one email or assignment is required")]
    EmptyBatch,

    #[error("order already redeemed this voucher")]
    DuplicateOrder,

    #[error("voucher is being redeemed concurrently; retry")]
    Conflict,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl CouponsServiceError {
    /// Whether the request lost a race for a slot and may be retried.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict | Self::Ledger(LedgerError::Exhausted))
    }
}

impl From<Error> for CouponsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        if error
            .as_database_error()
            .is_some_and(|db| db.constraint() == Some(ORDER_CONSTRAINT))
        {
            return Self::DuplicateOrder;
        }

        if let Some(db) = error.as_database_error()
            && (db.constraint() == Some(CAPACITY_CONSTRAINT)
                || matches!(
                    db.code().as_deref(),
                    Some(SERIALIZATION_FAILURE | DEADLOCK_DETECTED)
                ))
        {
            return Self::Conflict;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            _ => Self::Sql(error),
        }
    }
}
