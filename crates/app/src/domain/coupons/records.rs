//! Coupon Records

use jiff::Timestamp;
use vouchers::{assignments::AssignmentStatus, usage::UsageType, validity::ValidityWindow};

use crate::uuids::TypedUuid;

/// Coupon UUID
pub type CouponUuid = TypedUuid<CouponRecord>;

/// Voucher UUID
pub type VoucherUuid = TypedUuid<VoucherRecord>;

/// Offer assignment UUID
pub type AssignmentUuid = TypedUuid<AssignmentRecord>;

/// Voucher application UUID
pub type ApplicationUuid = TypedUuid<ApplicationRecord>;

/// A batch of voucher codes sharing usage rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponRecord {
    pub uuid: CouponUuid,
    pub title: String,
    pub usage_type: UsageType,
    pub max_uses: Option<u32>,
    pub requires_assignment: bool,
    pub start_at: Timestamp,
    pub end_at: Timestamp,

    /// Number of voucher codes issued for the coupon.
    pub voucher_count: u32,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CouponRecord {
    /// Redemption window shared by every code of the coupon.
    #[must_use]
    pub fn window(&self) -> ValidityWindow {
        ValidityWindow::new(self.start_at, self.end_at)
    }
}

/// One redeemable code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoucherRecord {
    pub uuid: VoucherUuid,
    pub coupon_uuid: CouponUuid,
    pub code: String,

    /// Total slots of the code.
    pub capacity: u32,

    /// Applications recorded against the code.
    pub redemption_count: u32,

    pub created_at: Timestamp,
}

/// A slot of a voucher earmarked for one learner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentRecord {
    pub uuid: AssignmentUuid,
    pub voucher_uuid: VoucherUuid,
    pub user_email: String,
    pub status: AssignmentStatus,

    /// Application that redeemed the assignment.
    pub application_uuid: Option<ApplicationUuid>,

    pub created_at: Timestamp,
}

/// An immutable record of a voucher used on an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationRecord {
    pub uuid: ApplicationUuid,
    pub voucher_uuid: VoucherUuid,
    pub user_email: String,
    pub order_number: String,
    pub created_at: Timestamp,
}
