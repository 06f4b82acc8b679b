//! Coupon Data

use jiff::Timestamp;
use vouchers::{LedgerError, templates::EmailTemplate, usage::UsageType};

use crate::{
    domain::coupons::records::{ApplicationRecord, AssignmentUuid, CouponUuid},
    notifications::NotificationError,
};

/// Largest number of codes generated for one coupon.
pub const MAX_GENERATED_CODES: u32 = 1_000;

/// Where the codes of a new coupon come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CouponCodes {
    /// Generate this many random codes.
    Generate { quantity: u32 },

    /// Use exactly these codes.
    Explicit(Vec<String>),
}

/// New Coupon Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCoupon {
    pub uuid: CouponUuid,
    pub title: String,
    pub usage_type: UsageType,
    pub max_uses: Option<u32>,
    pub requires_assignment: bool,
    pub start_at: Timestamp,
    pub end_at: Timestamp,
    pub codes: CouponCodes,
}

/// Emails to assign across the codes of a coupon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentRequest {
    pub emails: Vec<String>,

    /// Restrict assignment to these codes, in coupon code order.
    pub codes: Option<Vec<String>>,

    pub template: EmailTemplate,
}

/// A learner email paired with one of the coupon's codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentPair {
    pub code: String,
    pub email: String,
}

/// Assignments to withdraw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevokeRequest {
    pub assignments: Vec<AssignmentPair>,

    /// Revocation email; nobody is notified without one.
    pub template: Option<EmailTemplate>,
}

/// Assignments to remind learners about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemindRequest {
    pub assignments: Vec<AssignmentPair>,
    pub template: EmailTemplate,
}

/// A code used at checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redemption {
    pub code: String,
    pub email: String,
    pub order_number: String,
}

/// Slots created for one email on one code.
#[derive(Debug)]
pub struct AssignedOffer {
    pub code: String,
    pub email: String,

    /// One assignment per slot, oldest first.
    pub assignments: Vec<AssignmentUuid>,

    pub notification: Result<(), NotificationError>,
}

/// Result of revoking or reminding one pair.
#[derive(Debug)]
pub struct PairOutcome {
    pub code: String,
    pub email: String,
    pub result: PairResult,
}

/// What happened to one pair of a batch.
#[derive(Debug)]
pub enum PairResult {
    /// The pair was checked and left untouched.
    Rejected(LedgerError),

    /// The pair was applied; `None` when no email was requested.
    Applied(Option<Result<(), NotificationError>>),
}

impl PairOutcome {
    /// Whether the pair was applied.
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self.result, PairResult::Applied(_))
    }

    /// `"success"`, the rejection, or the delivery error.
    #[must_use]
    pub fn detail(&self) -> String {
        match &self.result {
            PairResult::Rejected(error) => error.to_string(),
            PairResult::Applied(Some(Err(error))) => error.to_string(),
            PairResult::Applied(Some(Ok(())) | None) => "success".to_string(),
        }
    }
}

/// A successful redemption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedemptionRecord {
    pub application: ApplicationRecord,

    /// Assignment whose earmarked slot was consumed.
    pub assignment: Option<AssignmentUuid>,
}
