//! Vouchers prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    assignments::{AssignmentStatus, normalize_email},
    availability::{Availability, compute_availability},
    errors::LedgerError,
    filters::{CodeFilter, apply_filter},
    pagination::{Page, PageRequest, paginate},
    planning::{PlannedAssignment, plan_assignments},
    redemption::{RedemptionPlan, authorize_redemption},
    reports::{CodeReport, redeem_url, render_csv},
    templates::EmailTemplate,
    usage::{UNLIMITED_MAX_USES, UsageType},
    validity::ValidityWindow,
    voucher::{AssignmentCounts, AssignmentEntry, VoucherState},
};
