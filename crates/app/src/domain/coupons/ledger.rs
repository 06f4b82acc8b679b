//! Ledger snapshots of stored vouchers.

use rustc_hash::FxHashMap;
use vouchers::voucher::{AssignmentEntry, VoucherState};

use crate::domain::coupons::records::{
    ApplicationRecord, AssignmentRecord, CouponRecord, VoucherRecord, VoucherUuid,
};

/// A stored voucher with the state the ledger decides on.
///
/// `assignments` and `state.assignments` hold the same rows in the same
/// order, so an index returned by the ledger addresses both.
#[derive(Debug, Clone)]
pub(crate) struct LedgerVoucher {
    pub(crate) record: VoucherRecord,
    pub(crate) assignments: Vec<AssignmentRecord>,
    pub(crate) state: VoucherState,
}

/// Group assignments and applications under their vouchers, keeping voucher order.
pub(crate) fn assemble(
    coupon: &CouponRecord,
    vouchers: Vec<VoucherRecord>,
    assignments: Vec<AssignmentRecord>,
    applications: Vec<ApplicationRecord>,
) -> Vec<LedgerVoucher> {
    let mut assignments_by_voucher: FxHashMap<VoucherUuid, Vec<AssignmentRecord>> =
        FxHashMap::default();

    for assignment in assignments {
        assignments_by_voucher
            .entry(assignment.voucher_uuid)
            .or_default()
            .push(assignment);
    }

    let mut redemptions_by_voucher: FxHashMap<VoucherUuid, Vec<String>> = FxHashMap::default();

    for application in applications {
        redemptions_by_voucher
            .entry(application.voucher_uuid)
            .or_default()
            .push(application.user_email);
    }

    vouchers
        .into_iter()
        .map(|record| {
            let assignments = assignments_by_voucher
                .remove(&record.uuid)
                .unwrap_or_default();

            let state = VoucherState {
                code: record.code.clone(),
                usage: coupon.usage_type,
                capacity: record.capacity,
                window: coupon.window(),
                requires_assignment: coupon.requires_assignment,
                assignments: assignments
                    .iter()
                    .map(|assignment| AssignmentEntry {
                        email: assignment.user_email.clone(),
                        status: assignment.status,
                    })
                    .collect(),
                redemptions: redemptions_by_voucher
                    .remove(&record.uuid)
                    .unwrap_or_default(),
            };

            LedgerVoucher {
                record,
                assignments,
                state,
            }
        })
        .collect()
}
