//! Test Helpers

use jiff::{SignedDuration, Timestamp};
use vouchers::usage::UsageType;

use crate::{
    domain::{
        coupons::{
            CouponsService, CouponsServiceError,
            data::{AssignmentPair, CouponCodes, NewCoupon, Redemption, RedemptionRecord},
            records::{CouponRecord, CouponUuid},
        },
        scope::RequestScope,
    },
    test::TestContext,
};

pub(crate) fn scope(ctx: &TestContext) -> RequestScope {
    RequestScope::new(ctx.tenant_uuid).with_actor("test-admin")
}

pub(crate) fn pair(code: &str, email: &str) -> AssignmentPair {
    AssignmentPair {
        code: code.to_string(),
        email: email.to_string(),
    }
}

/// Create a coupon open from an hour ago until next week.
pub(crate) async fn create_coupon(
    ctx: &TestContext,
    usage_type: UsageType,
    max_uses: Option<u32>,
    quantity: u32,
) -> Result<CouponRecord, CouponsServiceError> {
    let now = Timestamp::now();

    ctx.coupons
        .create_coupon(
            scope(ctx),
            NewCoupon {
                uuid: CouponUuid::new(),
                title: "Test Coupon".to_string(),
                usage_type,
                max_uses,
                requires_assignment: false,
                start_at: now - SignedDuration::from_hours(1),
                end_at: now + SignedDuration::from_hours(24 * 7),
                codes: CouponCodes::Generate { quantity },
            },
        )
        .await
}

/// Codes of a coupon in code order.
pub(crate) async fn coupon_codes(
    ctx: &TestContext,
    coupon: CouponUuid,
) -> Result<Vec<String>, CouponsServiceError> {
    let reports = ctx.coupons.export_codes(scope(ctx), coupon, None).await?;

    Ok(reports.into_iter().map(|report| report.code).collect())
}

pub(crate) async fn redeem(
    ctx: &TestContext,
    code: &str,
    email: &str,
) -> Result<RedemptionRecord, CouponsServiceError> {
    ctx.coupons
        .redeem(
            scope(ctx),
            Redemption {
                code: code.to_string(),
                email: email.to_string(),
                order_number: format!("EDX-{}", uuid::Uuid::now_v7().simple()),
            },
        )
        .await
}
