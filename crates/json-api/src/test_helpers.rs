//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};
use uuid::Uuid;
use vouchers::usage::UsageType;
use vouchers_app::{
    context::AppContext,
    domain::{
        coupons::{
            MockCouponsService,
            records::{CouponRecord, CouponUuid},
        },
        scope::RequestScope,
        tenants::{
            MockTenantsService,
            records::{TenantRecord, TenantUuid},
        },
    },
};

use crate::{config::ledger::LedgerConfig, extensions::*, state::State};

pub(crate) const TEST_TENANT_UUID: TenantUuid = TenantUuid::from_uuid(Uuid::nil());

pub(crate) const TEST_REDEEM_BASE_URL: &str = "https://learn.example.com/redeem/";

pub(crate) fn test_scope() -> RequestScope {
    RequestScope::new(TEST_TENANT_UUID)
}

#[salvo::handler]
pub(crate) async fn inject_scope(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    depot.insert_scope(test_scope());
    ctrl.call_next(req, depot, res).await;
}

fn strict_tenants_mock() -> MockTenantsService {
    let mut tenants = MockTenantsService::new();

    tenants.expect_create_tenant().never();
    tenants.expect_get_tenant().never();

    tenants
}

fn strict_coupons_mock() -> MockCouponsService {
    let mut coupons = MockCouponsService::new();

    coupons.expect_create_coupon().never();
    coupons.expect_get_coupon().never();
    coupons.expect_list_codes().never();
    coupons.expect_export_codes().never();
    coupons.expect_assign().never();
    coupons.expect_revoke().never();
    coupons.expect_remind().never();
    coupons.expect_redeem().never();

    coupons
}

fn test_ledger_config() -> LedgerConfig {
    LedgerConfig {
        redeem_base_url: TEST_REDEEM_BASE_URL.to_string(),
        default_page_size: 2,
        max_page_size: 10,
    }
}

fn state(coupons: MockCouponsService, tenants: MockTenantsService) -> Arc<State> {
    State::from_app_context(
        AppContext {
            coupons: Arc::new(coupons),
            tenants: Arc::new(tenants),
        },
        test_ledger_config(),
    )
}

pub(crate) fn state_with_coupons(coupons: MockCouponsService) -> Arc<State> {
    state(coupons, strict_tenants_mock())
}

pub(crate) fn state_with_tenants(tenants: MockTenantsService) -> Arc<State> {
    state(strict_coupons_mock(), tenants)
}

/// Service with `route` mounted behind an injected test scope.
pub(crate) fn coupons_service(coupons: MockCouponsService, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state_with_coupons(coupons)))
            .hoop(inject_scope)
            .push(route),
    )
}


pub(crate) fn make_tenant(uuid: TenantUuid) -> TenantRecord {
    let now = Timestamp::now();

    TenantRecord {
        uuid,
        name: "Example University".to_string(),
        created_at: now,
        updated_at: now,
        deleted_at: None,
    }
}

pub(crate) fn make_coupon(uuid: CouponUuid) -> CouponRecord {
    let now = Timestamp::now();

    CouponRecord {
        uuid,
        title: "Spring enrollment".to_string(),
        usage_type: UsageType::SingleUse,
        max_uses: None,
        requires_assignment: false,
        start_at: now,
        end_at: now,
        voucher_count: 3,
        created_at: now,
        updated_at: now,
    }
}
