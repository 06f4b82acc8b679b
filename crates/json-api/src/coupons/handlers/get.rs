//! Get Coupon Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;
use vouchers_app::domain::coupons::records::CouponUuid;

use crate::{
    coupons::{errors::into_status_error, models::CouponResponse},
    extensions::*,
    state::State,
};

/// Get Coupon Handler
///
/// Returns a coupon with its code count.
#[endpoint(tags("coupons"), summary = "Get Coupon")]
pub(crate) async fn handler(
    coupon: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<CouponResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let scope = depot.scope_or_401()?;

    let coupon = state
        .app
        .coupons
        .get_coupon(scope, CouponUuid::from_uuid(coupon.into_inner()))
        .await
        .map_err(into_status_error)?;

    Ok(Json(coupon.into()))
}
