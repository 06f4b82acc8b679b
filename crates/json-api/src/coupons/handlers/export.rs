//! Export Codes Handler

use std::sync::Arc;

use salvo::{
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    oapi::extract::{PathParam, QueryParam},
    prelude::*,
};
use uuid::Uuid;
use vouchers::reports::render_csv;
use vouchers_app::domain::coupons::records::CouponUuid;

use crate::{coupons::errors::into_status_error, extensions::*, state::State};

/// Export Codes Handler
///
/// Returns every code of a coupon as CSV, with redeem links.
#[endpoint(
    tags("coupons"),
    summary = "Export Coupon Codes",
    responses(
        (status_code = StatusCode::OK, description = "CSV report", content_type = "text/csv"),
        (status_code = StatusCode::BAD_REQUEST, description = "Unknown code_filter"),
        (status_code = StatusCode::NOT_FOUND, description = "Coupon not found"),
    ),
)]
pub(crate) async fn handler(
    coupon: PathParam<Uuid>,
    code_filter: QueryParam<String, false>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<(), StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let scope = depot.scope_or_401()?;
    let coupon = CouponUuid::from_uuid(coupon.into_inner());
    let filter = code_filter.into_code_filter()?;

    let reports = state
        .app
        .coupons
        .export_codes(scope, coupon, filter)
        .await
        .map_err(into_status_error)?;

    res.add_header(CONTENT_TYPE, "text/csv; charset=utf-8", true)
        .or_500("failed to set content type header")?
        .add_header(
            CONTENT_DISPOSITION,
            format!("attachment; filename=\"coupon-{coupon}-codes.csv\""),
            true,
        )
        .or_500("failed to set content disposition header")?
        .render(render_csv(&reports, &state.ledger.redeem_base_url));

    Ok(())
}
