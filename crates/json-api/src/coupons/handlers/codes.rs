//! List Codes Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{PathParam, QueryParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vouchers::{filters::CodeFilter, pagination::Page, reports::CodeReport};
use vouchers_app::domain::coupons::records::CouponUuid;

use crate::{
    coupons::{errors::into_status_error, models::CodeResponse},
    extensions::*,
    state::State,
};

/// One page of codes
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CodesPageResponse {
    /// Codes matching the filter across all pages
    pub count: usize,

    /// Link to the next page
    pub next: Option<String>,

    /// Link to the previous page
    pub previous: Option<String>,

    pub results: Vec<CodeResponse>,
}

impl CodesPageResponse {
    fn new(
        page: Page<CodeReport>,
        coupon: CouponUuid,
        filter: Option<CodeFilter>,
        redeem_base_url: &str,
    ) -> Self {
        let page_size = page.page_size;
        let link = |number: u32| page_link(coupon, filter, number, page_size);

        Self {
            count: page.count,
            next: page.next_page().map(link),
            previous: page.previous_page().map(link),
            results: page
                .items
                .into_iter()
                .map(|report| CodeResponse::from_report(report, redeem_base_url))
                .collect(),
        }
    }
}

fn page_link(coupon: CouponUuid, filter: Option<CodeFilter>, page: u32, page_size: u32) -> String {
    let mut link = format!("/coupons/{coupon}/codes?page={page}&page_size={page_size}");

    if let Some(filter) = filter {
        link.push_str("&code_filter=");
        link.push_str(filter.as_str());
    }

    link
}

/// List Codes Handler
///
/// Returns the codes of a coupon in code order, with slot counters and
/// current assignees.
#[endpoint(
    tags("coupons"),
    summary = "List Coupon Codes",
    responses(
        (status_code = StatusCode::OK, description = "Page of codes"),
        (status_code = StatusCode::BAD_REQUEST, description = "Unknown code_filter"),
        (status_code = StatusCode::NOT_FOUND, description = "Coupon not found or invalid page"),
    ),
)]
pub(crate) async fn handler(
    coupon: PathParam<Uuid>,
    code_filter: QueryParam<String, false>,
    page: QueryParam<u32, false>,
    page_size: QueryParam<u32, false>,
    depot: &mut Depot,
) -> Result<Json<CodesPageResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let scope = depot.scope_or_401()?;
    let coupon = CouponUuid::from_uuid(coupon.into_inner());
    let filter = code_filter.into_code_filter()?;
    let request = state.page_request(page.into_inner(), page_size.into_inner());

    let page = state
        .app
        .coupons
        .list_codes(scope, coupon, filter, request)
        .await
        .map_err(into_status_error)?;

    Ok(Json(CodesPageResponse::new(
        page,
        coupon,
        filter,
        &state.ledger.redeem_base_url,
    )))
}
