//! Create Coupon Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vouchers::usage::UsageType;
use vouchers_app::domain::coupons::{
    data::{CouponCodes, NewCoupon},
    records::CouponUuid,
};

use crate::{
    coupons::{errors::into_status_error, models::CouponResponse},
    extensions::*,
    state::State,
};

/// Create Coupon Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateCouponRequest {
    /// Client-chosen identifier; generated when omitted
    pub uuid: Option<Uuid>,

    pub title: String,

    /// `SINGLE_USE`, `MULTI_USE`, `ONCE_PER_CUSTOMER` or `MULTI_USE_PER_CUSTOMER`
    pub usage_type: String,

    /// Slots per code; unlimited when omitted for multi-use types
    pub max_uses: Option<u32>,

    /// Number of codes to generate
    pub quantity: Option<u32>,

    /// Codes to issue instead of generated ones
    pub codes: Option<Vec<String>>,

    #[serde(default)]
    pub requires_assignment: bool,

    /// RFC 3339 start of the validity window
    pub start_at: String,

    /// RFC 3339 end of the validity window
    pub end_at: String,
}

impl TryFrom<CreateCouponRequest> for NewCoupon {
    type Error = StatusError;

    fn try_from(request: CreateCouponRequest) -> Result<Self, Self::Error> {
        let usage_type = request.usage_type.parse::<UsageType>().or_400("invalid usage_type")?;
        let start_at = request.start_at.parse::<Timestamp>().or_400("invalid start_at")?;
        let end_at = request.end_at.parse::<Timestamp>().or_400("invalid end_at")?;

        let codes = match (request.codes, request.quantity) {
            (Some(codes), _) if !codes.is_empty() => CouponCodes::Explicit(codes),
            (_, Some(quantity)) => CouponCodes::Generate { quantity },
            _ => {
                return Err(StatusError::bad_request().brief("Either quantity or codes is required"));
            }
        };

        Ok(NewCoupon {
            uuid: request.uuid.map_or_else(CouponUuid::new, CouponUuid::from_uuid),
            title: request.title,
            usage_type,
            max_uses: request.max_uses,
            requires_assignment: request.requires_assignment,
            start_at,
            end_at,
            codes,
        })
    }
}

/// Create Coupon Handler
#[endpoint(
    tags("coupons"),
    summary = "Create Coupon",
    responses(
        (status_code = StatusCode::CREATED, description = "Coupon created"),
        (status_code = StatusCode::CONFLICT, description = "Coupon or code already exists"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Missing tenant"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CreateCouponRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<CouponResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let scope = depot.scope_or_401()?;
    let new_coupon = NewCoupon::try_from(json.into_inner())?;

    let coupon = state
        .app
        .coupons
        .create_coupon(scope, new_coupon)
        .await
        .map_err(into_status_error)?;

    res.add_header(LOCATION, format!("/coupons/{}", coupon.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(coupon.into()))
}
