//! Redeem Voucher Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vouchers_app::domain::coupons::data::{Redemption, RedemptionRecord};

use crate::{coupons::errors::observe, extensions::*, state::State};

/// Redeem Voucher Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RedeemVoucherRequest {
    /// Learner redeeming the code
    pub email: String,

    /// Order the redemption pays for
    pub order_number: String,
}

/// Redemption Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RedemptionResponse {
    /// The unique identifier of the redemption
    pub uuid: Uuid,

    pub code: String,
    pub user_email: String,
    pub order_number: String,

    /// Assignment whose slot was consumed, if any
    pub assignment_uuid: Option<Uuid>,

    /// The date and time of the redemption
    pub created_at: String,
}

impl RedemptionResponse {
    fn new(code: String, record: RedemptionRecord) -> Self {
        Self {
            uuid: record.application.uuid.into_uuid(),
            code,
            user_email: record.application.user_email,
            order_number: record.application.order_number,
            assignment_uuid: record.assignment.map(|uuid| uuid.into_uuid()),
            created_at: record.application.created_at.to_string(),
        }
    }
}

/// Redeem Voucher Handler
///
/// Consumes one slot of a code for an order.
#[endpoint(
    tags("vouchers"),
    summary = "Redeem Voucher",
    responses(
        (status_code = StatusCode::CREATED, description = "Voucher redeemed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Outside the validity window, not assigned or already redeemed"),
        (status_code = StatusCode::NOT_FOUND, description = "Unknown code"),
        (status_code = StatusCode::CONFLICT, description = "No slot left or concurrent redemption; retry"),
    ),
)]
pub(crate) async fn handler(
    code: PathParam<String>,
    json: JsonBody<RedeemVoucherRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<RedemptionResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let scope = depot.scope_or_401()?;
    let code = code.into_inner();
    let request = json.into_inner();

    let record = observe(
        "redeem",
        state
            .app
            .coupons
            .redeem(
                scope,
                Redemption {
                    code: code.clone(),
                    email: request.email,
                    order_number: request.order_number,
                },
            )
            .await,
    )?;

    res.status_code(StatusCode::CREATED);

    Ok(Json(RedemptionResponse::new(code, record)))
}
