//! Remind Assignments Handler

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
use vouchers_app::domain::coupons::{data::RemindRequest, records::CouponUuid};

use crate::{
    coupons::{
        errors::observe,
        models::{PairOutcomeResponse, PairRequest, email_template},
    },
    extensions::*,
    state::State,
};

/// Remind Assignments Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RemindAssignmentsRequest {
    pub assignments: Vec<PairRequest>,

    /// Reminder body; `{REDEEMED_OFFER_COUNT}` and `{TOTAL_OFFER_COUNT}` are also filled in
    pub template: String,

    pub greeting: Option<String>,
    pub closing: Option<String>,
}

impl From<RemindAssignmentsRequest> for RemindRequest {
    fn from(request: RemindAssignmentsRequest) -> Self {
        RemindRequest {
            assignments: request.assignments.into_iter().map(Into::into).collect(),
            template: email_template(request.template, request.greeting, request.closing),
        }
    }
}

/// Remind Assignments Handler
///
/// Re-sends the assignment email for open assignments without changing them.
#[endpoint(
    tags("coupons"),
    summary = "Remind Coupon Assignees",
    responses(
        (status_code = StatusCode::OK, description = "One result per pair"),
        (status_code = StatusCode::BAD_REQUEST, description = "Malformed or empty batch"),
        (status_code = StatusCode::NOT_FOUND, description = "Coupon not found"),
    ),
)]
pub(crate) async fn handler(
    coupon: PathParam<Uuid>,
    json: JsonBody<RemindAssignmentsRequest>,
    depot: &mut Depot,
) -> Result<Json<Vec<PairOutcomeResponse>>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let scope = depot.scope_or_401()?;

    let outcomes = observe(
        "remind",
        state
            .app
            .coupons
            .remind(
                scope,
                CouponUuid::from_uuid(coupon.into_inner()),
                json.into_inner().into(),
            )
            .await,
    )?;

    Ok(Json(outcomes.into_iter().map(Into::into).collect()))
}
