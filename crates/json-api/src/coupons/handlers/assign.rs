//! Assign Codes Handler

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
use vouchers::assignments::AssignmentStatus;
use vouchers_app::domain::coupons::{
    data::{AssignedOffer, AssignmentRequest},
    records::CouponUuid,
};

use crate::{
    coupons::{errors::observe, models::email_template},
    extensions::*,
    state::State,
};

/// Assign Codes Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AssignCodesRequest {
    /// Learners to assign, in order
    pub emails: Vec<String>,

    /// Only assign from these codes
    pub codes: Option<Vec<String>>,

    /// Email body; `{USER_EMAIL}`, `{CODE}`, `{REDEMPTIONS_REMAINING}` and `{EXPIRATION_DATE}` are filled in
    pub template: String,

    pub greeting: Option<String>,
    pub closing: Option<String>,
}

impl From<AssignCodesRequest> for AssignmentRequest {
    fn from(request: AssignCodesRequest) -> Self {
        AssignmentRequest {
            emails: request.emails,
            codes: request.codes,
            template: email_template(request.template, request.greeting, request.closing),
        }
    }
}

/// One created assignment
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AssignmentResponse {
    pub uuid: Uuid,
    pub code: String,
    pub user_email: String,
    pub status: String,

    /// `success`, or why the email could not be sent
    pub detail: String,
}

fn assignment_rows(offer: AssignedOffer) -> impl Iterator<Item = AssignmentResponse> {
    let detail = match &offer.notification {
        Ok(()) => "success".to_string(),
        Err(error) => error.to_string(),
    };

    offer.assignments.into_iter().map(move |uuid| AssignmentResponse {
        uuid: uuid.into_uuid(),
        code: offer.code.clone(),
        user_email: offer.email.clone(),
        status: AssignmentStatus::Assigned.as_str().to_string(),
        detail: detail.clone(),
    })
}

/// Assign Codes Handler
///
/// Earmarks slots for every email or none of them, then emails each learner.
#[endpoint(
    tags("coupons"),
    summary = "Assign Coupon Codes",
    responses(
        (status_code = StatusCode::OK, description = "Assignments created"),
        (status_code = StatusCode::BAD_REQUEST, description = "Not enough slots, unknown code or expired coupon"),
        (status_code = StatusCode::NOT_FOUND, description = "Coupon not found"),
        (status_code = StatusCode::CONFLICT, description = "Concurrent update; retry"),
    ),
)]
pub(crate) async fn handler(
    coupon: PathParam<Uuid>,
    json: JsonBody<AssignCodesRequest>,
    depot: &mut Depot,
) -> Result<Json<Vec<AssignmentResponse>>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let scope = depot.scope_or_401()?;

    let offers = observe(
        "assign",
        state
            .app
            .coupons
            .assign(
                scope,
                CouponUuid::from_uuid(coupon.into_inner()),
                json.into_inner().into(),
            )
            .await,
    )?;

    Ok(Json(offers.into_iter().flat_map(assignment_rows).collect()))
}
