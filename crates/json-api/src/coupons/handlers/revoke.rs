//! Revoke Assignments Handler

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
use vouchers_app::domain::coupons::{data::RevokeRequest, records::CouponUuid};

use crate::{
    coupons::{
        errors::observe,
        models::{PairOutcomeResponse, PairRequest, email_template},
    },
    extensions::*,
    state::State,
};

/// Revoke Assignments Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RevokeAssignmentsRequest {
    pub assignments: Vec<PairRequest>,

    /// Revocation email body; learners are not emailed without one
    pub template: Option<String>,

    pub greeting: Option<String>,
    pub closing: Option<String>,
}

impl From<RevokeAssignmentsRequest> for RevokeRequest {
    fn from(request: RevokeAssignmentsRequest) -> Self {
        RevokeRequest {
            assignments: request.assignments.into_iter().map(Into::into).collect(),
            template: request
                .template
                .filter(|body| !body.trim().is_empty())
                .map(|body| email_template(body, request.greeting, request.closing)),
        }
    }
}

/// Revoke Assignments Handler
///
/// Withdraws the open assignments of each pair. Pairs without an open
/// assignment are reported in their own result and leave the rest untouched.
#[endpoint(
    tags("coupons"),
    summary = "Revoke Coupon Assignments",
    responses(
        (status_code = StatusCode::OK, description = "One result per pair"),
        (status_code = StatusCode::BAD_REQUEST, description = "Malformed or empty batch"),
        (status_code = StatusCode::NOT_FOUND, description = "Coupon not found"),
    ),
)]
pub(crate) async fn handler(
    coupon: PathParam<Uuid>,
    json: JsonBody<RevokeAssignmentsRequest>,
    depot: &mut Depot,
) -> Result<Json<Vec<PairOutcomeResponse>>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let scope = depot.scope_or_401()?;

    let outcomes = observe(
        "revoke",
        state
            .app
            .coupons
            .revoke(
                scope,
                CouponUuid::from_uuid(coupon.into_inner()),
                json.into_inner().into(),
            )
            .await,
    )?;

    Ok(Json(outcomes.into_iter().map(Into::into).collect()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;
    use vouchers::LedgerError;
    use vouchers_app::domain::coupons::{
        CouponsServiceError, MockCouponsService,
        data::{PairOutcome, PairResult},
    };

    use crate::test_helpers::coupons_service;

    use super::*;

    fn make_service(coupons: MockCouponsService) -> Service {
        coupons_service(
            coupons,
            Router::with_path("coupons/{coupon}/revoke").post(handler),
        )
    }

    #[tokio::test]
    async fn test_revoke_without_template_sends_no_email() -> TestResult {
        let coupon = CouponUuid::new();

        let mut coupons = MockCouponsService::new();

        coupons
            .expect_revoke()
            .once()
            .withf(|_, _, request| {
                request.template.is_none()
                    && request.assignments.len() == 1
                    && request
                        .assignments
                        .iter()
                        .all(|pair| pair.code == "AAA" && pair.email == "a@example.com")
            })
            .return_once(|_, _, _| {
                Ok(vec![PairOutcome {
                    code: "AAA".to_string(),
                    email: "a@example.com".to_string(),
                    result: PairResult::Applied(None),
                }])
            });

        let mut res = TestClient::post(format!("http://example.com/coupons/{coupon}/revoke"))
            .json(&json!({
                "assignments": [{ "email": "a@example.com", "code": "AAA" }],
                "template": "  ",
            }))
            .send(&make_service(coupons))
            .await;

        let body: Vec<PairOutcomeResponse> = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.len(), 1);
        assert!(
            body.iter().all(|outcome| outcome.detail == "success"),
            "expected success detail"
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_revoke_reports_rejected_pairs_alongside_revoked_ones() -> TestResult {
        let coupon = CouponUuid::new();

        let mut coupons = MockCouponsService::new();

        coupons.expect_revoke().once().return_once(|_, _, _| {
            Ok(vec![
                PairOutcome {
                    code: "AAA".to_string(),
                    email: "a@example.com".to_string(),
                    result: PairResult::Applied(Some(Ok(()))),
                },
                PairOutcome {
                    code: "RANDOMCODE".to_string(),
                    email: "b@example.com".to_string(),
                    result: PairResult::Rejected(LedgerError::CodeNotAssociated {
                        code: "RANDOMCODE".to_string(),
                    }),
                },
            ])
        });

        let mut res = TestClient::post(format!("http://example.com/coupons/{coupon}/revoke"))
            .json(&json!({
                "assignments": [
                    { "email": "a@example.com", "code": "AAA" },
                    { "email": "b@example.com", "code": "RANDOMCODE" },
                ],
                "template": "Your access to {CODE} was withdrawn",
            }))
            .send(&make_service(coupons))
            .await;

        let body: Vec<PairOutcomeResponse> = res.take_json().await?;

        let details: Vec<_> = body.iter().map(|outcome| outcome.detail.as_str()).collect();

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(
            details,
            vec!["success", "Code RANDOMCODE is not associated with this Coupon"]
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_revoke_empty_batch_returns_400() -> TestResult {
        let coupon = CouponUuid::new();

        let mut coupons = MockCouponsService::new();

        coupons
            .expect_revoke()
            .once()
            .return_once(|_, _, _| Err(CouponsServiceError::EmptyBatch));

        let res = TestClient::post(format!("http://example.com/coupons/{coupon}/revoke"))
            .json(&json!({ "assignments": [] }))
            .send(&make_service(coupons))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
