//! Request and response bodies shared by coupon handlers.

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vouchers::{
    reports::{CodeReport, redeem_url},
    templates::EmailTemplate,
};
use vouchers_app::domain::coupons::{
    data::{AssignmentPair, PairOutcome},
    records::CouponRecord,
};

/// Coupon Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CouponResponse {
    /// The unique identifier of the coupon
    pub uuid: Uuid,

    pub title: String,

    /// `SINGLE_USE`, `MULTI_USE`, `ONCE_PER_CUSTOMER` or `MULTI_USE_PER_CUSTOMER`
    pub usage_type: String,

    /// Slots per code, when set
    pub max_uses: Option<u32>,

    /// Whether codes can only be redeemed through an assignment
    pub requires_assignment: bool,

    /// Start of the validity window
    pub start_at: String,

    /// End of the validity window
    pub end_at: String,

    /// Number of codes issued
    pub voucher_count: u32,

    /// The date and time the coupon was created
    pub created_at: String,

    /// The date and time the coupon was last updated
    pub updated_at: String,
}

impl From<CouponRecord> for CouponResponse {
    fn from(coupon: CouponRecord) -> Self {
        Self {
            uuid: coupon.uuid.into_uuid(),
            title: coupon.title,
            usage_type: coupon.usage_type.as_str().to_string(),
            max_uses: coupon.max_uses,
            requires_assignment: coupon.requires_assignment,
            start_at: coupon.start_at.to_string(),
            end_at: coupon.end_at.to_string(),
            voucher_count: coupon.voucher_count,
            created_at: coupon.created_at.to_string(),
            updated_at: coupon.updated_at.to_string(),
        }
    }
}

/// Slot counters of one code
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RedemptionsResponse {
    /// Capacity of the code
    pub total: u32,

    /// Slots taken by open assignments or redemptions
    pub used: u32,

    /// Slots consumed by redemptions
    pub redeemed: u32,

    /// Slots still free
    pub available: u32,
}

/// Code Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CodeResponse {
    pub code: String,

    /// Emails holding an open assignment
    pub assigned_to: Vec<String>,

    /// Link a learner follows to redeem the code
    pub redeem_url: String,

    /// Filters the code passes: `UNASSIGNED`, `UNREDEEMED`, `PARTIAL_REDEEMED`
    /// or `REDEEMED`
    pub filters: Vec<String>,

    pub redemptions: RedemptionsResponse,
}

impl CodeResponse {
    pub(crate) fn from_report(report: CodeReport, redeem_base_url: &str) -> Self {
        let availability = report.availability;

        Self {
            redeem_url: redeem_url(redeem_base_url, &report.code),
            code: report.code,
            assigned_to: report.assigned_to,
            filters: report
                .filters
                .iter()
                .map(|filter| filter.label().to_string())
                .collect(),
            redemptions: RedemptionsResponse {
                total: availability.total,
                used: availability.used(),
                redeemed: availability.redeemed,
                available: availability.available(),
            },
        }
    }
}

/// A learner email and one of the coupon's codes
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub(crate) struct PairRequest {
    pub email: String,
    pub code: String,
}

impl From<PairRequest> for AssignmentPair {
    fn from(pair: PairRequest) -> Self {
        AssignmentPair {
            code: pair.code,
            email: pair.email,
        }
    }
}

/// Result for one email and code pair
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PairOutcomeResponse {
    pub code: String,
    pub email: String,

    /// `success`, or why the email could not be sent
    pub detail: String,
}

impl From<PairOutcome> for PairOutcomeResponse {
    fn from(outcome: PairOutcome) -> Self {
        Self {
            detail: outcome.detail(),
            code: outcome.code,
            email: outcome.email,
        }
    }
}

/// Build a template from the body and optional surrounding text.
pub(crate) fn email_template(
    body: String,
    greeting: Option<String>,
    closing: Option<String>,
) -> EmailTemplate {
    EmailTemplate {
        body,
        greeting: greeting.filter(|text| !text.trim().is_empty()),
        closing: closing.filter(|text| !text.trim().is_empty()),
    }
}

#[cfg(test)]
mod tests {
    use vouchers::{availability::Availability, filters::CodeFilter};

    use super::*;

    #[test]
    fn code_response_carries_counters_and_link() {
        let report = CodeReport {
            code: "SPRING".to_string(),
            assigned_to: vec!["a@example.com".to_string()],
            availability: Availability {
                total: 3,
                assigned: 1,
                redeemed: 1,
            },
            filters: vec![CodeFilter::Unredeemed, CodeFilter::PartiallyRedeemed],
        };

        let response = CodeResponse::from_report(report, "https://learn.example.com/redeem/");

        assert_eq!(response.redeem_url, "https://learn.example.com/redeem/?code=SPRING");
        assert_eq!(response.filters, vec!["UNREDEEMED", "PARTIAL_REDEEMED"]);
        assert_eq!(response.redemptions.used, 2);
        assert_eq!(response.redemptions.available, 1);
    }

    #[test]
    fn blank_greeting_and_closing_are_dropped() {
        let template = email_template(
            "Your code is {CODE}".to_string(),
            Some("  ".to_string()),
            Some("Thanks".to_string()),
        );

        assert_eq!(template.greeting, None);
        assert_eq!(template.closing.as_deref(), Some("Thanks"));
    }
}
