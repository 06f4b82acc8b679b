//! Notification messages for ledger operations.

use jiff::Timestamp;
use vouchers::{
    templates::{
        CODE, EXPIRATION_DATE, EmailTemplate, REDEEMED_OFFER_COUNT, REDEMPTIONS_REMAINING,
        TOTAL_OFFER_COUNT, USER_EMAIL, format_expiration,
    },
    voucher::AssignmentCounts,
};

use crate::domain::coupons::records::AssignmentUuid;

use super::Notification;

/// Subjects of the emails sent by the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailSubjects {
    /// Subject of new assignment emails.
    pub assignment: String,

    /// Subject of reminder emails.
    pub reminder: String,

    /// Subject of revocation emails.
    pub revocation: String,
}

impl Default for EmailSubjects {
    fn default() -> Self {
        Self {
            assignment: "New course assignment".to_string(),
            reminder: "Reminder on course assignment".to_string(),
            revocation: "Course assignment revoked".to_string(),
        }
    }
}

/// The learner and code an email is about.
#[derive(Debug, Clone, Copy)]
pub struct OfferDetails<'a> {
    pub email: &'a str,
    pub code: &'a str,
    pub expires_at: Timestamp,
}

/// Email announcing a new assignment.
#[must_use]
pub fn assignment(
    subjects: &EmailSubjects,
    template: &EmailTemplate,
    offer: OfferDetails<'_>,
    redemptions_remaining: u32,
    assignment: Option<AssignmentUuid>,
) -> Notification {
    let body = template.render(&[
        (USER_EMAIL, offer.email.to_string()),
        (CODE, offer.code.to_string()),
        (REDEMPTIONS_REMAINING, redemptions_remaining.to_string()),
        (EXPIRATION_DATE, format_expiration(offer.expires_at)),
    ]);

    Notification {
        recipient: offer.email.to_string(),
        assignment,
        subject: subjects.assignment.clone(),
        body,
    }
}

/// Email reminding a learner of an open assignment.
#[must_use]
pub fn reminder(
    subjects: &EmailSubjects,
    template: &EmailTemplate,
    offer: OfferDetails<'_>,
    counts: AssignmentCounts,
) -> Notification {
    let body = template.render(&[
        (USER_EMAIL, offer.email.to_string()),
        (CODE, offer.code.to_string()),
        (REDEEMED_OFFER_COUNT, counts.redeemed.to_string()),
        (TOTAL_OFFER_COUNT, counts.total.to_string()),
        (EXPIRATION_DATE, format_expiration(offer.expires_at)),
    ]);

    Notification {
        recipient: offer.email.to_string(),
        assignment: None,
        subject: subjects.reminder.clone(),
        body,
    }
}

/// Email telling a learner their assignment was withdrawn.
#[must_use]
pub fn revocation(
    subjects: &EmailSubjects,
    template: &EmailTemplate,
    offer: OfferDetails<'_>,
) -> Notification {
    let body = template.render(&[
        (USER_EMAIL, offer.email.to_string()),
        (CODE, offer.code.to_string()),
    ]);

    Notification {
        recipient: offer.email.to_string(),
        assignment: None,
        subject: subjects.revocation.clone(),
        body,
    }
}
