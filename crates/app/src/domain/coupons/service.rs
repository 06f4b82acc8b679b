//! Coupons Service

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use sqlx::{Postgres, Transaction};
use tracing::{Span, info, warn};
use vouchers::{
    LedgerError,
    assignments::normalize_email,
    filters::{CodeFilter, apply_filter},
    pagination::{Page, PageRequest, paginate},
    planning::plan_assignments,
    redemption::{RedemptionPlan, authorize_redemption},
    reports::CodeReport,
    validity::ValidityWindow,
    voucher::VoucherState,
};

use crate::{
    database::Db,
    domain::{
        coupons::{
            CouponsServiceError,
            codes::{generate_codes, normalize_codes},
            data::{
                AssignedOffer, AssignmentPair, AssignmentRequest, CouponCodes,
                MAX_GENERATED_CODES, NewCoupon, PairOutcome, PairResult, Redemption,
                RedemptionRecord, RemindRequest, RevokeRequest,
            },
            ledger::{LedgerVoucher, assemble},
            records::{AssignmentUuid, CouponRecord, CouponUuid, VoucherRecord, VoucherUuid},
            repositories::{
                NewAssignmentRow, PgApplicationsRepository, PgAssignmentsRepository,
                PgCouponsRepository, PgVouchersRepository,
            },
        },
        scope::RequestScope,
    },
    notifications::{
        EmailSubjects, Notification, NotificationError, Notifier,
        messages::{self, OfferDetails},
    },
};

#[derive(Clone)]
pub struct PgCouponsService {
    db: Db,
    coupons: PgCouponsRepository,
    vouchers: PgVouchersRepository,
    assignments: PgAssignmentsRepository,
    applications: PgApplicationsRepository,
    notifier: Arc<dyn Notifier>,
    subjects: EmailSubjects,
}

impl PgCouponsService {
    #[must_use]
    pub fn new(db: Db, notifier: Arc<dyn Notifier>, subjects: EmailSubjects) -> Self {
        Self {
            db,
            coupons: PgCouponsRepository::new(),
            vouchers: PgVouchersRepository::new(),
            assignments: PgAssignmentsRepository::new(),
            applications: PgApplicationsRepository::new(),
            notifier,
            subjects,
        }
    }

    async fn load_ledger(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: &CouponRecord,
        vouchers: Vec<VoucherRecord>,
    ) -> Result<Vec<LedgerVoucher>, sqlx::Error> {
        let uuids: Vec<VoucherUuid> = vouchers.iter().map(|voucher| voucher.uuid).collect();

        let assignments = self.assignments.get_assignments(tx, &uuids).await?;
        let applications = self.applications.get_applications(tx, &uuids).await?;

        Ok(assemble(coupon, vouchers, assignments, applications))
    }

    async fn classified_codes(
        &self,
        scope: &RequestScope,
        coupon: CouponUuid,
        filter: Option<CodeFilter>,
    ) -> Result<Vec<CodeReport>, CouponsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(scope.tenant).await?;

        let record = self.coupons.get_coupon(&mut tx, coupon).await?;
        let vouchers = self.vouchers.get_coupon_vouchers(&mut tx, coupon).await?;
        let ledger = self.load_ledger(&mut tx, &record, vouchers).await?;

        tx.commit().await?;

        let reports = ledger.iter().map(|voucher| CodeReport::from(&voucher.state));

        Ok(apply_filter(reports, filter, |report, filter| report.passes(filter)))
    }

    /// Lock the coupon's vouchers named by `pairs`. Codes outside the coupon
    /// are simply missing from the result.
    async fn lock_pairs(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: CouponUuid,
        pairs: &[AssignmentPair],
    ) -> Result<(CouponRecord, Vec<LedgerVoucher>), CouponsServiceError> {
        let record = self.coupons.get_coupon(tx, coupon).await?;

        let mut codes: Vec<String> = pairs.iter().map(|pair| pair.code.clone()).collect();
        codes.sort_unstable();
        codes.dedup();

        let vouchers = self
            .vouchers
            .lock_vouchers_by_codes(tx, coupon, &codes)
            .await?;

        let ledger = self.load_ledger(tx, &record, vouchers).await?;

        Ok((record, ledger))
    }

    async fn notify(&self, notification: Notification) -> Result<(), NotificationError> {
        let recipient = notification.recipient.clone();
        let result = self.notifier.send(notification).await;

        if let Err(error) = &result {
            warn!(recipient = %recipient, error = %error, "failed to send notification");
        }

        result
    }
}

impl Debug for PgCouponsService {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("PgCouponsService")
            .field("db", &self.db)
            .field("subjects", &self.subjects)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CouponsService for PgCouponsService {
    #[tracing::instrument(
        name = "coupons.service.create_coupon",
        skip(self, scope, coupon),
        fields(
            tenant_uuid = %scope.tenant,
            actor = %scope.actor_or_anonymous(),
            coupon_uuid = %coupon.uuid,
            usage_type = %coupon.usage_type,
            code_count = tracing::field::Empty
        ),
        err
    )]
    async fn create_coupon(
        &self,
        scope: RequestScope,
        coupon: NewCoupon,
    ) -> Result<CouponRecord, CouponsServiceError> {
        coupon
            .usage_type
            .validate_max_uses(coupon.max_uses)
            .map_err(LedgerError::from)?;

        if !ValidityWindow::new(coupon.start_at, coupon.end_at).is_well_formed() {
            return Err(CouponsServiceError::InvalidWindow);
        }

        let codes = match &coupon.codes {
            CouponCodes::Generate { quantity } => {
                if *quantity == 0 || *quantity > MAX_GENERATED_CODES {
                    return Err(CouponsServiceError::InvalidQuantity {
                        max: MAX_GENERATED_CODES,
                    });
                }

                generate_codes(usize::try_from(*quantity).unwrap_or_default())
            }
            CouponCodes::Explicit(codes) => normalize_codes(codes.clone()),
        };

        let max_codes = usize::try_from(MAX_GENERATED_CODES).unwrap_or(usize::MAX);

        if codes.is_empty() || codes.len() > max_codes {
            return Err(CouponsServiceError::InvalidQuantity {
                max: MAX_GENERATED_CODES,
            });
        }

        Span::current().record("code_count", codes.len());

        let capacity = coupon.usage_type.total_slots(coupon.max_uses);

        let mut tx = self.db.begin_tenant_transaction(scope.tenant).await?;

        self.coupons.create_coupon(&mut tx, &coupon).await?;

        self.vouchers
            .create_vouchers(&mut tx, coupon.uuid, codes, capacity)
            .await?;

        let record = self.coupons.get_coupon(&mut tx, coupon.uuid).await?;

        tx.commit().await?;

        info!(
            coupon_uuid = %record.uuid,
            voucher_count = record.voucher_count,
            "created coupon"
        );

        Ok(record)
    }

    #[tracing::instrument(
        name = "coupons.service.get_coupon",
        skip(self, scope),
        fields(tenant_uuid = %scope.tenant, coupon_uuid = %coupon),
        err
    )]
    async fn get_coupon(
        &self,
        scope: RequestScope,
        coupon: CouponUuid,
    ) -> Result<CouponRecord, CouponsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(scope.tenant).await?;

        let record = self.coupons.get_coupon(&mut tx, coupon).await?;

        tx.commit().await?;

        Ok(record)
    }

    #[tracing::instrument(
        name = "coupons.service.list_codes",
        skip(self, scope),
        fields(tenant_uuid = %scope.tenant, coupon_uuid = %coupon),
        err
    )]
    async fn list_codes(
        &self,
        scope: RequestScope,
        coupon: CouponUuid,
        filter: Option<CodeFilter>,
        page: PageRequest,
    ) -> Result<Page<CodeReport>, CouponsServiceError> {
        let reports = self.classified_codes(&scope, coupon, filter).await?;

        Ok(paginate(reports, page)?)
    }

    #[tracing::instrument(
        name = "coupons.service.export_codes",
        skip(self, scope),
        fields(tenant_uuid = %scope.tenant, coupon_uuid = %coupon),
        err
    )]
    async fn export_codes(
        &self,
        scope: RequestScope,
        coupon: CouponUuid,
        filter: Option<CodeFilter>,
    ) -> Result<Vec<CodeReport>, CouponsServiceError> {
        self.classified_codes(&scope, coupon, filter).await
    }

    #[tracing::instrument(
        name = "coupons.service.assign",
        skip(self, scope, request),
        fields(
            tenant_uuid = %scope.tenant,
            actor = %scope.actor_or_anonymous(),
            coupon_uuid = %coupon,
            email_count = request.emails.len(),
            assignment_count = tracing::field::Empty
        ),
        err
    )]
    async fn assign(
        &self,
        scope: RequestScope,
        coupon: CouponUuid,
        request: AssignmentRequest,
    ) -> Result<Vec<AssignedOffer>, CouponsServiceError> {
        let emails: Vec<String> = request
            .emails
            .iter()
            .map(|email| normalize_email(email))
            .filter(|email| !email.is_empty())
            .collect();

        if emails.is_empty() {
            return Err(CouponsServiceError::EmptyBatch);
        }

        let mut tx = self.db.begin_tenant_transaction(scope.tenant).await?;

        let record = self.coupons.get_coupon(&mut tx, coupon).await?;

        if record.window().has_ended(Timestamp::now()) {
            return Err(LedgerError::Expired.into());
        }

        let mut vouchers = self.vouchers.lock_coupon_vouchers(&mut tx, coupon).await?;

        if let Some(codes) = &request.codes {
            let codes: Vec<&str> = codes.iter().map(|code| code.trim()).collect();

            if let Some(unknown) = codes
                .iter()
                .find(|code| !vouchers.iter().any(|voucher| voucher.code == **code))
            {
                return Err(LedgerError::CodeNotAssociated {
                    code: (*unknown).to_string(),
                }
                .into());
            }

            vouchers.retain(|voucher| codes.contains(&voucher.code.as_str()));
        }

        let ledger = self.load_ledger(&mut tx, &record, vouchers).await?;
        let states: Vec<VoucherState> = ledger.iter().map(|voucher| voucher.state.clone()).collect();

        let plan = plan_assignments(&states, &emails)?;

        let mut rows = Vec::new();
        let mut offers = Vec::with_capacity(plan.len());

        for planned in plan {
            let voucher = ledger
                .get(planned.voucher)
                .ok_or(LedgerError::InsufficientSlots)?;

            let assignments: Vec<AssignmentUuid> =
                (0..planned.slots).map(|_| AssignmentUuid::new()).collect();

            rows.extend(assignments.iter().map(|uuid| NewAssignmentRow {
                uuid: *uuid,
                voucher_uuid: voucher.record.uuid,
                user_email: planned.email.clone(),
            }));

            offers.push((voucher.record.code.clone(), planned.email, assignments));
        }

        let assignment_count = rows.len();

        Span::current().record("assignment_count", assignment_count);

        self.assignments.create_assignments(&mut tx, rows).await?;

        tx.commit().await?;

        info!(coupon_uuid = %coupon, assignment_count, "assigned vouchers");

        let mut results = Vec::with_capacity(offers.len());

        for (code, email, assignments) in offers {
            let offer = OfferDetails {
                email: &email,
                code: &code,
                expires_at: record.end_at,
            };

            let notification = messages::assignment(
                &self.subjects,
                &request.template,
                offer,
                u32::try_from(assignments.len()).unwrap_or(u32::MAX),
                assignments.first().copied(),
            );

            let notification = self.notify(notification).await;

            results.push(AssignedOffer {
                code,
                email,
                assignments,
                notification,
            });
        }

        Ok(results)
    }

    #[tracing::instrument(
        name = "coupons.service.revoke",
        skip(self, scope, request),
        fields(
            tenant_uuid = %scope.tenant,
            actor = %scope.actor_or_anonymous(),
            coupon_uuid = %coupon,
            pair_count = request.assignments.len(),
            revoked_count = tracing::field::Empty
        ),
        err
    )]
    async fn revoke(
        &self,
        scope: RequestScope,
        coupon: CouponUuid,
        request: RevokeRequest,
    ) -> Result<Vec<PairOutcome>, CouponsServiceError> {
        let pairs = normalize_pairs(request.assignments)?;

        let mut tx = self.db.begin_tenant_transaction(scope.tenant).await?;

        let (record, ledger) = self.lock_pairs(&mut tx, coupon, &pairs).await?;

        let checks: Vec<Result<&LedgerVoucher, LedgerError>> =
            pairs.iter().map(|pair| open_pair(&ledger, pair)).collect();

        let mut revoked_count = 0;

        for (pair, check) in pairs.iter().zip(&checks) {
            if let Ok(voucher) = check {
                revoked_count += self
                    .assignments
                    .revoke_assignments(&mut tx, voucher.record.uuid, &pair.email)
                    .await?;
            }
        }

        Span::current().record("revoked_count", revoked_count);

        tx.commit().await?;

        info!(coupon_uuid = %coupon, revoked_count, "revoked assignments");

        let mut outcomes = Vec::with_capacity(pairs.len());

        for (pair, check) in pairs.into_iter().zip(checks) {
            let result = match (check, &request.template) {
                (Err(error), _) => PairResult::Rejected(error),
                (Ok(_), None) => PairResult::Applied(None),
                (Ok(_), Some(template)) => {
                    let offer = OfferDetails {
                        email: &pair.email,
                        code: &pair.code,
                        expires_at: record.end_at,
                    };

                    PairResult::Applied(Some(
                        self.notify(messages::revocation(&self.subjects, template, offer))
                            .await,
                    ))
                }
            };

            outcomes.push(PairOutcome {
                code: pair.code,
                email: pair.email,
                result,
            });
        }

        Ok(outcomes)
    }

    #[tracing::instrument(
        name = "coupons.service.remind",
        skip(self, scope, request),
        fields(
            tenant_uuid = %scope.tenant,
            actor = %scope.actor_or_anonymous(),
            coupon_uuid = %coupon,
            pair_count = request.assignments.len()
        ),
        err
    )]
    async fn remind(
        &self,
        scope: RequestScope,
        coupon: CouponUuid,
        request: RemindRequest,
    ) -> Result<Vec<PairOutcome>, CouponsServiceError> {
        let pairs = normalize_pairs(request.assignments)?;

        let mut tx = self.db.begin_tenant_transaction(scope.tenant).await?;

        let (record, ledger) = self.lock_pairs(&mut tx, coupon, &pairs).await?;

        let reminders: Vec<_> = pairs
            .into_iter()
            .map(|pair| {
                let counts = open_pair(&ledger, &pair)
                    .map(|voucher| voucher.state.assignment_counts(&pair.email));

                (pair, counts)
            })
            .collect();

        tx.commit().await?;

        let mut outcomes = Vec::with_capacity(reminders.len());

        for (pair, counts) in reminders {
            let result = match counts {
                Err(error) => PairResult::Rejected(error),
                Ok(counts) => {
                    let offer = OfferDetails {
                        email: &pair.email,
                        code: &pair.code,
                        expires_at: record.end_at,
                    };

                    PairResult::Applied(Some(
                        self.notify(messages::reminder(
                            &self.subjects,
                            &request.template,
                            offer,
                            counts,
                        ))
                        .await,
                    ))
                }
            };

            outcomes.push(PairOutcome {
                code: pair.code,
                email: pair.email,
                result,
            });
        }

        let reminder_count = outcomes.iter().filter(|outcome| outcome.is_applied()).count();

        info!(coupon_uuid = %coupon, reminder_count, "sent reminders");

        Ok(outcomes)
    }

    #[tracing::instrument(
        name = "coupons.service.redeem",
        skip(self, scope, redemption),
        fields(
            tenant_uuid = %scope.tenant,
            actor = %scope.actor_or_anonymous(),
            code = %redemption.code,
            voucher_uuid = tracing::field::Empty,
            assignment_uuid = tracing::field::Empty
        ),
        err
    )]
    async fn redeem(
        &self,
        scope: RequestScope,
        redemption: Redemption,
    ) -> Result<RedemptionRecord, CouponsServiceError> {
        let email = normalize_email(&redemption.email);
        let order_number = redemption.order_number.trim();

        if email.is_empty() || order_number.is_empty() {
            return Err(CouponsServiceError::MissingRequiredData);
        }

        let mut tx = self.db.begin_tenant_transaction(scope.tenant).await?;

        let voucher = self
            .vouchers
            .lock_voucher_by_code(&mut tx, redemption.code.trim())
            .await?;

        let span = Span::current();

        span.record("voucher_uuid", tracing::field::display(voucher.uuid));

        let coupon = self.coupons.get_coupon(&mut tx, voucher.coupon_uuid).await?;

        let voucher = self
            .load_ledger(&mut tx, &coupon, vec![voucher])
            .await?
            .pop()
            .ok_or(CouponsServiceError::NotFound)?;

        let plan = authorize_redemption(&voucher.state, &email, Timestamp::now())?;

        let application = self
            .applications
            .create_application(&mut tx, voucher.record.uuid, &email, order_number)
            .await?;

        let assignment = match plan {
            RedemptionPlan::Assigned(index) => {
                let assignment = voucher
                    .assignments
                    .get(index)
                    .map(|assignment| assignment.uuid)
                    .ok_or(CouponsServiceError::NotFound)?;

                self.assignments
                    .redeem_assignment(&mut tx, assignment, application.uuid)
                    .await?;

                span.record("assignment_uuid", tracing::field::display(assignment));

                Some(assignment)
            }
            RedemptionPlan::Open => None,
        };

        self.vouchers
            .increment_redemption_count(&mut tx, voucher.record.uuid)
            .await?;

        tx.commit().await?;

        info!(
            voucher_uuid = %voucher.record.uuid,
            application_uuid = %application.uuid,
            "redeemed voucher"
        );

        Ok(RedemptionRecord {
            application,
            assignment,
        })
    }
}

fn find_voucher<'a>(
    ledger: &'a [LedgerVoucher],
    code: &str,
) -> Result<&'a LedgerVoucher, LedgerError> {
    ledger
        .iter()
        .find(|voucher| voucher.record.code == code)
        .ok_or_else(|| LedgerError::CodeNotAssociated {
            code: code.to_string(),
        })
}

/// The voucher of `pair`, when the pair holds an open assignment on it.
fn open_pair<'a>(
    ledger: &'a [LedgerVoucher],
    pair: &AssignmentPair,
) -> Result<&'a LedgerVoucher, LedgerError> {
    let voucher = find_voucher(ledger, &pair.code)?;

    if voucher.state.holds(&pair.email) {
        Ok(voucher)
    } else {
        Err(LedgerError::NoAssignmentExists {
            email: pair.email.clone(),
            code: pair.code.clone(),
        })
    }
}

fn normalize_pairs(pairs: Vec<AssignmentPair>) -> Result<Vec<AssignmentPair>, CouponsServiceError> {
    if pairs.is_empty() {
        return Err(CouponsServiceError::EmptyBatch);
    }

    Ok(pairs
        .into_iter()
        .map(|pair| AssignmentPair {
            code: pair.code.trim().to_string(),
            email: normalize_email(&pair.email),
        })
        .collect())
}

#[automock]
#[async_trait]
/// Voucher ledger operations scoped to one tenant.
pub trait CouponsService: Send + Sync {
    /// Create a coupon and issue its codes.
    async fn create_coupon(
        &self,
        scope: RequestScope,
        coupon: NewCoupon,
    ) -> Result<CouponRecord, CouponsServiceError>;

    /// Fetch a coupon with its voucher count.
    async fn get_coupon(
        &self,
        scope: RequestScope,
        coupon: CouponUuid,
    ) -> Result<CouponRecord, CouponsServiceError>;

    /// Classified codes of a coupon in code order, one page at a time.
    async fn list_codes(
        &self,
        scope: RequestScope,
        coupon: CouponUuid,
        filter: Option<CodeFilter>,
        page: PageRequest,
    ) -> Result<Page<CodeReport>, CouponsServiceError>;

    /// Every classified code of a coupon, for reports.
    async fn export_codes(
        &self,
        scope: RequestScope,
        coupon: CouponUuid,
        filter: Option<CodeFilter>,
    ) -> Result<Vec<CodeReport>, CouponsServiceError>;

    /// Earmark slots for a batch of emails, all or nothing.
    async fn assign(
        &self,
        scope: RequestScope,
        coupon: CouponUuid,
        request: AssignmentRequest,
    ) -> Result<Vec<AssignedOffer>, CouponsServiceError>;

    /// Withdraw open assignments pair by pair. Pairs without an open
    /// assignment on a code of the coupon are reported and left alone.
    async fn revoke(
        &self,
        scope: RequestScope,
        coupon: CouponUuid,
        request: RevokeRequest,
    ) -> Result<Vec<PairOutcome>, CouponsServiceError>;

    /// Re-send assignment emails for open assignments, pair by pair.
    async fn remind(
        &self,
        scope: RequestScope,
        coupon: CouponUuid,
        request: RemindRequest,
    ) -> Result<Vec<PairOutcome>, CouponsServiceError>;

    /// Consume a slot of a voucher for an order.
    async fn redeem(
        &self,
        scope: RequestScope,
        redemption: Redemption,
    ) -> Result<RedemptionRecord, CouponsServiceError>;
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;
    use testresult::TestResult;
    use vouchers::{
        assignments::AssignmentStatus,
        templates::EmailTemplate,
        usage::{MaxUsesError, UsageType},
    };

    use crate::{
        notifications::MockNotifier,
        test::{
            TestContext,
            helpers::{coupon_codes, create_coupon, pair, redeem, scope},
        },
    };

    use super::*;

    fn template() -> EmailTemplate {
        EmailTemplate::new("Use {CODE} before {EXPIRATION_DATE}")
    }

    fn assignment(emails: &[&str]) -> AssignmentRequest {
        AssignmentRequest {
            emails: emails.iter().map(ToString::to_string).collect(),
            codes: None,
            template: template(),
        }
    }

    async fn used_slots(ctx: &TestContext, coupon: CouponUuid) -> TestResult<u32> {
        let reports = ctx.coupons.export_codes(scope(ctx), coupon, None).await?;

        Ok(reports
            .iter()
            .map(|report| report.availability.used())
            .sum())
    }

    #[tokio::test]
    async fn create_coupon_generates_requested_quantity() -> TestResult {
        let ctx = TestContext::new().await;

        let coupon = create_coupon(&ctx, UsageType::MultiUse, Some(3), 5).await?;
        let codes = coupon_codes(&ctx, coupon.uuid).await?;

        assert_eq!(coupon.voucher_count, 5);
        assert_eq!(coupon.usage_type, UsageType::MultiUse);
        assert_eq!(codes.len(), 5);
        assert!(codes.iter().all(|code| code.len() == 16));

        let reports = ctx.coupons.export_codes(scope(&ctx), coupon.uuid, None).await?;

        assert!(reports.iter().all(|report| report.availability.total == 3));

        Ok(())
    }

    #[tokio::test]
    async fn create_coupon_keeps_explicit_codes() -> TestResult {
        let ctx = TestContext::new().await;
        let now = Timestamp::now();

        let coupon = ctx
            .coupons
            .create_coupon(
                scope(&ctx),
                NewCoupon {
                    uuid: CouponUuid::new(),
                    title: "Partner codes".to_string(),
                    usage_type: UsageType::SingleUse,
                    max_uses: None,
                    requires_assignment: false,
                    start_at: now,
                    end_at: now.checked_add(SignedDuration::from_hours(24))?,
                    codes: CouponCodes::Explicit(vec![
                        "PARTNER-B".to_string(),
                        " PARTNER-A ".to_string(),
                    ]),
                },
            )
            .await?;

        assert_eq!(
            coupon_codes(&ctx, coupon.uuid).await?,
            vec!["PARTNER-A".to_string(), "PARTNER-B".to_string()]
        );

        Ok(())
    }

    #[tokio::test]
    async fn create_coupon_rejects_max_uses_on_single_use() -> TestResult {
        let ctx = TestContext::new().await;

        let result = create_coupon(&ctx, UsageType::SingleUse, Some(2), 1).await;

        assert!(
            matches!(
                result,
                Err(CouponsServiceError::Ledger(LedgerError::InvalidMaxUses(_)))
            ),
            "expected InvalidMaxUses, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn create_coupon_requires_max_uses_for_multi_use_per_customer() -> TestResult {
        let ctx = TestContext::new().await;

        let result = create_coupon(&ctx, UsageType::MultiUsePerCustomer, None, 1).await;

        assert!(
            matches!(
                result,
                Err(CouponsServiceError::Ledger(LedgerError::InvalidMaxUses(
                    MaxUsesError::Required
                )))
            ),
            "expected a missing max_uses error, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn create_coupon_rejects_inverted_window() -> TestResult {
        let ctx = TestContext::new().await;
        let now = Timestamp::now();

        let result = ctx
            .coupons
            .create_coupon(
                scope(&ctx),
                NewCoupon {
                    uuid: CouponUuid::new(),
                    title: "Backwards".to_string(),
                    usage_type: UsageType::SingleUse,
                    max_uses: None,
                    requires_assignment: false,
                    start_at: now,
                    end_at: now.checked_sub(SignedDuration::from_hours(1))?,
                    codes: CouponCodes::Generate { quantity: 1 },
                },
            )
            .await;

        assert!(
            matches!(result, Err(CouponsServiceError::InvalidWindow)),
            "expected InvalidWindow, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn coupons_are_invisible_to_other_tenants() -> TestResult {
        let ctx = TestContext::new().await;
        let coupon = create_coupon(&ctx, UsageType::SingleUse, None, 1).await?;

        let other = ctx.create_tenant("Other Partner").await;

        let result = ctx
            .coupons
            .get_coupon(RequestScope::new(other), coupon.uuid)
            .await;

        assert!(
            matches!(result, Err(CouponsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn single_use_assign_remind_revoke_cycle() -> TestResult {
        let ctx = TestContext::new().await;
        let coupon = create_coupon(&ctx, UsageType::SingleUse, None, 3).await?;

        let offers = ctx
            .coupons
            .assign(scope(&ctx), coupon.uuid, assignment(&["Learner@Example.com "]))
            .await?;

        let [offer] = offers.as_slice() else {
            return Err(format!("expected one offer, got {offers:?}").into());
        };

        assert_eq!(offer.email, "learner@example.com");
        assert_eq!(offer.assignments.len(), 1);
        assert!(offer.notification.is_ok());
        assert_eq!(used_slots(&ctx, coupon.uuid).await?, 1);

        let reminders = ctx
            .coupons
            .remind(
                scope(&ctx),
                coupon.uuid,
                RemindRequest {
                    assignments: vec![pair(&offer.code, "learner@example.com")],
                    template: template(),
                },
            )
            .await?;

        assert_eq!(
            reminders.iter().map(PairOutcome::detail).collect::<Vec<_>>(),
            vec!["success".to_string()]
        );

        let unassigned = ctx
            .coupons
            .export_codes(scope(&ctx), coupon.uuid, Some(CodeFilter::Unassigned))
            .await?;

        assert_eq!(unassigned.len(), 2);

        ctx.coupons
            .revoke(
                scope(&ctx),
                coupon.uuid,
                RevokeRequest {
                    assignments: vec![pair(&offer.code, "learner@example.com")],
                    template: None,
                },
            )
            .await?;

        let unassigned = ctx
            .coupons
            .list_codes(
                scope(&ctx),
                coupon.uuid,
                Some(CodeFilter::Unassigned),
                PageRequest::default(),
            )
            .await?;

        assert_eq!(unassigned.count, 3);
        assert!(unassigned.items.iter().any(|report| report.code == offer.code));

        let reassigned = ctx
            .coupons
            .assign(scope(&ctx), coupon.uuid, assignment(&["learner@example.com"]))
            .await?;

        assert_eq!(reassigned.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn multi_use_fully_redeemed_lists_both_codes() -> TestResult {
        let ctx = TestContext::new().await;
        let coupon = create_coupon(&ctx, UsageType::MultiUse, Some(3), 2).await?;

        let reports = ctx.coupons.export_codes(scope(&ctx), coupon.uuid, None).await?;
        let total: u32 = reports.iter().map(|report| report.availability.total).sum();

        assert_eq!(total, 6);

        for code in coupon_codes(&ctx, coupon.uuid).await? {
            for n in 0..3 {
                redeem(&ctx, &code, &format!("learner{n}@example.com")).await?;
            }
        }

        let redeemed = ctx
            .coupons
            .list_codes(
                scope(&ctx),
                coupon.uuid,
                Some(CodeFilter::Redeemed),
                PageRequest::default(),
            )
            .await?;

        assert_eq!(redeemed.count, 2);
        assert!(
            redeemed
                .items
                .iter()
                .all(|report| report.passes(CodeFilter::Redeemed))
        );

        Ok(())
    }

    #[tokio::test]
    async fn assign_fills_each_code_before_the_next() -> TestResult {
        let ctx = TestContext::new().await;
        let coupon = create_coupon(&ctx, UsageType::MultiUse, Some(3), 2).await?;
        let codes = coupon_codes(&ctx, coupon.uuid).await?;

        let offers = ctx
            .coupons
            .assign(
                scope(&ctx),
                coupon.uuid,
                assignment(&["a@x.com", "b@x.com", "c@x.com", "d@x.com"]),
            )
            .await?;

        let [first, second] = codes.as_slice() else {
            return Err(format!("expected two codes, got {codes:?}").into());
        };

        let assigned: Vec<&String> = offers.iter().map(|offer| &offer.code).collect();

        assert_eq!(assigned, vec![first, first, first, second]);

        Ok(())
    }

    #[tokio::test]
    async fn assign_beyond_capacity_changes_nothing() -> TestResult {
        let ctx = TestContext::new().await;
        let coupon = create_coupon(&ctx, UsageType::SingleUse, None, 2).await?;

        let result = ctx
            .coupons
            .assign(
                scope(&ctx),
                coupon.uuid,
                assignment(&["a@x.com", "b@x.com", "c@x.com"]),
            )
            .await;

        assert!(
            matches!(
                result,
                Err(CouponsServiceError::Ledger(LedgerError::InsufficientSlots))
            ),
            "expected InsufficientSlots, got {result:?}"
        );

        assert_eq!(used_slots(&ctx, coupon.uuid).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn assign_rejects_codes_of_other_coupons() -> TestResult {
        let ctx = TestContext::new().await;
        let coupon = create_coupon(&ctx, UsageType::SingleUse, None, 1).await?;

        let mut request = assignment(&["a@x.com"]);
        request.codes = Some(vec!["NOT-A-CODE".to_string()]);

        let result = ctx.coupons.assign(scope(&ctx), coupon.uuid, request).await;

        assert!(
            matches!(
                result,
                Err(CouponsServiceError::Ledger(LedgerError::CodeNotAssociated { ref code }))
                    if code == "NOT-A-CODE"
            ),
            "expected CodeNotAssociated, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn assign_on_expired_coupon_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let now = Timestamp::now();

        let coupon = ctx
            .coupons
            .create_coupon(
                scope(&ctx),
                NewCoupon {
                    uuid: CouponUuid::new(),
                    title: "Last term".to_string(),
                    usage_type: UsageType::SingleUse,
                    max_uses: None,
                    requires_assignment: false,
                    start_at: now.checked_sub(SignedDuration::from_hours(48))?,
                    end_at: now.checked_sub(SignedDuration::from_hours(24))?,
                    codes: CouponCodes::Generate { quantity: 1 },
                },
            )
            .await?;

        let result = ctx
            .coupons
            .assign(scope(&ctx), coupon.uuid, assignment(&["a@x.com"]))
            .await;

        assert!(
            matches!(result, Err(CouponsServiceError::Ledger(LedgerError::Expired))),
            "expected Expired, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn revoke_batch_applies_valid_pairs_and_reports_the_rest() -> TestResult {
        let ctx = TestContext::new().await;
        let coupon = create_coupon(&ctx, UsageType::SingleUse, None, 2).await?;

        let mut notifier = MockNotifier::new();

        notifier
            .expect_send()
            .withf(|notification| notification.subject == "New course assignment")
            .times(1)
            .returning(|_| Ok(()));

        notifier
            .expect_send()
            .withf(|notification| notification.subject == "Course assignment revoked")
            .times(1)
            .returning(|_| Ok(()));

        let service = PgCouponsService::new(
            ctx.app_db.clone(),
            Arc::new(notifier),
            EmailSubjects::default(),
        );

        let offers = service
            .assign(scope(&ctx), coupon.uuid, assignment(&["a@x.com"]))
            .await?;

        let code = offers
            .first()
            .map(|offer| offer.code.clone())
            .ok_or("missing offer")?;

        let outcomes = service
            .revoke(
                scope(&ctx),
                coupon.uuid,
                RevokeRequest {
                    assignments: vec![
                        pair(&code, "a@x.com"),
                        pair("RANDOMCODE", "b@x.com"),
                        pair(&code, "c@x.com"),
                    ],
                    template: Some(template()),
                },
            )
            .await?;

        assert_eq!(
            outcomes.iter().map(PairOutcome::detail).collect::<Vec<_>>(),
            vec![
                "success".to_string(),
                "Code RANDOMCODE is not associated with this Coupon".to_string(),
                format!("No assignments exist for user c@x.com and code {code}"),
            ]
        );

        assert!(
            matches!(
                outcomes.get(1).map(|outcome| &outcome.result),
                Some(PairResult::Rejected(LedgerError::CodeNotAssociated { .. }))
            ),
            "expected CodeNotAssociated, got {outcomes:?}"
        );

        assert_eq!(used_slots(&ctx, coupon.uuid).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn remind_batch_notifies_only_valid_pairs() -> TestResult {
        let ctx = TestContext::new().await;
        let coupon = create_coupon(&ctx, UsageType::SingleUse, None, 2).await?;

        let mut notifier = MockNotifier::new();

        notifier
            .expect_send()
            .withf(|notification| notification.subject == "New course assignment")
            .times(1)
            .returning(|_| Ok(()));

        notifier
            .expect_send()
            .withf(|notification| notification.subject == "Reminder on course assignment")
            .times(1)
            .returning(|_| Ok(()));

        let service = PgCouponsService::new(
            ctx.app_db.clone(),
            Arc::new(notifier),
            EmailSubjects::default(),
        );

        let offers = service
            .assign(scope(&ctx), coupon.uuid, assignment(&["a@x.com"]))
            .await?;

        let code = offers
            .first()
            .map(|offer| offer.code.clone())
            .ok_or("missing offer")?;

        let outcomes = service
            .remind(
                scope(&ctx),
                coupon.uuid,
                RemindRequest {
                    assignments: vec![pair("RANDOMCODE", "a@x.com"), pair(&code, "a@x.com")],
                    template: template(),
                },
            )
            .await?;

        assert_eq!(
            outcomes.iter().map(PairOutcome::detail).collect::<Vec<_>>(),
            vec![
                "Code RANDOMCODE is not associated with this Coupon".to_string(),
                "success".to_string(),
            ]
        );

        assert_eq!(used_slots(&ctx, coupon.uuid).await?, 1);

        Ok(())
    }

    #[tokio::test]
    async fn redeem_without_required_assignment_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let now = Timestamp::now();

        let coupon = ctx
            .coupons
            .create_coupon(
                scope(&ctx),
                NewCoupon {
                    uuid: CouponUuid::new(),
                    title: "Invite only".to_string(),
                    usage_type: UsageType::MultiUse,
                    max_uses: Some(5),
                    requires_assignment: true,
                    start_at: now.checked_sub(SignedDuration::from_hours(1))?,
                    end_at: now.checked_add(SignedDuration::from_hours(24))?,
                    codes: CouponCodes::Generate { quantity: 1 },
                },
            )
            .await?;

        let codes = coupon_codes(&ctx, coupon.uuid).await?;
        let code = codes.first().ok_or("missing code")?;

        let result = redeem(&ctx, code, "stranger@x.com").await;

        assert!(
            matches!(
                result,
                Err(CouponsServiceError::Ledger(LedgerError::AssignmentRequired))
            ),
            "expected AssignmentRequired, got {result:?}"
        );

        ctx.coupons
            .assign(scope(&ctx), coupon.uuid, assignment(&["invited@x.com"]))
            .await?;

        let record = redeem(&ctx, code, "Invited@X.com").await?;

        assert!(record.assignment.is_some());
        assert_eq!(record.application.user_email, "invited@x.com");

        Ok(())
    }

    #[tokio::test]
    async fn redeem_consumes_the_oldest_assignment_per_customer() -> TestResult {
        let ctx = TestContext::new().await;
        let coupon = create_coupon(&ctx, UsageType::MultiUsePerCustomer, Some(2), 1).await?;

        let offers = ctx
            .coupons
            .assign(scope(&ctx), coupon.uuid, assignment(&["a@x.com"]))
            .await?;

        let offer = offers.first().ok_or("missing offer")?;

        assert_eq!(offer.assignments.len(), 2);

        let record = redeem(&ctx, &offer.code, "a@x.com").await?;

        assert_eq!(record.assignment, offer.assignments.first().copied());

        let reports = ctx.coupons.export_codes(scope(&ctx), coupon.uuid, None).await?;
        let report = reports.first().ok_or("missing report")?;

        assert_eq!(report.availability.assigned, 1);
        assert_eq!(report.availability.redeemed, 1);
        assert!(report.passes(CodeFilter::PartiallyRedeemed));
        assert!(report.passes(CodeFilter::Unredeemed));
        assert!(!report.passes(CodeFilter::Redeemed));

        Ok(())
    }

    #[tokio::test]
    async fn repeated_order_number_is_a_duplicate_order() -> TestResult {
        let ctx = TestContext::new().await;
        let coupon = create_coupon(&ctx, UsageType::MultiUse, Some(5), 1).await?;
        let codes = coupon_codes(&ctx, coupon.uuid).await?;
        let code = codes.first().ok_or("missing code")?;

        let redemption = Redemption {
            code: code.clone(),
            email: "a@x.com".to_string(),
            order_number: "EDX-100001".to_string(),
        };

        ctx.coupons.redeem(scope(&ctx), redemption.clone()).await?;

        let result = ctx.coupons.redeem(scope(&ctx), redemption).await;

        assert!(
            matches!(result, Err(CouponsServiceError::DuplicateOrder)),
            "expected DuplicateOrder, got {result:?}"
        );

        let reports = ctx.coupons.export_codes(scope(&ctx), coupon.uuid, None).await?;
        let report = reports.first().ok_or("missing report")?;

        assert_eq!(report.availability.redeemed, 1);

        Ok(())
    }

    #[tokio::test]
    async fn multi_use_per_customer_rejects_a_second_customer() -> TestResult {
        let ctx = TestContext::new().await;
        let coupon = create_coupon(&ctx, UsageType::MultiUsePerCustomer, Some(3), 1).await?;
        let codes = coupon_codes(&ctx, coupon.uuid).await?;
        let code = codes.first().ok_or("missing code")?;

        redeem(&ctx, code, "a@x.com").await?;
        redeem(&ctx, code, "a@x.com").await?;

        let result = redeem(&ctx, code, "b@x.com").await;

        assert!(
            matches!(
                result,
                Err(CouponsServiceError::Ledger(LedgerError::ClaimedByAnotherCustomer))
            ),
            "expected ClaimedByAnotherCustomer, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn once_per_customer_rejects_repeat_redemption() -> TestResult {
        let ctx = TestContext::new().await;
        let coupon = create_coupon(&ctx, UsageType::OncePerCustomer, Some(3), 1).await?;
        let codes = coupon_codes(&ctx, coupon.uuid).await?;
        let code = codes.first().ok_or("missing code")?;

        redeem(&ctx, code, "a@x.com").await?;

        let result = redeem(&ctx, code, "a@x.com").await;

        assert!(
            matches!(
                result,
                Err(CouponsServiceError::Ledger(LedgerError::AlreadyRedeemed))
            ),
            "expected AlreadyRedeemed, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn concurrent_redemptions_of_a_single_slot_admit_one() -> TestResult {
        let ctx = TestContext::new().await;
        let coupon = create_coupon(&ctx, UsageType::SingleUse, None, 1).await?;
        let codes = coupon_codes(&ctx, coupon.uuid).await?;
        let code = codes.first().ok_or("missing code")?;

        let (first, second) = tokio::join!(
            redeem(&ctx, code, "a@x.com"),
            redeem(&ctx, code, "b@x.com")
        );

        let successes = [&first, &second]
            .iter()
            .filter(|result| result.is_ok())
            .count();

        assert_eq!(successes, 1, "got {first:?} and {second:?}");

        let failure = first.err().or(second.err()).ok_or("missing failure")?;

        assert!(failure.is_conflict(), "expected a conflict, got {failure:?}");
        assert_eq!(used_slots(&ctx, coupon.uuid).await?, 1);

        Ok(())
    }

    #[tokio::test]
    async fn failed_notifications_do_not_undo_assignments() -> TestResult {
        let ctx = TestContext::new().await;
        let coupon = create_coupon(&ctx, UsageType::SingleUse, None, 2).await?;

        let mut notifier = MockNotifier::new();

        notifier
            .expect_send()
            .times(2)
            .returning(|_| Err(NotificationError::Rejected { status: 503 }));

        let service = PgCouponsService::new(
            ctx.app_db.clone(),
            Arc::new(notifier),
            EmailSubjects::default(),
        );

        let offers = service
            .assign(scope(&ctx), coupon.uuid, assignment(&["a@x.com", "b@x.com"]))
            .await?;

        assert_eq!(offers.len(), 2);
        assert!(offers.iter().all(|offer| offer.notification.is_err()));
        assert_eq!(used_slots(&ctx, coupon.uuid).await?, 2);

        Ok(())
    }

    #[tokio::test]
    async fn revoke_sends_email_only_with_a_template() -> TestResult {
        let ctx = TestContext::new().await;
        let coupon = create_coupon(&ctx, UsageType::MultiUse, Some(5), 1).await?;

        let mut notifier = MockNotifier::new();

        notifier
            .expect_send()
            .withf(|notification| notification.subject == "Course assignment revoked")
            .times(1)
            .returning(|_| Ok(()));

        notifier
            .expect_send()
            .withf(|notification| notification.subject == "New course assignment")
            .times(2)
            .returning(|_| Ok(()));

        let service = PgCouponsService::new(
            ctx.app_db.clone(),
            Arc::new(notifier),
            EmailSubjects::default(),
        );

        let offers = service
            .assign(scope(&ctx), coupon.uuid, assignment(&["a@x.com", "b@x.com"]))
            .await?;

        let code = offers
            .first()
            .map(|offer| offer.code.clone())
            .ok_or("missing offer")?;

        let silent = service
            .revoke(
                scope(&ctx),
                coupon.uuid,
                RevokeRequest {
                    assignments: vec![pair(&code, "a@x.com")],
                    template: None,
                },
            )
            .await?;

        let notified = service
            .revoke(
                scope(&ctx),
                coupon.uuid,
                RevokeRequest {
                    assignments: vec![pair(&code, "b@x.com")],
                    template: Some(template()),
                },
            )
            .await?;

        assert!(
            silent
                .iter()
                .all(|outcome| matches!(outcome.result, PairResult::Applied(None)))
        );
        assert!(
            notified
                .iter()
                .all(|outcome| matches!(outcome.result, PairResult::Applied(Some(Ok(())))))
        );

        let reports = ctx.coupons.export_codes(scope(&ctx), coupon.uuid, None).await?;

        assert!(
            reports
                .iter()
                .all(|report| report.passes(CodeFilter::Unassigned))
        );

        Ok(())
    }

    #[tokio::test]
    async fn redeemed_assignments_cannot_be_revoked() -> TestResult {
        let ctx = TestContext::new().await;
        let coupon = create_coupon(&ctx, UsageType::SingleUse, None, 1).await?;

        let offers = ctx
            .coupons
            .assign(scope(&ctx), coupon.uuid, assignment(&["a@x.com"]))
            .await?;

        let code = offers
            .first()
            .map(|offer| offer.code.clone())
            .ok_or("missing offer")?;

        redeem(&ctx, &code, "a@x.com").await?;

        let outcomes = ctx
            .coupons
            .revoke(
                scope(&ctx),
                coupon.uuid,
                RevokeRequest {
                    assignments: vec![pair(&code, "a@x.com")],
                    template: None,
                },
            )
            .await?;

        let [outcome] = outcomes.as_slice() else {
            return Err(format!("expected one outcome, got {outcomes:?}").into());
        };

        assert!(
            matches!(
                outcome.result,
                PairResult::Rejected(LedgerError::NoAssignmentExists { .. })
            ),
            "expected NoAssignmentExists, got {outcome:?}"
        );

        let reports = ctx.coupons.export_codes(scope(&ctx), coupon.uuid, None).await?;
        let report = reports.first().ok_or("missing report")?;

        assert!(report.passes(CodeFilter::Redeemed));
        assert!(report.assigned_to.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn list_codes_rejects_pages_past_the_end() -> TestResult {
        let ctx = TestContext::new().await;
        let coupon = create_coupon(&ctx, UsageType::SingleUse, None, 3).await?;

        let page = ctx
            .coupons
            .list_codes(scope(&ctx), coupon.uuid, None, PageRequest::new(Some(2), Some(2), 50, 100))
            .await?;

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.previous_page(), Some(1));
        assert_eq!(page.next_page(), None);

        let result = ctx
            .coupons
            .list_codes(scope(&ctx), coupon.uuid, None, PageRequest::new(Some(3), Some(2), 50, 100))
            .await;

        assert!(
            matches!(result, Err(CouponsServiceError::Ledger(LedgerError::InvalidPage))),
            "expected InvalidPage, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn assignment_rows_keep_their_status() -> TestResult {
        let ctx = TestContext::new().await;
        let coupon = create_coupon(&ctx, UsageType::SingleUse, None, 1).await?;

        let offers = ctx
            .coupons
            .assign(scope(&ctx), coupon.uuid, assignment(&["a@x.com"]))
            .await?;

        let uuid = offers
            .first()
            .and_then(|offer| offer.assignments.first().copied())
            .ok_or("missing assignment")?;

        let status: String = sqlx::query_scalar("SELECT status FROM offer_assignments WHERE uuid = $1")
            .bind(uuid.into_uuid())
            .fetch_one(ctx.db.pool())
            .await?;

        assert_eq!(status, AssignmentStatus::Assigned.as_str());

        Ok(())
    }
}
