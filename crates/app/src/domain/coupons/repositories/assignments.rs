//! Offer Assignments Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;
use vouchers::assignments::AssignmentStatus;

use crate::domain::coupons::records::{
    ApplicationUuid, AssignmentRecord, AssignmentUuid, VoucherUuid,
};

const GET_ASSIGNMENTS_SQL: &str = include_str!("../sql/get_assignments.sql");
const CREATE_ASSIGNMENTS_SQL: &str = include_str!("../sql/create_assignments.sql");
const REVOKE_ASSIGNMENTS_SQL: &str = include_str!("../sql/revoke_assignments.sql");
const REDEEM_ASSIGNMENT_SQL: &str = include_str!("../sql/redeem_assignment.sql");

/// One assignment row to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NewAssignmentRow {
    pub(crate) uuid: AssignmentUuid,
    pub(crate) voucher_uuid: VoucherUuid,
    pub(crate) user_email: String,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgAssignmentsRepository;

impl PgAssignmentsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Assignments of the given vouchers, oldest first.
    pub(crate) async fn get_assignments(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        vouchers: &[VoucherUuid],
    ) -> Result<Vec<AssignmentRecord>, sqlx::Error> {
        let vouchers: Vec<Uuid> = vouchers.iter().map(|uuid| uuid.into_uuid()).collect();

        query_as::<Postgres, AssignmentRecord>(GET_ASSIGNMENTS_SQL)
            .bind(vouchers)
            .fetch_all(&mut **tx)
            .await
    }

    /// Insert rows in the given order, all with status `ASSIGNED`.
    pub(crate) async fn create_assignments(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        rows: Vec<NewAssignmentRow>,
    ) -> Result<(), sqlx::Error> {
        let mut uuids = Vec::with_capacity(rows.len());
        let mut vouchers = Vec::with_capacity(rows.len());
        let mut emails = Vec::with_capacity(rows.len());

        for row in rows {
            uuids.push(row.uuid.into_uuid());
            vouchers.push(row.voucher_uuid.into_uuid());
            emails.push(row.user_email);
        }

        query(CREATE_ASSIGNMENTS_SQL)
            .bind(uuids)
            .bind(vouchers)
            .bind(emails)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Revoke every open assignment of `email` on `voucher`, returning how many changed.
    pub(crate) async fn revoke_assignments(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        voucher: VoucherUuid,
        email: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = query(REVOKE_ASSIGNMENTS_SQL)
            .bind(voucher.into_uuid())
            .bind(email)
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected())
    }

    pub(crate) async fn redeem_assignment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        assignment: AssignmentUuid,
        application: ApplicationUuid,
    ) -> Result<(), sqlx::Error> {
        let result = query(REDEEM_ASSIGNMENT_SQL)
            .bind(assignment.into_uuid())
            .bind(application.into_uuid())
            .execute(&mut **tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        Ok(())
    }
}

impl<'r> FromRow<'r, PgRow> for AssignmentRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let status: String = row.try_get("status")?;
        let status = status
            .parse::<AssignmentStatus>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            uuid: AssignmentUuid::from_uuid(row.try_get("uuid")?),
            voucher_uuid: VoucherUuid::from_uuid(row.try_get("voucher_uuid")?),
            user_email: row.try_get("user_email")?,
            status,
            application_uuid: row
                .try_get::<Option<Uuid>, _>("application_uuid")?
                .map(ApplicationUuid::from_uuid),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
