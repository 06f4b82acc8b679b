//! Voucher Applications Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};
use uuid::Uuid;

use crate::domain::coupons::records::{ApplicationRecord, ApplicationUuid, VoucherUuid};

const GET_APPLICATIONS_SQL: &str = include_str!("../sql/get_applications.sql");
const CREATE_APPLICATION_SQL: &str = include_str!("../sql/create_application.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgApplicationsRepository;

impl PgApplicationsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get_applications(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        vouchers: &[VoucherUuid],
    ) -> Result<Vec<ApplicationRecord>, sqlx::Error> {
        let vouchers: Vec<Uuid> = vouchers.iter().map(|uuid| uuid.into_uuid()).collect();

        query_as::<Postgres, ApplicationRecord>(GET_APPLICATIONS_SQL)
            .bind(vouchers)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn create_application(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        voucher: VoucherUuid,
        email: &str,
        order_number: &str,
    ) -> Result<ApplicationRecord, sqlx::Error> {
        query_as::<Postgres, ApplicationRecord>(CREATE_APPLICATION_SQL)
            .bind(ApplicationUuid::new().into_uuid())
            .bind(voucher.into_uuid())
            .bind(email)
            .bind(order_number)
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for ApplicationRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: ApplicationUuid::from_uuid(row.try_get("uuid")?),
            voucher_uuid: VoucherUuid::from_uuid(row.try_get("voucher_uuid")?),
            user_email: row.try_get("user_email")?,
            order_number: row.try_get("order_number")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
