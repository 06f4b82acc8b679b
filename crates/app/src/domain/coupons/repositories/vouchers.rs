//! Vouchers Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::domain::coupons::records::{CouponUuid, VoucherRecord, VoucherUuid};

use super::{try_get_u32, try_i32_from_u32};

const CREATE_VOUCHERS_SQL: &str = include_str!("../sql/create_vouchers.sql");
const GET_COUPON_VOUCHERS_SQL: &str = include_str!("../sql/get_coupon_vouchers.sql");
const LOCK_COUPON_VOUCHERS_SQL: &str = include_str!("../sql/lock_coupon_vouchers.sql");
const LOCK_VOUCHERS_BY_CODES_SQL: &str = include_str!("../sql/lock_vouchers_by_codes.sql");
const LOCK_VOUCHER_BY_CODE_SQL: &str = include_str!("../sql/lock_voucher_by_code.sql");
const INCREMENT_REDEMPTION_COUNT_SQL: &str =
    include_str!("../sql/increment_redemption_count.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgVouchersRepository;

impl PgVouchersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_vouchers(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: CouponUuid,
        codes: Vec<String>,
        capacity: u32,
    ) -> Result<(), sqlx::Error> {
        let uuids: Vec<Uuid> = codes
            .iter()
            .map(|_| VoucherUuid::new().into_uuid())
            .collect();

        query(CREATE_VOUCHERS_SQL)
            .bind(coupon.into_uuid())
            .bind(uuids)
            .bind(codes)
            .bind(try_i32_from_u32(capacity, "capacity")?)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Vouchers of a coupon in code order, without locking.
    pub(crate) async fn get_coupon_vouchers(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: CouponUuid,
    ) -> Result<Vec<VoucherRecord>, sqlx::Error> {
        query_as::<Postgres, VoucherRecord>(GET_COUPON_VOUCHERS_SQL)
            .bind(coupon.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    /// Vouchers of a coupon in code order, locked until the transaction ends.
    pub(crate) async fn lock_coupon_vouchers(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: CouponUuid,
    ) -> Result<Vec<VoucherRecord>, sqlx::Error> {
        query_as::<Postgres, VoucherRecord>(LOCK_COUPON_VOUCHERS_SQL)
            .bind(coupon.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    /// The named vouchers of a coupon that exist, locked in code order.
    pub(crate) async fn lock_vouchers_by_codes(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: CouponUuid,
        codes: &[String],
    ) -> Result<Vec<VoucherRecord>, sqlx::Error> {
        query_as::<Postgres, VoucherRecord>(LOCK_VOUCHERS_BY_CODES_SQL)
            .bind(coupon.into_uuid())
            .bind(codes)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn lock_voucher_by_code(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
    ) -> Result<VoucherRecord, sqlx::Error> {
        query_as::<Postgres, VoucherRecord>(LOCK_VOUCHER_BY_CODE_SQL)
            .bind(code)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn increment_redemption_count(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        voucher: VoucherUuid,
    ) -> Result<(), sqlx::Error> {
        query(INCREMENT_REDEMPTION_COUNT_SQL)
            .bind(voucher.into_uuid())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}

impl<'r> FromRow<'r, PgRow> for VoucherRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: VoucherUuid::from_uuid(row.try_get("uuid")?),
            coupon_uuid: CouponUuid::from_uuid(row.try_get("coupon_uuid")?),
            code: row.try_get("code")?,
            capacity: try_get_u32(row, "capacity")?,
            redemption_count: try_get_u32(row, "redemption_count")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
