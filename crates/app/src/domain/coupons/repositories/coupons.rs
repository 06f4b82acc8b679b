//! Coupons Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use vouchers::usage::UsageType;

use crate::domain::coupons::{
    data::NewCoupon,
    records::{CouponRecord, CouponUuid},
};

use super::try_i32_from_u32;

const CREATE_COUPON_SQL: &str = include_str!("../sql/create_coupon.sql");
const GET_COUPON_SQL: &str = include_str!("../sql/get_coupon.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCouponsRepository;

impl PgCouponsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: &NewCoupon,
    ) -> Result<(), sqlx::Error> {
        let max_uses = coupon
            .max_uses
            .map(|value| try_i32_from_u32(value, "max_uses"))
            .transpose()?;

        query(CREATE_COUPON_SQL)
            .bind(coupon.uuid.into_uuid())
            .bind(&coupon.title)
            .bind(coupon.usage_type.as_str())
            .bind(max_uses)
            .bind(coupon.requires_assignment)
            .bind(SqlxTimestamp::from(coupon.start_at))
            .bind(SqlxTimestamp::from(coupon.end_at))
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn get_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        uuid: CouponUuid,
    ) -> Result<CouponRecord, sqlx::Error> {
        query_as::<Postgres, CouponRecord>(GET_COUPON_SQL)
            .bind(uuid.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for CouponRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let usage_type: String = row.try_get("usage_type")?;
        let usage_type =
            usage_type
                .parse::<UsageType>()
                .map_err(|e| sqlx::Error::ColumnDecode {
                    index: "usage_type".to_string(),
                    source: Box::new(e),
                })?;

        let max_uses = row
            .try_get::<Option<i32>, _>("max_uses")?
            .map(u32::try_from)
            .transpose()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "max_uses".to_string(),
                source: Box::new(e),
            })?;

        let voucher_count: i64 = row.try_get("voucher_count")?;
        let voucher_count =
            u32::try_from(voucher_count).map_err(|e| sqlx::Error::ColumnDecode {
                index: "voucher_count".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            uuid: CouponUuid::from_uuid(row.try_get("uuid")?),
            title: row.try_get("title")?,
            usage_type,
            max_uses,
            requires_assignment: row.try_get("requires_assignment")?,
            start_at: row.try_get::<SqlxTimestamp, _>("start_at")?.to_jiff(),
            end_at: row.try_get::<SqlxTimestamp, _>("end_at")?.to_jiff(),
            voucher_count,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
