//! Coupon Repositories

mod applications;
mod assignments;
mod coupons;
mod vouchers;

use sqlx::{Row, postgres::PgRow};

pub(crate) use applications::PgApplicationsRepository;
pub(crate) use assignments::{NewAssignmentRow, PgAssignmentsRepository};
pub(crate) use coupons::PgCouponsRepository;
pub(crate) use vouchers::PgVouchersRepository;

fn try_get_u32(row: &PgRow, column: &str) -> sqlx::Result<u32> {
    let value: i32 = row.try_get(column)?;

    u32::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

fn try_i32_from_u32(value: u32, column: &'static str) -> sqlx::Result<i32> {
    i32::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}
