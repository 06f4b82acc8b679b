//! Postgres-backed voucher ledger: coupons, assignments, redemptions and
//! learner notifications, scoped per tenant with row-level security.

pub mod context;
pub mod database;
pub mod domain;
pub mod notifications;

#[cfg(test)]
mod test;

pub mod uuids;
