//! Voucher Ledger Domain Concerns

pub mod coupons;
pub mod scope;
pub mod tenants;
