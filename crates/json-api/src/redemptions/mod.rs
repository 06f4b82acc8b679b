//! Voucher Redemptions

mod handlers;

pub(crate) use handlers::*;
