//! Voucher Handlers

pub(crate) mod redeem;
