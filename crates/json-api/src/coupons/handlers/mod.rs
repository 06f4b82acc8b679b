//! Coupon Handlers

pub(crate) mod assign;
pub(crate) mod codes;
pub(crate) mod create;
pub(crate) mod export;
pub(crate) mod get;
pub(crate) mod remind;
pub(crate) mod revoke;
