//! Coupons

mod codes;
pub mod data;
mod errors;
mod ledger;
pub mod records;
mod repositories;
pub mod service;

pub use errors::CouponsServiceError;
pub use service::*;
