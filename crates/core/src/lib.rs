//! Vouchers
//!
//! Slot bookkeeping for voucher codes: capacity per usage type, assignment
//! planning, redemption checks, code classification and reporting. Nothing in
//! this crate performs I/O; callers load a [`voucher::VoucherState`] under
//! whatever locking they need and apply the decisions made here.

pub mod assignments;
pub mod availability;
pub mod errors;
pub mod filters;
pub mod pagination;
pub mod planning;
pub mod prelude;
pub mod redemption;
pub mod reports;
pub mod templates;
pub mod usage;
pub mod validity;
pub mod voucher;

pub use availability::compute_availability;
pub use errors::LedgerError;
