//! Errors

use salvo::http::StatusError;
use tracing::error;
use vouchers::LedgerError;
use vouchers_app::domain::coupons::CouponsServiceError;

use crate::observability::{LedgerOutcome, observe_ledger_operation};

pub(crate) fn into_status_error(error: CouponsServiceError) -> StatusError {
    match error {
        CouponsServiceError::Ledger(LedgerError::InvalidPage) => {
            StatusError::not_found().brief("Invalid page.")
        }
        error @ (CouponsServiceError::Ledger(LedgerError::Exhausted)
        | CouponsServiceError::Conflict) => StatusError::conflict().brief(error.to_string()),
        CouponsServiceError::Ledger(source) => StatusError::bad_request().brief(source.to_string()),
        CouponsServiceError::AlreadyExists => {
            StatusError::conflict().brief("Coupon or voucher code already exists")
        }
        CouponsServiceError::DuplicateOrder => {
            StatusError::conflict().brief("This order has already redeemed this voucher code")
        }
        CouponsServiceError::NotFound => StatusError::not_found().brief("Coupon or code not found"),
        error @ (CouponsServiceError::InvalidReference
        | CouponsServiceError::MissingRequiredData
        | CouponsServiceError::InvalidData
        | CouponsServiceError::InvalidWindow
        | CouponsServiceError::InvalidQuantity { .. }
        | CouponsServiceError::EmptyBatch) => StatusError::bad_request().brief(error.to_string()),
        CouponsServiceError::Sql(source) => {
            error!("ledger storage failure: {source}");

            StatusError::internal_server_error()
        }
    }
}

/// Count the outcome of a slot-changing `operation`, then map its error.
pub(crate) fn observe<T>(
    operation: &str,
    result: Result<T, CouponsServiceError>,
) -> Result<T, StatusError> {
    let outcome = match &result {
        Ok(_) => LedgerOutcome::Success,
        Err(error) if error.is_conflict() => LedgerOutcome::Conflict,
        Err(CouponsServiceError::Sql(_)) => LedgerOutcome::Failed,
        Err(_) => LedgerOutcome::Rejected,
    };

    observe_ledger_operation(operation, outcome);

    result.map_err(into_status_error)
}
