//! Depot helper extensions.

use std::any::Any;

use salvo::prelude::{Depot, StatusError};
use vouchers_app::domain::scope::RequestScope;

/// Helpers for mapping depot extraction failures to HTTP errors.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError>;

    fn insert_scope(&mut self, scope: RequestScope);

    /// Scope placed by the tenant middleware, cloned for the service call.
    fn scope_or_401(&self) -> Result<RequestScope, StatusError>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError> {
        self.obtain::<T>()
            .map_err(|_ignored| StatusError::internal_server_error())
    }

    fn insert_scope(&mut self, scope: RequestScope) {
        self.inject(scope);
    }

    fn scope_or_401(&self) -> Result<RequestScope, StatusError> {
        self.obtain::<RequestScope>()
            .cloned()
            .map_err(|_ignored| StatusError::unauthorized().brief("Missing tenant scope"))
    }
}
