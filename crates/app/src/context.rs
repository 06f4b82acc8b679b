//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    database::{self, Db, RoleCheckError},
    domain::{
        coupons::{CouponsService, PgCouponsService},
        tenants::{PgTenantsService, TenantsService},
    },
    notifications::{EmailSubjects, Notifier},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error(transparent)]
    Role(#[from] RoleCheckError),
}

#[derive(Clone)]
pub struct AppContext {
    pub coupons: Arc<dyn CouponsService>,
    pub tenants: Arc<dyn TenantsService>,
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails or the
    /// connected role would bypass row-level security.
    pub async fn from_database_url(
        url: &str,
        notifier: Arc<dyn Notifier>,
        subjects: EmailSubjects,
    ) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        database::ensure_rls_enforced_role(&pool).await?;

        Ok(Self {
            coupons: Arc::new(PgCouponsService::new(
                Db::new(pool.clone()),
                notifier,
                subjects,
            )),
            tenants: Arc::new(PgTenantsService::new(pool)),
        })
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext").finish_non_exhaustive()
    }
}
