//! Database connection management

use sqlx::{PgPool, Postgres, Transaction, query, query_scalar};
use thiserror::Error;

use crate::domain::tenants::records::TenantUuid;

/// SQL used to set tenant context for row-level security.
pub const SET_TENANT_CONTEXT_SQL: &str = "SELECT set_config('app.current_tenant_uuid', $1, true)";

const ROLE_BYPASSES_RLS_SQL: &str =
    "SELECT rolsuper OR rolbypassrls FROM pg_roles WHERE rolname = current_user";

/// Errors raised when checking the connected role.
#[derive(Debug, Error)]
pub enum RoleCheckError {
    #[error("failed to inspect the connected role")]
    Database(#[from] sqlx::Error),

    #[error("connected role bypasses row-level security; connect with the app role instead")]
    BypassesRls,
}

#[derive(Debug, Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Begin a transaction and set tenant context for RLS policies.
    ///
    /// # Errors
    ///
    /// Returns an error when starting the transaction or setting tenant context fails.
    pub async fn begin_tenant_transaction(
        &self,
        tenant: TenantUuid,
    ) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        query(SET_TENANT_CONTEXT_SQL)
            .bind(tenant.into_uuid().to_string())
            .execute(&mut *tx)
            .await?;

        Ok(tx)
    }
}

/// Connect to `PostgreSQL`.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPool::connect(database_url).await
}

/// Refuse to serve tenants through a role that ignores RLS policies.
///
/// # Errors
///
/// Returns [`RoleCheckError::BypassesRls`] for superusers and `BYPASSRLS`
/// roles, or a database error when the check itself fails.
pub async fn ensure_rls_enforced_role(pool: &PgPool) -> Result<(), RoleCheckError> {
    let bypasses: Option<bool> = query_scalar(ROLE_BYPASSES_RLS_SQL)
        .fetch_optional(pool)
        .await?;

    if bypasses.unwrap_or(false) {
        return Err(RoleCheckError::BypassesRls);
    }

    Ok(())
}
