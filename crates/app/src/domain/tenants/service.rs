//! Tenants service.

use async_trait::async_trait;
use mockall::automock;
use sqlx::PgPool;
use tracing::info;

use crate::domain::tenants::{
    data::NewTenant,
    errors::TenantsServiceError,
    records::{TenantRecord, TenantUuid},
    repository::PgTenantsRepository,
};

#[derive(Debug, Clone)]
pub struct PgTenantsService {
    repository: PgTenantsRepository,
}

impl PgTenantsService {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: PgTenantsRepository::new(pool),
        }
    }
}

#[async_trait]
impl TenantsService for PgTenantsService {
    #[tracing::instrument(
        name = "tenants.service.create_tenant",
        skip(self, tenant),
        fields(tenant_uuid = %tenant.uuid),
        err
    )]
    async fn create_tenant(&self, tenant: NewTenant) -> Result<TenantRecord, TenantsServiceError> {
        let record = self.repository.create_tenant(tenant).await?;

        info!(tenant_uuid = %record.uuid, "created tenant");

        Ok(record)
    }

    async fn get_tenant(&self, uuid: TenantUuid) -> Result<TenantRecord, TenantsServiceError> {
        self.repository.get_tenant(uuid).await.map_err(Into::into)
    }
}

#[automock]
#[async_trait]
/// Tenant persistence operations.
pub trait TenantsService: Send + Sync {
    /// Creates a new tenant.
    async fn create_tenant(&self, tenant: NewTenant) -> Result<TenantRecord, TenantsServiceError>;

    /// Fetches a live (not soft-deleted) tenant.
    async fn get_tenant(&self, uuid: TenantUuid) -> Result<TenantRecord, TenantsServiceError>;
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use testresult::TestResult;

    use crate::test::TestContext;

    use super::*;

    #[tokio::test]
    async fn create_tenant_returns_correct_uuid_and_name() -> TestResult {
        let ctx = TestContext::new().await;
        let svc = PgTenantsService::new(ctx.db.pool().clone());

        let uuid = TenantUuid::new();
        let before = Timestamp::now();

        let tenant = svc
            .create_tenant(NewTenant {
                uuid,
                name: "Open Learning Partner".to_string(),
            })
            .await?;

        assert_eq!(tenant.uuid, uuid);
        assert_eq!(tenant.name, "Open Learning Partner");
        assert!(tenant.created_at >= before);
        assert!(tenant.deleted_at.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn create_tenant_duplicate_uuid_returns_already_exists() -> TestResult {
        let ctx = TestContext::new().await;
        let svc = PgTenantsService::new(ctx.db.pool().clone());

        let result = svc
            .create_tenant(NewTenant {
                uuid: ctx.tenant_uuid,
                name: "Second".to_string(),
            })
            .await;

        assert!(
            matches!(result, Err(TenantsServiceError::AlreadyExists)),
            "expected AlreadyExists, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn create_tenant_blank_name_is_invalid() -> TestResult {
        let ctx = TestContext::new().await;
        let svc = PgTenantsService::new(ctx.db.pool().clone());

        let result = svc
            .create_tenant(NewTenant {
                uuid: TenantUuid::new(),
                name: "  ".to_string(),
            })
            .await;

        assert!(
            matches!(result, Err(TenantsServiceError::InvalidData)),
            "expected InvalidData, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn get_tenant_returns_existing_tenant() -> TestResult {
        let ctx = TestContext::new().await;
        let svc = PgTenantsService::new(ctx.db.pool().clone());

        let tenant = svc.get_tenant(ctx.tenant_uuid).await?;

        assert_eq!(tenant.uuid, ctx.tenant_uuid);
        assert_eq!(tenant.name, "Test Tenant");

        Ok(())
    }

    #[tokio::test]
    async fn get_tenant_unknown_uuid_returns_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let svc = PgTenantsService::new(ctx.db.pool().clone());

        let result = svc.get_tenant(TenantUuid::new()).await;

        assert!(
            matches!(result, Err(TenantsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }
}
