//! Test context for service-level integration tests.

use std::sync::Arc;

use sqlx::{Connection, PgConnection, PgPool, query};

use crate::{
    database::Db,
    domain::{
        coupons::PgCouponsService,
        tenants::{PgTenantsService, TenantsService, data::NewTenant, records::TenantUuid},
    },
    notifications::{EmailSubjects, LogNotifier},
};

use super::db::TestDb;

/// Non-superuser role the services connect as, so RLS policies apply.
const APP_ROLE: &str = "vouchers_app_test";
const APP_ROLE_PASSWORD: &str = "vouchers_app_test_pass";

pub(crate) struct TestContext {
    /// Superuser database, for setup and direct inspection.
    pub db: TestDb,

    /// Database handle connected as the app role.
    pub app_db: Db,

    pub tenant_uuid: TenantUuid,
    pub coupons: PgCouponsService,
}

impl TestContext {
    pub async fn new() -> Self {
        let db = TestDb::new().await;
        let app_db = Db::new(Self::connect_app_role(&db).await);

        let tenant_uuid = TenantUuid::new();

        PgTenantsService::new(db.pool().clone())
            .create_tenant(NewTenant {
                uuid: tenant_uuid,
                name: "Test Tenant".to_string(),
            })
            .await
            .expect("Failed to create default test tenant");

        Self {
            coupons: PgCouponsService::new(
                app_db.clone(),
                Arc::new(LogNotifier),
                EmailSubjects::default(),
            ),
            app_db,
            tenant_uuid,
            db,
        }
    }

    /// Create another tenant, for isolation tests.
    pub async fn create_tenant(&self, name: &str) -> TenantUuid {
        let uuid = TenantUuid::new();

        PgTenantsService::new(self.db.pool().clone())
            .create_tenant(NewTenant {
                uuid,
                name: name.to_string(),
            })
            .await
            .expect("Failed to create test tenant");

        uuid
    }

    /// Create the app role (once per server) with access to `db`, and connect as it.
    async fn connect_app_role(db: &TestDb) -> PgPool {
        let su_url = &db.superuser_url;
        let server_url = su_url.rsplit_once('/').map_or(su_url.as_str(), |x| x.0);

        let mut server_conn = PgConnection::connect(&format!("{server_url}/postgres"))
            .await
            .expect("Failed to connect to postgres database for role setup");

        // Parallel tests race to create the role; duplicate object (42710) or
        // the catalog's unique violation (23505) mean another test won.
        let created = query(&format!(
            "CREATE ROLE {APP_ROLE} WITH LOGIN PASSWORD '{APP_ROLE_PASSWORD}' \
               NOSUPERUSER NOCREATEDB NOCREATEROLE NOBYPASSRLS"
        ))
        .execute(&mut server_conn)
        .await;

        match created {
            Ok(_) => {}
            Err(sqlx::Error::Database(error))
                if matches!(error.code().as_deref(), Some("42710" | "23505")) => {}
            Err(error) => panic!("Failed to create app role: {error}"),
        }

        query(&format!(
            "GRANT CONNECT ON DATABASE \"{}\" TO {APP_ROLE}",
            db.name
        ))
        .execute(&mut server_conn)
        .await
        .expect("Failed to grant CONNECT on test database");

        server_conn
            .close()
            .await
            .expect("Failed to close server connection");

        for statement in [
            format!("GRANT USAGE ON SCHEMA public TO {APP_ROLE}"),
            format!("GRANT SELECT, INSERT, UPDATE ON ALL TABLES IN SCHEMA public TO {APP_ROLE}"),
        ] {
            query(&statement)
                .execute(db.pool())
                .await
                .expect("Failed to grant table privileges to app role");
        }

        let app_url = su_url.replacen(
            "vouchers_test:vouchers_test_password",
            &format!("{APP_ROLE}:{APP_ROLE_PASSWORD}"),
            1,
        );

        PgPool::connect(&app_url)
            .await
            .expect("Failed to create app pool")
    }
}
