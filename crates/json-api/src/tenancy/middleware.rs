//! Tenant scope middleware.

use std::sync::Arc;

use salvo::prelude::*;
use tracing::error;
use uuid::Uuid;
use vouchers_app::domain::{
    scope::RequestScope,
    tenants::{TenantsServiceError, records::TenantUuid},
};

use crate::{
    extensions::*,
    state::State,
    tenancy::{ACTOR_HEADER, TENANT_HEADER},
};

#[salvo::handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let Some(tenant_uuid) = extract_tenant_uuid(req) else {
        res.render(StatusError::unauthorized().brief("Missing or invalid x-tenant-uuid header"));

        return;
    };

    let state = match depot.obtain::<Arc<State>>() {
        Ok(state) => state,
        Err(_error) => {
            res.render(StatusError::internal_server_error());

            return;
        }
    };

    match state.app.tenants.get_tenant(tenant_uuid).await {
        Ok(_tenant) => {}
        Err(TenantsServiceError::NotFound) => {
            res.render(StatusError::unauthorized().brief("Unknown tenant"));

            return;
        }
        Err(source) => {
            error!("failed to look up tenant {tenant_uuid}: {source}");

            res.render(StatusError::internal_server_error());

            return;
        }
    }

    let mut scope = RequestScope::new(tenant_uuid);

    if let Some(actor) = extract_actor(req) {
        scope = scope.with_actor(actor);
    }

    depot.insert_scope(scope);

    ctrl.call_next(req, depot, res).await;
}

fn extract_tenant_uuid(req: &Request) -> Option<TenantUuid> {
    let value = req.headers().get(TENANT_HEADER)?.to_str().ok()?;

    Uuid::parse_str(value.trim()).ok().map(TenantUuid::from_uuid)
}

fn extract_actor(req: &Request) -> Option<String> {
    let value = req.headers().get(ACTOR_HEADER)?.to_str().ok()?.trim();

    (!value.is_empty()).then(|| value.to_owned())
}
