//! Tenant scoping of ledger routes.

pub(crate) mod middleware;

/// Trusted gateway header naming the tenant.
pub(crate) const TENANT_HEADER: &str = "x-tenant-uuid";

/// Optional header naming the requesting administrator.
pub(crate) const ACTOR_HEADER: &str = "x-actor";
