//! Request Scope

use crate::domain::tenants::records::TenantUuid;

/// Who is calling and on behalf of which tenant.
///
/// Passed explicitly into every ledger operation; the tenant selects the
/// row-level security context, the actor is only recorded in logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestScope {
    /// Tenant owning the coupons being operated on.
    pub tenant: TenantUuid,

    /// Identifier of the requesting administrator or system, when known.
    pub actor: Option<String>,
}

impl RequestScope {
    #[must_use]
    pub fn new(tenant: TenantUuid) -> Self {
        Self {
            tenant,
            actor: None,
        }
    }

    #[must_use]
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    /// Actor for log fields.
    #[must_use]
    pub fn actor_or_anonymous(&self) -> &str {
        self.actor.as_deref().unwrap_or("anonymous")
    }
}
