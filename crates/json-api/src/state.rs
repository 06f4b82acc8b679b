//! State

use std::sync::Arc;

use vouchers::pagination::PageRequest;
use vouchers_app::context::AppContext;

use crate::config::ledger::LedgerConfig;

#[derive(Clone)]
pub(crate) struct State {
    pub(crate) app: AppContext,
    pub(crate) ledger: LedgerConfig,
}

impl State {
    #[must_use]
    pub(crate) fn new(app: AppContext, ledger: LedgerConfig) -> Self {
        Self { app, ledger }
    }

    #[must_use]
    pub(crate) fn from_app_context(app: AppContext, ledger: LedgerConfig) -> Arc<Self> {
        Arc::new(Self::new(app, ledger))
    }

    /// Page request with the configured default and maximum sizes applied.
    pub(crate) fn page_request(&self, page: Option<u32>, page_size: Option<u32>) -> PageRequest {
        PageRequest::new(
            page,
            page_size,
            self.ledger.default_page_size,
            self.ledger.max_page_size,
        )
    }
}
