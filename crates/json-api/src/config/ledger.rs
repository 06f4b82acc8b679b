//! Ledger Config

use clap::Args;
use vouchers::pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Listing and report settings.
#[derive(Debug, Clone, Args)]
pub struct LedgerConfig {
    /// Page learners land on to redeem a code; `?code=` is appended
    #[arg(
        long,
        env = "REDEEM_BASE_URL",
        default_value = "http://localhost:8000/coupons/offer/"
    )]
    pub redeem_base_url: String,

    /// Page size used when a listing does not ask for one
    #[arg(long, env = "DEFAULT_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
    pub default_page_size: u32,

    /// Largest page size a listing may ask for
    #[arg(long, env = "MAX_PAGE_SIZE", default_value_t = MAX_PAGE_SIZE)]
    pub max_page_size: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            redeem_base_url: "http://localhost:8000/coupons/offer/".to_string(),
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}
