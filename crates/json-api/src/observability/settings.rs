//! Process-global observability runtime settings.

use std::sync::{
    OnceLock,
    atomic::{AtomicBool, AtomicU64, Ordering},
};

use salvo::http::HeaderName;

use crate::config::observability::ObservabilityConfig;

use super::ObservabilityError;

const DEFAULT_SLOW_REQUEST_THRESHOLD_MS: u64 = 1_000;
const DEFAULT_REQUEST_ID_HEADER: &str = "x-request-id";

static SLOW_REQUEST_THRESHOLD_MS: AtomicU64 = AtomicU64::new(DEFAULT_SLOW_REQUEST_THRESHOLD_MS);
static OTEL_PARENT_PROPAGATION_ENABLED: AtomicBool = AtomicBool::new(false);
static REQUEST_ID_HEADER: OnceLock<HeaderName> = OnceLock::new();

pub(super) fn apply_runtime_config(config: &ObservabilityConfig) -> Result<(), ObservabilityError> {
    let header = HeaderName::try_from(config.request_id_header.trim())?;

    SLOW_REQUEST_THRESHOLD_MS.store(config.slow_request_threshold_ms, Ordering::Relaxed);
    OTEL_PARENT_PROPAGATION_ENABLED.store(
        config.otel_enabled && config.otel_parent_propagation_enabled,
        Ordering::Relaxed,
    );

    // Only the first configuration wins; the server configures once at startup.
    _ = REQUEST_ID_HEADER.set(header);

    Ok(())
}

pub(super) fn slow_request_threshold_ms() -> u64 {
    SLOW_REQUEST_THRESHOLD_MS.load(Ordering::Relaxed)
}

pub(super) fn otel_parent_propagation_enabled() -> bool {
    OTEL_PARENT_PROPAGATION_ENABLED.load(Ordering::Relaxed)
}

pub(super) fn request_id_header() -> HeaderName {
    REQUEST_ID_HEADER
        .get()
        .cloned()
        .unwrap_or_else(|| HeaderName::from_static(DEFAULT_REQUEST_ID_HEADER))
}
