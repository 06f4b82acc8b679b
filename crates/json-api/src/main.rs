//! Vouchers JSON API Server

use std::{process, sync::Arc, time::Duration};

use salvo::{affix_state::inject, prelude::*};
use tracing::{error, info};

use vouchers_app::{
    context::AppContext,
    notifications::{HttpNotifier, HttpNotifierConfig, LogNotifier, Notifier},
};

use crate::{
    config::{ServerConfig, notifications::NotificationsConfig},
    observability::Observability,
    state::State,
};

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod config;
mod coupons;
mod extensions;
mod healthcheck;
mod observability;
mod redemptions;
mod router;
mod shutdown;
mod state;
mod tenancy;
#[cfg(test)]
mod test_helpers;

fn build_notifier(config: &NotificationsConfig) -> Arc<dyn Notifier> {
    match &config.notifier_url {
        Some(url) if !url.trim().is_empty() => {
            info!("delivering learner emails through {url}");

            Arc::new(HttpNotifier::new(HttpNotifierConfig {
                url: url.clone(),
                token: config.notifier_token.clone(),
                timeout: Duration::from_secs(config.notifier_timeout_seconds),
            }))
        }
        _ => {
            info!("no notifier endpoint configured; learner emails will only be logged");

            Arc::new(LogNotifier)
        }
    }
}

/// Vouchers JSON API Server entry point
#[tokio::main]
pub async fn main() {
    let config = ServerConfig::load().unwrap_or_else(|e| {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized yet, must use eprintln for config errors"
        )]
        {
            eprintln!("Configuration error: {e}");
        }

        process::exit(1);
    });

    let observability = match Observability::init(&config) {
        Ok(observability) => observability,
        Err(init_error) => {
            #[expect(
                clippy::print_stderr,
                reason = "logging failed to initialize, must use eprintln"
            )]
            {
                eprintln!("Observability error: {init_error}");
            }

            process::exit(1);
        }
    };

    let app = match AppContext::from_database_url(
        &config.database.database_url,
        build_notifier(&config.notifications),
        config.notifications.subjects(),
    )
    .await
    {
        Ok(app) => app,
        Err(init_error) => {
            error!("failed to initialize app context: {init_error}");
            observability.shutdown();

            process::exit(1);
        }
    };

    let addr = config.socket_addr();

    info!("Starting server on {addr}");

    let listener = TcpListener::new(addr).bind().await;

    let router = Router::new()
        .hoop(inject(State::from_app_context(app, config.ledger.clone())))
        .push(router::app_router(config.observability.metrics_enabled));

    let server = Server::new(listener);
    let handle = server.handle();
    let grace = config.server.shutdown_grace();

    tokio::spawn(async move {
        if let Err(error) = shutdown::listen(handle, grace).await {
            error!("failed to listen for shutdown signal: {error}");
        }
    });

    server.serve(router::service(router)).await;

    observability.shutdown();
}
