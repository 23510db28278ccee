//! Entitlement relay server binary.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use entitlement_relay::adapters::http::{build_app, EntitlementAppState};
use entitlement_relay::adapters::memory::{InMemoryEntitlementStore, InMemoryWebhookEventLog};
use entitlement_relay::adapters::postgres::{
    connect_pool, run_migrations, PostgresEntitlementStore, PostgresWebhookEventLog,
};
use entitlement_relay::adapters::stripe::{StripeConfig, StripePaymentOracle};
use entitlement_relay::application::{CheckoutRedirects, ConnectedStores, StoreReadiness};
use entitlement_relay::config::{AppConfig, DatabaseConfig, ServerConfig};
use entitlement_relay::domain::entitlement::StripeWebhookVerifier;
use entitlement_relay::domain::foundation::DomainError;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    let oracle = StripePaymentOracle::new(
        StripeConfig::new(config.payment.api_key())
            .with_base_url(&config.payment.api_base_url)
            .with_timeout(config.payment.request_timeout()),
    )?;
    let verifier = StripeWebhookVerifier::with_tolerance(
        config.payment.webhook_secret(),
        config.payment.webhook_tolerance(),
    );
    let redirects = CheckoutRedirects {
        success_url: config.payment.success_url.clone(),
        cancel_url: config.payment.cancel_url.clone(),
    };

    let readiness = StoreReadiness::new();
    match config.database.clone() {
        Some(database) => {
            tokio::spawn(connect_store(database, readiness.clone()));
        }
        None => {
            tracing::warn!("No database configured; entitlements are kept in memory");
            readiness.mark_ready(ConnectedStores::new(
                Arc::new(InMemoryEntitlementStore::new()),
                Arc::new(InMemoryWebhookEventLog::new()),
            ));
        }
    }

    let state = EntitlementAppState::new(
        Arc::new(oracle),
        Arc::new(verifier),
        redirects,
        readiness,
    );
    let app = build_app(state, &config.server);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        environment = ?config.server.environment,
        test_mode = config.payment.is_test_mode(),
        "Entitlement relay listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Entitlement relay stopped");
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&server.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if server.is_production() {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Retries until the store is connected and migrated, then opens the gate.
async fn connect_store(database: DatabaseConfig, readiness: StoreReadiness) {
    loop {
        match open_postgres(&database).await {
            Ok(stores) => {
                readiness.mark_ready(stores);
                tracing::info!("Entitlement store ready");
                return;
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    retry_in_secs = database.connect_retry().as_secs(),
                    "Entitlement store not available"
                );
                tokio::time::sleep(database.connect_retry()).await;
            }
        }
    }
}

async fn open_postgres(database: &DatabaseConfig) -> Result<ConnectedStores, DomainError> {
    let pool = connect_pool(database).await?;
    if database.run_migrations {
        run_migrations(&pool).await?;
        tracing::info!("Migrations applied");
    }
    Ok(ConnectedStores::new(
        Arc::new(PostgresEntitlementStore::new(pool.clone())),
        Arc::new(PostgresWebhookEventLog::new(pool)),
    ))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
