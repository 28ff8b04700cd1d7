use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use turfbook_api::{
    app,
    state::{AppState, AuthConfig, PaymentSettings},
};
use turfbook_catalog::{SportRegistry, TurfCatalog};
use turfbook_core::ledger::TransactionLedger;
use turfbook_reservation::{SlotCache, SlotStore};
use turfbook_store::{DbClient, PgBookingRepository};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "turfbook_api=debug,tower_http=debug,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = turfbook_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Turfbook API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    let slot_store = SlotStore::with_rules(
        config.business_rules.hold_seconds,
        config.business_rules.slot_retention_days,
    );

    let app_state = AppState {
        sports: Arc::new(Mutex::new(SportRegistry::new())),
        turfs: Arc::new(Mutex::new(TurfCatalog::with_seed_data())),
        slots: SlotCache::new(slot_store),
        bookings: Arc::new(PgBookingRepository::new(db.pool.clone())),
        ledger: Arc::new(Mutex::new(TransactionLedger::new())),
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
        payment: PaymentSettings {
            gateway_key_secret: config.payment.gateway_key_secret.clone(),
            currency: config.payment.currency.clone(),
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app).await.expect("Server error");
}
