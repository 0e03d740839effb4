//! # vin-api — Binary Entry Point
//!
//! Reads configuration from the environment, picks the store backend
//! (Postgres when `DATABASE_URL` is set, in-memory otherwise), builds the
//! decoder client, and serves the Axum router.

use std::sync::Arc;

use vin_api::db::vehicles::PgVehicleStore;
use vin_api::resolver::Resolver;
use vin_api::state::{AppConfig, AppState};
use vin_api::store::{InMemoryVehicleStore, VehicleStore};
use vin_decoder::{DecoderClient, DecoderConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!("Invalid server configuration: {e}");
        e
    })?;

    let store: Arc<dyn VehicleStore> = match vin_api::db::init_pool().await.map_err(|e| {
        tracing::error!("Database initialization failed: {e}");
        e
    })? {
        Some(pool) => Arc::new(PgVehicleStore::new(pool)),
        None => Arc::new(InMemoryVehicleStore::new()),
    };

    let decoder_config = DecoderConfig::from_env().map_err(|e| {
        tracing::error!("Invalid decoder configuration: {e}");
        e
    })?;
    config
        .ensure_covers_decoder(decoder_config.timeout_secs)
        .map_err(|e| {
            tracing::error!("Invalid server configuration: {e}");
            e
        })?;
    tracing::info!(
        profile = %decoder_config.profile,
        base_url = %decoder_config.base_url,
        "Decoder configured"
    );
    let decoder = DecoderClient::new(decoder_config).map_err(|e| {
        tracing::error!("Failed to create decoder client: {e}");
        e
    })?;

    let resolver = Resolver::new(store, Arc::new(decoder));
    let port = config.port;
    let app = vin_api::app(AppState::new(resolver, config));

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("VIN API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
