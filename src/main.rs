//! Vendor Event Service - Main Application Entry Point
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Open the PostgreSQL pool and run migrations, or fall back to the in-memory store
//! 3. Start the expired-OTP sweeper
//! 4. Build HTTP router with routes and middleware
//! 5. Start server on configured port

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use vendor_event_server::{
    config::Config,
    db, routes,
    services::{notifier::LogNotifier, otp_service},
    state::AppState,
    store::PgStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Reads RUST_LOG (defaults to "info")
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    let state = match config.database_url.as_deref() {
        Some(database_url) => {
            let pool = db::create_pool(database_url).await?;
            tracing::info!("Database pool created");

            db::run_migrations(&pool).await?;
            tracing::info!("Database migrations complete");

            let store = Arc::new(PgStore::new(pool));
            AppState::new(store.clone(), store, Arc::new(LogNotifier), &config)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store (data is lost on restart)");
            AppState::in_memory(&config)
        }
    };

    let _sweeper = otp_service::spawn_expiry_sweeper(
        state.otps.clone(),
        Duration::from_secs(config.otp_sweep_interval_seconds),
    );

    let app = routes::build_router(state);

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
