// Plan relay server entry point
//
// Usage: cargo run --bin api_server
// Configuration comes from the environment (PORT, FASTAPI_URL,
// ALLOWED_ORIGINS, DATABASE_URL, APP_ENV / NODE_ENV).

use farm_planner::{create_router, AppState, ServerConfig};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "farm_planner=info,tower_http=debug,axum=debug,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting plan relay server...");

    let config = ServerConfig::from_env()?;

    tracing::info!("Configuration:");
    tracing::info!("  PORT: {}", config.port);
    tracing::info!("  FASTAPI_URL: {}", config.backend_url);
    tracing::info!("  ALLOWED_ORIGINS: {}", config.allowed_origins.join(","));
    tracing::info!("  MODE: {:?}", config.mode);

    let port = config.port;
    let state = AppState::new(config).await?;
    tracing::info!("Record store: {}", state.store().backend_name());

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server running on http://localhost:{}", port);

    axum::serve(listener, app).await?;

    Ok(())
}
