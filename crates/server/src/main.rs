//! Certificate Server binary

use anyhow::Result;
use certificate_server::{app, AppState, Config};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(
                    "certificate_server=info,certificate=info,tower_http=info",
                )
            }),
        )
        .init();

    let config = Config::from_env()?;
    let addr = config.bind_addr()?;

    info!("Initializing certificate server...");
    let state = Arc::new(AppState::new(config)?);

    info!("Starting certificate server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}
