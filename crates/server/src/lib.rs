//! Certificate Server - HTTP surface for the certificate engine
//!
//! Provides REST endpoints for:
//! - Template upload and normalization
//! - Batch certificate generation
//! - Generated document download

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::Config;
pub use error::ApiError;
pub use state::AppState;

/// Build the router with all routes and middleware
pub fn app(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        // Health check
        .route("/health", get(routes::health))
        // Template upload and generation
        .route("/api/upload", post(routes::upload))
        .route("/api/generate", post(routes::generate))
        // Document delivery
        .route("/api/certificates/:filename", get(routes::download))
        // Add middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
