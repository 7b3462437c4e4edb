//! Axum server setup and router configuration.

use crate::api;
use crate::config::LoadedConfig;
use crate::shutdown::shutdown_signal;
use axum::{Json, Router, response::IntoResponse, routing::get};
use datatrans_sdk::signature::SignatureError;
use serde::Serialize;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Build the main application router.
pub fn build_router(config: &LoadedConfig) -> Result<Router, SignatureError> {
    Ok(Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        .merge(api::router(&config.webhook)?))
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Simple health check - returns OK if the server is running.
async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Run the server with graceful shutdown support.
pub async fn run_server(router: Router, addr: SocketAddr) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}
