// SPDX-FileCopyrightText: 2026 Linegem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook HTTP server built on axum.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use linegem_agent::EventRouter;
use linegem_config::model::ServerConfig;
use linegem_core::LinegemError;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Router that handles each delivery's events.
    pub router: Arc<EventRouter>,
    /// Channel secret for signature checks. `None` disables verification.
    pub channel_secret: Option<Arc<str>>,
    /// Process start time for uptime calculation.
    pub start_time: std::time::Instant,
}

impl GatewayState {
    pub fn new(router: Arc<EventRouter>, channel_secret: Option<String>) -> Self {
        Self {
            router,
            channel_secret: channel_secret.map(Arc::from),
            start_time: std::time::Instant::now(),
        }
    }
}

/// Builds the application routes:
/// - POST /webhook
/// - GET /health
pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/webhook", post(handlers::post_webhook))
        .route("/health", get(handlers::get_health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Binds `host:port` and serves until `shutdown` is cancelled.
///
/// In-flight deliveries run to completion before this returns.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), LinegemError> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| LinegemError::Channel {
            message: format!("failed to bind webhook server to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    info!("webhook server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| LinegemError::Channel {
            message: format!("webhook server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    info!("webhook server stopped");
    Ok(())
}
