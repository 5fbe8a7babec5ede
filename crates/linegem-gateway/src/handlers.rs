// SPDX-FileCopyrightText: 2026 Linegem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers.
//!
//! Handles POST /webhook and GET /health.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{Instrument, debug, info, info_span, warn};

use linegem_core::types::ChatEvent;
use linegem_line::signature::{self, SIGNATURE_HEADER};
use linegem_line::types::{WebhookBody, WebhookEvent};

use crate::server::GatewayState;

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    /// Vision prompts currently waiting for an image.
    pub pending_requests: usize,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// POST /webhook
///
/// Verifies the signature when a channel secret is configured, converts the
/// delivery into chat events, and dispatches them in order. Answers `200`
/// once every event has been handled, whatever the individual outcomes.
pub async fn post_webhook(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let delivery_id = uuid::Uuid::new_v4();
    let span = info_span!("delivery", %delivery_id);

    async move {
        if let Some(secret) = state.channel_secret.as_deref() {
            let provided = headers
                .get(SIGNATURE_HEADER)
                .and_then(|v| v.to_str().ok());
            if !signature::verify(secret, &body, provided) {
                warn!(has_header = provided.is_some(), "rejected webhook with bad signature");
                return error_response(StatusCode::UNAUTHORIZED, "invalid signature");
            }
        }

        let payload: WebhookBody = match serde_json::from_slice(&body) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "malformed webhook body");
                return error_response(StatusCode::BAD_REQUEST, "malformed webhook body");
            }
        };

        let received = payload.events.len();
        let events: Vec<ChatEvent> = payload
            .events
            .into_iter()
            .filter_map(WebhookEvent::into_chat_event)
            .collect();
        info!(received, routed = events.len(), "webhook delivery received");

        let outcomes = state.router.dispatch(events).await;
        debug!(?outcomes, "delivery processed");

        StatusCode::OK.into_response()
    }
    .instrument(span)
    .await
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        pending_requests: state.router.correlator().len(),
    })
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}
