// SPDX-FileCopyrightText: 2026 Linegem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook HTTP server for linegem.
//!
//! Accepts chat platform deliveries on `POST /webhook`, hands their events to
//! the [`EventRouter`](linegem_agent::EventRouter), and reports liveness on
//! `GET /health`.

pub mod handlers;
pub mod server;

pub use server::{GatewayState, build_router, start_server};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use linegem_config::model::LinegemConfig;
    use linegem_line::signature;
    use linegem_test_utils::{MockChannel, MockProvider};
    use tower::ServiceExt;

    struct App {
        channel: Arc<MockChannel>,
        provider: Arc<MockProvider>,
        state: GatewayState,
    }

    fn app(secret: Option<&str>) -> App {
        let mut config = LinegemConfig::default();
        config.bot.process_image_messages = true;
        let channel = Arc::new(MockChannel::new());
        let provider = Arc::new(MockProvider::new());
        let router = linegem_agent::build_router(&config, channel.clone(), provider.clone());
        App {
            channel,
            provider,
            state: GatewayState::new(Arc::new(router), secret.map(String::from)),
        }
    }

    fn webhook(body: &str, signature: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/webhook")
            .header("content-type", "application/json");
        if let Some(sig) = signature {
            builder = builder.header("x-line-signature", sig);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    const TEXT_DELIVERY: &str = r#"{
        "destination": "Ubot",
        "events": [{
            "type": "message",
            "replyToken": "rt-1",
            "source": {"type": "user", "userId": "U1"},
            "message": {"type": "text", "id": "m1", "text": "魚酥 hello"}
        }]
    }"#;

    #[tokio::test]
    async fn webhook_dispatches_and_returns_ok() {
        let app = app(None);
        app.provider.add_response("hi there").await;

        let resp = build_router(app.state.clone())
            .oneshot(webhook(TEXT_DELIVERY, None))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(app.channel.replies().await, vec!["hi there".to_string()]);
    }

    #[tokio::test]
    async fn empty_verification_delivery_is_ok() {
        let app = app(None);
        let resp = build_router(app.state.clone())
            .oneshot(webhook(r#"{"destination":"Ubot","events":[]}"#, None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(app.channel.calls().await.is_empty());
    }

    #[tokio::test]
    async fn unsupported_events_are_skipped() {
        let app = app(None);
        let body = r#"{"events":[
            {"type": "unfollow", "source": {"type": "user", "userId": "U1"}},
            {"type": "message", "replyToken": "rt", "source": {"type": "user", "userId": "U1"},
             "message": {"type": "sticker", "id": "s1", "packageId": "1", "stickerId": "2"}}
        ]}"#;
        let resp = build_router(app.state.clone())
            .oneshot(webhook(body, None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(app.channel.calls().await.is_empty());
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let app = app(None);
        let resp = build_router(app.state.clone())
            .oneshot(webhook("{not json", None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn valid_signature_is_accepted() {
        let app = app(Some("secret"));
        let sig = signature::sign("secret", TEXT_DELIVERY.as_bytes());
        let resp = build_router(app.state.clone())
            .oneshot(webhook(TEXT_DELIVERY, Some(&sig)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(app.provider.calls().await.len(), 1);
    }

    #[tokio::test]
    async fn bad_or_missing_signature_is_unauthorized() {
        let app = app(Some("secret"));
        for sig in [None, Some("bm90LWEtc2lnbmF0dXJl")] {
            let resp = build_router(app.state.clone())
                .oneshot(webhook(TEXT_DELIVERY, sig))
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        }
        assert!(app.provider.calls().await.is_empty());
        assert!(app.channel.calls().await.is_empty());
    }

    #[tokio::test]
    async fn health_reports_pending_requests() {
        let app = app(None);
        let trigger = r#"{"events":[{
            "type": "message", "replyToken": "rt",
            "source": {"type": "user", "userId": "U1"},
            "message": {"type": "text", "id": "m1", "text": "我想問 這是什麼"}
        }]}"#;
        build_router(app.state.clone())
            .oneshot(webhook(trigger, None))
            .await
            .unwrap();

        let resp = build_router(app.state.clone())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["pending_requests"], 1);
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }
}
