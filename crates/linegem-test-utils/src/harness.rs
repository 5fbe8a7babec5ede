// SPDX-FileCopyrightText: 2026 Linegem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end event routing.
//!
//! `TestHarness` wires an [`EventRouter`] to a [`MockChannel`] and a
//! [`MockProvider`], and offers helpers that build chat events the way the
//! webhook layer would.

use std::sync::Arc;

use linegem_agent::{EventOutcome, EventRouter, build_router};
use linegem_config::model::LinegemConfig;
use linegem_core::types::{ChatEvent, ChatEventKind, EventSource, MessageId, ReplyToken};

use crate::mock_channel::MockChannel;
use crate::mock_provider::MockProvider;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    config: LinegemConfig,
    responses: Vec<String>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        let mut config = LinegemConfig::default();
        config.bot.process_image_messages = true;
        Self {
            config,
            responses: Vec::new(),
        }
    }

    /// Set mock provider responses.
    pub fn with_mock_responses(mut self, responses: Vec<String>) -> Self {
        self.responses = responses;
        self
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: LinegemConfig) -> Self {
        self.config = config;
        self
    }

    /// Adjust the configuration in place.
    pub fn configure(mut self, adjust: impl FnOnce(&mut LinegemConfig)) -> Self {
        adjust(&mut self.config);
        self
    }

    /// Build the harness. Must be called inside a tokio runtime.
    pub fn build(self) -> TestHarness {
        let mock_provider = Arc::new(MockProvider::with_responses(self.responses));
        let mock_channel = Arc::new(MockChannel::new());
        let router = Arc::new(build_router(
            &self.config,
            mock_channel.clone(),
            mock_provider.clone(),
        ));

        TestHarness {
            mock_provider,
            mock_channel,
            router,
            config: self.config,
            next_token: std::sync::atomic::AtomicU64::new(1),
        }
    }
}

/// A complete routing stack over mock adapters.
pub struct TestHarness {
    /// The mock completion provider.
    pub mock_provider: Arc<MockProvider>,
    /// The mock chat channel.
    pub mock_channel: Arc<MockChannel>,
    /// The router under test.
    pub router: Arc<EventRouter>,
    /// Configuration the router was built from.
    pub config: LinegemConfig,
    next_token: std::sync::atomic::AtomicU64,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// A text event from a one-to-one chat with a fresh reply token.
    pub fn text_event(&self, user_id: &str, text: &str) -> ChatEvent {
        let token = self.token();
        ChatEvent {
            reply_token: Some(ReplyToken(token.clone())),
            source: EventSource::user(user_id),
            kind: ChatEventKind::Text {
                message_id: MessageId(format!("msg-{token}")),
                text: text.to_string(),
            },
        }
    }

    /// An image event from a one-to-one chat with a fresh reply token.
    pub fn image_event(&self, user_id: &str, message_id: &str) -> ChatEvent {
        ChatEvent {
            reply_token: Some(ReplyToken(self.token())),
            source: EventSource::user(user_id),
            kind: ChatEventKind::Image {
                message_id: MessageId(message_id.to_string()),
            },
        }
    }

    /// Sends one text event and returns its outcome.
    pub async fn send_text(&self, user_id: &str, text: &str) -> EventOutcome {
        self.router.handle_event(self.text_event(user_id, text)).await
    }

    /// Registers `bytes` as the content of `message_id`, sends an image event
    /// for it, and returns the outcome.
    pub async fn send_image(&self, user_id: &str, message_id: &str, bytes: Vec<u8>) -> EventOutcome {
        self.mock_channel.add_content(message_id, bytes).await;
        self.router
            .handle_event(self.image_event(user_id, message_id))
            .await
    }

    /// Reply texts sent so far.
    pub async fn replies(&self) -> Vec<String> {
        self.mock_channel.replies().await
    }

    fn token(&self) -> String {
        let n = self
            .next_token
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        format!("reply-{n}")
    }
}
