// SPDX-FileCopyrightText: 2026 Linegem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event routing and pending-request correlation for linegem.
//!
//! - [`EventRouter`] dispatches the events of a webhook delivery
//! - [`Correlator`] pairs a vision prompt with the image that follows it
//! - [`NotifyOnExpiry`] tells users when their prompt timed out

pub mod correlator;
pub mod expiry;
pub mod router;
pub mod shutdown;
pub mod trigger;

use std::sync::Arc;

use linegem_config::model::{ExpiryPolicy, LinegemConfig};
use linegem_core::ChannelAdapter;
use linegem_core::ProviderAdapter;
use tracing::info;

pub use correlator::{Correlator, ExpiryListener, PendingRequest};
pub use expiry::NotifyOnExpiry;
pub use router::{EventOutcome, EventRouter, RouterConfig};
pub use trigger::{Command, TriggerSet};

/// Builds the correlator and router for `config` on top of the given adapters.
pub fn build_router(
    config: &LinegemConfig,
    channel: Arc<dyn ChannelAdapter>,
    provider: Arc<dyn ProviderAdapter>,
) -> EventRouter {
    let router_config = RouterConfig::from_config(config);

    let correlator = match config.bot.expiry_policy {
        ExpiryPolicy::Silent => Correlator::new(),
        ExpiryPolicy::Notify => Correlator::with_listener(Arc::new(NotifyOnExpiry::new(
            channel.clone(),
            router_config.messages.expired.clone(),
        ))),
    };

    info!(
        callsign = %config.bot.callsign,
        vision_triggers = ?config.bot.vision_triggers,
        images = config.bot.process_image_messages,
        expiry_policy = %config.bot.expiry_policy,
        "event router initialized"
    );

    EventRouter::new(channel, provider, Arc::new(correlator), router_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use linegem_core::types::{ChatEvent, ChatEventKind, EventSource, MessageId, ReplyToken};
    use linegem_test_utils::{MockChannel, MockProvider};

    #[tokio::test(start_paused = true)]
    async fn notify_policy_pushes_rendered_notice() {
        let mut config = LinegemConfig::default();
        config.bot.expiry_policy = ExpiryPolicy::Notify;
        config.bot.pending_ttl_secs = 5;
        let channel = Arc::new(MockChannel::new());
        let router = build_router(&config, channel.clone(), Arc::new(MockProvider::new()));

        router
            .handle_event(ChatEvent {
                reply_token: Some(ReplyToken("rt".into())),
                source: EventSource::user("U1"),
                kind: ChatEventKind::Text {
                    message_id: MessageId("m".into()),
                    text: "我想問 這是什麼".into(),
                },
            })
            .await;
        tokio::time::sleep(Duration::from_secs(6)).await;

        let pushes = channel.pushes().await;
        assert_eq!(pushes.len(), 1);
        assert_eq!(pushes[0].0, "U1");
        assert!(pushes[0].1.contains("我想問"));
        assert!(!pushes[0].1.contains("{vision_trigger}"));
    }

    #[tokio::test(start_paused = true)]
    async fn silent_policy_pushes_nothing() {
        let mut config = LinegemConfig::default();
        config.bot.pending_ttl_secs = 5;
        let channel = Arc::new(MockChannel::new());
        let router = build_router(&config, channel.clone(), Arc::new(MockProvider::new()));

        router
            .handle_event(ChatEvent {
                reply_token: Some(ReplyToken("rt".into())),
                source: EventSource::user("U1"),
                kind: ChatEventKind::Text {
                    message_id: MessageId("m".into()),
                    text: "我想問 q".into(),
                },
            })
            .await;
        tokio::time::sleep(Duration::from_secs(6)).await;

        assert!(channel.pushes().await.is_empty());
        assert!(router.correlator().is_empty());
    }
}
