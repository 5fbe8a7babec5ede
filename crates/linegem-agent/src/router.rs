// SPDX-FileCopyrightText: 2026 Linegem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dispatch of inbound chat events.
//!
//! The [`EventRouter`] handles the events of one delivery strictly in order.
//! Each event is handled in isolation: upstream failures turn into an
//! apology reply, other failures end the event silently, and nothing aborts
//! the events that follow.

use std::sync::Arc;
use std::time::Duration;

use linegem_config::model::{LinegemConfig, MessagesConfig, UnmatchedTextPolicy};
use linegem_core::types::{ChatEvent, ChatEventKind, EventSource, MessageId, ReplyToken};
use linegem_core::{ChannelAdapter, LinegemError, ProviderAdapter};
use tracing::{debug, error, info, warn};

use crate::correlator::Correlator;
use crate::trigger::{Command, TriggerSet};

/// How a single event was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// A completion was produced and replied.
    Answered,
    /// A completion or download failed and the apology was replied.
    Apologized,
    /// A vision prompt was stored and the upload prompt replied.
    AwaitingImage,
    /// An image arrived with no pending prompt.
    OrphanImage,
    /// A trigger with nothing after it. No reply.
    EmptyPrompt,
    /// Unmatched text answered with the usage hint.
    UsageHint,
    /// A lifecycle event answered with the onboarding text.
    Onboarded,
    /// Nothing to do for this event.
    Ignored,
}

/// Router settings derived from [`LinegemConfig`].
#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub triggers: TriggerSet,
    pub pending_ttl: Duration,
    pub process_images: bool,
    pub unmatched_text: UnmatchedTextPolicy,
    /// Loading indicator duration; `0` disables it.
    pub loading_seconds: u32,
    /// Reply texts with placeholders already substituted.
    pub messages: MessagesConfig,
}

impl RouterConfig {
    pub fn from_config(config: &LinegemConfig) -> Self {
        let triggers = TriggerSet::new(
            config.bot.callsign.clone(),
            config.bot.vision_triggers.clone(),
        );
        let messages = render_messages(&config.messages, &triggers);
        Self {
            triggers,
            pending_ttl: Duration::from_secs(config.bot.pending_ttl_secs),
            process_images: config.bot.process_image_messages,
            unmatched_text: config.bot.unmatched_text,
            loading_seconds: config.line.loading_seconds,
            messages,
        }
    }
}

/// Substitutes `{callsign}` and `{vision_trigger}` in every reply text.
pub fn render_messages(messages: &MessagesConfig, triggers: &TriggerSet) -> MessagesConfig {
    let render = |template: &str| {
        template
            .replace("{callsign}", triggers.callsign())
            .replace("{vision_trigger}", triggers.primary_vision_trigger())
    };
    MessagesConfig {
        upload_prompt: render(&messages.upload_prompt),
        orphan_image: render(&messages.orphan_image),
        apology: render(&messages.apology),
        expired: render(&messages.expired),
        usage_hint: render(&messages.usage_hint),
        onboarding: render(&messages.onboarding),
    }
}

/// Routes chat events to the completion provider, the correlator and the
/// reply channel.
pub struct EventRouter {
    channel: Arc<dyn ChannelAdapter>,
    provider: Arc<dyn ProviderAdapter>,
    correlator: Arc<Correlator>,
    config: RouterConfig,
}

impl EventRouter {
    pub fn new(
        channel: Arc<dyn ChannelAdapter>,
        provider: Arc<dyn ProviderAdapter>,
        correlator: Arc<Correlator>,
        config: RouterConfig,
    ) -> Self {
        Self {
            channel,
            provider,
            correlator,
            config,
        }
    }

    pub fn correlator(&self) -> &Arc<Correlator> {
        &self.correlator
    }

    /// Handles the events of one delivery in order.
    pub async fn dispatch(&self, events: Vec<ChatEvent>) -> Vec<EventOutcome> {
        let mut outcomes = Vec::with_capacity(events.len());
        for event in events {
            outcomes.push(self.handle_event(event).await);
        }
        outcomes
    }

    /// Handles one event.
    pub async fn handle_event(&self, event: ChatEvent) -> EventOutcome {
        let ChatEvent {
            reply_token,
            source,
            kind,
        } = event;

        match kind {
            ChatEventKind::Text { message_id, text } => {
                debug!(message_id = %message_id, "text event");
                self.handle_text(reply_token.as_ref(), &source, &text).await
            }
            ChatEventKind::Image { message_id } => {
                self.handle_image(reply_token.as_ref(), &source, &message_id)
                    .await
            }
            lifecycle @ (ChatEventKind::Follow | ChatEventKind::Join | ChatEventKind::MemberJoined) => {
                info!(kind = ?lifecycle, "lifecycle event");
                self.send_reply(reply_token.as_ref(), &self.config.messages.onboarding)
                    .await;
                EventOutcome::Onboarded
            }
        }
    }

    async fn handle_text(
        &self,
        reply_token: Option<&ReplyToken>,
        source: &EventSource,
        text: &str,
    ) -> EventOutcome {
        match self.config.triggers.parse(text) {
            Command::Text("") | Command::Vision("") => {
                debug!("no input after trigger");
                EventOutcome::EmptyPrompt
            }
            Command::Text(prompt) => {
                self.show_loading(source).await;
                match self.provider.complete_text(prompt).await {
                    Ok(answer) => {
                        self.send_reply(reply_token, &answer).await;
                        EventOutcome::Answered
                    }
                    Err(e) => {
                        error!(error = %e, "text completion failed");
                        self.fail(reply_token, &e).await
                    }
                }
            }
            Command::Vision(prompt) => {
                let Some(key) = source.correlation_key() else {
                    warn!("vision trigger from a source without an id");
                    return EventOutcome::Ignored;
                };
                match self
                    .correlator
                    .register(key, prompt, self.config.pending_ttl)
                {
                    Ok(()) => {
                        info!(user_id = key, "awaiting image");
                        self.send_reply(reply_token, &self.config.messages.upload_prompt)
                            .await;
                        EventOutcome::AwaitingImage
                    }
                    Err(LinegemError::InvalidInput(reason)) => {
                        debug!(reason = %reason, "vision prompt rejected");
                        EventOutcome::EmptyPrompt
                    }
                    Err(e) => {
                        error!(error = %e, "failed to register vision prompt");
                        EventOutcome::Ignored
                    }
                }
            }
            Command::Unmatched => match self.config.unmatched_text {
                UnmatchedTextPolicy::Ignore => EventOutcome::Ignored,
                UnmatchedTextPolicy::UsageHint => {
                    self.send_reply(reply_token, &self.config.messages.usage_hint)
                        .await;
                    EventOutcome::UsageHint
                }
            },
        }
    }

    async fn handle_image(
        &self,
        reply_token: Option<&ReplyToken>,
        source: &EventSource,
        message_id: &MessageId,
    ) -> EventOutcome {
        if !self.config.process_images {
            debug!(message_id = %message_id, "image handling disabled");
            return EventOutcome::Ignored;
        }
        let Some(key) = source.correlation_key() else {
            warn!(message_id = %message_id, "image from a source without an id");
            return EventOutcome::Ignored;
        };

        let Some(pending) = self.correlator.take(key) else {
            info!(user_id = key, message_id = %message_id, "orphan image");
            self.send_reply(reply_token, &self.config.messages.orphan_image)
                .await;
            return EventOutcome::OrphanImage;
        };

        self.show_loading(source).await;
        match self.answer_image(&pending.prompt, message_id).await {
            Ok(answer) => {
                self.send_reply(reply_token, &answer).await;
                EventOutcome::Answered
            }
            Err(e) => {
                error!(user_id = key, message_id = %message_id, error = %e, "vision completion failed");
                self.fail(reply_token, &e).await
            }
        }
    }

    async fn answer_image(&self, prompt: &str, message_id: &MessageId) -> Result<String, LinegemError> {
        let image = self.channel.fetch_content(message_id).await?;
        debug!(message_id = %message_id, size = image.len(), "fetched image");
        self.provider.complete_vision(prompt, &image).await
    }

    async fn show_loading(&self, source: &EventSource) {
        if self.config.loading_seconds == 0 || !source.is_direct() {
            return;
        }
        let Some(chat_id) = source.user_id.as_deref() else {
            return;
        };
        if let Err(e) = self
            .channel
            .start_loading(chat_id, self.config.loading_seconds)
            .await
        {
            warn!(error = %e, "failed to start loading indicator");
        }
    }

    /// Upstream failures are apologized for. Anything else ends the event
    /// without a reply.
    async fn fail(&self, reply_token: Option<&ReplyToken>, error: &LinegemError) -> EventOutcome {
        if error.is_upstream() {
            self.send_reply(reply_token, &self.config.messages.apology)
                .await;
            EventOutcome::Apologized
        } else {
            debug!(error = %error, "dropping event without a reply");
            EventOutcome::Ignored
        }
    }

    async fn send_reply(&self, reply_token: Option<&ReplyToken>, text: &str) {
        let Some(token) = reply_token else {
            warn!("event has no reply token, dropping reply");
            return;
        };
        if let Err(e) = self.channel.reply(token, text).await {
            error!(reply_token = %token, error = %e, "failed to send reply");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linegem_test_utils::{ChannelCall, MockChannel, MockProvider, ProviderCall};
    use tracing_test::traced_test;

    struct Fixture {
        channel: Arc<MockChannel>,
        provider: Arc<MockProvider>,
        router: EventRouter,
    }

    fn fixture_with(adjust: impl FnOnce(&mut LinegemConfig)) -> Fixture {
        let mut config = LinegemConfig::default();
        config.bot.process_image_messages = true;
        adjust(&mut config);

        let channel = Arc::new(MockChannel::new());
        let provider = Arc::new(MockProvider::new());
        let router = EventRouter::new(
            channel.clone(),
            provider.clone(),
            Arc::new(Correlator::new()),
            RouterConfig::from_config(&config),
        );
        Fixture {
            channel,
            provider,
            router,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(|_| {})
    }

    fn text(user: &str, token: &str, body: &str) -> ChatEvent {
        ChatEvent {
            reply_token: Some(ReplyToken(token.into())),
            source: EventSource::user(user),
            kind: ChatEventKind::Text {
                message_id: MessageId(format!("t-{token}")),
                text: body.into(),
            },
        }
    }

    fn image(user: &str, token: &str, message_id: &str) -> ChatEvent {
        ChatEvent {
            reply_token: Some(ReplyToken(token.into())),
            source: EventSource::user(user),
            kind: ChatEventKind::Image {
                message_id: MessageId(message_id.into()),
            },
        }
    }

    #[tokio::test]
    async fn callsign_text_is_answered() {
        let f = fixture();
        f.provider.add_response("台北").await;

        let outcome = f
            .router
            .handle_event(text("U1", "rt1", "魚酥 What is the capital of Taiwan?"))
            .await;

        assert_eq!(outcome, EventOutcome::Answered);
        assert_eq!(
            f.provider.calls().await,
            vec![ProviderCall {
                prompt: "What is the capital of Taiwan?".into(),
                image: None
            }]
        );
        assert_eq!(
            f.channel.calls().await,
            vec![
                ChannelCall::Loading {
                    chat_id: "U1".into(),
                    seconds: 10
                },
                ChannelCall::Reply {
                    reply_token: "rt1".into(),
                    text: "台北".into()
                },
            ]
        );
    }

    #[tokio::test]
    async fn bare_callsign_is_dropped_silently() {
        let f = fixture();
        let outcome = f.router.handle_event(text("U1", "rt1", "魚酥  ")).await;
        assert_eq!(outcome, EventOutcome::EmptyPrompt);
        assert!(f.channel.calls().await.is_empty());
        assert!(f.provider.calls().await.is_empty());
    }

    #[tokio::test]
    async fn bare_vision_trigger_registers_nothing() {
        let f = fixture();
        let outcome = f.router.handle_event(text("U1", "rt1", "我想問")).await;
        assert_eq!(outcome, EventOutcome::EmptyPrompt);
        assert!(f.router.correlator().is_empty());
        assert!(f.channel.calls().await.is_empty());
    }

    #[tokio::test]
    #[traced_test]
    async fn provider_failure_replies_apology() {
        let f = fixture();
        f.provider.add_failure("quota exceeded").await;

        let outcome = f.router.handle_event(text("U1", "rt1", "魚酥 hi")).await;

        assert_eq!(outcome, EventOutcome::Apologized);
        assert_eq!(
            f.channel.replies().await,
            vec!["對不起，處理消息時出錯。".to_string()]
        );
        assert!(logs_contain("text completion failed"));
    }

    #[tokio::test]
    async fn non_upstream_failure_ends_event_without_reply() {
        let f = fixture();
        f.provider
            .add_error(LinegemError::InvalidInput("prompt rejected".into()))
            .await;
        f.provider.add_failure("overloaded").await;

        let outcomes = f
            .router
            .dispatch(vec![
                text("U1", "rt1", "魚酥 first"),
                text("U1", "rt2", "魚酥 second"),
            ])
            .await;

        assert_eq!(
            outcomes,
            vec![EventOutcome::Ignored, EventOutcome::Apologized]
        );
        assert_eq!(
            f.channel.replies().await,
            vec!["對不起，處理消息時出錯。".to_string()]
        );
    }

    #[tokio::test]
    async fn vision_flow_answers_with_stored_prompt_and_image() {
        let f = fixture();
        f.channel.add_content("img-1", vec![0x89, b'P', b'N', b'G']).await;
        f.provider.add_response("約 500 大卡").await;

        let outcomes = f
            .router
            .dispatch(vec![
                text("U1", "rt1", "我想問 how many calories"),
                image("U1", "rt2", "img-1"),
            ])
            .await;

        assert_eq!(
            outcomes,
            vec![EventOutcome::AwaitingImage, EventOutcome::Answered]
        );
        assert_eq!(
            f.provider.calls().await,
            vec![ProviderCall {
                prompt: "how many calories".into(),
                image: Some(vec![0x89, b'P', b'N', b'G'])
            }]
        );
        assert_eq!(
            f.channel.replies().await,
            vec!["請您上傳一張圖片給我".to_string(), "約 500 大卡".to_string()]
        );
        assert!(f.router.correlator().is_empty());
    }

    #[tokio::test]
    async fn orphan_image_gets_instruction_without_state_change() {
        let f = fixture();
        let outcome = f.router.handle_event(image("U1", "rt1", "img-1")).await;

        assert_eq!(outcome, EventOutcome::OrphanImage);
        assert_eq!(
            f.channel.replies().await,
            vec!["請先使用「我想問」指令提出問題，再上傳圖片。".to_string()]
        );
        assert!(f.provider.calls().await.is_empty());
        assert!(f.router.correlator().is_empty());
    }

    #[tokio::test]
    async fn failed_download_apologizes_and_clears_request() {
        let f = fixture();
        f.router
            .handle_event(text("U1", "rt1", "我想問 what is this"))
            .await;

        let outcome = f.router.handle_event(image("U1", "rt2", "missing")).await;

        assert_eq!(outcome, EventOutcome::Apologized);
        assert!(f.provider.calls().await.is_empty());
        assert!(!f.router.correlator().contains("U1"));
    }

    #[tokio::test]
    async fn images_ignored_when_disabled() {
        let f = fixture_with(|c| c.bot.process_image_messages = false);
        f.router
            .handle_event(text("U1", "rt1", "我想問 what is this"))
            .await;
        f.channel.clear_calls().await;

        let outcome = f.router.handle_event(image("U1", "rt2", "img")).await;

        assert_eq!(outcome, EventOutcome::Ignored);
        assert!(f.channel.calls().await.is_empty());
        assert!(f.router.correlator().contains("U1"));
    }

    #[tokio::test]
    async fn unmatched_text_follows_policy() {
        let f = fixture();
        assert_eq!(
            f.router.handle_event(text("U1", "rt1", "hello")).await,
            EventOutcome::Ignored
        );
        assert!(f.channel.calls().await.is_empty());

        let f = fixture_with(|c| c.bot.unmatched_text = UnmatchedTextPolicy::UsageHint);
        assert_eq!(
            f.router.handle_event(text("U1", "rt1", "hello")).await,
            EventOutcome::UsageHint
        );
        let replies = f.channel.replies().await;
        assert_eq!(replies.len(), 1);
        assert!(replies[0].contains("魚酥") && replies[0].contains("我想問"));
    }

    #[tokio::test]
    async fn lifecycle_events_reply_onboarding() {
        let f = fixture();
        for kind in [
            ChatEventKind::Follow,
            ChatEventKind::Join,
            ChatEventKind::MemberJoined,
        ] {
            let outcome = f
                .router
                .handle_event(ChatEvent {
                    reply_token: Some(ReplyToken("rt".into())),
                    source: EventSource::group("G1", None),
                    kind,
                })
                .await;
            assert_eq!(outcome, EventOutcome::Onboarded);
        }
        let replies = f.channel.replies().await;
        assert_eq!(replies.len(), 3);
        assert!(replies[0].contains("魚酥 台灣的首都是哪裡？"));
        assert!(!replies[0].contains("{callsign}"));
    }

    #[tokio::test]
    async fn group_chat_skips_loading_indicator() {
        let f = fixture();
        let event = ChatEvent {
            reply_token: Some(ReplyToken("rt".into())),
            source: EventSource::group("G1", Some("U1".into())),
            kind: ChatEventKind::Text {
                message_id: MessageId("m".into()),
                text: "魚酥 hi".into(),
            },
        };
        f.router.handle_event(event).await;
        assert!(
            !f.channel
                .calls()
                .await
                .iter()
                .any(|c| matches!(c, ChannelCall::Loading { .. }))
        );
    }

    #[tokio::test]
    async fn loading_failure_does_not_abort_event() {
        let f = fixture();
        f.channel.set_fail_loading(true);
        f.provider.add_response("ok").await;
        let outcome = f.router.handle_event(text("U1", "rt1", "魚酥 hi")).await;
        assert_eq!(outcome, EventOutcome::Answered);
        assert_eq!(f.channel.replies().await, vec!["ok".to_string()]);
    }

    #[tokio::test]
    async fn failures_do_not_stop_later_events() {
        let f = fixture();
        f.channel.set_fail_replies(true);
        f.provider.add_failure("down").await;
        f.provider.add_response("second").await;

        let outcomes = f
            .router
            .dispatch(vec![
                text("U1", "rt1", "魚酥 first"),
                text("U2", "rt2", "魚酥 second"),
            ])
            .await;

        assert_eq!(
            outcomes,
            vec![EventOutcome::Apologized, EventOutcome::Answered]
        );
        assert_eq!(f.provider.calls().await.len(), 2);
    }

    #[tokio::test]
    async fn group_without_user_correlates_on_group_id() {
        let f = fixture();
        f.channel.add_content("img", vec![1]).await;
        let mut trigger = text("ignored", "rt1", "我想問 q");
        trigger.source = EventSource::group("G1", None);
        let mut upload = image("ignored", "rt2", "img");
        upload.source = EventSource::group("G1", None);

        let outcomes = f.router.dispatch(vec![trigger, upload]).await;
        assert_eq!(
            outcomes,
            vec![EventOutcome::AwaitingImage, EventOutcome::Answered]
        );
    }
}
