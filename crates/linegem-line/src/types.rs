// SPDX-FileCopyrightText: 2026 Linegem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Messaging API wire types: the webhook payload and outbound request bodies.

use serde::{Deserialize, Serialize};

use linegem_core::types::{ChatEvent, ChatEventKind, EventSource, MessageId, ReplyToken};

// --- Inbound webhook types ---

/// Body of a webhook delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookBody {
    /// Bot user id the delivery is addressed to.
    #[serde(default)]
    pub destination: Option<String>,
    /// Events in delivery order. Empty for the console's verification ping.
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

/// A single webhook event. Types the bot does not react to deserialize as
/// [`WebhookEvent::Unsupported`] instead of failing the whole delivery.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum WebhookEvent {
    Message {
        #[serde(default)]
        reply_token: Option<String>,
        source: Source,
        message: MessagePayload,
    },
    Follow {
        #[serde(default)]
        reply_token: Option<String>,
        source: Source,
    },
    Join {
        #[serde(default)]
        reply_token: Option<String>,
        source: Source,
    },
    MemberJoined {
        #[serde(default)]
        reply_token: Option<String>,
        source: Source,
    },
    #[serde(other)]
    Unsupported,
}

/// Sender of an event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    /// `user`, `group` or `room`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub room_id: Option<String>,
}

/// Message object of a `message` event.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessagePayload {
    Text { id: String, text: String },
    Image { id: String },
    #[serde(other)]
    Unsupported,
}

impl From<Source> for EventSource {
    fn from(source: Source) -> Self {
        EventSource {
            user_id: source.user_id,
            group_id: source.group_id,
            room_id: source.room_id,
        }
    }
}

impl WebhookEvent {
    /// Converts the wire event into a [`ChatEvent`].
    ///
    /// Returns `None` for event and message types the bot ignores.
    pub fn into_chat_event(self) -> Option<ChatEvent> {
        let (reply_token, source, kind) = match self {
            WebhookEvent::Message {
                reply_token,
                source,
                message,
            } => {
                let kind = match message {
                    MessagePayload::Text { id, text } => ChatEventKind::Text {
                        message_id: MessageId(id),
                        text,
                    },
                    MessagePayload::Image { id } => ChatEventKind::Image {
                        message_id: MessageId(id),
                    },
                    MessagePayload::Unsupported => return None,
                };
                (reply_token, source, kind)
            }
            WebhookEvent::Follow {
                reply_token,
                source,
            } => (reply_token, source, ChatEventKind::Follow),
            WebhookEvent::Join {
                reply_token,
                source,
            } => (reply_token, source, ChatEventKind::Join),
            WebhookEvent::MemberJoined {
                reply_token,
                source,
            } => (reply_token, source, ChatEventKind::MemberJoined),
            WebhookEvent::Unsupported => return None,
        };

        Some(ChatEvent {
            reply_token: reply_token.map(ReplyToken),
            source: source.into(),
            kind,
        })
    }
}

// --- Outbound request types ---

/// A text message object.
#[derive(Debug, Clone, Serialize)]
pub struct TextMessage {
    #[serde(rename = "type")]
    pub message_type: &'static str,
    pub text: String,
}

impl TextMessage {
    pub fn new(text: String) -> Self {
        Self {
            message_type: "text",
            text,
        }
    }
}

/// Body of `POST /v2/bot/message/reply`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyRequest {
    pub reply_token: String,
    pub messages: Vec<TextMessage>,
}

/// Body of `POST /v2/bot/message/push`.
#[derive(Debug, Clone, Serialize)]
pub struct PushRequest {
    pub to: String,
    pub messages: Vec<TextMessage>,
}

/// Body of `POST /v2/bot/chat/loading/start`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadingRequest {
    pub chat_id: String,
    pub loading_seconds: u32,
}

/// Response of `GET /v2/bot/info`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotInfo {
    pub user_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Error body returned by the Messaging API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub message: String,
    #[serde(default)]
    pub details: Vec<ApiErrorDetail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub property: Option<String>,
}
