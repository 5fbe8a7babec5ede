// SPDX-FileCopyrightText: 2026 Linegem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the adapters and the event router.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Single-use token the chat platform hands out for replying to one event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReplyToken(pub String);

impl std::fmt::Display for ReplyToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Platform identifier of a single message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    Provider,
}

/// Where an event came from.
///
/// One-to-one chats carry only a user id. Group and room events carry the
/// group or room id, plus the user id when the platform discloses it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventSource {
    pub user_id: Option<String>,
    pub group_id: Option<String>,
    pub room_id: Option<String>,
}

impl EventSource {
    /// A one-to-one chat source.
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Self::default()
        }
    }

    /// A group chat source with an optional speaking user.
    pub fn group(group_id: impl Into<String>, user_id: Option<String>) -> Self {
        Self {
            user_id,
            group_id: Some(group_id.into()),
            room_id: None,
        }
    }

    /// Key under which a pending vision prompt is stored for this source.
    ///
    /// Falls back to the group or room id when the user id is withheld.
    pub fn correlation_key(&self) -> Option<&str> {
        self.user_id
            .as_deref()
            .or(self.group_id.as_deref())
            .or(self.room_id.as_deref())
    }

    /// Returns `true` for a one-to-one chat with the bot.
    pub fn is_direct(&self) -> bool {
        self.group_id.is_none() && self.room_id.is_none() && self.user_id.is_some()
    }
}

/// The payload of a chat event, reduced to what the bot reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEventKind {
    /// A text message.
    Text { message_id: MessageId, text: String },
    /// An uploaded image; the binary is fetched separately by id.
    Image { message_id: MessageId },
    /// A user added the bot as a friend.
    Follow,
    /// The bot joined a group or room.
    Join,
    /// A user joined a group or room the bot is in.
    MemberJoined,
}

/// A channel-agnostic inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEvent {
    /// Token for replying to this event. Absent for events that cannot be replied to.
    pub reply_token: Option<ReplyToken>,
    pub source: EventSource,
    pub kind: ChatEventKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correlation_key_prefers_user_id() {
        let source = EventSource::group("G1", Some("U1".into()));
        assert_eq!(source.correlation_key(), Some("U1"));
        assert!(!source.is_direct());
    }

    #[test]
    fn correlation_key_falls_back_to_group() {
        let source = EventSource::group("G1", None);
        assert_eq!(source.correlation_key(), Some("G1"));
    }

    #[test]
    fn empty_source_has_no_key() {
        assert_eq!(EventSource::default().correlation_key(), None);
        assert!(!EventSource::default().is_direct());
    }

    #[test]
    fn user_source_is_direct() {
        assert!(EventSource::user("U1").is_direct());
    }
}
