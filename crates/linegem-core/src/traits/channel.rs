// SPDX-FileCopyrightText: 2026 Linegem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel adapter trait for the chat platform.

use async_trait::async_trait;

use crate::error::LinegemError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{MessageId, ReplyToken};

/// Outbound side of the chat platform: replies, pushes, media downloads.
#[async_trait]
pub trait ChannelAdapter: PluginAdapter {
    /// Sends a single text reply bound to `reply_token`.
    async fn reply(&self, reply_token: &ReplyToken, text: &str) -> Result<(), LinegemError>;

    /// Sends a text message to `to` without a reply token.
    async fn push(&self, to: &str, text: &str) -> Result<(), LinegemError>;

    /// Downloads the binary content of an uploaded message.
    async fn fetch_content(&self, message_id: &MessageId) -> Result<Vec<u8>, LinegemError>;

    /// Shows a loading indicator in a one-to-one chat for `seconds`.
    async fn start_loading(&self, chat_id: &str, seconds: u32) -> Result<(), LinegemError>;
}
