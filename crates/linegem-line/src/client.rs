// SPDX-FileCopyrightText: 2026 Linegem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the LINE Messaging API.
//!
//! Provides [`LineClient`] covering the four endpoints the bot uses: reply,
//! push, content download, and the loading indicator. Requests are never
//! retried; a reply token is single-use, so a retried reply would fail anyway.

use std::time::Duration;

use linegem_core::LinegemError;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Serialize;
use tracing::debug;

use crate::types::{
    ApiErrorResponse, BotInfo, LoadingRequest, PushRequest, ReplyRequest, TextMessage,
};

/// Maximum characters in one text message object.
pub const MAX_TEXT_LENGTH: usize = 5000;

/// HTTP client for Messaging API communication.
#[derive(Debug, Clone)]
pub struct LineClient {
    client: reqwest::Client,
    api_base_url: String,
    data_api_base_url: String,
}

impl LineClient {
    /// Creates a client authenticating with the channel access token.
    pub fn new(
        channel_access_token: &str,
        api_base_url: String,
        data_api_base_url: String,
        timeout: Duration,
    ) -> Result<Self, LinegemError> {
        let mut headers = HeaderMap::new();
        let mut bearer = HeaderValue::from_str(&format!("Bearer {channel_access_token}"))
            .map_err(|e| {
                LinegemError::Config(format!("invalid channel access token header value: {e}"))
            })?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| LinegemError::Channel {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            data_api_base_url: data_api_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Sends one text message as the reply to an event.
    pub async fn reply_text(&self, reply_token: &str, text: &str) -> Result<(), LinegemError> {
        let body = ReplyRequest {
            reply_token: reply_token.to_string(),
            messages: vec![TextMessage::new(truncate_text(text))],
        };
        self.post_json("/v2/bot/message/reply", &body).await
    }

    /// Pushes one text message to a user, group, or room.
    pub async fn push_text(&self, to: &str, text: &str) -> Result<(), LinegemError> {
        let body = PushRequest {
            to: to.to_string(),
            messages: vec![TextMessage::new(truncate_text(text))],
        };
        self.post_json("/v2/bot/message/push", &body).await
    }

    /// Starts the loading animation in a one-to-one chat.
    pub async fn start_loading(&self, chat_id: &str, seconds: u32) -> Result<(), LinegemError> {
        let body = LoadingRequest {
            chat_id: chat_id.to_string(),
            loading_seconds: seconds,
        };
        self.post_json("/v2/bot/chat/loading/start", &body).await
    }

    /// Downloads the binary content of a message.
    pub async fn get_content(&self, message_id: &str) -> Result<Vec<u8>, LinegemError> {
        let url = format!(
            "{}/v2/bot/message/{message_id}/content",
            self.data_api_base_url
        );
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LinegemError::Channel {
                message: format!("content request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error("GET /content", status, &body));
        }

        let bytes = response.bytes().await.map_err(|e| LinegemError::Channel {
            message: format!("failed to read content body: {e}"),
            source: Some(Box::new(e)),
        })?;
        debug!(message_id, size = bytes.len(), "downloaded message content");
        Ok(bytes.to_vec())
    }

    /// Fetches the bot's own profile. Used as a cheap credential probe.
    pub async fn get_bot_info(&self) -> Result<BotInfo, LinegemError> {
        let url = format!("{}/v2/bot/info", self.api_base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LinegemError::Channel {
                message: format!("bot info request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error("GET /v2/bot/info", status, &body));
        }

        response.json().await.map_err(|e| LinegemError::Channel {
            message: format!("failed to parse bot info: {e}"),
            source: Some(Box::new(e)),
        })
    }

    async fn post_json<T: Serialize>(&self, path: &str, body: &T) -> Result<(), LinegemError> {
        let url = format!("{}{path}", self.api_base_url);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| LinegemError::Channel {
                message: format!("POST {path} failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(path, status = %status, "messaging API response");
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(api_error(&format!("POST {path}"), status, &body))
    }
}

/// Builds a channel error from a non-success response, preferring the API's own message.
fn api_error(operation: &str, status: reqwest::StatusCode, body: &str) -> LinegemError {
    let message = match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(api_err) => {
            let details: Vec<String> = api_err
                .details
                .iter()
                .filter_map(|d| match (&d.property, &d.message) {
                    (Some(p), Some(m)) => Some(format!("{p}: {m}")),
                    (None, Some(m)) => Some(m.clone()),
                    _ => None,
                })
                .collect();
            if details.is_empty() {
                format!("{operation} returned {status}: {}", api_err.message)
            } else {
                format!(
                    "{operation} returned {status}: {} ({})",
                    api_err.message,
                    details.join("; ")
                )
            }
        }
        Err(_) => format!("{operation} returned {status}: {body}"),
    };
    LinegemError::Channel {
        message,
        source: None,
    }
}

/// Cuts `text` to the per-message character limit.
fn truncate_text(text: &str) -> String {
    match text.char_indices().nth(MAX_TEXT_LENGTH) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
