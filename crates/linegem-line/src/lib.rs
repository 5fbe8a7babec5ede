// SPDX-FileCopyrightText: 2026 Linegem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! LINE Messaging API channel adapter for linegem.
//!
//! Implements [`ChannelAdapter`] on top of [`client::LineClient`], and
//! provides the webhook wire types and signature check the gateway uses to
//! accept deliveries.

pub mod client;
pub mod signature;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use linegem_config::model::LineConfig;
use linegem_core::error::LinegemError;
use linegem_core::traits::{ChannelAdapter, PluginAdapter};
use linegem_core::types::{AdapterType, HealthStatus, MessageId, ReplyToken};
use tracing::{debug, info};

use crate::client::LineClient;

/// LINE channel adapter implementing [`ChannelAdapter`].
pub struct LineChannel {
    client: LineClient,
}

impl LineChannel {
    /// Creates a new LINE channel adapter.
    ///
    /// Requires `config.channel_access_token` to be set.
    pub fn new(config: &LineConfig) -> Result<Self, LinegemError> {
        let token = config.channel_access_token.as_deref().ok_or_else(|| {
            LinegemError::Config(
                "line.channel_access_token is required (or set CHANNEL_ACCESS_TOKEN)".into(),
            )
        })?;

        if token.trim().is_empty() {
            return Err(LinegemError::Config(
                "line.channel_access_token cannot be empty".into(),
            ));
        }

        let client = LineClient::new(
            token,
            config.api_base_url.clone(),
            config.data_api_base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )?;

        info!(api = %config.api_base_url, "LINE channel initialized");
        Ok(Self { client })
    }

    /// Returns the underlying HTTP client.
    pub fn client(&self) -> &LineClient {
        &self.client
    }
}

#[async_trait]
impl PluginAdapter for LineChannel {
    fn name(&self) -> &str {
        "line"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, LinegemError> {
        match self.client.get_bot_info().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "LINE messaging API unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), LinegemError> {
        debug!("LINE channel shutting down");
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for LineChannel {
    async fn reply(&self, reply_token: &ReplyToken, text: &str) -> Result<(), LinegemError> {
        self.client.reply_text(&reply_token.0, text).await
    }

    async fn push(&self, to: &str, text: &str) -> Result<(), LinegemError> {
        self.client.push_text(to, text).await
    }

    async fn fetch_content(&self, message_id: &MessageId) -> Result<Vec<u8>, LinegemError> {
        self.client.get_content(&message_id.0).await
    }

    async fn start_loading(&self, chat_id: &str, seconds: u32) -> Result<(), LinegemError> {
        self.client.start_loading(chat_id, seconds).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> LineConfig {
        LineConfig {
            channel_access_token: Some("tok".into()),
            api_base_url: server.uri(),
            data_api_base_url: server.uri(),
            ..LineConfig::default()
        }
    }

    #[test]
    fn missing_token_is_config_error() {
        let err = LineChannel::new(&LineConfig::default()).err().unwrap();
        assert!(matches!(err, LinegemError::Config(_)));
        assert!(err.to_string().contains("channel_access_token"));
    }

    #[test]
    fn blank_token_is_config_error() {
        let config = LineConfig {
            channel_access_token: Some("   ".into()),
            ..LineConfig::default()
        };
        assert!(matches!(
            LineChannel::new(&config),
            Err(LinegemError::Config(_))
        ));
    }

    #[tokio::test]
    async fn adapter_metadata() {
        let server = MockServer::start().await;
        let channel = LineChannel::new(&config_for(&server)).unwrap();
        assert_eq!(channel.name(), "line");
        assert_eq!(channel.adapter_type(), AdapterType::Channel);
    }

    #[tokio::test]
    async fn health_check_reports_unhealthy_on_auth_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/bot/info"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "message": "Authentication failed"
            })))
            .mount(&server)
            .await;

        let channel = LineChannel::new(&config_for(&server)).unwrap();
        let status = channel.health_check().await.unwrap();
        assert!(matches!(status, HealthStatus::Unhealthy(msg) if msg.contains("Authentication failed")));
    }

    #[tokio::test]
    async fn reply_goes_through_trait() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/bot/message/reply"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let channel = LineChannel::new(&config_for(&server)).unwrap();
        channel
            .reply(&ReplyToken("rt".into()), "hello")
            .await
            .unwrap();
    }
}
