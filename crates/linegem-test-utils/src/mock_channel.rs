// SPDX-FileCopyrightText: 2026 Linegem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock channel adapter for deterministic testing.
//!
//! `MockChannel` implements `ChannelAdapter`, serves registered message
//! content, and captures every outbound call for assertion in tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use linegem_core::LinegemError;
use linegem_core::traits::adapter::PluginAdapter;
use linegem_core::traits::channel::ChannelAdapter;
use linegem_core::types::{AdapterType, HealthStatus, MessageId, ReplyToken};

/// An outbound call captured by [`MockChannel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelCall {
    Reply { reply_token: String, text: String },
    Push { to: String, text: String },
    Loading { chat_id: String, seconds: u32 },
    Fetch { message_id: String },
}

/// A mock chat channel for testing.
///
/// Content downloads succeed only for ids registered with
/// [`add_content`](Self::add_content). Replies and the loading indicator can
/// be switched to fail.
pub struct MockChannel {
    calls: Arc<Mutex<Vec<ChannelCall>>>,
    content: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    fail_replies: AtomicBool,
    fail_loading: AtomicBool,
}

impl MockChannel {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            content: Arc::new(Mutex::new(HashMap::new())),
            fail_replies: AtomicBool::new(false),
            fail_loading: AtomicBool::new(false),
        }
    }

    /// Makes `fetch_content(message_id)` return `bytes`.
    pub async fn add_content(&self, message_id: impl Into<String>, bytes: Vec<u8>) {
        self.content.lock().await.insert(message_id.into(), bytes);
    }

    pub fn set_fail_replies(&self, fail: bool) {
        self.fail_replies.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_loading(&self, fail: bool) {
        self.fail_loading.store(fail, Ordering::SeqCst);
    }

    /// Every outbound call so far, in call order.
    pub async fn calls(&self) -> Vec<ChannelCall> {
        self.calls.lock().await.clone()
    }

    /// Reply texts sent so far, in order.
    pub async fn replies(&self) -> Vec<String> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|c| match c {
                ChannelCall::Reply { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Push messages sent so far as `(to, text)` pairs.
    pub async fn pushes(&self) -> Vec<(String, String)> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|c| match c {
                ChannelCall::Push { to, text } => Some((to.clone(), text.clone())),
                _ => None,
            })
            .collect()
    }

    pub async fn clear_calls(&self) {
        self.calls.lock().await.clear();
    }

    async fn record(&self, call: ChannelCall) {
        self.calls.lock().await.push(call);
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockChannel {
    fn name(&self) -> &str {
        "mock-channel"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, LinegemError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), LinegemError> {
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for MockChannel {
    async fn reply(&self, reply_token: &ReplyToken, text: &str) -> Result<(), LinegemError> {
        self.record(ChannelCall::Reply {
            reply_token: reply_token.0.clone(),
            text: text.to_string(),
        })
        .await;
        if self.fail_replies.load(Ordering::SeqCst) {
            return Err(LinegemError::Channel {
                message: "mock reply failure".into(),
                source: None,
            });
        }
        Ok(())
    }

    async fn push(&self, to: &str, text: &str) -> Result<(), LinegemError> {
        self.record(ChannelCall::Push {
            to: to.to_string(),
            text: text.to_string(),
        })
        .await;
        Ok(())
    }

    async fn fetch_content(&self, message_id: &MessageId) -> Result<Vec<u8>, LinegemError> {
        self.record(ChannelCall::Fetch {
            message_id: message_id.0.clone(),
        })
        .await;
        self.content
            .lock()
            .await
            .get(&message_id.0)
            .cloned()
            .ok_or_else(|| LinegemError::Channel {
                message: format!("no content for message {message_id}"),
                source: None,
            })
    }

    async fn start_loading(&self, chat_id: &str, seconds: u32) -> Result<(), LinegemError> {
        self.record(ChannelCall::Loading {
            chat_id: chat_id.to_string(),
            seconds,
        })
        .await;
        if self.fail_loading.load(Ordering::SeqCst) {
            return Err(LinegemError::Channel {
                message: "mock loading failure".into(),
                source: None,
            });
        }
        Ok(())
    }
}
