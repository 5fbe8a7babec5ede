// SPDX-FileCopyrightText: 2026 Linegem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Expiry notification for the `notify` policy.

use std::sync::Arc;

use async_trait::async_trait;
use linegem_core::ChannelAdapter;
use tracing::{info, warn};

use crate::correlator::{ExpiryListener, PendingRequest};

/// Pushes a fixed message to the user whose pending request expired.
///
/// The reply token of the triggering event is spent by the upload prompt, so
/// the notice goes out as a push message.
pub struct NotifyOnExpiry {
    channel: Arc<dyn ChannelAdapter>,
    message: String,
}

impl NotifyOnExpiry {
    pub fn new(channel: Arc<dyn ChannelAdapter>, message: impl Into<String>) -> Self {
        Self {
            channel,
            message: message.into(),
        }
    }
}

#[async_trait]
impl ExpiryListener for NotifyOnExpiry {
    async fn on_expired(&self, request: PendingRequest) {
        match self.channel.push(&request.user_id, &self.message).await {
            Ok(()) => info!(user_id = %request.user_id, "sent expiry notice"),
            Err(e) => warn!(user_id = %request.user_id, error = %e, "failed to send expiry notice"),
        }
    }
}
