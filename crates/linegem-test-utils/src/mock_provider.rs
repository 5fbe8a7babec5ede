// SPDX-FileCopyrightText: 2026 Linegem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock completion provider for deterministic testing.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use linegem_core::LinegemError;
use linegem_core::traits::adapter::PluginAdapter;
use linegem_core::traits::provider::ProviderAdapter;
use linegem_core::types::{AdapterType, HealthStatus};

/// A prompt the provider was asked to complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderCall {
    pub prompt: String,
    /// Attached image bytes for vision completions.
    pub image: Option<Vec<u8>>,
}

/// A completion provider that returns pre-configured results.
///
/// Results are popped from a FIFO queue. When the queue is empty, the text
/// `"mock response"` is returned.
pub struct MockProvider {
    results: Arc<Mutex<VecDeque<Result<String, LinegemError>>>>,
    calls: Arc<Mutex<Vec<ProviderCall>>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            results: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock provider pre-loaded with successful answers.
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            results: Arc::new(Mutex::new(responses.into_iter().map(Ok).collect())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a successful answer.
    pub async fn add_response(&self, text: impl Into<String>) {
        self.results.lock().await.push_back(Ok(text.into()));
    }

    /// Queue a provider failure with the given message.
    pub async fn add_failure(&self, message: impl Into<String>) {
        self.add_error(LinegemError::Provider {
            message: message.into(),
            source: None,
        })
        .await;
    }

    /// Queue an arbitrary error.
    pub async fn add_error(&self, error: LinegemError) {
        self.results.lock().await.push_back(Err(error));
    }

    /// Every prompt received so far, in call order.
    pub async fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().await.clone()
    }

    async fn next_result(&self, call: ProviderCall) -> Result<String, LinegemError> {
        self.calls.lock().await.push(call);
        self.results
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok("mock response".to_string()))
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, LinegemError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), LinegemError> {
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    async fn complete_text(&self, prompt: &str) -> Result<String, LinegemError> {
        self.next_result(ProviderCall {
            prompt: prompt.to_string(),
            image: None,
        })
        .await
    }

    async fn complete_vision(&self, prompt: &str, image: &[u8]) -> Result<String, LinegemError> {
        self.next_result(ProviderCall {
            prompt: prompt.to_string(),
            image: Some(image.to_vec()),
        })
        .await
    }
}
