// SPDX-FileCopyrightText: 2026 Linegem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for generative text completion.

use async_trait::async_trait;

use crate::error::LinegemError;
use crate::traits::adapter::PluginAdapter;

/// Adapter for a generative-AI completion service.
///
/// Sampling and safety settings are fixed per deployment, so callers pass
/// only the prompt (and, for vision, the raw image bytes).
#[async_trait]
pub trait ProviderAdapter: PluginAdapter {
    /// Completes a text-only prompt.
    async fn complete_text(&self, prompt: &str) -> Result<String, LinegemError>;

    /// Completes a prompt with one attached image. The bytes are forwarded
    /// without format validation.
    async fn complete_vision(&self, prompt: &str, image: &[u8]) -> Result<String, LinegemError>;
}
