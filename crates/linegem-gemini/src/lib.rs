// SPDX-FileCopyrightText: 2026 Linegem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Gemini completion provider for linegem.
//!
//! Implements [`ProviderAdapter`]: text prompts go to the text model and
//! image prompts go to the vision model, each as a single-turn
//! `generateContent` request carrying the configured sampling and safety
//! parameters.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use linegem_config::model::GeminiConfig;
use linegem_core::error::LinegemError;
use linegem_core::traits::{PluginAdapter, ProviderAdapter};
use linegem_core::types::{AdapterType, HealthStatus};
use tracing::{debug, info, warn};

use crate::client::GeminiClient;
use crate::types::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, InlineData, Part,
    SafetySetting,
};

/// MIME type attached to every image prompt.
pub const IMAGE_MIME_TYPE: &str = "image/png";

/// Gemini provider implementing [`ProviderAdapter`].
pub struct GeminiProvider {
    client: GeminiClient,
    config: GeminiConfig,
}

impl GeminiProvider {
    /// Creates a provider from configuration.
    ///
    /// Requires `config.api_key` to be set.
    pub fn new(config: GeminiConfig) -> Result<Self, LinegemError> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                LinegemError::Config(
                    "gemini.api_key is required (or set GGAI_API_KEY)".into(),
                )
            })?;

        let client = GeminiClient::new(
            api_key,
            config.base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )?;

        info!(
            model = %config.model,
            vision_model = %config.vision_model,
            "Gemini provider initialized"
        );
        Ok(Self { client, config })
    }

    fn build_request(&self, parts: Vec<Part>) -> GenerateContentRequest {
        let safety = &self.config.safety;
        let safety_settings = [
            ("HARM_CATEGORY_HARASSMENT", safety.harassment),
            ("HARM_CATEGORY_HATE_SPEECH", safety.hate_speech),
            ("HARM_CATEGORY_SEXUALLY_EXPLICIT", safety.sexually_explicit),
            ("HARM_CATEGORY_DANGEROUS_CONTENT", safety.dangerous_content),
        ]
        .into_iter()
        .map(|(category, threshold)| SafetySetting {
            category: category.to_string(),
            threshold: threshold.to_string(),
        })
        .collect();

        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".into()),
                parts,
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                top_k: self.config.top_k,
                top_p: self.config.top_p,
                max_output_tokens: self.config.max_output_tokens,
                stop_sequences: self.config.stop_sequences.clone(),
            },
            safety_settings,
        }
    }

    async fn complete(&self, model: &str, parts: Vec<Part>) -> Result<String, LinegemError> {
        let request = self.build_request(parts);
        let response = self.client.generate_content(model, &request).await?;
        extract_text(model, response)
    }
}

/// Pulls the completion text out of a response, treating a blocked prompt
/// or an empty candidate list as a provider failure.
fn extract_text(model: &str, response: GenerateContentResponse) -> Result<String, LinegemError> {
    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_deref())
    {
        warn!(model, reason, "prompt blocked by provider");
        return Err(LinegemError::Provider {
            message: format!("prompt blocked: {reason}"),
            source: None,
        });
    }

    if let Some(usage) = &response.usage_metadata {
        debug!(
            model,
            prompt_tokens = usage.prompt_token_count,
            output_tokens = usage.candidates_token_count,
            "completion usage"
        );
    }

    response.text().ok_or_else(|| {
        let finish = response
            .candidates
            .first()
            .and_then(|c| c.finish_reason.clone())
            .unwrap_or_else(|| "no candidates".into());
        LinegemError::Provider {
            message: format!("empty completion ({finish})"),
            source: None,
        }
    })
}

#[async_trait]
impl PluginAdapter for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
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
        debug!("Gemini provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for GeminiProvider {
    async fn complete_text(&self, prompt: &str) -> Result<String, LinegemError> {
        let parts = vec![Part::Text {
            text: prompt.to_string(),
        }];
        self.complete(&self.config.model, parts).await
    }

    async fn complete_vision(&self, prompt: &str, image: &[u8]) -> Result<String, LinegemError> {
        let parts = vec![
            Part::Text {
                text: prompt.to_string(),
            },
            Part::InlineData {
                inline_data: InlineData {
                    mime_type: IMAGE_MIME_TYPE.to_string(),
                    data: STANDARD.encode(image),
                },
            },
        ];
        self.complete(&self.config.vision_model, parts).await
    }
}
