// SPDX-FileCopyrightText: 2026 Linegem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Gemini `generateContent` endpoint.

use std::time::Duration;

use linegem_core::LinegemError;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::debug;

use crate::types::{ApiErrorResponse, GenerateContentRequest, GenerateContentResponse};

/// HTTP client for Gemini API communication.
///
/// One request per call. Failures surface immediately as
/// [`LinegemError::Provider`] and are not retried.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
}

impl GeminiClient {
    /// Creates a client authenticating with `api_key`.
    pub fn new(api_key: &str, base_url: String, timeout: Duration) -> Result<Self, LinegemError> {
        let mut headers = HeaderMap::new();
        let mut key = HeaderValue::from_str(api_key)
            .map_err(|e| LinegemError::Config(format!("invalid API key header value: {e}")))?;
        key.set_sensitive(true);
        headers.insert("x-goog-api-key", key);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| LinegemError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Sends one `generateContent` request against `model`.
    pub async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, LinegemError> {
        let url = format!("{}/v1beta/models/{model}:generateContent", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| LinegemError::Provider {
                message: if e.is_timeout() {
                    format!("request to {model} timed out")
                } else {
                    format!("HTTP request failed: {e}")
                },
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(model, status = %status, "generateContent response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if let Ok(api_err) = serde_json::from_str::<ApiErrorResponse>(&body) {
                format!(
                    "Gemini API error ({}): {}",
                    api_err.error.status.as_deref().unwrap_or("UNKNOWN"),
                    api_err.error.message
                )
            } else {
                format!("API returned {status}: {body}")
            };
            return Err(LinegemError::Provider {
                message,
                source: None,
            });
        }

        response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| LinegemError::Provider {
                message: format!("failed to parse response: {e}"),
                source: Some(Box::new(e)),
            })
    }
}
