// SPDX-FileCopyrightText: 2026 Linegem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the linegem bot.

use thiserror::Error;

/// The error type shared by every adapter trait and the event router.
#[derive(Debug, Error)]
pub enum LinegemError {
    /// Configuration errors (missing credentials, invalid header values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Chat platform errors (reply, push, content download, loading indicator).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Completion provider errors (transport failure, API error, blocked prompt).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The request carried no usable prompt.
    #[error("invalid input: {0}")]
    InvalidInput(String),

}

impl LinegemError {
    /// Returns `true` for failures of an external service (chat platform or
    /// completion provider). These end the current event with an apology.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            LinegemError::Channel { .. } | LinegemError::Provider { .. }
        )
    }
}
