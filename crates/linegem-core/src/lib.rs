// SPDX-FileCopyrightText: 2026 Linegem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the linegem chat bot.
//!
//! This crate provides the error type, the channel-agnostic event model, and
//! the adapter traits that the chat platform and completion provider crates
//! implement. The router only ever talks to these traits.

pub mod error;
pub mod traits;
pub mod types;

pub use error::LinegemError;
pub use types::{
    AdapterType, ChatEvent, ChatEventKind, EventSource, HealthStatus, MessageId, ReplyToken,
};

pub use traits::{ChannelAdapter, PluginAdapter, ProviderAdapter};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_variants_construct() {
        let _config = LinegemError::Config("test".into());
        let _channel = LinegemError::Channel {
            message: "test".into(),
            source: None,
        };
        let _provider = LinegemError::Provider {
            message: "test".into(),
            source: Some(Box::new(std::io::Error::other("boom"))),
        };
        let _input = LinegemError::InvalidInput("empty prompt".into());
    }

    #[test]
    fn adapter_type_round_trips_through_strings() {
        use std::str::FromStr;

        for variant in [AdapterType::Channel, AdapterType::Provider] {
            let s = variant.to_string();
            let parsed = AdapterType::from_str(&s).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn trait_objects_are_usable() {
        fn _assert_channel(_: &dyn ChannelAdapter) {}
        fn _assert_provider(_: &dyn ProviderAdapter) {}
    }
}
