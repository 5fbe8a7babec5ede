// SPDX-FileCopyrightText: 2026 Linegem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for linegem integration tests.
//!
//! Provides mock adapters and a test harness for fast, deterministic tests
//! without the chat platform or the completion API.
//!
//! # Components
//!
//! - [`MockProvider`] - Completion provider with queued answers and failures
//! - [`MockChannel`] - Chat channel that records every outbound call
//! - [`TestHarness`] - Event router wired to both mocks

pub mod harness;
pub mod mock_channel;
pub mod mock_provider;

pub use harness::TestHarness;
pub use mock_channel::{ChannelCall, MockChannel};
pub use mock_provider::{MockProvider, ProviderCall};
