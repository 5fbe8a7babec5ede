// SPDX-FileCopyrightText: 2026 Linegem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `linegem serve` command implementation.
//!
//! Builds the LINE channel and Gemini provider from configuration, wires them
//! into the event router, and serves the webhook until SIGINT or SIGTERM.

use std::sync::Arc;

use linegem_agent::shutdown::install_signal_handler;
use linegem_config::model::LinegemConfig;
use linegem_core::{ChannelAdapter, LinegemError, PluginAdapter, ProviderAdapter};
use linegem_gateway::GatewayState;
use linegem_gemini::GeminiProvider;
use linegem_line::LineChannel;
use tracing::{info, warn};

/// Runs the webhook server until shutdown.
pub async fn run_serve(config: LinegemConfig) -> Result<(), LinegemError> {
    init_tracing(&config.bot.log_level);

    info!(name = %config.bot.name, version = env!("CARGO_PKG_VERSION"), "starting linegem serve");

    if config.line.channel_secret.is_none() {
        warn!("line.channel_secret is not set, webhook signatures will not be verified");
    }
    if !config.bot.process_image_messages {
        info!("image messages are disabled (bot.process_image_messages = false)");
    }

    let channel = Arc::new(LineChannel::new(&config.line)?);
    let provider = Arc::new(GeminiProvider::new(config.gemini.clone())?);

    let router = linegem_agent::build_router(&config, channel.clone(), provider.clone());
    let state = GatewayState::new(Arc::new(router), config.line.channel_secret.clone());

    let shutdown = install_signal_handler();
    let served = linegem_gateway::start_server(&config.server, state, shutdown.clone()).await;
    shutdown.cancel();

    shutdown_adapters(channel.as_ref(), provider.as_ref()).await;
    info!("linegem stopped");
    served
}

async fn shutdown_adapters(channel: &dyn ChannelAdapter, provider: &dyn ProviderAdapter) {
    if let Err(e) = channel.shutdown().await {
        warn!(adapter = channel.name(), error = %e, "adapter shutdown failed");
    }
    if let Err(e) = provider.shutdown().await {
        warn!(adapter = provider.name(), error = %e, "adapter shutdown failed");
    }
}

/// Initializes the tracing subscriber. `RUST_LOG` takes precedence over the
/// configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("linegem={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
