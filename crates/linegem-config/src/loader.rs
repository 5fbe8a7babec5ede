// SPDX-FileCopyrightText: 2026 Linegem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./linegem.toml` > `~/.config/linegem/linegem.toml` > `/etc/linegem/linegem.toml`
//! with environment variable overrides via the `LINEGEM_` prefix. The bare
//! variable names of earlier deployments (`PORT`, `callSign`, ...) are honoured
//! below the prefixed ones.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::LinegemConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/linegem/linegem.toml` (system-wide)
/// 3. `~/.config/linegem/linegem.toml` (user XDG config)
/// 4. `./linegem.toml` (local directory)
/// 5. Legacy bare environment variables
/// 6. `LINEGEM_*` environment variables
pub fn load_config() -> Result<LinegemConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<LinegemConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LinegemConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<LinegemConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LinegemConfig::default()))
        .merge(Toml::file(path))
        .merge(legacy_env_provider())
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(LinegemConfig::default()))
        .merge(Toml::file("/etc/linegem/linegem.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("linegem/linegem.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("linegem.toml"))
        .merge(legacy_env_provider())
        .merge(env_provider())
}

/// Create the prefixed environment provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `LINEGEM_LINE_CHANNEL_ACCESS_TOKEN` must map to
/// `line.channel_access_token`, not `line.channel.access.token`.
pub(crate) fn env_provider() -> Env {
    Env::prefixed("LINEGEM_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        let key_str = key.as_str();
        let mapped = if let Some(rest) = key_str.strip_prefix("gemini_safety_") {
            format!("gemini.safety.{rest}")
        } else {
            key_str
                .replacen("bot_", "bot.", 1)
                .replacen("server_", "server.", 1)
                .replacen("line_", "line.", 1)
                .replacen("gemini_", "gemini.", 1)
                .replacen("messages_", "messages.", 1)
        };
        mapped.into()
    })
}

/// Bare variable names read by the original deployment scripts.
const LEGACY_ENV_KEYS: &[(&str, &str)] = &[
    ("port", "server.port"),
    ("callsign", "bot.callsign"),
    ("processimagemsg", "bot.process_image_messages"),
    ("ggai_api_key", "gemini.api_key"),
    ("channel_access_token", "line.channel_access_token"),
    ("channel_secret", "line.channel_secret"),
];

/// Create the provider for unprefixed legacy variables (`PORT`, `callSign`, ...).
pub(crate) fn legacy_env_provider() -> Env {
    let names: Vec<&str> = LEGACY_ENV_KEYS.iter().map(|(name, _)| *name).collect();
    Env::raw().only(&names).map(|key| {
        let lowered = key.as_str().to_ascii_lowercase();
        LEGACY_ENV_KEYS
            .iter()
            .find(|(name, _)| *name == lowered)
            .map(|(_, path)| (*path).to_string())
            .unwrap_or(lowered)
            .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_provider_maps_nested_safety_keys() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("LINEGEM_GEMINI_SAFETY_HATE_SPEECH", "block_only_high");
            jail.set_env("LINEGEM_BOT_PENDING_TTL_SECS", "60");
            let config: LinegemConfig = Figment::new()
                .merge(Serialized::defaults(LinegemConfig::default()))
                .merge(env_provider())
                .extract()?;
            assert_eq!(
                config.gemini.safety.hate_speech,
                crate::model::SafetyThreshold::BlockOnlyHigh
            );
            assert_eq!(config.bot.pending_ttl_secs, 60);
            Ok(())
        });
    }

    #[test]
    fn legacy_env_names_are_honoured() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("PORT", "8080");
            jail.set_env("callSign", "小幫手");
            jail.set_env("processImageMsg", "true");
            jail.set_env("GGAI_API_KEY", "legacy-key");
            let config: LinegemConfig = Figment::new()
                .merge(Serialized::defaults(LinegemConfig::default()))
                .merge(legacy_env_provider())
                .extract()?;
            assert_eq!(config.server.port, 8080);
            assert_eq!(config.bot.callsign, "小幫手");
            assert!(config.bot.process_image_messages);
            assert_eq!(config.gemini.api_key.as_deref(), Some("legacy-key"));
            Ok(())
        });
    }

    #[test]
    fn prefixed_env_beats_legacy_env() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("PORT", "8080");
            jail.set_env("LINEGEM_SERVER_PORT", "9090");
            let config: LinegemConfig = Figment::new()
                .merge(Serialized::defaults(LinegemConfig::default()))
                .merge(legacy_env_provider())
                .merge(env_provider())
                .extract()?;
            assert_eq!(config.server.port, 9090);
            Ok(())
        });
    }

    #[test]
    fn file_values_load_from_path() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "custom.toml",
                r#"
[bot]
callsign = "小魚"
pending_ttl_secs = 120
"#,
            )?;
            let config = load_config_from_path(Path::new("custom.toml"))?;
            assert_eq!(config.bot.callsign, "小魚");
            assert_eq!(config.bot.pending_ttl_secs, 120);
            Ok(())
        });
    }
}
