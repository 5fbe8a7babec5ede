// SPDX-FileCopyrightText: 2026 Linegem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as trigger phrases that would shadow each other or sampling
//! parameters outside the provider's accepted range.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::LinegemConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &LinegemConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let callsign = config.bot.callsign.trim();
    if callsign.is_empty() {
        fail("bot.callsign must not be empty".to_string());
    }

    if config.bot.vision_triggers.is_empty() {
        fail("bot.vision_triggers must contain at least one trigger".to_string());
    }

    let mut seen = HashSet::new();
    for (i, trigger) in config.bot.vision_triggers.iter().enumerate() {
        let trigger = trigger.trim();
        if trigger.is_empty() {
            fail(format!("bot.vision_triggers[{i}] must not be empty"));
            continue;
        }
        if trigger == callsign {
            fail(format!(
                "bot.vision_triggers[{i}] `{trigger}` is the same as bot.callsign"
            ));
        }
        if !seen.insert(trigger) {
            fail(format!("duplicate vision trigger `{trigger}`"));
        }
    }

    if config.bot.pending_ttl_secs == 0 {
        fail("bot.pending_ttl_secs must be greater than 0".to_string());
    }

    if config.server.host.trim().is_empty() {
        fail("server.host must not be empty".to_string());
    }

    let loading = config.line.loading_seconds;
    if loading != 0 && (!(5..=60).contains(&loading) || loading % 5 != 0) {
        fail(format!(
            "line.loading_seconds must be 0 or a multiple of 5 between 5 and 60, got {loading}"
        ));
    }

    if config.line.request_timeout_secs == 0 {
        fail("line.request_timeout_secs must be greater than 0".to_string());
    }

    let gemini = &config.gemini;
    if !(0.0..=2.0).contains(&gemini.temperature) {
        fail(format!(
            "gemini.temperature must be between 0 and 2, got {}",
            gemini.temperature
        ));
    }
    if !(0.0..=1.0).contains(&gemini.top_p) {
        fail(format!(
            "gemini.top_p must be between 0 and 1, got {}",
            gemini.top_p
        ));
    }
    if gemini.top_k == 0 {
        fail("gemini.top_k must be at least 1".to_string());
    }
    if gemini.max_output_tokens == 0 {
        fail("gemini.max_output_tokens must be at least 1".to_string());
    }
    if gemini.model.trim().is_empty() || gemini.vision_model.trim().is_empty() {
        fail("gemini.model and gemini.vision_model must not be empty".to_string());
    }
    if gemini.request_timeout_secs == 0 {
        fail("gemini.request_timeout_secs must be greater than 0".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_error(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&LinegemConfig::default()).is_ok());
    }

    #[test]
    fn empty_callsign_fails_validation() {
        let mut config = LinegemConfig::default();
        config.bot.callsign = "   ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "bot.callsign"));
    }

    #[test]
    fn vision_trigger_equal_to_callsign_fails() {
        let mut config = LinegemConfig::default();
        config.bot.vision_triggers = vec![config.bot.callsign.clone()];
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "same as bot.callsign"));
    }

    #[test]
    fn duplicate_vision_triggers_fail() {
        let mut config = LinegemConfig::default();
        config.bot.vision_triggers = vec!["我想問".into(), "我想問".into()];
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "duplicate vision trigger"));
    }

    #[test]
    fn zero_ttl_fails() {
        let mut config = LinegemConfig::default();
        config.bot.pending_ttl_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "pending_ttl_secs"));
    }

    #[test]
    fn loading_seconds_must_be_multiple_of_five() {
        let mut config = LinegemConfig::default();
        config.line.loading_seconds = 7;
        assert!(has_error(
            &validate_config(&config).unwrap_err(),
            "loading_seconds"
        ));

        config.line.loading_seconds = 0;
        assert!(validate_config(&config).is_ok());

        config.line.loading_seconds = 60;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn sampling_out_of_range_collects_all_errors() {
        let mut config = LinegemConfig::default();
        config.gemini.temperature = 3.0;
        config.gemini.top_p = 1.5;
        config.gemini.top_k = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(has_error(&errors, "temperature"));
        assert!(has_error(&errors, "top_p"));
        assert!(has_error(&errors, "top_k"));
    }
}
