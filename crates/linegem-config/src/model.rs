// SPDX-FileCopyrightText: 2026 Linegem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the linegem bot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};
use strum::Display;

/// Top-level linegem configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to the values the bot shipped with.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LinegemConfig {
    /// Trigger phrases and interaction policies.
    #[serde(default)]
    pub bot: BotConfig,

    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Chat platform credentials and endpoints.
    #[serde(default)]
    pub line: LineConfig,

    /// Completion provider settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// User-facing reply texts.
    #[serde(default)]
    pub messages: MessagesConfig,
}

const REDACTED: &str = "[redacted]";

impl LinegemConfig {
    /// Returns a copy with every configured secret replaced by a marker,
    /// suitable for printing.
    pub fn redacted(&self) -> Self {
        let mask = |secret: &Option<String>| secret.as_ref().map(|_| REDACTED.to_string());
        let mut config = self.clone();
        config.line.channel_access_token = mask(&self.line.channel_access_token);
        config.line.channel_secret = mask(&self.line.channel_secret);
        config.gemini.api_key = mask(&self.gemini.api_key);
        config
    }
}

/// What happens when a pending vision prompt expires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExpiryPolicy {
    /// Drop the prompt without telling the user.
    #[default]
    Silent,
    /// Drop the prompt and push `messages.expired` to the user.
    Notify,
}

/// What happens to text that matches neither the callsign nor a vision trigger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UnmatchedTextPolicy {
    /// No reply.
    #[default]
    Ignore,
    /// Reply with `messages.usage_hint`.
    UsageHint,
}

/// Bot identity, trigger phrases, and interaction policies.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Display name used in logs.
    #[serde(default = "default_bot_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Prefix that sends the rest of a text message to text completion.
    #[serde(default = "default_callsign")]
    pub callsign: String,

    /// Prefixes that start an image-awaiting interaction.
    #[serde(default = "default_vision_triggers")]
    pub vision_triggers: Vec<String>,

    /// Whether image messages are handled at all.
    #[serde(default)]
    pub process_image_messages: bool,

    /// How long a vision prompt waits for its image, in seconds.
    #[serde(default = "default_pending_ttl_secs")]
    pub pending_ttl_secs: u64,

    /// Behaviour when a pending vision prompt expires.
    #[serde(default)]
    pub expiry_policy: ExpiryPolicy,

    /// Behaviour for text matching no trigger.
    #[serde(default)]
    pub unmatched_text: UnmatchedTextPolicy,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_bot_name(),
            log_level: default_log_level(),
            callsign: default_callsign(),
            vision_triggers: default_vision_triggers(),
            process_image_messages: false,
            pending_ttl_secs: default_pending_ttl_secs(),
            expiry_policy: ExpiryPolicy::default(),
            unmatched_text: UnmatchedTextPolicy::default(),
        }
    }
}

fn default_bot_name() -> String {
    "linegem".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_callsign() -> String {
    "魚酥".to_string()
}

fn default_vision_triggers() -> Vec<String> {
    vec!["我想問".to_string()]
}

fn default_pending_ttl_secs() -> u64 {
    300
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Chat platform configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LineConfig {
    /// Bearer credential for the messaging API. Falls back to `CHANNEL_ACCESS_TOKEN`.
    #[serde(default)]
    pub channel_access_token: Option<String>,

    /// Channel secret for webhook signature verification. `None` disables verification.
    #[serde(default)]
    pub channel_secret: Option<String>,

    /// Base URL of the messaging API (reply, push, loading).
    #[serde(default = "default_line_api_base_url")]
    pub api_base_url: String,

    /// Base URL of the content API (media downloads).
    #[serde(default = "default_line_data_api_base_url")]
    pub data_api_base_url: String,

    /// Loading indicator duration in seconds. `0` disables the indicator.
    #[serde(default = "default_loading_seconds")]
    pub loading_seconds: u32,

    /// Per-request timeout against the platform, in seconds.
    #[serde(default = "default_line_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl std::fmt::Debug for LineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineConfig")
            .field(
                "channel_access_token",
                &self.channel_access_token.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "channel_secret",
                &self.channel_secret.as_ref().map(|_| "[redacted]"),
            )
            .field("api_base_url", &self.api_base_url)
            .field("data_api_base_url", &self.data_api_base_url)
            .field("loading_seconds", &self.loading_seconds)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            channel_access_token: None,
            channel_secret: None,
            api_base_url: default_line_api_base_url(),
            data_api_base_url: default_line_data_api_base_url(),
            loading_seconds: default_loading_seconds(),
            request_timeout_secs: default_line_timeout_secs(),
        }
    }
}

fn default_line_api_base_url() -> String {
    "https://api.line.me".to_string()
}

fn default_line_data_api_base_url() -> String {
    "https://api-data.line.me".to_string()
}

fn default_loading_seconds() -> u32 {
    10
}

fn default_line_timeout_secs() -> u64 {
    30
}

/// Content-safety block threshold for one harm category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyThreshold {
    #[default]
    #[strum(serialize = "BLOCK_NONE")]
    BlockNone,
    #[strum(serialize = "BLOCK_ONLY_HIGH")]
    BlockOnlyHigh,
    #[strum(serialize = "BLOCK_MEDIUM_AND_ABOVE")]
    BlockMediumAndAbove,
    #[strum(serialize = "BLOCK_LOW_AND_ABOVE")]
    BlockLowAndAbove,
}

/// Per-category content-safety thresholds.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SafetyConfig {
    #[serde(default)]
    pub harassment: SafetyThreshold,
    #[serde(default)]
    pub hate_speech: SafetyThreshold,
    #[serde(default)]
    pub sexually_explicit: SafetyThreshold,
    #[serde(default)]
    pub dangerous_content: SafetyThreshold,
}

/// Completion provider configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeminiConfig {
    /// API key. Falls back to `GGAI_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the generative language API.
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,

    /// Model used for text-only prompts.
    ///
    /// The default `gemini-1.0-pro` is retired on `v1beta`; set a current
    /// model (for example `gemini-2.5-flash`) for a live deployment.
    #[serde(default = "default_model")]
    pub model: String,

    /// Model used for prompts with an attached image.
    ///
    /// The default `gemini-pro-vision` is retired on `v1beta` and must be
    /// overridden the same way as [`model`](Self::model).
    #[serde(default = "default_vision_model")]
    pub vision_model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    #[serde(default = "default_top_k")]
    pub top_k: u32,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    #[serde(default = "default_stop_sequences")]
    pub stop_sequences: Vec<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_gemini_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub safety: SafetyConfig,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("vision_model", &self.vision_model)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("top_k", &self.top_k)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("stop_sequences", &self.stop_sequences)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("safety", &self.safety)
            .finish()
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_gemini_base_url(),
            model: default_model(),
            vision_model: default_vision_model(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
            max_output_tokens: default_max_output_tokens(),
            stop_sequences: default_stop_sequences(),
            request_timeout_secs: default_gemini_timeout_secs(),
            safety: SafetyConfig::default(),
        }
    }
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_model() -> String {
    "gemini-1.0-pro".to_string()
}

fn default_vision_model() -> String {
    "gemini-pro-vision".to_string()
}

fn default_temperature() -> f32 {
    0.5
}

fn default_top_p() -> f32 {
    1.0
}

fn default_top_k() -> u32 {
    1
}

fn default_max_output_tokens() -> u32 {
    2048
}

fn default_stop_sequences() -> Vec<String> {
    vec!["bbu".to_string()]
}

fn default_gemini_timeout_secs() -> u64 {
    120
}

/// User-facing reply texts.
///
/// `onboarding` and `usage_hint` may contain `{callsign}` and
/// `{vision_trigger}` placeholders.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MessagesConfig {
    /// Sent after a vision trigger is registered.
    #[serde(default = "default_upload_prompt")]
    pub upload_prompt: String,

    /// Sent when an image arrives with no pending prompt.
    #[serde(default = "default_orphan_image")]
    pub orphan_image: String,

    /// Sent when a completion or download fails.
    #[serde(default = "default_apology")]
    pub apology: String,

    /// Pushed when a pending prompt expires under the `notify` policy.
    #[serde(default = "default_expired")]
    pub expired: String,

    /// Sent for unmatched text under the `usage_hint` policy.
    #[serde(default = "default_usage_hint")]
    pub usage_hint: String,

    /// Sent on follow, join and member-joined events.
    #[serde(default = "default_onboarding")]
    pub onboarding: String,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            upload_prompt: default_upload_prompt(),
            orphan_image: default_orphan_image(),
            apology: default_apology(),
            expired: default_expired(),
            usage_hint: default_usage_hint(),
            onboarding: default_onboarding(),
        }
    }
}

fn default_upload_prompt() -> String {
    "請您上傳一張圖片給我".to_string()
}

fn default_orphan_image() -> String {
    "請先使用「{vision_trigger}」指令提出問題，再上傳圖片。".to_string()
}

fn default_apology() -> String {
    "對不起，處理消息時出錯。".to_string()
}

fn default_expired() -> String {
    "等待圖片逾時，請重新使用「{vision_trigger}」指令提問。".to_string()
}

fn default_usage_hint() -> String {
    "請用「{callsign}」開頭提問，或用「{vision_trigger}」開頭後上傳圖片。".to_string()
}

fn default_onboarding() -> String {
    "歡迎！\n文字提問：{callsign} 台灣的首都是哪裡？\n圖片提問：{vision_trigger} 這道菜有多少熱量？ 然後上傳一張圖片。"
        .to_string()
}
