use anyhow::{Context, Result, anyhow};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::language_utils::TargetLanguage;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Chat server connection settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Channel ids watched at startup
    #[serde(default)]
    pub watch_channels: Vec<String>,

    /// Display names for channel ids
    #[serde(default)]
    pub channel_names: HashMap<String, String>,

    /// Display names for user ids
    #[serde(default)]
    pub user_names: HashMap<String, String>,

    /// Language messages are translated into
    #[serde(default)]
    pub target_language: TargetLanguage,

    /// Translation provider settings
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Alert gating settings
    #[serde(default)]
    pub notification: NotificationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Realtime stream settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    /// HTTP base URL of the chat server, used for channel discovery
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Websocket endpoint (ws:// or wss://)
    #[serde(default = "default_ws_url")]
    pub ws_url: String,

    /// Bearer token used for the authentication challenge
    #[serde(default = "String::new")]
    pub token: String,

    /// Id of the watching user
    #[serde(default = "String::new")]
    pub user_id: String,

    /// Username of the watching user, used for mention matching
    #[serde(default = "String::new")]
    pub username: String,

    /// Fixed delay between reconnect attempts
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,

    /// Upper bound on a websocket handshake or a REST call to the server
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            ws_url: default_ws_url(),
            token: String::new(),
            user_id: String::new(),
            username: String::new(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl ServerConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

/// Primary (LLM) provider configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PrimaryProviderConfig {
    /// Full generateContent URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    /// API key for the service
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Request timeout in seconds
    #[serde(default = "default_primary_timeout_secs")]
    pub timeout_secs: u64,

    /// Temperature parameter for generation
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for PrimaryProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            timeout_secs: default_primary_timeout_secs(),
            temperature: default_temperature(),
        }
    }
}

impl PrimaryProviderConfig {
    pub fn is_configured(&self) -> bool {
        !self.endpoint.trim().is_empty() && !self.api_key.trim().is_empty()
    }
}

/// Secondary (general-purpose translation API) configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SecondaryProviderConfig {
    /// Service endpoint URL
    #[serde(default = "default_secondary_endpoint")]
    pub endpoint: String,

    /// API key for the service
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Request timeout in seconds
    #[serde(default = "default_fallback_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SecondaryProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: default_secondary_endpoint(),
            api_key: String::new(),
            timeout_secs: default_fallback_timeout_secs(),
        }
    }
}

impl SecondaryProviderConfig {
    pub fn is_configured(&self) -> bool {
        !self.endpoint.trim().is_empty() && !self.api_key.trim().is_empty()
    }
}

/// Tertiary (self-hostable translation endpoint) configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TertiaryProviderConfig {
    /// Service endpoint URL
    #[serde(default = "default_tertiary_endpoint")]
    pub endpoint: String,

    /// Optional API key
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_fallback_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TertiaryProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: default_tertiary_endpoint(),
            api_key: None,
            timeout_secs: default_fallback_timeout_secs(),
        }
    }
}

impl TertiaryProviderConfig {
    pub fn is_configured(&self) -> bool {
        !self.endpoint.trim().is_empty()
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct TranslationConfig {
    #[serde(default)]
    pub primary: PrimaryProviderConfig,

    #[serde(default)]
    pub secondary: SecondaryProviderConfig,

    #[serde(default)]
    pub tertiary: TertiaryProviderConfig,
}

/// Alert suppression windows
///
/// The defaults were tuned against a single deployment; they are knobs,
/// not correctness thresholds.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NotificationConfig {
    /// Slack subtracted from the staleness baseline
    #[serde(default = "default_focus_buffer_ms")]
    pub focus_buffer_ms: u64,

    /// Window after a reconnect during which stale posts are always muted
    #[serde(default = "default_reconnect_warmup_ms")]
    pub reconnect_warmup_ms: u64,

    /// Global mute after the user clicks an alert
    #[serde(default = "default_click_suppress_ms")]
    pub click_suppress_ms: u64,

    /// Same-title alerts inside this window are dropped
    #[serde(default = "default_title_dedup_ms")]
    pub title_dedup_ms: u64,

    /// Minimum gap between any two alerts when the surface cannot replace
    #[serde(default = "default_min_alert_gap_ms")]
    pub min_alert_gap_ms: u64,

    /// Whether the alert surface replaces the previous alert natively
    #[serde(default)]
    pub alert_surface_replaces: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            focus_buffer_ms: default_focus_buffer_ms(),
            reconnect_warmup_ms: default_reconnect_warmup_ms(),
            click_suppress_ms: default_click_suppress_ms(),
            title_dedup_ms: default_title_dedup_ms(),
            min_alert_gap_ms: default_min_alert_gap_ms(),
            alert_surface_replaces: false,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8065".to_string()
}

fn default_ws_url() -> String {
    "ws://localhost:8065/api/v4/websocket".to_string()
}

fn default_reconnect_delay_ms() -> u64 {
    1000
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

fn default_primary_timeout_secs() -> u64 {
    15
}

fn default_fallback_timeout_secs() -> u64 {
    12
}

fn default_temperature() -> f32 {
    0.2
}

fn default_secondary_endpoint() -> String {
    "https://translation.googleapis.com/language/translate/v2".to_string()
}

fn default_tertiary_endpoint() -> String {
    "https://libretranslate.de/translate".to_string()
}

fn default_focus_buffer_ms() -> u64 {
    2000
}

fn default_reconnect_warmup_ms() -> u64 {
    2000
}

fn default_click_suppress_ms() -> u64 {
    1500
}

fn default_title_dedup_ms() -> u64 {
    3000
}

fn default_min_alert_gap_ms() -> u64 {
    8000
}

/// Environment variable that points at the configuration file
pub const CONFIG_ENV_VAR: &str = "CHATWATCH_CONFIG";

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.server.ws_url)
            .with_context(|| format!("Invalid websocket URL: {}", self.server.ws_url))?;
        if url.scheme() != "ws" && url.scheme() != "wss" {
            return Err(anyhow!("Websocket URL must use ws:// or wss://, got {}", url.scheme()));
        }

        if self.server.token.trim().is_empty() {
            return Err(anyhow!("An authentication token is required"));
        }

        if self.server.username.trim().is_empty() {
            return Err(anyhow!("A username is required for mention matching"));
        }

        if self.watch_channels.is_empty() {
            warn!("No channels are watched; every post will be ignored until the watch list is set");
        }

        Ok(())
    }

    /// Load the configuration at `path`, writing a default file first if
    /// none exists.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        config.save(path)?;

        Ok(config)
    }

    /// Write the configuration to `path` as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))?;
        Ok(())
    }

    /// Pick the configuration file: explicit path first, then the current
    /// directory, then the per-user config directory.
    pub fn resolve_path(explicit: Option<&str>) -> PathBuf {
        if let Some(path) = explicit {
            return PathBuf::from(path);
        }

        let local = PathBuf::from("conf.json");
        if local.exists() {
            return local;
        }

        if let Some(user_path) = dirs::config_dir().map(|dir| dir.join("chatwatch").join("conf.json")) {
            if user_path.exists() {
                return user_path;
            }
        }

        local
    }

    /// Display name for a channel id, falling back to the id itself
    pub fn channel_display_name(&self, channel_id: &str) -> String {
        self.channel_names
            .get(channel_id)
            .cloned()
            .unwrap_or_else(|| channel_id.to_string())
    }

    /// Display name for a user id, falling back to the id itself
    pub fn user_display_name(&self, user_id: &str) -> String {
        self.user_names
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| user_id.to_string())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig::default(),
            watch_channels: Vec::new(),
            channel_names: HashMap::new(),
            user_names: HashMap::new(),
            target_language: TargetLanguage::default(),
            translation: TranslationConfig::default(),
            notification: NotificationConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
