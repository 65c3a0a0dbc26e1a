/*!
 * Tests for application configuration functionality
 */

use chatwatch::app_config::{Config, LogLevel};
use chatwatch::language_utils::TargetLanguage;

use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.server.ws_url, "ws://localhost:8065/api/v4/websocket");
    assert_eq!(config.server.reconnect_delay_ms, 1000);
    assert_eq!(config.server.base_url, "http://localhost:8065");
    assert_eq!(config.server.connect_timeout(), std::time::Duration::from_secs(10));
    assert_eq!(config.target_language, TargetLanguage::Vietnamese);
    assert_eq!(config.translation.primary.timeout_secs, 15);
    assert_eq!(config.translation.secondary.timeout_secs, 12);
    assert_eq!(config.translation.tertiary.endpoint, "https://libretranslate.de/translate");
    assert_eq!(config.notification.reconnect_warmup_ms, 2000);
    assert!(!config.notification.alert_surface_replaces);
    assert_eq!(config.log_level, LogLevel::Info);
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = common::test_config();
    assert!(config.validate().is_ok());

    config.server.ws_url = "wss://chat.example.com/api/v4/websocket".to_string();
    assert!(config.validate().is_ok());

    config.server.ws_url = "not a url".to_string();
    assert!(config.validate().is_err());

    let mut config = common::test_config();
    config.server.username = "  ".to_string();
    assert!(config.validate().is_err());

    // An empty watch list is allowed, it only logs a warning
    let mut config = common::test_config();
    config.watch_channels.clear();
    assert!(config.validate().is_ok());
}

#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaults() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");

    let config = Config::load_or_create(&path).unwrap();

    assert!(path.exists());
    assert_eq!(config.server.reconnect_delay_ms, 1000);
    let reloaded = Config::load_or_create(&path).unwrap();
    assert_eq!(reloaded.server.ws_url, config.server.ws_url);
}

#[test]
fn test_loadOrCreate_withExistingFile_shouldReadOverrides() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::write_config(
        &dir,
        r#"{
            "server": { "token": "abc", "username": "carol", "reconnect_delay_ms": 250 },
            "watch_channels": ["x"],
            "channel_names": { "x": "dev" },
            "target_language": "id",
            "translation": { "tertiary": { "endpoint": "http://localhost:5000/translate", "api_key": "k" } },
            "notification": { "min_alert_gap_ms": 100, "alert_surface_replaces": true },
            "log_level": "debug"
        }"#,
    )
    .unwrap();

    let config = Config::load_or_create(&path).unwrap();

    assert_eq!(config.server.reconnect_delay_ms, 250);
    assert_eq!(config.target_language, TargetLanguage::Indonesian);
    assert_eq!(config.channel_display_name("x"), "dev");
    assert_eq!(config.translation.tertiary.api_key.as_deref(), Some("k"));
    assert_eq!(config.notification.min_alert_gap_ms, 100);
    assert_eq!(config.notification.title_dedup_ms, 3000);
    assert!(config.notification.alert_surface_replaces);
    assert_eq!(config.log_level, LogLevel::Debug);
}

#[test]
fn test_save_thenLoad_shouldKeepDiscoveredChannels() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");
    let mut config = common::test_config();
    config.server.base_url = "https://chat.example.com".to_string();
    config.watch_channels = vec!["a".to_string(), "b".to_string()];
    config.channel_names.insert("b".to_string(), "Dev / backend".to_string());

    config.save(&path).unwrap();
    let reloaded = Config::load_or_create(&path).unwrap();

    assert_eq!(reloaded.server.base_url, "https://chat.example.com");
    assert_eq!(reloaded.watch_channels, vec!["a", "b"]);
    assert_eq!(reloaded.channel_display_name("b"), "Dev / backend");
}

#[test]
fn test_loadOrCreate_withMalformedFile_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::write_config(&dir, "{ not json").unwrap();
    assert!(Config::load_or_create(&path).is_err());
}

#[test]
fn test_resolvePath_withExplicitPath_shouldUseIt() {
    let path = Config::resolve_path(Some("/tmp/somewhere/else.json"));
    assert_eq!(path, std::path::PathBuf::from("/tmp/somewhere/else.json"));
}

#[test]
fn test_providerConfigured_shouldRequireCredentials() {
    let mut config = Config::default();
    assert!(!config.translation.primary.is_configured());
    assert!(!config.translation.secondary.is_configured());
    assert!(config.translation.tertiary.is_configured());

    config.translation.primary.endpoint = "https://example.com/gen".to_string();
    assert!(!config.translation.primary.is_configured());
    config.translation.primary.api_key = "key".to_string();
    assert!(config.translation.primary.is_configured());

    config.translation.tertiary.endpoint = " ".to_string();
    assert!(!config.translation.tertiary.is_configured());
}
