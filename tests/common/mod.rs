/*!
 * Common test utilities for the chatwatch test suite
 */

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::{Arc, Once};
use tempfile::TempDir;

use chatwatch::app_config::Config;
use chatwatch::providers::mock::MockProvider;
use chatwatch::providers::Provider;
use chatwatch::stream::{IncomingPost, PostHandler};
use chatwatch::translation::TranslationCascade;

static LOGGER: Once = Once::new();

/// Route library logs to the test output; safe to call from every test
pub fn init_logging() {
    LOGGER.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Writes `content` as a config file inside `dir`
pub fn write_config(dir: &TempDir, content: &str) -> Result<PathBuf> {
    let path = dir.path().join("conf.json");
    std::fs::write(&path, content)?;
    Ok(path)
}

/// Config with credentials, one watched channel and display names
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.server.token = "test-token".to_string();
    config.server.user_id = "me".to_string();
    config.server.username = "alice".to_string();
    config.server.reconnect_delay_ms = 50;
    config.watch_channels = vec!["chan-1".to_string()];
    config.channel_names.insert("chan-1".to_string(), "town-square".to_string());
    config.user_names.insert("user-1".to_string(), "Bob".to_string());
    config
}

/// Cascade over mock providers, in the given order
pub fn mock_cascade(providers: Vec<MockProvider>) -> TranslationCascade {
    TranslationCascade::new(
        providers
            .into_iter()
            .map(|p| Arc::new(p) as Arc<dyn Provider>)
            .collect(),
    )
}

/// Encodes a `posted` frame the way the server does
pub fn posted_frame(id: Option<&str>, channel_id: &str, user_id: &str, message: &str, create_at: i64) -> String {
    let mut post = serde_json::json!({
        "channel_id": channel_id,
        "user_id": user_id,
        "message": message,
        "create_at": create_at,
    });
    if let Some(id) = id {
        post["id"] = serde_json::Value::String(id.to_string());
    }
    serde_json::json!({
        "event": "posted",
        "data": { "post": post.to_string(), "channel_type": "O" },
        "broadcast": { "channel_id": channel_id },
        "seq": 1,
    })
    .to_string()
}

/// A posted frame stamped with the current time
pub fn fresh_frame(id: &str, channel_id: &str, message: &str) -> String {
    posted_frame(Some(id), channel_id, "user-1", message, Utc::now().timestamp_millis())
}

pub fn post(id: Option<&str>, channel_id: &str, text: &str, created_at: DateTime<Utc>) -> IncomingPost {
    IncomingPost {
        id: id.map(str::to_string),
        channel_id: channel_id.to_string(),
        user_id: "user-1".to_string(),
        text: text.to_string(),
        created_at,
    }
}

/// Post handler that keeps everything it receives
#[derive(Debug, Default)]
pub struct RecordingHandler {
    pub posts: Vec<IncomingPost>,
}

#[async_trait]
impl PostHandler for RecordingHandler {
    async fn handle_post(&mut self, post: IncomingPost) {
        self.posts.push(post);
    }
}
