use anyhow::Result;
use async_trait::async_trait;
use log::{debug, info};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::app_config::Config;
use crate::dedup::DedupEngine;
use crate::events::{Alert, EventBus, ProcessedMessage};
use crate::language_utils::TargetLanguage;
use crate::notification::{AlertGate, NotificationGate};
use crate::providers::preview;
use crate::stream::{ConnectionManager, ConnectionState, IncomingPost, PostHandler, WatchSet};
use crate::translation::{TranslationCascade, TranslationResult};

// @module: Application controller for the message pipeline

/// State shared between the worker and its handles
#[derive(Debug)]
struct SharedState {
    target_language: RwLock<TargetLanguage>,
    counter: AtomicU64,
    watch: WatchSet,
    gate: NotificationGate,
    alerts: Mutex<AlertGate>,
}

/// Cloneable command surface for the UI side
#[derive(Debug, Clone)]
pub struct MonitorHandle {
    shared: Arc<SharedState>,
    events: EventBus,
}

impl MonitorHandle {
    /// Zero the processed-message counter and announce it
    pub fn reset_counter(&self) {
        self.shared.counter.store(0, Ordering::SeqCst);
        self.events.emit_counter(0);
    }

    pub fn counter(&self) -> u64 {
        self.shared.counter.load(Ordering::SeqCst)
    }

    /// Replace the watched channels; no reconnect needed
    pub fn set_watch_channels<I, S>(&self, channels: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.shared.watch.replace(channels);
        info!("Watching {} channel(s)", self.shared.watch.len());
    }

    pub fn set_target_language(&self, language: TargetLanguage) {
        *self.shared.target_language.write() = language;
        info!("Target language set to {}", language);
    }

    pub fn target_language(&self) -> TargetLanguage {
        *self.shared.target_language.read()
    }

    /// The user brought the window forward
    pub fn user_focused(&self) {
        self.shared.gate.user_focused();
    }

    /// The user clicked an alert; also counts as focus
    pub fn alert_clicked(&self) {
        self.shared.alerts.lock().clicked();
        self.shared.gate.user_focused();
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }
}

/// Main application controller: dedup, translate, emit, notify
pub struct Controller {
    // @field: App configuration
    config: Config,
    cascade: TranslationCascade,
    dedup: DedupEngine,
    shared: Arc<SharedState>,
    events: EventBus,
    connection: ConnectionState,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let cascade = TranslationCascade::from_config(&config.translation);
        Ok(Self::with_cascade(config, cascade))
    }

    /// Create a controller around an already built cascade
    pub fn with_cascade(config: Config, cascade: TranslationCascade) -> Self {
        let shared = Arc::new(SharedState {
            target_language: RwLock::new(config.target_language),
            counter: AtomicU64::new(0),
            watch: WatchSet::new(config.watch_channels.iter().cloned()),
            gate: NotificationGate::new(&config.server.username, &config.notification),
            alerts: Mutex::new(AlertGate::new(&config.notification)),
        });

        Self {
            config,
            cascade,
            dedup: DedupEngine::default(),
            shared,
            events: EventBus::default(),
            connection: ConnectionState::default(),
        }
    }

    pub fn handle(&self) -> MonitorHandle {
        MonitorHandle {
            shared: Arc::clone(&self.shared),
            events: self.events.clone(),
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Stream client wired to this controller's watch set and events
    pub fn connection_manager(&mut self) -> ConnectionManager {
        let manager = ConnectionManager::new(
            self.config.server.clone(),
            self.shared.watch.clone(),
            self.events.clone(),
        );
        self.connection = manager.state();
        manager
    }

    /// Connect and process posts until the process stops
    pub async fn run(mut self) {
        let manager = self.connection_manager();
        info!(
            "Monitoring {} channel(s) as @{}",
            self.shared.watch.len(),
            self.config.server.username
        );
        manager.run(&mut self).await;
    }

    /// Translate a single text with the current target language
    pub async fn translate_text(&self, text: &str) -> TranslationResult {
        let target = *self.shared.target_language.read();
        self.cascade.translate(text.trim(), target).await
    }

    /// Run one post through the pipeline.
    ///
    /// Returns the emitted message, or `None` for a duplicate.
    pub async fn process_post(&mut self, post: IncomingPost) -> Option<ProcessedMessage> {
        if !self.dedup.observe(&post) {
            debug!("Duplicate post dropped: {}", post.id_or_empty());
            return None;
        }

        let sender = self.config.user_display_name(&post.user_id);
        let channel = self.config.channel_display_name(&post.channel_id);
        debug!("Post from {} in #{}: {}", sender, channel, preview(&post.text, 80));

        let translation = self.translate_text(&post.text).await;

        let message = ProcessedMessage {
            post_id: post.id_or_empty().to_string(),
            sender: sender.clone(),
            channel: channel.clone(),
            original_text: post.text.clone(),
            translated_text: translation.display_text(),
            provider: translation.provider,
        };
        self.events.emit_message(message.clone());

        let count = self.shared.counter.fetch_add(1, Ordering::SeqCst) + 1;
        self.events.emit_counter(count);

        let decision = self
            .shared
            .gate
            .evaluate(&post, &sender, &channel, self.connection.connected_at());
        if decision.should_notify {
            let raised = self.shared.alerts.lock().try_raise(&decision.title);
            if raised {
                info!("Alert: {}", decision.title);
                self.events.emit_alert(Alert {
                    title: decision.title,
                    body: post.text,
                });
            }
        }

        Some(message)
    }
}

#[async_trait]
impl PostHandler for Controller {
    async fn handle_post(&mut self, post: IncomingPost) {
        self.process_post(post).await;
    }
}
