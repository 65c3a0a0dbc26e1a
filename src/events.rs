/*!
 * Typed publish/subscribe channels toward external consumers.
 *
 * Each event kind has its own `tokio::sync::broadcast` channel. Publishing
 * never blocks and never fails when nobody listens; subscribers that fall
 * behind lose the oldest events.
 */

use log::trace;
use serde::Serialize;
use tokio::sync::broadcast;

use crate::providers::ProviderTier;

/// Default per-channel buffer
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// A post that passed filtering and translation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessedMessage {
    /// Server post id, empty when the server sent none
    pub post_id: String,
    /// Sender display name
    pub sender: String,
    /// Channel display name
    pub channel: String,
    pub original_text: String,
    /// Marker-prefixed translation, or empty
    pub translated_text: String,
    pub provider: Option<ProviderTier>,
}

/// A user-facing alert
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub title: String,
    pub body: String,
}

/// Broadcast hub shared by the worker and its consumers
#[derive(Debug, Clone)]
pub struct EventBus {
    message_processed: broadcast::Sender<ProcessedMessage>,
    connection_state_changed: broadcast::Sender<bool>,
    counter_changed: broadcast::Sender<u64>,
    alert_raised: broadcast::Sender<Alert>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            message_processed: broadcast::channel(capacity).0,
            connection_state_changed: broadcast::channel(capacity).0,
            counter_changed: broadcast::channel(capacity).0,
            alert_raised: broadcast::channel(capacity).0,
        }
    }

    pub fn subscribe_messages(&self) -> broadcast::Receiver<ProcessedMessage> {
        self.message_processed.subscribe()
    }

    pub fn subscribe_connection(&self) -> broadcast::Receiver<bool> {
        self.connection_state_changed.subscribe()
    }

    pub fn subscribe_counter(&self) -> broadcast::Receiver<u64> {
        self.counter_changed.subscribe()
    }

    pub fn subscribe_alerts(&self) -> broadcast::Receiver<Alert> {
        self.alert_raised.subscribe()
    }

    pub fn emit_message(&self, message: ProcessedMessage) {
        if self.message_processed.send(message).is_err() {
            trace!("message_processed has no subscribers");
        }
    }

    pub fn emit_connection(&self, connected: bool) {
        if self.connection_state_changed.send(connected).is_err() {
            trace!("connection_state_changed has no subscribers");
        }
    }

    pub fn emit_counter(&self, count: u64) {
        if self.counter_changed.send(count).is_err() {
            trace!("counter_changed has no subscribers");
        }
    }

    pub fn emit_alert(&self, alert: Alert) {
        if self.alert_raised.send(alert).is_err() {
            trace!("alert_raised has no subscribers");
        }
    }
}
