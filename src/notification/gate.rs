/*!
 * Decides whether a post deserves a user-facing alert.
 *
 * A post is a candidate when it mentions the user (`@username`) or the whole
 * channel (`@channel`, `@here`, `@all`). Candidates older than the staleness
 * baseline are never alerted: the baseline is the later of app start and the
 * last user focus, minus a small buffer. Right after a reconnect the server
 * may replay history, so stale posts seen during the warm-up are suppressed
 * regardless of mentions.
 */

use chrono::{DateTime, Utc};
use log::debug;
use parking_lot::Mutex;
use std::time::{Duration, Instant};

use crate::app_config::NotificationConfig;
use crate::stream::protocol::IncomingPost;

/// Mentions that address everyone in a channel
const CHANNEL_WIDE_MENTIONS: [&str; 3] = ["@channel", "@here", "@all"];

/// Why a post is an alert candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MentionKind {
    Personal,
    ChannelWide,
}

/// Outcome of the gate
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NotificationDecision {
    pub should_notify: bool,
    /// Alert title; empty when no alert is due
    pub title: String,
}

impl NotificationDecision {
    fn suppressed() -> Self {
        Self::default()
    }

    fn notify(title: String) -> Self {
        Self {
            should_notify: true,
            title,
        }
    }
}

#[derive(Debug)]
pub struct NotificationGate {
    /// Lowercase `@username`, empty when no username is known
    personal_tag: String,
    app_started_at: DateTime<Utc>,
    last_focus_at: Mutex<Option<DateTime<Utc>>>,
    focus_buffer: chrono::Duration,
    reconnect_warmup: Duration,
}

impl NotificationGate {
    pub fn new(username: &str, config: &NotificationConfig) -> Self {
        Self::with_started_at(username, config, Utc::now())
    }

    pub fn with_started_at(username: &str, config: &NotificationConfig, app_started_at: DateTime<Utc>) -> Self {
        let username = username.trim().trim_start_matches('@').to_lowercase();
        Self {
            personal_tag: if username.is_empty() { String::new() } else { format!("@{}", username) },
            app_started_at,
            last_focus_at: Mutex::new(None),
            focus_buffer: chrono::Duration::milliseconds(config.focus_buffer_ms as i64),
            reconnect_warmup: Duration::from_millis(config.reconnect_warmup_ms),
        }
    }

    /// Record that the user looked at the window now
    pub fn user_focused(&self) {
        self.user_focused_at(Utc::now());
    }

    pub fn user_focused_at(&self, at: DateTime<Utc>) {
        let mut last = self.last_focus_at.lock();
        if last.is_none_or(|prev| at > prev) {
            *last = Some(at);
        }
    }

    /// Posts created before this instant are stale
    pub fn baseline(&self) -> DateTime<Utc> {
        let focus = *self.last_focus_at.lock();
        let latest = match focus {
            Some(focus) if focus > self.app_started_at => focus,
            _ => self.app_started_at,
        };
        latest - self.focus_buffer
    }

    pub fn classify(&self, text: &str) -> Option<MentionKind> {
        let lower = text.to_lowercase();
        if !self.personal_tag.is_empty() && lower.contains(&self.personal_tag) {
            Some(MentionKind::Personal)
        } else if CHANNEL_WIDE_MENTIONS.iter().any(|m| lower.contains(m)) {
            Some(MentionKind::ChannelWide)
        } else {
            None
        }
    }

    pub fn evaluate(
        &self,
        post: &IncomingPost,
        sender: &str,
        channel: &str,
        connected_at: Option<Instant>,
    ) -> NotificationDecision {
        self.evaluate_at(post, sender, channel, connected_at, Instant::now())
    }

    pub fn evaluate_at(
        &self,
        post: &IncomingPost,
        sender: &str,
        channel: &str,
        connected_at: Option<Instant>,
        now: Instant,
    ) -> NotificationDecision {
        let stale = post.created_at < self.baseline();
        let warming_up = connected_at
            .is_some_and(|at| now.saturating_duration_since(at) < self.reconnect_warmup);

        if stale {
            if warming_up {
                debug!("Suppressing replayed post {} during reconnect warm-up", post.id_or_empty());
            }
            return NotificationDecision::suppressed();
        }

        match self.classify(&post.text) {
            Some(MentionKind::Personal) => {
                NotificationDecision::notify(format!("Mention from {} in #{}", sender, channel))
            }
            Some(MentionKind::ChannelWide) => {
                NotificationDecision::notify(format!("Channel mention in #{}", channel))
            }
            None => NotificationDecision::suppressed(),
        }
    }
}
