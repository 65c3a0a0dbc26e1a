use log::debug;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::app_config::NotificationConfig;

/// Rate limiter applied at the moment an alert would be shown.
///
/// Checks run in order: post-click suppression, per-title window, then the
/// global cooldown (skipped when the alert surface replaces older alerts on
/// its own). Rejected alerts are dropped, never queued.
#[derive(Debug, Clone)]
pub struct AlertGate {
    click_suppress: Duration,
    title_window: Duration,
    min_gap: Duration,
    surface_replaces: bool,
    last_click: Option<Instant>,
    recent_titles: HashMap<String, Instant>,
    last_alert: Option<Instant>,
}

impl AlertGate {
    pub fn new(config: &NotificationConfig) -> Self {
        Self {
            click_suppress: Duration::from_millis(config.click_suppress_ms),
            title_window: Duration::from_millis(config.title_dedup_ms),
            min_gap: Duration::from_millis(config.min_alert_gap_ms),
            surface_replaces: config.alert_surface_replaces,
            last_click: None,
            recent_titles: HashMap::new(),
            last_alert: None,
        }
    }

    /// Record a click on an alert now
    pub fn clicked(&mut self) {
        self.clicked_at(Instant::now());
    }

    pub fn clicked_at(&mut self, now: Instant) {
        self.last_click = Some(now);
    }

    pub fn try_raise(&mut self, title: &str) -> bool {
        self.try_raise_at(title, Instant::now())
    }

    /// Whether an alert titled `title` may be shown at `now`; records it if so
    pub fn try_raise_at(&mut self, title: &str, now: Instant) -> bool {
        if Self::within(self.last_click, now, self.click_suppress) {
            debug!("Alert '{}' dropped: just after a click", title);
            return false;
        }

        let window = self.title_window;
        self.recent_titles
            .retain(|_, shown_at| now.saturating_duration_since(*shown_at) < window);
        if self.recent_titles.contains_key(title) {
            debug!("Alert '{}' dropped: same title shown recently", title);
            return false;
        }

        if !self.surface_replaces && Self::within(self.last_alert, now, self.min_gap) {
            debug!("Alert '{}' dropped: cooldown", title);
            return false;
        }

        self.recent_titles.insert(title.to_string(), now);
        self.last_alert = Some(now);
        true
    }

    /// Titles still inside the dedup window
    pub fn tracked_titles(&self) -> usize {
        self.recent_titles.len()
    }

    fn within(since: Option<Instant>, now: Instant, window: Duration) -> bool {
        since.is_some_and(|at| now.saturating_duration_since(at) < window)
    }
}
