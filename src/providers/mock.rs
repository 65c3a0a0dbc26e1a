/*!
 * Mock provider implementations for testing.
 *
 * This module provides mock providers that simulate different behaviors:
 * - `MockProvider::working(tier)` - Always succeeds with tagged text
 * - `MockProvider::failing(tier)` - Always fails with an error
 * - `MockProvider::collapsing(tier)` - Squashes multi-line input onto one line
 * - `MockProvider::unmarked()` - Primary tier that omits its marker
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::language_utils::TargetLanguage;
use crate::providers::{Provider, ProviderTier};

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with `[code] text`
    Working,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Returns empty response
    Empty,
    /// Joins multi-line input into a single line before translating
    Collapsing,
    /// Succeeds but never adds the primary marker
    Unmarked,
}

/// Mock provider for testing cascade behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Tier reported to the cascade
    tier: ProviderTier,
    /// Whether the cascade should skip the Markdown guard
    structure_aware: bool,
    /// Request counter shared between clones
    request_count: Arc<AtomicUsize>,
    /// Every input text received, shared between clones
    received: Arc<Mutex<Vec<String>>>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&str, TargetLanguage) -> String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(tier: ProviderTier, behavior: MockBehavior) -> Self {
        Self {
            behavior,
            tier,
            structure_aware: tier == ProviderTier::Primary,
            request_count: Arc::new(AtomicUsize::new(0)),
            received: Arc::new(Mutex::new(Vec::new())),
            custom_response: None,
        }
    }

    pub fn working(tier: ProviderTier) -> Self {
        Self::new(tier, MockBehavior::Working)
    }

    pub fn intermittent(tier: ProviderTier, fail_every: usize) -> Self {
        Self::new(tier, MockBehavior::Intermittent { fail_every })
    }

    pub fn failing(tier: ProviderTier) -> Self {
        Self::new(tier, MockBehavior::Failing)
    }

    pub fn empty(tier: ProviderTier) -> Self {
        Self::new(tier, MockBehavior::Empty)
    }

    pub fn collapsing(tier: ProviderTier) -> Self {
        Self::new(tier, MockBehavior::Collapsing)
    }

    /// Primary-tier mock whose replies lack the marker
    pub fn unmarked() -> Self {
        Self::new(ProviderTier::Primary, MockBehavior::Unmarked)
    }

    /// Set a custom response generator used by the working behavior
    pub fn with_custom_response(mut self, generator: fn(&str, TargetLanguage) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of translate calls made so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Copy of every input text received so far
    pub fn received(&self) -> Vec<String> {
        self.received.lock().clone()
    }

    fn render(&self, text: &str, target: TargetLanguage) -> String {
        match self.custom_response {
            Some(generator) => generator(text, target),
            None => format!("[{}] {}", target.code(), text),
        }
    }

    fn tagged(&self, output: String) -> String {
        if self.tier == ProviderTier::Primary {
            format!("{}{}", ProviderTier::Primary.marker(), output)
        } else {
            output
        }
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            tier: self.tier,
            structure_aware: self.structure_aware,
            request_count: Arc::clone(&self.request_count),
            received: Arc::clone(&self.received),
            custom_response: self.custom_response,
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn translate(&self, text: &str, target: TargetLanguage) -> Result<String, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.received.lock().push(text.to_string());

        match self.behavior {
            MockBehavior::Working => Ok(self.tagged(self.render(text, target))),

            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    Ok(self.tagged(self.render(text, target)))
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::Empty => Ok(String::new()),

            MockBehavior::Collapsing => {
                let squashed = text
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ");
                Ok(self.tagged(self.render(&squashed, target)))
            }

            MockBehavior::Unmarked => Ok(self.render(text, target)),
        }
    }

    fn tier(&self) -> ProviderTier {
        self.tier
    }

    fn preserves_structure(&self) -> bool {
        self.structure_aware
    }
}
