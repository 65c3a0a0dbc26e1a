/*!
 * Provider implementations for different translation services.
 *
 * This module contains client implementations for the translation cascade:
 * - Gemini: LLM translation, prompted to keep Markdown structure (primary)
 * - Google: Cloud Translation v2 API (secondary)
 * - LibreTranslate: self-hostable translation endpoint (tertiary)
 * - Mock: scripted providers for tests
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::errors::ProviderError;
use crate::language_utils::TargetLanguage;

/// Position of a provider in the fallback order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderTier {
    Primary,
    Secondary,
    Tertiary,
}

impl ProviderTier {
    /// Visible prefix that identifies which tier answered
    pub fn marker(&self) -> &'static str {
        match self {
            ProviderTier::Primary => "🔁 ",
            ProviderTier::Secondary => "🌐 ",
            ProviderTier::Tertiary => "🆓 ",
        }
    }
}

impl std::fmt::Display for ProviderTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ProviderTier::Primary => "primary",
            ProviderTier::Secondary => "secondary",
            ProviderTier::Tertiary => "tertiary",
        };
        write!(f, "{}", name)
    }
}

/// Common trait for all translation providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably in the translation cascade.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Translate `text` into `target`
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - Raw provider output. The primary
    ///   tier returns its output prefixed with the tier marker on success.
    async fn translate(&self, text: &str, target: TargetLanguage) -> Result<String, ProviderError>;

    /// Which tier this provider occupies
    fn tier(&self) -> ProviderTier;

    /// Whether the provider keeps Markdown structure on its own. Providers
    /// that do not are wrapped in the Markdown guard.
    fn preserves_structure(&self) -> bool {
        false
    }
}

/// Shorten text for log lines
pub(crate) fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_string()
    }
}

pub mod gemini;
pub mod google;
pub mod libre;
pub mod mock;
