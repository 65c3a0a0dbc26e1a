/*!
 * Ordered multi-provider translation with fallback.
 *
 * Providers are tried strictly in the order given. Each one gets a single
 * shot, plus a block-wise (then line-wise) retry when its output looks like
 * the source was squashed onto one line. Providers that do not keep Markdown
 * structure on their own are wrapped in the Markdown guard. Failures never
 * propagate: when every provider fails the result is an empty string.
 */

use log::{debug, info, warn};
use std::sync::Arc;

use crate::app_config::TranslationConfig;
use crate::errors::ProviderError;
use crate::language_utils::TargetLanguage;
use crate::providers::gemini::Gemini;
use crate::providers::google::GoogleTranslate;
use crate::providers::libre::LibreTranslate;
use crate::providers::{Provider, ProviderTier, preview};

use super::markdown::MarkdownGuard;
use super::structure::{Block, looks_collapsed, repair_list_structure, split_blocks};

/// Outcome of one cascade run
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TranslationResult {
    /// Translated text without the tier marker
    pub text: String,
    /// Tier that produced the text
    pub provider: Option<ProviderTier>,
    /// Whether any provider succeeded
    pub success: bool,
}

impl TranslationResult {
    pub fn translated(text: String, provider: ProviderTier) -> Self {
        Self {
            text,
            provider: Some(provider),
            success: true,
        }
    }

    pub fn failed() -> Self {
        Self::default()
    }

    /// Marker-prefixed text, or an empty string when nothing succeeded
    pub fn display_text(&self) -> String {
        match (self.success, self.provider) {
            (true, Some(tier)) => format!("{}{}", tier.marker(), self.text),
            _ => String::new(),
        }
    }
}

/// Translation cascade over an ordered provider list
#[derive(Debug, Clone, Default)]
pub struct TranslationCascade {
    providers: Vec<Arc<dyn Provider>>,
}

impl TranslationCascade {
    /// Create a cascade that tries `providers` in order
    pub fn new(providers: Vec<Arc<dyn Provider>>) -> Self {
        Self { providers }
    }

    /// Build the cascade from configuration, skipping unconfigured tiers
    pub fn from_config(config: &TranslationConfig) -> Self {
        let mut providers: Vec<Arc<dyn Provider>> = Vec::new();

        if config.primary.is_configured() {
            providers.push(Arc::new(Gemini::from_config(&config.primary)));
        } else {
            debug!("Primary provider not configured, skipping");
        }

        if config.secondary.is_configured() {
            providers.push(Arc::new(GoogleTranslate::from_config(&config.secondary)));
        } else {
            debug!("Secondary provider not configured, skipping");
        }

        if config.tertiary.is_configured() {
            providers.push(Arc::new(LibreTranslate::from_config(&config.tertiary)));
        } else {
            debug!("Tertiary provider not configured, skipping");
        }

        let cascade = Self::new(providers);
        if cascade.is_empty() {
            warn!("No translation provider configured; messages will not be translated");
        } else {
            info!("Translation cascade: {}", cascade.describe());
        }
        cascade
    }

    /// Tiers in the order they will be tried
    pub fn tiers(&self) -> Vec<ProviderTier> {
        self.providers.iter().map(|p| p.tier()).collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    fn describe(&self) -> String {
        self.tiers()
            .iter()
            .map(|tier| tier.to_string())
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    /// Translate `text` into `target`, falling through providers on failure
    pub async fn translate(&self, text: &str, target: TargetLanguage) -> TranslationResult {
        if text.trim().is_empty() {
            return TranslationResult::failed();
        }

        for provider in &self.providers {
            let tier = provider.tier();
            match self.translate_with(provider.as_ref(), text, target).await {
                Ok(output) => {
                    debug!("{} provider translated: {}", tier, preview(&output, 80));
                    return TranslationResult::translated(output, tier);
                }
                Err(e) => {
                    warn!("{} provider failed: {}", tier, e);
                }
            }
        }

        if !self.providers.is_empty() {
            warn!("All translation providers failed for: {}", preview(text, 80));
        }
        TranslationResult::failed()
    }

    /// One provider, including the collapse repair
    async fn translate_with(
        &self,
        provider: &dyn Provider,
        text: &str,
        target: TargetLanguage,
    ) -> Result<String, ProviderError> {
        let first = Self::call_once(provider, text, target).await?;
        if !looks_collapsed(text, &first) {
            return Ok(first);
        }

        debug!("{} output collapsed to one line, retrying block-wise", provider.tier());
        let blockwise = Self::translate_blocks(provider, text, target).await;
        if blockwise.trim().is_empty() {
            Ok(first)
        } else {
            Ok(blockwise)
        }
    }

    /// Translate each blank-line separated block on its own
    async fn translate_blocks(provider: &dyn Provider, text: &str, target: TargetLanguage) -> String {
        let mut result = String::new();

        for block in split_blocks(text) {
            match block {
                Block::Separator(separator) => result.push_str(&separator),
                Block::Text(source) => {
                    match Self::call_once(provider, &source, target).await {
                        Ok(output) if looks_collapsed(&source, &output) => {
                            let lines = Self::translate_lines(provider, &source, target).await;
                            if lines.trim().is_empty() {
                                result.push_str(&output);
                            } else {
                                result.push_str(&lines);
                            }
                        }
                        Ok(output) => result.push_str(&output),
                        Err(e) => debug!("Block translation failed: {}", e),
                    }
                }
            }
        }

        result
    }

    /// Translate a block one line at a time
    async fn translate_lines(provider: &dyn Provider, block: &str, target: TargetLanguage) -> String {
        let mut lines = Vec::new();

        for line in block.split('\n') {
            if line.trim().is_empty() {
                lines.push(line.to_string());
                continue;
            }
            match Self::call_once(provider, line, target).await {
                Ok(output) => lines.push(output),
                Err(e) => {
                    debug!("Line translation failed: {}", e);
                    lines.push(String::new());
                }
            }
        }

        lines.join("\n")
    }

    /// A single provider call with guard, marker check and list repair
    async fn call_once(provider: &dyn Provider, text: &str, target: TargetLanguage) -> Result<String, ProviderError> {
        let output = if provider.preserves_structure() {
            let raw = provider.translate(text, target).await?;
            Self::accept(provider.tier(), &raw)?.to_string()
        } else {
            let protected = MarkdownGuard::protect(text);
            let raw = provider.translate(&protected.text, target).await?;
            let body = Self::accept(provider.tier(), &raw)?;
            // list repair must run before restore so protected spans stay literal
            protected.restore(&repair_list_structure(text, body))
        };

        let output = output.trim();
        if output.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        Ok(output.to_string())
    }

    /// Primary output counts only when it carries the primary marker
    fn accept(tier: ProviderTier, raw: &str) -> Result<&str, ProviderError> {
        match tier {
            ProviderTier::Primary => raw
                .strip_prefix(ProviderTier::Primary.marker())
                .ok_or(ProviderError::MissingMarker),
            _ => Ok(raw),
        }
    }
}
