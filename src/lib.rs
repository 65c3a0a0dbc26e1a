/*!
 * # chatwatch - chat channel monitor with translated alerts
 *
 * A Rust library that follows a Mattermost-style realtime event stream,
 * translates new posts in a set of watched channels, and decides which of
 * them deserve a user-facing alert.
 *
 * ## Features
 *
 * - Reconnecting websocket client with bearer/cookie authentication
 * - Hot-swappable channel watch list
 * - Duplicate suppression by post id or content
 * - Translation cascade with fallback between providers:
 *   - Gemini (LLM, structure-aware)
 *   - Google Cloud Translation v2
 *   - LibreTranslate
 * - Markdown protection and collapsed-list repair for translated text
 * - Mention alerts with staleness, replay and flood suppression
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `stream`: Websocket connection, wire protocol and watch set
 * - `dedup`: Bounded duplicate registries
 * - `discovery`: Team and channel listing over the REST API
 * - `translation`: Provider cascade and text-structure helpers:
 *   - `translation::cascade`: Ordered fallback with collapse repair
 *   - `translation::markdown`: Placeholder protection for code and URLs
 * - `notification`: Alert gating
 * - `events`: Broadcast channels toward consumers
 * - `app_controller`: Per-post pipeline and command handle
 * - `language_utils`: Target language codes
 * - `providers`: Translation service clients
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod dedup;
pub mod discovery;
pub mod errors;
pub mod events;
pub mod language_utils;
pub mod notification;
pub mod providers;
pub mod stream;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, MonitorHandle};
pub use dedup::DedupEngine;
pub use discovery::{ChannelDirectory, DiscoveredChannel};
pub use errors::{DiscoveryError, ProviderError, StreamError};
pub use events::{Alert, EventBus, ProcessedMessage};
pub use language_utils::TargetLanguage;
pub use providers::ProviderTier;
pub use stream::{ConnectionManager, IncomingPost, WatchSet};
pub use translation::{TranslationCascade, TranslationResult};
