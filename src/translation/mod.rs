/*!
 * Translation of chat messages through a cascade of providers.
 *
 * - `cascade`: ordered provider fallback with collapse repair
 * - `markdown`: placeholder protection for code and URLs
 * - `prompts`: instruction text for the LLM provider
 * - `structure`: line-structure heuristics
 */

pub use self::cascade::{TranslationCascade, TranslationResult};
pub use self::markdown::{MarkdownGuard, ProtectedText};

pub mod cascade;
pub mod markdown;
pub mod prompts;
pub mod structure;
