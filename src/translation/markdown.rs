/*!
 * Markdown protection for translation providers that are not structure-aware.
 *
 * Fenced code blocks, inline code spans and bare URLs are swapped for opaque
 * placeholder tokens before the text leaves the process, and swapped back
 * verbatim afterwards. Protection order is fenced blocks, inline code, URLs.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Fenced code blocks, including the fences
static CODE_BLOCK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```.*?```").expect("Invalid code block regex")
});

/// Inline code spans on a single line
static INLINE_CODE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"`[^`\n]+`").expect("Invalid inline code regex")
});

/// Bare http(s) URLs
static URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"https?://\S+").expect("Invalid URL regex")
});

/// Kind of protected span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    CodeBlock,
    InlineCode,
    Url,
}

impl SpanKind {
    fn tag(&self) -> &'static str {
        match self {
            SpanKind::CodeBlock => "CODEBLOCK",
            SpanKind::InlineCode => "INLINECODE",
            SpanKind::Url => "URL",
        }
    }
}

/// A single placeholder and the literal text it stands for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedSpan {
    pub kind: SpanKind,
    pub placeholder: String,
    pub original: String,
}

/// Text with its protected spans lifted out
#[derive(Debug, Clone, Default)]
pub struct ProtectedText {
    /// Text to hand to the provider
    pub text: String,
    /// Spans in protection order
    pub spans: Vec<ProtectedSpan>,
}

impl ProtectedText {
    /// Put the original spans back into a translated text.
    ///
    /// Spans are restored last-first so a placeholder captured inside a
    /// later span (an inline code token swallowed by a URL) is resolved
    /// too. Placeholders the provider dropped are simply absent; ones it
    /// left behind without a mapping stay as literal text.
    pub fn restore(&self, translated: &str) -> String {
        let mut result = translated.to_string();
        for span in self.spans.iter().rev() {
            result = result.replace(&span.placeholder, &span.original);
        }
        result
    }

    /// Whether anything was protected
    pub fn is_untouched(&self) -> bool {
        self.spans.is_empty()
    }
}

/// Markdown guard for wrapping provider calls
pub struct MarkdownGuard;

impl MarkdownGuard {
    /// Replace code blocks, inline code and URLs with placeholders
    pub fn protect(text: &str) -> ProtectedText {
        let mut spans = Vec::new();

        let mut result = Self::protect_kind(text, &CODE_BLOCK_REGEX, SpanKind::CodeBlock, &mut spans);
        result = Self::protect_kind(&result, &INLINE_CODE_REGEX, SpanKind::InlineCode, &mut spans);
        result = Self::protect_kind(&result, &URL_REGEX, SpanKind::Url, &mut spans);

        ProtectedText { text: result, spans }
    }

    fn protect_kind(text: &str, regex: &Regex, kind: SpanKind, spans: &mut Vec<ProtectedSpan>) -> String {
        regex
            .replace_all(text, |caps: &regex::Captures| {
                let placeholder = format!("__{}_{}__", kind.tag(), spans.len());
                spans.push(ProtectedSpan {
                    kind,
                    placeholder: placeholder.clone(),
                    original: caps[0].to_string(),
                });
                placeholder
            })
            .into_owned()
    }
}
