/*!
 * Tests for the Markdown guard, structure heuristics and cascade behaviour
 */

use chatwatch::language_utils::TargetLanguage;
use chatwatch::providers::mock::MockProvider;
use chatwatch::providers::ProviderTier;
use chatwatch::translation::markdown::{MarkdownGuard, SpanKind};
use chatwatch::translation::structure::{count_lines, looks_collapsed};

use crate::common;

#[test]
fn test_protect_withMixedMarkdown_shouldProtectInOrder() {
    let text = "See `a` and https://x.io then\n```\nb\n```";
    let protected = MarkdownGuard::protect(text);

    let kinds: Vec<SpanKind> = protected.spans.iter().map(|s| s.kind).collect();
    assert_eq!(kinds, vec![SpanKind::CodeBlock, SpanKind::InlineCode, SpanKind::Url]);
    assert_eq!(protected.text, "See __INLINECODE_1__ and __URL_2__ then\n__CODEBLOCK_0__");
}

#[test]
fn test_restore_withReorderedPlaceholders_shouldRestoreEach() {
    let protected = MarkdownGuard::protect("open https://a.io or https://b.io");
    let restored = protected.restore("__URL_1__ hoặc __URL_0__ mở");
    assert_eq!(restored, "https://b.io hoặc https://a.io mở");
}

#[test]
fn test_restore_withUnknownPlaceholder_shouldLeaveItVerbatim() {
    let protected = MarkdownGuard::protect("plain");
    assert_eq!(protected.restore("x __URL_7__"), "x __URL_7__");
}

#[test]
fn test_looksCollapsed_withDefaultThreshold_shouldUse200Chars() {
    let source = "a\nb\nc";
    assert!(looks_collapsed(source, &"x".repeat(199)));
    assert!(!looks_collapsed(source, &"x".repeat(200)));
}

#[tokio::test]
async fn test_cascade_withFencedBlockAndUrl_shouldRoundTripByteIdentical() {
    common::init_logging();
    let provider = MockProvider::working(ProviderTier::Tertiary)
        .with_custom_response(|text, _| text.to_uppercase());
    let cascade = common::mock_cascade(vec![provider]);
    let text = "check this\n```sh\ncurl -s https://api.example.com/v1?q=a | jq .\n```\nmore at https://docs.example.com/Path_X";

    let result = cascade.translate(text, TargetLanguage::English).await;

    assert!(result.text.contains("```sh\ncurl -s https://api.example.com/v1?q=a | jq .\n```"));
    assert!(result.text.ends_with("https://docs.example.com/Path_X"));
    assert!(result.text.starts_with("CHECK THIS"));
}

#[tokio::test]
async fn test_cascade_withCollapsingFiveLineList_shouldKeepMajorityOfLines() {
    common::init_logging();
    let cascade = common::mock_cascade(vec![
        MockProvider::failing(ProviderTier::Primary),
        MockProvider::collapsing(ProviderTier::Secondary),
    ]);
    let source = "* apples\n* pears\n* plums\n* figs\n* dates";

    let result = cascade.translate(source, TargetLanguage::Vietnamese).await;

    assert_eq!(result.provider, Some(ProviderTier::Secondary));
    assert!(count_lines(&result.text) >= 3, "got: {:?}", result.text);
}

#[tokio::test]
async fn test_cascade_withUnrecoverableCollapse_shouldKeepSquashedOutput() {
    // every multi-line request collapses, every single-line request fails
    let provider = MockProvider::working(ProviderTier::Secondary).with_custom_response(|text, _| {
        if text.contains('\n') {
            "squashed".to_string()
        } else {
            String::new()
        }
    });
    let cascade = common::mock_cascade(vec![provider]);

    let result = cascade.translate("one\ntwo\nthree", TargetLanguage::English).await;

    assert!(result.success);
    assert_eq!(result.text, "squashed");
}
