/*!
 * Line-structure heuristics for translated text.
 *
 * Large single-call translations sometimes come back squashed onto one line.
 * These helpers detect that, split a source into paragraph blocks for a
 * block-wise retry, and patch up bullet lists that lost their line breaks.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Runs of two or more newlines separate blocks
static BLANK_RUN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\n{2,}").expect("Invalid blank run regex")
});

/// Numbered list item start
static NUMBERED_ITEM_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d+\.\s").expect("Invalid numbered item regex")
});

/// Numbered item glued to the previous one
static GLUED_NUMBERED_ITEM_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s(\d+\.\s)").expect("Invalid glued numbered item regex")
});

/// Minimum length a single-line translation must reach before it is trusted
const COLLAPSE_MIN_CHARS: usize = 200;

/// Fraction of the source length a single-line translation must reach
const COLLAPSE_RATIO: f64 = 0.7;

/// Count lines of non-blank text; blank text has zero lines
pub fn count_lines(text: &str) -> usize {
    let normalized = text.replace("\r\n", "\n");
    if normalized.trim().is_empty() {
        0
    } else {
        normalized.matches('\n').count() + 1
    }
}

/// Whether `translated` looks like a multi-line `source` squashed onto one line
pub fn looks_collapsed(source: &str, translated: &str) -> bool {
    if count_lines(source) < 2 || count_lines(translated) > 1 {
        return false;
    }

    let source_len = source.trim().chars().count();
    let translated_len = translated.trim().chars().count();
    let threshold = COLLAPSE_MIN_CHARS.max((source_len as f64 * COLLAPSE_RATIO) as usize);

    translated_len < threshold
}

/// A piece of source text for block-wise translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Paragraph to translate
    Text(String),
    /// Blank-line run kept verbatim
    Separator(String),
}

impl Block {
    pub fn as_str(&self) -> &str {
        match self {
            Block::Text(s) | Block::Separator(s) => s,
        }
    }
}

/// Split text on blank-line boundaries, keeping the separators
pub fn split_blocks(text: &str) -> Vec<Block> {
    let normalized = text.replace("\r\n", "\n");
    let mut blocks = Vec::new();
    let mut last = 0;

    for m in BLANK_RUN_REGEX.find_iter(&normalized) {
        if m.start() > last {
            push_text_block(&mut blocks, &normalized[last..m.start()]);
        }
        blocks.push(Block::Separator(m.as_str().to_string()));
        last = m.end();
    }

    if last < normalized.len() {
        push_text_block(&mut blocks, &normalized[last..]);
    }

    blocks
}

fn push_text_block(blocks: &mut Vec<Block>, piece: &str) {
    if piece.trim().is_empty() {
        blocks.push(Block::Separator(piece.to_string()));
    } else {
        blocks.push(Block::Text(piece.to_string()));
    }
}

fn is_bullet_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with('-')
        || trimmed.starts_with('*')
        || trimmed.starts_with('+')
        || NUMBERED_ITEM_REGEX.is_match(trimmed)
}

/// Re-split a bullet list that came back on a single line.
///
/// Only applies when the source had at least two list items and the
/// translation has no line breaks at all.
pub fn repair_list_structure(source: &str, translated: &str) -> String {
    let bullet_count = source.lines().filter(|line| is_bullet_line(line)).count();
    if bullet_count < 2 || translated.contains('\n') {
        return translated.to_string();
    }

    let mut result = translated.to_string();
    for (glued, split) in [
        (" - ", "\n- "),
        (" • ", "\n- "),
        (" ・", "\n- "),
        (" + ", "\n+ "),
        (" * ", "\n* "),
    ] {
        if result.contains(glued) {
            result = result.replace(glued, split);
        }
    }

    GLUED_NUMBERED_ITEM_REGEX.replace_all(&result, "\n$1").into_owned()
}

/// Unwrap a reply that the model wrapped in a single code fence
pub fn strip_fences(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.len() >= 6 && trimmed.starts_with("```") && trimmed.ends_with("```") {
        let lines: Vec<&str> = trimmed.lines().collect();
        if lines.len() >= 2 {
            return lines[1..lines.len() - 1].join("\n").trim().to_string();
        }
    }
    trimmed.to_string()
}
