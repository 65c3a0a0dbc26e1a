/*!
 * Prompt construction for the LLM translation provider.
 */

use crate::language_utils::TargetLanguage;

/// One-shot translation instruction for a target language
#[derive(Debug, Clone)]
pub struct TranslationPrompt {
    language_name: String,
}

impl TranslationPrompt {
    pub fn new(target: TargetLanguage) -> Self {
        Self {
            language_name: target.english_name(),
        }
    }

    /// Render the full instruction around `text`
    pub fn build(&self, text: &str) -> String {
        let name = &self.language_name;
        format!(
            "Translate the text below into {name}. Do not add any explanations or extra words. \
             If the input contains Markdown, preserve its formatting EXACTLY as-is \
             (headings, lists, bold/italic, fenced code blocks, tables, inline code, links, spacing, and line breaks). \
             Do not translate anything inside code blocks or inline code, and do not alter URLs. \
             If the input is not Markdown, output clear {name} with appropriate punctuation and line breaks.\n\n\
             INPUT:\n{text}\n\n\
             OUTPUT ({name} only):"
        )
    }
}
