use anyhow::{Result, anyhow};
use isolang::Language;
use serde::{Deserialize, Deserializer, Serialize};

/// Language utilities for the translation target
///
/// The monitor only translates into a small fixed set of languages. Codes
/// are ISO 639-1; display names come from the ISO tables so the prompt
/// sent to the primary provider reads naturally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum TargetLanguage {
    #[default]
    #[serde(rename = "vi")]
    Vietnamese,
    #[serde(rename = "en")]
    English,
    #[serde(rename = "ja")]
    Japanese,
    #[serde(rename = "id")]
    Indonesian,
}

/// Unknown codes in a config file fall back to the default target
impl<'de> Deserialize<'de> for TargetLanguage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Ok(Self::from_code_or_default(&code))
    }
}

impl TargetLanguage {
    /// All supported targets, in menu order
    pub const ALL: [TargetLanguage; 4] = [
        TargetLanguage::Vietnamese,
        TargetLanguage::English,
        TargetLanguage::Japanese,
        TargetLanguage::Indonesian,
    ];

    /// ISO 639-1 code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Vietnamese => "vi",
            Self::English => "en",
            Self::Japanese => "ja",
            Self::Indonesian => "id",
        }
    }

    /// English name of the language, used inside translation prompts
    pub fn english_name(&self) -> String {
        Language::from_639_1(self.code())
            .map(|lang| lang.to_name().to_string())
            .unwrap_or_else(|| self.code().to_string())
    }

    /// Lenient conversion used for runtime signals: unknown codes fall back
    /// to the default target instead of failing.
    pub fn from_code_or_default(code: &str) -> Self {
        code.parse().unwrap_or_default()
    }
}

impl std::fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for TargetLanguage {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|lang| lang.code() == normalized)
            .ok_or_else(|| anyhow!("Unsupported target language: {}", s))
    }
}
