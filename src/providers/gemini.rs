use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::app_config::PrimaryProviderConfig;
use crate::errors::ProviderError;
use crate::language_utils::TargetLanguage;
use crate::providers::{Provider, ProviderTier, preview};
use crate::translation::prompts::TranslationPrompt;
use crate::translation::structure::{repair_list_structure, strip_fences};

/// Gemini client for LLM translation
#[derive(Debug)]
pub struct Gemini {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// Full generateContent URL
    endpoint: String,
    /// Sampling temperature for the first attempt
    temperature: f32,
}

/// generateContent request body
#[derive(Debug, Clone, Serialize)]
pub struct GeminiRequest {
    /// Conversation turns; translation uses a single user turn
    contents: Vec<GeminiContent>,

    /// Optional sampling parameters
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

/// Sampling parameters
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

impl GenerationConfig {
    /// Near-deterministic settings for translation
    pub fn for_translation(temperature: f32) -> Self {
        Self {
            temperature: Some(temperature),
            top_k: Some(1),
            top_p: Some(0.9),
            response_mime_type: Some("text/markdown".to_string()),
        }
    }
}

/// Content block shared by requests and responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

/// Single part of a content block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// generateContent response body
#[derive(Debug, Deserialize)]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
}

/// One generated candidate
#[derive(Debug, Deserialize)]
pub struct GeminiCandidate {
    #[serde(default)]
    pub content: Option<GeminiContent>,
}

impl GeminiRequest {
    /// Create a single-turn request
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart { text: Some(prompt.into()) }],
            }],
            generation_config: None,
        }
    }

    /// Set the sampling parameters
    pub fn generation_config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = Some(config);
        self
    }

    /// Same request with the optional parameters dropped
    pub fn reduced(&self) -> Self {
        Self {
            contents: self.contents.clone(),
            generation_config: None,
        }
    }
}

impl Gemini {
    /// Create a new Gemini client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            temperature: 0.2,
        }
    }

    /// Create a client from the primary provider section of the config
    pub fn from_config(config: &PrimaryProviderConfig) -> Self {
        let mut client = Self::new(
            config.api_key.clone(),
            config.endpoint.clone(),
            Duration::from_secs(config.timeout_secs),
        );
        client.temperature = config.temperature;
        client
    }

    /// Send a generateContent request
    pub async fn complete(&self, request: &GeminiRequest) -> Result<GeminiResponse, ProviderError> {
        if self.endpoint.is_empty() || self.api_key.is_empty() {
            return Err(ProviderError::NotConfigured("Gemini endpoint or API key missing".to_string()));
        }

        let response = self.client.post(&self.endpoint)
            .header("Content-Type", "application/json")
            .header("X-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Gemini API error ({}): {}", status, preview(&error_text, 300));
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: error_text,
            });
        }

        response.json::<GeminiResponse>().await
            .map_err(|e| ProviderError::ParseError(format!("Gemini response: {}", e)))
    }

    /// Text of the first part of the first candidate
    pub fn extract_text_from_response(response: &GeminiResponse) -> Option<String> {
        response.candidates.first()
            .and_then(|candidate| candidate.content.as_ref())
            .and_then(|content| content.parts.first())
            .and_then(|part| part.text.as_ref())
            .map(|text| text.trim().to_string())
    }

    async fn attempt(&self, request: &GeminiRequest) -> Result<String, ProviderError> {
        let response = self.complete(request).await?;
        Self::extract_text_from_response(&response)
            .ok_or_else(|| ProviderError::ParseError("Gemini response has no candidate text".to_string()))
    }
}

#[async_trait]
impl Provider for Gemini {
    async fn translate(&self, text: &str, target: TargetLanguage) -> Result<String, ProviderError> {
        let prompt = TranslationPrompt::new(target).build(text);
        let request = GeminiRequest::new(prompt)
            .generation_config(GenerationConfig::for_translation(self.temperature));

        let raw = match self.attempt(&request).await {
            Ok(raw) => raw,
            Err(ProviderError::NotConfigured(reason)) => return Err(ProviderError::NotConfigured(reason)),
            Err(e) => {
                debug!("Gemini attempt failed ({}), retrying with reduced payload", e);
                self.attempt(&request.reduced()).await?
            }
        };

        let output = repair_list_structure(text, &strip_fences(&raw));
        if output.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }

        Ok(format!("{}{}", ProviderTier::Primary.marker(), output))
    }

    fn tier(&self) -> ProviderTier {
        ProviderTier::Primary
    }

    fn preserves_structure(&self) -> bool {
        true
    }
}
