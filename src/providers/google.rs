use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::app_config::SecondaryProviderConfig;
use crate::errors::ProviderError;
use crate::language_utils::TargetLanguage;
use crate::providers::{Provider, ProviderTier, preview};

/// Google Cloud Translation (v2) client
#[derive(Debug)]
pub struct GoogleTranslate {
    client: Client,
    api_key: String,
    endpoint: String,
}

/// v2 translate request
#[derive(Debug, Serialize)]
pub struct GoogleRequest {
    /// Text to translate
    q: String,

    /// Source language; omitted for auto-detection
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,

    /// Target language code
    target: String,

    /// "text" or "html"
    format: String,
}

/// v2 translate response
#[derive(Debug, Deserialize)]
pub struct GoogleResponse {
    pub data: GoogleData,
}

#[derive(Debug, Deserialize)]
pub struct GoogleData {
    #[serde(default)]
    pub translations: Vec<GoogleTranslation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleTranslation {
    #[serde(default)]
    pub translated_text: String,
}

impl GoogleRequest {
    pub fn new(text: impl Into<String>, target: TargetLanguage) -> Self {
        Self {
            q: text.into(),
            source: None,
            target: target.code().to_string(),
            format: "text".to_string(),
        }
    }
}

impl GoogleTranslate {
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }

    pub fn from_config(config: &SecondaryProviderConfig) -> Self {
        Self::new(
            config.api_key.clone(),
            config.endpoint.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Send a translate request
    pub async fn complete(&self, request: &GoogleRequest) -> Result<GoogleResponse, ProviderError> {
        let response = self.client.post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Google Translate API error ({}): {}", status, preview(&error_text, 300));
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: error_text,
            });
        }

        response.json::<GoogleResponse>().await
            .map_err(|e| ProviderError::ParseError(format!("Google Translate response: {}", e)))
    }

    /// Extract text from a translate response
    pub fn extract_text_from_response(response: &GoogleResponse) -> String {
        response.data.translations.first()
            .map(|t| t.translated_text.trim().to_string())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Provider for GoogleTranslate {
    async fn translate(&self, text: &str, target: TargetLanguage) -> Result<String, ProviderError> {
        let response = self.complete(&GoogleRequest::new(text, target)).await?;
        let output = Self::extract_text_from_response(&response);
        if output.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        Ok(output)
    }

    fn tier(&self) -> ProviderTier {
        ProviderTier::Secondary
    }
}
