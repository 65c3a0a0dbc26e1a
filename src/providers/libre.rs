use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::app_config::TertiaryProviderConfig;
use crate::errors::ProviderError;
use crate::language_utils::TargetLanguage;
use crate::providers::{Provider, ProviderTier, preview};

/// LibreTranslate client
#[derive(Debug)]
pub struct LibreTranslate {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

/// /translate request body
#[derive(Debug, Serialize)]
pub struct LibreRequest {
    q: String,
    source: String,
    target: String,
    format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,
}

/// /translate response body; some deployments answer with `translation`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibreResponse {
    #[serde(default)]
    pub translated_text: Option<String>,
    #[serde(default)]
    pub translation: Option<String>,
}

impl LibreRequest {
    pub fn new(text: impl Into<String>, target: TargetLanguage, api_key: Option<String>) -> Self {
        Self {
            q: text.into(),
            source: "auto".to_string(),
            target: target.code().to_string(),
            format: "text".to_string(),
            api_key,
        }
    }
}

impl LibreTranslate {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            endpoint: endpoint.into(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        }
    }

    pub fn from_config(config: &TertiaryProviderConfig) -> Self {
        Self::new(
            config.endpoint.clone(),
            config.api_key.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Send a translate request
    pub async fn complete(&self, request: &LibreRequest) -> Result<LibreResponse, ProviderError> {
        let response = self.client.post(&self.endpoint)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("LibreTranslate error ({}): {}", status, preview(&error_text, 300));
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: error_text,
            });
        }

        response.json::<LibreResponse>().await
            .map_err(|e| ProviderError::ParseError(format!("LibreTranslate response: {}", e)))
    }

    pub fn extract_text_from_response(response: &LibreResponse) -> String {
        response.translated_text.as_deref()
            .filter(|text| !text.trim().is_empty())
            .or(response.translation.as_deref())
            .unwrap_or_default()
            .trim()
            .to_string()
    }
}

#[async_trait]
impl Provider for LibreTranslate {
    async fn translate(&self, text: &str, target: TargetLanguage) -> Result<String, ProviderError> {
        let request = LibreRequest::new(text, target, self.api_key.clone());
        let response = self.complete(&request).await?;
        let output = Self::extract_text_from_response(&response);
        if output.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        Ok(output)
    }

    fn tier(&self) -> ProviderTier {
        ProviderTier::Tertiary
    }
}
