//! Generative-AI capability seam.
//!
//! The model client is constructed once at process start and injected into
//! whatever needs it; there is no implicit per-request or global client.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::AiSettings;
use crate::error::AiError;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// A text-in, text-out generative model.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, AiError>;
}

/// Google Gemini implementation of [`GenerativeModel`].
pub struct GeminiModel {
    client: Client,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    base_url: String,
}

impl GeminiModel {
    /// Build a model client from configuration.
    ///
    /// The API key comes from the config, falling back to the
    /// `GEMINI_API_KEY` environment variable.
    pub fn new(settings: &AiSettings, timeout: Duration) -> Result<Self, AiError> {
        let api_key = settings
            .api_key
            .clone()
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .ok_or_else(|| {
                AiError::Unknown("GEMINI_API_KEY not found in config or environment".to_string())
            })?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AiError::Unknown(err.to_string()))?;

        Ok(Self {
            client,
            api_key,
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            base_url: settings
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }
}

#[async_trait]
impl GenerativeModel for GeminiModel {
    async fn generate(&self, prompt: &str) -> Result<String, AiError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let response = self
            .client
            .post(&url)
            .json(&json!({
                "contents": [{
                    "parts": [{ "text": prompt }]
                }],
                "generationConfig": {
                    "temperature": self.temperature,
                    "maxOutputTokens": self.max_tokens
                }
            }))
            .send()
            .await?;

        let status = response.status().as_u16();
        match status {
            401 | 403 => return Err(AiError::Auth),
            429 => return Err(AiError::RateLimit),
            500..=599 => return Err(AiError::ModelUnavailable),
            _ => {}
        }

        let body: Value = response.json().await?;
        debug!("model response: {:?}", body);

        body["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                AiError::Unknown("failed to extract text from model response".to_string())
            })
    }
}
