//! Anthropic inference provider, a plain HTTP client against the
//! Messages API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{event_prompt, parse_inference, InferenceHints, InferenceProvider};
use crate::error::{HarvestError, Result};
use crate::types::ExtractionResult;

const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

/// Anthropic-backed provider.
#[derive(Clone)]
pub struct AnthropicProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl AnthropicProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: "claude-3-5-haiku-latest".to_string(),
            base_url: "https://api.anthropic.com/v1".to_string(),
        }
    }

    /// Create from the `ANTHROPIC_API_KEY` environment variable.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY").ok()?;
        if api_key.is_empty() {
            return None;
        }
        Some(Self::new(api_key))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set a custom base URL (for proxies).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn provider_error(&self, message: impl Into<String>) -> HarvestError {
        HarvestError::Provider {
            provider: "anthropic".to_string(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl InferenceProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn infer(&self, url: &str, hints: &InferenceHints) -> Result<ExtractionResult> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: 1024,
            messages: vec![Message {
                role: "user",
                content: event_prompt(url, hints),
            }],
        };

        tracing::debug!(url = %url, model = %self.model, "Calling Anthropic");

        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.provider_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.provider_error(format!("HTTP {}: {}", status, body)));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| self.provider_error(e.to_string()))?;

        let text = parsed
            .content
            .first()
            .map(|b| b.text.as_str())
            .ok_or_else(|| self.provider_error("empty response"))?;

        parse_inference(text)
    }
}
