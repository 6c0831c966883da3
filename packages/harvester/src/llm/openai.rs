//! OpenAI inference provider, built on rig.

use async_trait::async_trait;
use rig::completion::Prompt;
use rig::providers::openai;

use super::{event_prompt, parse_inference, InferenceHints, InferenceProvider};
use crate::error::{HarvestError, Result};
use crate::types::ExtractionResult;

const PREAMBLE: &str =
    "You extract structured event data for a cultural events aggregator. You answer with strict JSON only.";

/// OpenAI-backed provider.
#[derive(Clone)]
pub struct OpenAiProvider {
    client: openai::Client,
    model: String,
}

impl OpenAiProvider {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: openai::Client::new(api_key),
            model: "gpt-4o".to_string(),
        }
    }

    /// Create from the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").ok()?;
        if api_key.is_empty() {
            return None;
        }
        Some(Self::new(&api_key))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl InferenceProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn infer(&self, url: &str, hints: &InferenceHints) -> Result<ExtractionResult> {
        let agent = self
            .client
            .agent(&self.model)
            .preamble(PREAMBLE)
            .max_tokens(1024)
            .build();

        let prompt = event_prompt(url, hints);
        tracing::debug!(url = %url, model = %self.model, "Calling OpenAI");

        let response = agent
            .prompt(prompt.as_str())
            .await
            .map_err(|e| HarvestError::Provider {
                provider: "openai".to_string(),
                message: e.to_string(),
            })?;

        parse_inference(&response)
    }
}
