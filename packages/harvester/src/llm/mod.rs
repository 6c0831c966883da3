//! Language-model inference fallback.
//!
//! When scraping is blocked or yields no usable title, an ordered chain
//! of interchangeable providers is asked to infer the event from the URL
//! (plus optional venue context). Providers are tried one at a time,
//! never concurrently; each call has its own timeout and a failure simply
//! advances the chain.

pub mod anthropic;
pub mod openai;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{HarvestError, Result};
use crate::types::{Confidence, EventCategory, ExtractionResult, ExtractionTier};

/// Context handed to providers alongside the URL.
#[derive(Debug, Clone, Default)]
pub struct InferenceHints {
    pub venue_name: Option<String>,
    pub city: Option<String>,
    pub category: Option<EventCategory>,
}

/// One interchangeable inference backend.
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Infer an extraction result for a URL the scraper could not handle.
    async fn infer(&self, url: &str, hints: &InferenceHints) -> Result<ExtractionResult>;
}

/// Priority-ordered provider list; first success wins.
pub struct ProviderChain {
    providers: Vec<Box<dyn InferenceProvider>>,
    call_timeout: Duration,
}

impl ProviderChain {
    pub fn new(call_timeout: Duration) -> Self {
        Self {
            providers: Vec::new(),
            call_timeout,
        }
    }

    pub fn with_provider(mut self, provider: Box<dyn InferenceProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn push(&mut self, provider: Box<dyn InferenceProvider>) {
        self.providers.push(provider);
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Try each provider in order until one returns a usable result.
    pub async fn infer(&self, url: &str, hints: &InferenceHints) -> Result<ExtractionResult> {
        for provider in &self.providers {
            let attempt = tokio::time::timeout(self.call_timeout, provider.infer(url, hints));
            match attempt.await {
                Ok(Ok(result)) if result.is_usable() => {
                    info!(url = %url, provider = provider.name(), "Inference succeeded");
                    return Ok(result);
                }
                Ok(Ok(_)) => {
                    warn!(url = %url, provider = provider.name(), "Inference returned no title");
                }
                Ok(Err(e)) => {
                    warn!(url = %url, provider = provider.name(), error = %e, "Provider failed");
                }
                Err(_) => {
                    warn!(url = %url, provider = provider.name(), "Provider timed out");
                }
            }
        }
        Err(HarvestError::AllProvidersFailed {
            url: url.to_string(),
        })
    }
}

/// Shared prompt for all providers: same contract, different backends.
pub(crate) fn event_prompt(url: &str, hints: &InferenceHints) -> String {
    let mut context = String::new();
    if let Some(venue) = &hints.venue_name {
        context.push_str(&format!("The page belongs to the venue \"{}\". ", venue));
    }
    if let Some(city) = &hints.city {
        context.push_str(&format!("The venue is in {}. ", city));
    }
    if let Some(category) = hints.category {
        context.push_str(&format!("The caller is looking for {} events. ", category));
    }

    format!(
        r#"You know about cultural venues and their programming. The page at {url} could not be scraped. {context}Based on the URL and anything you know about this venue's programming, describe the event or exhibition the page covers.

Respond with ONLY a JSON object, no prose, using exactly these keys:
{{
  "title": string or null,
  "description": string or null,
  "location": string or null,
  "start_date": "YYYY-MM-DD" or null,
  "start_time": "HH:MM" (24h) or null,
  "end_date": "YYYY-MM-DD" or null,
  "end_time": "HH:MM" (24h) or null,
  "schedule_text": string or null,
  "confidence": "high" | "medium" | "low"
}}

Use "high" only for well-known, stable programming (a permanent collection, a famous recurring tour). If you cannot identify the event, set title to null and confidence to "low"."#
    )
}

#[derive(Debug, Deserialize)]
struct InferredEvent {
    title: Option<String>,
    description: Option<String>,
    location: Option<String>,
    start_date: Option<String>,
    start_time: Option<String>,
    end_date: Option<String>,
    end_time: Option<String>,
    schedule_text: Option<String>,
    confidence: Option<String>,
}

/// Parse a provider's raw response into an [`ExtractionResult`].
///
/// Tolerates markdown code fences around the JSON. Confidence defaults to
/// medium when the provider does not report one: inferred data is only
/// labeled high on an explicit claim.
pub(crate) fn parse_inference(raw: &str) -> Result<ExtractionResult> {
    let cleaned = strip_code_fences(raw);
    let inferred: InferredEvent = serde_json::from_str(cleaned)?;

    let confidence = inferred
        .confidence
        .as_deref()
        .and_then(|c| c.parse::<Confidence>().ok())
        .unwrap_or(Confidence::Medium);

    let mut result = ExtractionResult::empty(ExtractionTier::LlmInferred, confidence);
    result.title = inferred.title.filter(|t| !t.trim().is_empty());
    result.description = inferred.description;
    result.location_text = inferred.location;
    result.schedule_text = inferred.schedule_text;
    result.start_date = parse_date(inferred.start_date.as_deref());
    result.end_date = parse_date(inferred.end_date.as_deref());
    result.start_time = parse_time(inferred.start_time.as_deref());
    result.end_time = parse_time(inferred.end_time.as_deref());
    Ok(result)
}

fn parse_date(s: Option<&str>) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s?, "%Y-%m-%d").ok()
}

fn parse_time(s: Option<&str>) -> Option<NaiveTime> {
    let s = s?;
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .ok()
}

fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_inference_full() {
        let raw = r#"{
            "title": "Highlights Tour",
            "description": "A docent-led walk through the collection.",
            "location": "Main Lobby",
            "start_date": "2025-12-05",
            "start_time": "14:00",
            "end_date": "2025-12-05",
            "end_time": "15:00",
            "schedule_text": null,
            "confidence": "high"
        }"#;
        let result = parse_inference(raw).unwrap();
        assert_eq!(result.title.as_deref(), Some("Highlights Tour"));
        assert_eq!(result.tier, ExtractionTier::LlmInferred);
        assert_eq!(result.confidence, Confidence::High);
        assert_eq!(
            result.start_date,
            NaiveDate::from_ymd_opt(2025, 12, 5)
        );
        assert_eq!(result.start_time, NaiveTime::from_hms_opt(14, 0, 0));
    }

    #[test]
    fn test_parse_inference_with_code_fence() {
        let raw = "```json\n{\"title\": \"Dutch Masters\", \"description\": null, \"location\": null, \"start_date\": null, \"start_time\": null, \"end_date\": null, \"end_time\": null, \"schedule_text\": \"ongoing\", \"confidence\": null}\n```";
        let result = parse_inference(raw).unwrap();
        assert_eq!(result.title.as_deref(), Some("Dutch Masters"));
        // No explicit confidence claim: clamp to medium
        assert_eq!(result.confidence, Confidence::Medium);
    }

    #[test]
    fn test_parse_inference_rejects_non_json() {
        assert!(parse_inference("I think the page is about Monet.").is_err());
    }

    #[tokio::test]
    async fn test_chain_advances_past_failures() {
        use crate::testing::MockProvider;

        let chain = ProviderChain::new(Duration::from_secs(1))
            .with_provider(Box::new(MockProvider::failing("first")))
            .with_provider(Box::new(MockProvider::succeeding(
                "second",
                "Inferred Exhibit",
            )));

        let result = chain
            .infer("https://museum.org/x", &InferenceHints::default())
            .await
            .unwrap();
        assert_eq!(result.title.as_deref(), Some("Inferred Exhibit"));
    }

    #[tokio::test]
    async fn test_chain_exhaustion() {
        use crate::testing::MockProvider;

        let chain = ProviderChain::new(Duration::from_secs(1))
            .with_provider(Box::new(MockProvider::failing("only")));
        let err = chain
            .infer("https://museum.org/x", &InferenceHints::default())
            .await
            .unwrap_err();
        assert!(matches!(err, HarvestError::AllProvidersFailed { .. }));
    }

    #[tokio::test]
    async fn test_empty_chain_fails() {
        let chain = ProviderChain::new(Duration::from_secs(1));
        assert!(chain
            .infer("https://museum.org/x", &InferenceHints::default())
            .await
            .is_err());
    }
}
