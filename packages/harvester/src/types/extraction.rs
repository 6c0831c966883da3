//! Extraction results and their provenance labels.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::candidate::ListingHint;

/// How a result was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionTier {
    /// Parsed directly out of fetched HTML
    Scraped,
    /// Inferred by a language-model provider
    LlmInferred,
    /// Reassembled from listing-page partial data after all else failed
    ListingFallback,
}

impl ExtractionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scraped => "scraped",
            Self::LlmInferred => "llm_inferred",
            Self::ListingFallback => "listing_fallback",
        }
    }
}

impl std::fmt::Display for ExtractionTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coarse trust label for a result, mostly relevant for inferred data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Confidence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(format!("unknown confidence: {}", s)),
        }
    }
}

/// Structured fields pulled from one page (or inferred for one URL).
///
/// Every field except `tier` and `confidence` is optional; a missing
/// `title` marks the result as unusable and triggers the fallback path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub location_text: Option<String>,
    /// Raw schedule text, handed verbatim to the schedule resolver
    pub schedule_text: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_date: Option<NaiveDate>,
    pub end_time: Option<NaiveTime>,
    pub tier: ExtractionTier,
    pub confidence: Confidence,
}

impl ExtractionResult {
    /// An empty scraped result (nothing found yet).
    pub fn empty(tier: ExtractionTier, confidence: Confidence) -> Self {
        Self {
            title: None,
            description: None,
            image_url: None,
            location_text: None,
            schedule_text: None,
            start_date: None,
            start_time: None,
            end_date: None,
            end_time: None,
            tier,
            confidence,
        }
    }

    /// Build the degraded result used when scraping and inference both
    /// failed but the listing page carried partial data.
    pub fn from_listing_hint(hint: &ListingHint) -> Option<Self> {
        let title = hint.title.clone()?;
        let mut result = Self::empty(ExtractionTier::ListingFallback, Confidence::Low);
        result.title = Some(title);
        result.schedule_text = hint.schedule_text.clone();
        Some(result)
    }

    /// A result without a title is a failed extraction.
    pub fn is_usable(&self) -> bool {
        self.title.as_deref().is_some_and(|t| !t.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usable_requires_title() {
        let mut result = ExtractionResult::empty(ExtractionTier::Scraped, Confidence::High);
        assert!(!result.is_usable());
        result.title = Some("  ".to_string());
        assert!(!result.is_usable());
        result.title = Some("Dutch Masters".to_string());
        assert!(result.is_usable());
    }

    #[test]
    fn test_confidence_round_trip() {
        assert_eq!("high".parse::<Confidence>().unwrap(), Confidence::High);
        assert_eq!(Confidence::Medium.to_string(), "medium");
        assert!("unknown".parse::<Confidence>().is_err());
    }

    #[test]
    fn test_listing_hint_requires_title() {
        assert!(ExtractionResult::from_listing_hint(&ListingHint::default()).is_none());

        let hint = ListingHint {
            title: Some("Gallery Tour".to_string()),
            schedule_text: Some("Fridays 2pm".to_string()),
        };
        let result = ExtractionResult::from_listing_hint(&hint).unwrap();
        assert_eq!(result.tier, ExtractionTier::ListingFallback);
        assert_eq!(result.confidence, Confidence::Low);
        assert_eq!(result.schedule_text.as_deref(), Some("Fridays 2pm"));
    }
}
