//! Discovery candidates produced by the page discoverer.

use serde::{Deserialize, Serialize};

/// Which discovery strategy surfaced a candidate URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryStrategy {
    /// Found in sitemap.xml (or a nested sitemap index)
    Sitemap,
    /// Found in top-level navigation, or one level below a matched nav link
    Navigation,
    /// Probed from a conventional path like `/exhibitions`
    UrlPattern,
    /// Found via breadcrumbs or "view all" anchors
    Structure,
    /// Last-resort harvest of all outbound links from the base page
    LinkHarvest,
}

impl DiscoveryStrategy {
    /// String representation (for logging and serialization).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sitemap => "sitemap",
            Self::Navigation => "navigation",
            Self::UrlPattern => "url_pattern",
            Self::Structure => "structure",
            Self::LinkHarvest => "link_harvest",
        }
    }
}

impl std::fmt::Display for DiscoveryStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Partial data carried over from the listing page that linked to a
/// candidate. Used by the pipeline's last degrade step when both scraping
/// and inference fail for the detail page itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingHint {
    /// Anchor text of the link that pointed here
    pub title: Option<String>,
    /// Date-ish text found near the link, verbatim
    pub schedule_text: Option<String>,
}

impl ListingHint {
    /// True if the hint carries anything usable.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.schedule_text.is_none()
    }
}

/// A candidate detail-page URL, scored and attributed to its strategy.
///
/// Candidates live for one extraction pass and are never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryCandidate {
    pub url: String,
    pub discovered_via: DiscoveryStrategy,
    /// Number of strategies that independently surfaced this URL.
    pub score: u32,
    #[serde(default)]
    pub listing_hint: ListingHint,
}

impl DiscoveryCandidate {
    pub fn new(url: impl Into<String>, discovered_via: DiscoveryStrategy) -> Self {
        Self {
            url: url.into(),
            discovered_via,
            score: 1,
            listing_hint: ListingHint::default(),
        }
    }

    /// Attach listing-page partial data.
    pub fn with_hint(mut self, hint: ListingHint) -> Self {
        self.listing_hint = hint;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_display() {
        assert_eq!(DiscoveryStrategy::UrlPattern.to_string(), "url_pattern");
        assert_eq!(DiscoveryStrategy::Sitemap.as_str(), "sitemap");
    }

    #[test]
    fn test_empty_hint() {
        assert!(ListingHint::default().is_empty());
        let hint = ListingHint {
            title: Some("Monet in Focus".to_string()),
            schedule_text: None,
        };
        assert!(!hint.is_empty());
    }
}
