//! Per-venue specialized extractors.
//!
//! Some venues have markup quirky enough that the generic heuristics read
//! the wrong fields. Rather than subclassing sprawl, a small registry maps
//! a venue host to a specialized producer that takes priority over the
//! generic extractor. A handler may decline (return `None`) to fall
//! through to the generic path.

use std::collections::HashMap;

use crate::types::ExtractionResult;
use crate::urls;

/// A venue-specific extraction override.
pub trait VenueExtractor: Send + Sync {
    /// Extract from a page of this venue's site, or decline with `None`.
    fn extract(&self, url: &str, html: &str) -> Option<ExtractionResult>;
}

impl<F> VenueExtractor for F
where
    F: Fn(&str, &str) -> Option<ExtractionResult> + Send + Sync,
{
    fn extract(&self, url: &str, html: &str) -> Option<ExtractionResult> {
        self(url, html)
    }
}

/// Registry of specialized extractors keyed by host.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Box<dyn VenueExtractor>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a host ("museum.org" also covers
    /// "www.museum.org").
    pub fn register(&mut self, host: impl Into<String>, handler: Box<dyn VenueExtractor>) {
        self.handlers.insert(host.into().to_lowercase(), handler);
    }

    /// Builder-style registration.
    pub fn with_handler(mut self, host: impl Into<String>, handler: Box<dyn VenueExtractor>) -> Self {
        self.register(host, handler);
        self
    }

    /// Find the handler for a URL, if any.
    pub fn for_url(&self, url: &str) -> Option<&dyn VenueExtractor> {
        let host = urls::host_of(url)?.to_lowercase();
        let bare = host.strip_prefix("www.").unwrap_or(&host);
        self.handlers
            .get(&host)
            .or_else(|| self.handlers.get(bare))
            .map(|h| h.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Confidence, ExtractionTier};

    fn canned(title: &str) -> ExtractionResult {
        let mut result = ExtractionResult::empty(ExtractionTier::Scraped, Confidence::High);
        result.title = Some(title.to_string());
        result
    }

    #[test]
    fn test_handler_lookup_by_host() {
        let registry = HandlerRegistry::new().with_handler(
            "museum.org",
            Box::new(|_: &str, _: &str| Some(canned("Special"))),
        );

        let handler = registry
            .for_url("https://www.museum.org/exhibitions/x")
            .expect("handler");
        let result = handler.extract("https://www.museum.org/exhibitions/x", "<html></html>");
        assert_eq!(result.unwrap().title.as_deref(), Some("Special"));

        assert!(registry.for_url("https://other.org/").is_none());
    }

    #[test]
    fn test_handler_may_decline() {
        let registry = HandlerRegistry::new()
            .with_handler("museum.org", Box::new(|_: &str, _: &str| None));
        let handler = registry.for_url("https://museum.org/a").expect("handler");
        assert!(handler.extract("https://museum.org/a", "").is_none());
    }
}
