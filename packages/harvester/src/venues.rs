//! Venue registry lookup and location matching.
//!
//! The registry is external and read-only to this engine. A failed match
//! is a legitimate outcome, not an error: city-wide and unattributed
//! events are valid.

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::types::VenueRecord;

/// Read-only venue lookup boundary.
#[async_trait]
pub trait VenueRegistry: Send + Sync {
    /// Case-insensitive substring match against known venue names;
    /// first match wins.
    async fn lookup_by_name_substring(&self, text: &str) -> Option<VenueRecord>;
}

/// Map a free-text location onto a venue, retrying with a leading
/// definite article stripped.
pub async fn match_venue(
    location_text: &str,
    registry: &dyn VenueRegistry,
) -> (Option<Uuid>, Option<Uuid>) {
    let text = location_text.trim();
    if text.is_empty() {
        return (None, None);
    }

    if let Some(venue) = registry.lookup_by_name_substring(text).await {
        debug!(location = %text, venue = %venue.name, "Venue matched");
        return (Some(venue.id), venue.city_id);
    }

    if let Some(stripped) = strip_definite_article(text) {
        if let Some(venue) = registry.lookup_by_name_substring(stripped).await {
            debug!(location = %text, venue = %venue.name, "Venue matched after article strip");
            return (Some(venue.id), venue.city_id);
        }
    }

    (None, None)
}

fn strip_definite_article(text: &str) -> Option<&str> {
    let lower = text.to_lowercase();
    lower.starts_with("the ").then(|| text[4..].trim_start())
}

/// In-memory registry over a fixed venue list.
#[derive(Debug, Clone, Default)]
pub struct StaticVenueRegistry {
    venues: Vec<VenueRecord>,
}

impl StaticVenueRegistry {
    pub fn new(venues: Vec<VenueRecord>) -> Self {
        Self { venues }
    }
}

#[async_trait]
impl VenueRegistry for StaticVenueRegistry {
    async fn lookup_by_name_substring(&self, text: &str) -> Option<VenueRecord> {
        let needle = text.to_lowercase();
        self.venues
            .iter()
            .find(|v| {
                let name = v.name.to_lowercase();
                needle.contains(&name) || name.contains(&needle)
            })
            .cloned()
    }
}
