//! Duplicate detection for one harvest batch.
//!
//! The fingerprint is (normalized title, venue or source domain, start
//! date), deliberately not the source URL. Many drafts expanded from one
//! listing page legitimately share a URL while describing distinct
//! events, and the same titles recur across venues without being the
//! same event.

use std::collections::HashSet;

use sha2::{Digest, Sha256};

use crate::types::EventDraft;
use crate::urls;

/// Batch-scoped fingerprint index. Single-writer: the pipeline merges
/// completed candidates through it at one point.
#[derive(Debug, Default)]
pub struct DedupIndex {
    seen: HashSet<String>,
}

impl DedupIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a draft; returns false if an equivalent draft was already
    /// seen.
    pub fn insert(&mut self, draft: &EventDraft) -> bool {
        self.seen.insert(fingerprint(draft))
    }

    /// Check without recording.
    pub fn is_duplicate(&self, draft: &EventDraft) -> bool {
        self.seen.contains(&fingerprint(draft))
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

fn fingerprint(draft: &EventDraft) -> String {
    let venue_key = draft
        .venue_id
        .map(|id| id.to_string())
        .or_else(|| urls::host_of(&draft.source_url))
        .unwrap_or_default();

    let mut hasher = Sha256::new();
    hasher.update(normalize_title(&draft.title));
    hasher.update(b"\x1f");
    hasher.update(venue_key);
    hasher.update(b"\x1f");
    hasher.update(draft.start_date.to_string());
    hex::encode(hasher.finalize())
}

/// Lowercase, strip punctuation, collapse whitespace.
fn normalize_title(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Confidence, EventCategory, ExtractionTier};
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn draft(title: &str, venue_id: Option<Uuid>, source_url: &str, day: u32) -> EventDraft {
        EventDraft {
            title: title.to_string(),
            description: None,
            image_url: None,
            start_date: NaiveDate::from_ymd_opt(2025, 12, day).unwrap(),
            start_time: None,
            end_date: None,
            end_time: None,
            location_text: None,
            venue_id,
            city_id: None,
            source_url: source_url.to_string(),
            event_type: EventCategory::Any,
            tier: ExtractionTier::Scraped,
            confidence: Confidence::High,
        }
    }

    #[test]
    fn test_same_url_different_events_not_merged() {
        let mut index = DedupIndex::new();
        let listing = "https://museum.org/exhibitions";
        assert!(index.insert(&draft("Monet in Focus", None, listing, 5)));
        assert!(index.insert(&draft("Dutch Masters", None, listing, 6)));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_same_identity_different_incidentals_merged() {
        let mut index = DedupIndex::new();
        let venue = Some(Uuid::from_u128(7));
        assert!(index.insert(&draft("Highlights Tour", venue, "https://a.org/p1", 5)));
        // Same normalized title, venue and date; different URL and casing
        assert!(!index.insert(&draft("highlights tour!", venue, "https://a.org/p2", 5)));
    }

    #[test]
    fn test_same_title_across_venues_not_merged() {
        let mut index = DedupIndex::new();
        assert!(index.insert(&draft(
            "Highlights Tour",
            Some(Uuid::from_u128(1)),
            "https://a.org/t",
            5
        )));
        assert!(index.insert(&draft(
            "Highlights Tour",
            Some(Uuid::from_u128(2)),
            "https://b.org/t",
            5
        )));
    }

    #[test]
    fn test_domain_fallback_when_unattributed() {
        let mut index = DedupIndex::new();
        assert!(index.insert(&draft("Open Studio", None, "https://a.org/x", 5)));
        assert!(!index.insert(&draft("Open Studio", None, "https://a.org/y", 5)));
        assert!(index.insert(&draft("Open Studio", None, "https://b.org/x", 5)));
    }

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("  Monet — in   Focus! "), "monet in focus");
    }
}
