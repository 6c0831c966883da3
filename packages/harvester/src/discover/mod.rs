//! Candidate page discovery.
//!
//! Four independent strategies run against a venue's site and their
//! results are unioned, scored by agreement, validated against a
//! blocklist and capped. Discovery is bounded and best-effort: it only
//! has to beat the no-discovery baseline, never to find every page.

mod navigation;
mod patterns;
mod sitemap;
mod structure;

use std::collections::HashMap;

use scraper::Html;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::HarvestError;
use crate::fetch::Fetch;
use crate::schedule;
use crate::types::{DiscoveryCandidate, DiscoveryStrategy, EventCategory, ListingHint};
use crate::urls;

/// Cap on listing pages any single strategy will expand one level deep.
const MAX_LISTING_EXPANSIONS: usize = 3;

/// A URL found by a strategy, with optional listing-page partial data.
#[derive(Debug, Clone)]
pub(crate) struct Found {
    pub url: String,
    pub hint: ListingHint,
}

impl Found {
    fn bare(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            hint: ListingHint::default(),
        }
    }
}

/// Runs the discovery strategies for one venue.
pub struct PageDiscoverer<'a, F: Fetch> {
    fetcher: &'a F,
}

impl<'a, F: Fetch> PageDiscoverer<'a, F> {
    pub fn new(fetcher: &'a F) -> Self {
        Self { fetcher }
    }

    /// Produce a ranked, deduplicated set of candidate URLs, at most
    /// `max_pages` of them.
    pub async fn discover(
        &self,
        base_url: &str,
        category: EventCategory,
        max_pages: usize,
    ) -> Vec<DiscoveryCandidate> {
        let base = match Url::parse(&urls::ensure_scheme(base_url)) {
            Ok(u) => u,
            Err(e) => {
                warn!(base_url = %base_url, error = %e, "Invalid base URL");
                return Vec::new();
            }
        };

        let base_outcome = self.fetcher.fetch(base.as_str()).await;
        let base_html = base_outcome.raw_html.clone().unwrap_or_default();

        // The strategies are independent and read-only; run them together
        let (from_sitemap, from_nav, from_patterns, from_structure) = futures::join!(
            sitemap::discover(self.fetcher, &base, category),
            navigation::discover(self.fetcher, &base, &base_html, category),
            patterns::discover(self.fetcher, &base, category),
            structure::discover(self.fetcher, &base, &base_html, category),
        );

        info!(
            base_url = %base,
            sitemap = from_sitemap.len(),
            navigation = from_nav.len(),
            url_pattern = from_patterns.len(),
            structure = from_structure.len(),
            "Discovery strategies completed"
        );

        let base_self = urls::normalize(&base);
        let mut by_url: HashMap<String, usize> = HashMap::new();
        let mut candidates: Vec<DiscoveryCandidate> = Vec::new();

        let mut merge = |found: Vec<Found>, strategy: DiscoveryStrategy| {
            for f in found {
                if f.url == base_self || urls::is_blocked_section(&f.url) {
                    continue;
                }
                match by_url.get(&f.url) {
                    Some(&idx) => {
                        candidates[idx].score += 1;
                        if candidates[idx].listing_hint.is_empty() && !f.hint.is_empty() {
                            candidates[idx].listing_hint = f.hint;
                        }
                    }
                    None => {
                        by_url.insert(f.url.clone(), candidates.len());
                        candidates.push(DiscoveryCandidate::new(f.url, strategy).with_hint(f.hint));
                    }
                }
            }
        };

        merge(from_sitemap, DiscoveryStrategy::Sitemap);
        merge(from_nav, DiscoveryStrategy::Navigation);
        merge(from_patterns, DiscoveryStrategy::UrlPattern);
        merge(from_structure, DiscoveryStrategy::Structure);

        candidates.sort_by(|a, b| b.score.cmp(&a.score));
        candidates.truncate(max_pages);

        if candidates.is_empty() {
            // Last resort, and an explicit one: harvest every outbound
            // link from the base page rather than silently returning
            // nothing.
            let error = HarvestError::DiscoveryEmpty {
                base_url: base.to_string(),
            };
            warn!(error = %error, "No strategy found candidates, harvesting base page links");
            return self.harvest_base_links(&base, &base_html, max_pages);
        }

        candidates
    }

    fn harvest_base_links(
        &self,
        base: &Url,
        base_html: &str,
        max_pages: usize,
    ) -> Vec<DiscoveryCandidate> {
        let document = Html::parse_document(base_html);
        let base_self = urls::normalize(base);
        let mut seen = std::collections::HashSet::new();
        urls::same_domain_links(&document, base)
            .into_iter()
            .filter(|(url, _)| *url != base_self && !urls::is_blocked_section(url))
            .filter(|(url, _)| seen.insert(url.clone()))
            .take(max_pages)
            .map(|(url, text)| {
                let hint = ListingHint {
                    title: (!text.is_empty()).then_some(text),
                    schedule_text: None,
                };
                DiscoveryCandidate::new(url, DiscoveryStrategy::LinkHarvest).with_hint(hint)
            })
            .collect()
    }
}

/// Fetch a matched listing page once and harvest its outbound links as
/// second-level candidates (depth 1, per strategy contract). Anchor text
/// and adjacent date-ish text ride along as listing hints.
pub(crate) async fn harvest_listing<F: Fetch>(
    fetcher: &F,
    listing_url: &str,
    base: &Url,
    category: EventCategory,
) -> Vec<Found> {
    let outcome = fetcher.fetch(listing_url).await;
    let Some(html) = outcome.raw_html else {
        debug!(url = %listing_url, status = ?outcome.status, "Listing fetch failed");
        return Vec::new();
    };

    let listing_path = Url::parse(listing_url)
        .map(|u| u.path().trim_end_matches('/').to_string())
        .unwrap_or_default();

    let document = Html::parse_document(&html);
    let mut found = Vec::new();

    for (url, anchor_text) in links_with_context(&document, base) {
        if url == listing_url {
            continue;
        }
        let path = Url::parse(&url).map(|u| u.path().to_string()).unwrap_or_default();
        // Children of the listing path, or anything category-flavored
        let is_child = !listing_path.is_empty() && path.starts_with(&listing_path) && path != listing_path;
        if !is_child && !category.matches(&path) && !category.matches(&anchor_text.0) {
            continue;
        }
        found.push(Found {
            url,
            hint: ListingHint {
                title: (!anchor_text.0.is_empty()).then_some(anchor_text.0),
                schedule_text: anchor_text.1,
            },
        });
    }

    found
}

/// Same-domain links paired with (anchor text, nearby schedule-ish text).
fn links_with_context(document: &Html, base: &Url) -> Vec<(String, (String, Option<String>))> {
    let Ok(selector) = scraper::Selector::parse("a[href]") else {
        return Vec::new();
    };
    let base_domain = base.domain().unwrap_or("");

    document
        .select(&selector)
        .filter_map(|el| {
            let href = el.value().attr("href")?;
            let resolved = base.join(href).ok()?;
            if resolved.domain() != Some(base_domain) || urls::is_skip_path(resolved.path()) {
                return None;
            }
            let text = el
                .text()
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ");
            let nearby = el
                .parent()
                .and_then(scraper::ElementRef::wrap)
                .map(|parent| {
                    parent
                        .text()
                        .collect::<String>()
                        .split_whitespace()
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .filter(|t| t.len() <= 300 && schedule::looks_like_schedule(t));
            Some((urls::normalize(&resolved), (text, nearby)))
        })
        .collect()
}
