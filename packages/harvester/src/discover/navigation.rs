//! Navigation discovery strategy.
//!
//! Scans the base page's navigation regions for links whose anchor text
//! or href matches the category; matched links that are themselves
//! listing pages are fetched once and their outbound links harvested as
//! second-level candidates.

use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use super::{harvest_listing, Found, MAX_LISTING_EXPANSIONS};
use crate::fetch::Fetch;
use crate::types::{EventCategory, ListingHint};
use crate::urls;

pub(super) async fn discover<F: Fetch>(
    fetcher: &F,
    base: &Url,
    base_html: &str,
    category: EventCategory,
) -> Vec<Found> {
    // Parse and drop the DOM before any await: Html is not Send
    let matched = nav_links(base, base_html, category);
    if matched.is_empty() {
        return Vec::new();
    }
    debug!(count = matched.len(), "Navigation links matched");

    let mut found: Vec<Found> = Vec::new();
    for (url, text) in &matched {
        found.push(Found {
            url: url.clone(),
            hint: ListingHint {
                title: (!text.is_empty()).then(|| text.clone()),
                schedule_text: None,
            },
        });
    }

    // Matched nav links usually point at listing pages; expand a bounded
    // number of them one level.
    for (url, _) in matched.iter().take(MAX_LISTING_EXPANSIONS) {
        found.extend(harvest_listing(fetcher, url, base, category).await);
    }

    found
}

fn nav_links(base: &Url, base_html: &str, category: EventCategory) -> Vec<(String, String)> {
    let document = Html::parse_document(base_html);
    let Ok(selector) =
        Selector::parse("nav a[href], header a[href], [role='navigation'] a[href]")
    else {
        return Vec::new();
    };

    let base_domain = base.domain().unwrap_or("");
    let mut seen = std::collections::HashSet::new();
    let mut links = Vec::new();

    for el in document.select(&selector) {
        let Some(href) = el.value().attr("href") else {
            continue;
        };
        let Ok(resolved) = base.join(href) else {
            continue;
        };
        if resolved.domain() != Some(base_domain) || urls::is_skip_path(resolved.path()) {
            continue;
        }
        let text = el
            .text()
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        if !category.matches(&text) && !category.matches(resolved.path()) {
            continue;
        }
        let normalized = urls::normalize(&resolved);
        if seen.insert(normalized.clone()) {
            links.push((normalized, text));
        }
    }

    links
}
