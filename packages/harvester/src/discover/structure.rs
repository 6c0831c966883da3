//! Structure discovery strategy.
//!
//! Inspects breadcrumbs and "view all / see all" anchors on the base page
//! for additional listing pages.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use super::{harvest_listing, Found};
use crate::fetch::Fetch;
use crate::types::EventCategory;
use crate::urls;

lazy_static! {
    static ref VIEW_ALL_RE: Regex = Regex::new(
        r"(?i)\b(view all|see all|all exhibitions|all tours|all events|full calendar|browse all)\b"
    )
    .expect("view-all regex");
}

/// "View all" anchors expanded at most this many times.
const MAX_STRUCTURE_EXPANSIONS: usize = 2;

pub(super) async fn discover<F: Fetch>(
    fetcher: &F,
    base: &Url,
    base_html: &str,
    category: EventCategory,
) -> Vec<Found> {
    let listing_urls = structure_links(base, base_html, category);
    if listing_urls.is_empty() {
        return Vec::new();
    }

    let mut found: Vec<Found> = listing_urls.iter().cloned().map(Found::bare).collect();
    for url in listing_urls.iter().take(MAX_STRUCTURE_EXPANSIONS) {
        found.extend(harvest_listing(fetcher, url, base, category).await);
    }
    found
}

fn structure_links(base: &Url, base_html: &str, category: EventCategory) -> Vec<String> {
    let document = Html::parse_document(base_html);
    let base_domain = base.domain().unwrap_or("");
    let mut seen = std::collections::HashSet::new();
    let mut links = Vec::new();

    let mut consider = |href: &str, text: &str, require_category: bool| {
        let Ok(resolved) = base.join(href) else {
            return;
        };
        if resolved.domain() != Some(base_domain) || urls::is_skip_path(resolved.path()) {
            return;
        }
        if require_category && !category.matches(text) && !category.matches(resolved.path()) {
            return;
        }
        let normalized = urls::normalize(&resolved);
        if seen.insert(normalized.clone()) {
            links.push(normalized);
        }
    };

    // Breadcrumb trails often point back at the section listing
    if let Ok(selector) =
        Selector::parse("[class*='breadcrumb'] a[href], [aria-label='breadcrumb'] a[href]")
    {
        for el in document.select(&selector) {
            if let Some(href) = el.value().attr("href") {
                let text = el.text().collect::<String>();
                consider(href, text.trim(), true);
            }
        }
    }

    // "View all" / "see all" anchors anywhere on the page
    if let Ok(selector) = Selector::parse("a[href]") {
        for el in document.select(&selector) {
            let text = el
                .text()
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ");
            if VIEW_ALL_RE.is_match(&text) {
                if let Some(href) = el.value().attr("href") {
                    consider(href, &text, false);
                }
            }
        }
    }

    links
}
