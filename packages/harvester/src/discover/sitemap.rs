//! Sitemap discovery strategy.
//!
//! Fetches the conventional sitemap locations, recursively expands
//! sitemap-of-sitemaps, and keeps URLs whose path carries category
//! keywords.

use std::collections::{HashSet, VecDeque};

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;
use url::Url;

use super::Found;
use crate::fetch::Fetch;
use crate::types::EventCategory;
use crate::urls;

lazy_static! {
    static ref LOC_RE: Regex = Regex::new(r"(?is)<loc>\s*([^<]+?)\s*</loc>").expect("loc regex");
}

const SITEMAP_PATHS: &[&str] = &["/sitemap.xml", "/sitemap_index.xml", "/sitemap-index.xml"];

/// Nested sitemap indexes expanded at most this deep.
const MAX_SITEMAP_DEPTH: usize = 2;

/// Hard cap so a pathological sitemap cannot flood the union.
const MAX_SITEMAP_URLS: usize = 200;

pub(super) async fn discover<F: Fetch>(
    fetcher: &F,
    base: &Url,
    category: EventCategory,
) -> Vec<Found> {
    let mut queue: VecDeque<(String, usize)> = SITEMAP_PATHS
        .iter()
        .filter_map(|path| base.join(path).ok())
        .map(|u| (u.to_string(), 0))
        .collect();

    let mut visited: HashSet<String> = HashSet::new();
    let mut found: Vec<Found> = Vec::new();
    let mut kept: HashSet<String> = HashSet::new();

    while let Some((sitemap_url, depth)) = queue.pop_front() {
        if !visited.insert(sitemap_url.clone()) || found.len() >= MAX_SITEMAP_URLS {
            continue;
        }

        let outcome = fetcher.fetch(&sitemap_url).await;
        let Some(xml) = outcome.raw_html else {
            debug!(url = %sitemap_url, status = ?outcome.status, "Sitemap fetch failed");
            continue;
        };

        for caps in LOC_RE.captures_iter(&xml) {
            let loc = caps[1].trim();
            let Ok(loc_url) = Url::parse(loc) else {
                continue;
            };
            if loc_url.domain() != base.domain() {
                continue;
            }

            if loc_url.path().to_lowercase().ends_with(".xml") {
                if depth < MAX_SITEMAP_DEPTH {
                    queue.push_back((loc_url.to_string(), depth + 1));
                }
                continue;
            }

            if category.matches(loc_url.path()) && !urls::is_skip_path(loc_url.path()) {
                let normalized = urls::normalize(&loc_url);
                if kept.insert(normalized.clone()) {
                    found.push(Found::bare(normalized));
                }
            }
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{FetchOutcome, FetchStatus};
    use crate::testing::MockFetcher;

    #[tokio::test]
    async fn test_sitemap_index_recursion_and_filtering() {
        let fetcher = MockFetcher::new()
            .with_outcome(
                "https://museum.org/sitemap.xml",
                FetchOutcome::ok(
                    r#"<sitemapindex>
                        <sitemap><loc>https://museum.org/sitemap-pages.xml</loc></sitemap>
                    </sitemapindex>"#
                        .to_string(),
                    200,
                ),
            )
            .with_outcome(
                "https://museum.org/sitemap-pages.xml",
                FetchOutcome::ok(
                    r#"<urlset>
                        <url><loc>https://museum.org/exhibitions/monet</loc></url>
                        <url><loc>https://museum.org/shop/prints</loc></url>
                        <url><loc>https://other.org/exhibitions/x</loc></url>
                    </urlset>"#
                        .to_string(),
                    200,
                ),
            )
            .with_default(FetchOutcome::failed(FetchStatus::NotFound, Some(404)));

        let base = Url::parse("https://museum.org/").unwrap();
        let found = discover(&fetcher, &base, EventCategory::Exhibition).await;

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].url, "https://museum.org/exhibitions/monet");
    }

    #[tokio::test]
    async fn test_missing_sitemap_is_empty_not_error() {
        let fetcher =
            MockFetcher::new().with_default(FetchOutcome::failed(FetchStatus::NotFound, Some(404)));
        let base = Url::parse("https://museum.org/").unwrap();
        assert!(discover(&fetcher, &base, EventCategory::Any).await.is_empty());
    }
}
