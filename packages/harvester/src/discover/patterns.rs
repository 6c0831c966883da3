//! URL-pattern discovery strategy.
//!
//! Probes a fixed list of conventional paths with cheap existence checks;
//! paths that respond are kept and expanded one level as listing pages.

use tracing::debug;
use url::Url;

use super::{harvest_listing, Found, MAX_LISTING_EXPANSIONS};
use crate::fetch::Fetch;
use crate::types::EventCategory;
use crate::urls;

pub(super) async fn discover<F: Fetch>(
    fetcher: &F,
    base: &Url,
    category: EventCategory,
) -> Vec<Found> {
    let mut found: Vec<Found> = Vec::new();
    let mut expanded = 0usize;

    for path in category.probe_paths() {
        let Ok(probe_url) = base.join(path) else {
            continue;
        };
        let probe_url = urls::normalize(&probe_url);
        if !fetcher.probe(&probe_url).await {
            continue;
        }
        debug!(url = %probe_url, "Conventional path exists");
        found.push(Found::bare(probe_url.clone()));

        if expanded < MAX_LISTING_EXPANSIONS {
            expanded += 1;
            found.extend(harvest_listing(fetcher, &probe_url, base, category).await);
        }
    }

    found
}
