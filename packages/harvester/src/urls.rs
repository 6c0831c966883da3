//! URL normalization and link harvesting shared by discovery and dedup.

use scraper::{Html, Selector};
use url::Url;

/// Paths that never describe events (assets, auth, commerce, boilerplate).
const SKIP_PATTERNS: &[&str] = &[
    "/wp-admin",
    "/wp-login",
    "/wp-content/uploads",
    "/login",
    "/logout",
    "/signin",
    "/signout",
    "/auth",
    "/api/",
    "/cdn-cgi/",
    "/feed",
    "/rss",
    ".pdf",
    ".jpg",
    ".jpeg",
    ".png",
    ".gif",
    ".svg",
    ".css",
    ".js",
    ".json",
];

/// Non-event site sections dropped by the post-union validation filter.
const BLOCKED_SECTIONS: &[&str] = &[
    "/contact",
    "/shop",
    "/store",
    "/donate",
    "/support-us",
    "/membership",
    "/jobs",
    "/careers",
    "/press",
    "/privacy",
    "/terms",
    "/accessibility",
    "/newsletter",
];

/// Add https:// if no scheme is present.
pub fn ensure_scheme(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

/// Normalize: drop query and fragment, trim trailing slash.
pub fn normalize(url: &Url) -> String {
    let mut normalized = url.clone();
    normalized.set_query(None);
    normalized.set_fragment(None);
    let path = normalized.path().trim_end_matches('/').to_string();
    normalized.set_path(if path.is_empty() { "/" } else { &path });
    normalized.to_string()
}

/// Check if a path points at assets, auth, or machine endpoints.
pub fn is_skip_path(path: &str) -> bool {
    let lower = path.to_lowercase();
    SKIP_PATTERNS.iter().any(|p| lower.contains(p))
}

/// Check if a path belongs to a site section that never lists events.
pub fn is_blocked_section(path: &str) -> bool {
    let lower = path.to_lowercase();
    BLOCKED_SECTIONS.iter().any(|p| lower.contains(p))
}

/// Extract same-domain links with their anchor text, normalized and
/// filtered through the skip list.
pub fn same_domain_links(document: &Html, base_url: &Url) -> Vec<(String, String)> {
    let link_selector = match Selector::parse("a[href]") {
        Ok(s) => s,
        Err(_) => return vec![],
    };

    let base_domain = base_url.domain().unwrap_or("");

    document
        .select(&link_selector)
        .filter_map(|el| {
            let href = el.value().attr("href")?;
            let resolved = base_url.join(href).ok()?;
            if resolved.domain() != Some(base_domain)
                || !(resolved.scheme() == "http" || resolved.scheme() == "https")
                || is_skip_path(resolved.path())
            {
                return None;
            }
            let text = el
                .text()
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ");
            Some((normalize(&resolved), text))
        })
        .collect()
}

/// Host of a URL, for dedup keys on unattributed drafts.
pub fn host_of(url: &str) -> Option<String> {
    Url::parse(url).ok()?.host_str().map(|h| h.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_scheme() {
        assert_eq!(ensure_scheme("example.org"), "https://example.org");
        assert_eq!(ensure_scheme("http://example.org"), "http://example.org");
    }

    #[test]
    fn test_is_skip_path() {
        assert!(is_skip_path("/wp-admin/"));
        assert!(is_skip_path("/hero.jpg"));
        assert!(is_skip_path("/api/v2/events"));
        assert!(!is_skip_path("/exhibitions/monet"));
    }

    #[test]
    fn test_is_blocked_section() {
        assert!(is_blocked_section("/shop/prints"));
        assert!(is_blocked_section("/about/jobs"));
        assert!(!is_blocked_section("/tours/highlights"));
    }

    #[test]
    fn test_normalize_strips_query_and_slash() {
        let url = Url::parse("https://museum.org/exhibitions/?utm=x#top").unwrap();
        assert_eq!(normalize(&url), "https://museum.org/exhibitions");
    }

    #[test]
    fn test_same_domain_links() {
        let html = r#"
            <a href="/exhibitions/monet">Monet in Focus</a>
            <a href="https://other.org/x">External</a>
            <a href="/logo.png">Logo</a>
        "#;
        let document = Html::parse_document(html);
        let base = Url::parse("https://museum.org/").unwrap();
        let links = same_domain_links(&document, &base);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].0, "https://museum.org/exhibitions/monet");
        assert_eq!(links[0].1, "Monet in Focus");
    }

    #[test]
    fn test_host_of() {
        assert_eq!(
            host_of("https://museum.org/tours").as_deref(),
            Some("museum.org")
        );
        assert!(host_of("not a url").is_none());
    }
}
