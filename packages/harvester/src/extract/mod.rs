//! Heuristic field extraction from one fetched page.
//!
//! A pure function of the page content: malformed HTML never raises, any
//! field that cannot be found is simply `None`. A result with no title is
//! treated as a failed extraction upstream.

pub mod handlers;

pub use handlers::{HandlerRegistry, VenueExtractor};

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use crate::schedule;
use crate::types::{Confidence, ExtractionResult, ExtractionTier};

lazy_static! {
    static ref MEET_AT_RE: Regex = Regex::new(
        r"(?i)\b(?:meet at|meeting (?:point|location)|location:|meet in)\s*[:\-]?\s*(.{3,80})"
    )
    .expect("meet-at regex");
    static ref ROOM_RE: Regex = Regex::new(
        r"(?i)\b(?:gallery|galleries|room|hall|wing|floor)\s+[\w\d]+\b|\brotunda\b|\batrium\b|\bauditorium\b"
    )
    .expect("room regex");
}

/// Minimum length for a paragraph to count as a description.
const MIN_DESCRIPTION_LEN: usize = 80;

/// Extract structured fields from a page.
///
/// `description_limit` caps the description length in characters.
pub fn extract(url: &str, html: &str, description_limit: usize) -> ExtractionResult {
    let document = Html::parse_document(html);
    let base_url = Url::parse(url).ok();

    let mut result = ExtractionResult::empty(ExtractionTier::Scraped, Confidence::High);
    result.title = extract_title(&document);
    result.description = extract_description(&document, description_limit);
    result.image_url = extract_image(&document, base_url.as_ref());
    result.location_text = extract_location(&document);
    result.schedule_text = extract_schedule_text(&document);
    result
}

/// Prefer the most specific on-page heading over `<title>`: listing-style
/// chrome often repeats the venue name in the page title and h1.
fn extract_title(document: &Html) -> Option<String> {
    let page_title = select_text(document, "title");
    let site_name = page_title.as_deref().map(site_name_of);

    let h1 = select_text(document, "main h1, article h1, h1");
    let h2 = select_text(document, "main h2, article h2, h2");

    // An h1 echoing the site name is chrome; step down to the h2
    if let (Some(h1_text), Some(site)) = (h1.as_deref(), site_name.as_deref()) {
        if texts_overlap(h1_text, site) {
            if let Some(h2_text) = h2 {
                return Some(h2_text);
            }
        }
    }

    h1.or(h2)
        .or_else(|| page_title.map(|t| strip_site_suffix(&t)))
        .filter(|t| !t.is_empty())
}

fn extract_description(document: &Html, limit: usize) -> Option<String> {
    let selector = Selector::parse("main p, article p, .content p, p").ok()?;
    for el in document.select(&selector) {
        let text = normalize_ws(&el.text().collect::<String>());
        if text.len() < MIN_DESCRIPTION_LEN {
            continue;
        }
        let lower = text.to_lowercase();
        if lower.contains("cookie")
            || lower.contains("newsletter")
            || lower.contains("subscribe")
            || lower.contains("all rights reserved")
        {
            continue;
        }
        return Some(truncate_chars(&text, limit));
    }
    None
}

/// Prefer the Open-Graph share image; otherwise the first content image
/// that is plausibly not a logo or icon.
fn extract_image(document: &Html, base_url: Option<&Url>) -> Option<String> {
    if let Ok(selector) = Selector::parse(r#"meta[property="og:image"], meta[name="og:image"]"#) {
        if let Some(content) = document
            .select(&selector)
            .next()
            .and_then(|el| el.value().attr("content"))
        {
            return resolve_src(content, base_url);
        }
    }

    let selector = Selector::parse("main img, article img, .content img, img").ok()?;
    for el in document.select(&selector) {
        let Some(src) = el.value().attr("src") else {
            continue;
        };
        let lower = src.to_lowercase();
        if lower.starts_with("data:")
            || lower.ends_with(".svg")
            || lower.contains("logo")
            || lower.contains("icon")
            || lower.contains("sprite")
        {
            continue;
        }
        return resolve_src(src, base_url);
    }
    None
}

fn extract_location(document: &Html) -> Option<String> {
    for text in content_texts(document) {
        if let Some(caps) = MEET_AT_RE.captures(&text) {
            return Some(normalize_ws(caps.get(1)?.as_str()));
        }
    }
    // Second pass: a bare gallery/room token near schedule text
    for text in content_texts(document) {
        if let Some(m) = ROOM_RE.find(&text) {
            return Some(m.as_str().to_string());
        }
    }
    None
}

/// First text chunk carrying day-of-week or time tokens, verbatim.
fn extract_schedule_text(document: &Html) -> Option<String> {
    content_texts(document)
        .into_iter()
        .find(|t| t.len() <= 300 && schedule::looks_like_schedule(t))
}

/// Flattened text of schedule-bearing elements, document order.
fn content_texts(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse("time, p, li, h2, h3, h4, h5, dd, span, figcaption") else {
        return Vec::new();
    };
    document
        .select(&selector)
        .map(|el| normalize_ws(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty())
        .collect()
}

fn select_text(document: &Html, selectors: &str) -> Option<String> {
    let selector = Selector::parse(selectors).ok()?;
    document
        .select(&selector)
        .map(|el| normalize_ws(&el.text().collect::<String>()))
        .find(|t| !t.is_empty())
}

/// Last segment of a page title like "Monet in Focus | The Example Museum".
fn site_name_of(page_title: &str) -> String {
    page_title
        .rsplit(['|', '\u{2013}', '\u{2014}'])
        .next()
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| page_title.trim().to_string())
}

/// First segment of a page title, with any site-name suffix removed.
fn strip_site_suffix(page_title: &str) -> String {
    page_title
        .split(['|', '\u{2013}', '\u{2014}'])
        .next()
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| page_title.trim().to_string())
}

/// Titles that are section navigation rather than an event. A listing
/// page scraped whole reports its section heading as the title, and any
/// schedule text nearby belongs to a linked event, not the page.
pub(crate) fn is_section_chrome(title: &str) -> bool {
    const SECTION_TITLES: &[&str] = &[
        "exhibition",
        "exhibitions",
        "current exhibitions",
        "upcoming exhibitions",
        "on view",
        "tour",
        "tours",
        "event",
        "events",
        "upcoming events",
        "calendar",
        "what's on",
        "whats on",
        "programs",
        "visit",
        "plan your visit",
    ];
    let norm = title.trim().trim_end_matches([':', '.']).to_lowercase();
    SECTION_TITLES.contains(&norm.as_str())
}

fn texts_overlap(a: &str, b: &str) -> bool {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    !a.is_empty() && !b.is_empty() && (a.contains(&b) || b.contains(&a))
}

fn normalize_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => {
            let mut out = text[..idx].trim_end().to_string();
            out.push('\u{2026}');
            out
        }
        None => text.to_string(),
    }
}

fn resolve_src(src: &str, base_url: Option<&Url>) -> Option<String> {
    match base_url {
        Some(base) => base.join(src).ok().map(|u| u.to_string()),
        None => Some(src.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DETAIL_PAGE: &str = r#"
        <html>
        <head>
            <title>The Example Museum</title>
            <meta property="og:image" content="/images/monet-hero.jpg" />
        </head>
        <body>
            <header><h1>The Example Museum</h1></header>
            <main>
                <h2>Monet in Focus</h2>
                <p>A once-in-a-generation gathering of late water-lily canvases,
                   tracing the painter's final decade through loans from four
                   continents and rarely seen studio material.</p>
                <p>Fridays, 6:30 - 7:30 PM</p>
                <p>Meet at Gallery 534</p>
                <img src="/logo.png" />
                <img src="/images/inline.jpg" />
            </main>
        </body>
        </html>
    "#;

    #[test]
    fn test_prefers_specific_heading_over_chrome() {
        let result = extract("https://museum.org/exhibitions/monet", DETAIL_PAGE, 600);
        assert_eq!(result.title.as_deref(), Some("Monet in Focus"));
        assert_eq!(result.tier, ExtractionTier::Scraped);
    }

    #[test]
    fn test_og_image_wins_and_resolves() {
        let result = extract("https://museum.org/exhibitions/monet", DETAIL_PAGE, 600);
        assert_eq!(
            result.image_url.as_deref(),
            Some("https://museum.org/images/monet-hero.jpg")
        );
    }

    #[test]
    fn test_description_skips_short_blocks() {
        let result = extract("https://museum.org/exhibitions/monet", DETAIL_PAGE, 600);
        let description = result.description.expect("description");
        assert!(description.starts_with("A once-in-a-generation"));
    }

    #[test]
    fn test_location_meet_at() {
        let result = extract("https://museum.org/exhibitions/monet", DETAIL_PAGE, 600);
        assert_eq!(result.location_text.as_deref(), Some("Gallery 534"));
    }

    #[test]
    fn test_schedule_text_found() {
        let result = extract("https://museum.org/exhibitions/monet", DETAIL_PAGE, 600);
        let schedule_text = result.schedule_text.expect("schedule text");
        assert!(schedule_text.contains("Fridays"));
    }

    #[test]
    fn test_malformed_html_never_panics() {
        let result = extract("https://museum.org/x", "<div><p>broken<span></div>", 600);
        assert!(!result.is_usable());
    }

    #[test]
    fn test_title_falls_back_to_page_title() {
        let html = r#"<html><head><title>Dutch Masters | Museum</title></head><body></body></html>"#;
        let result = extract("https://museum.org/x", html, 600);
        assert_eq!(result.title.as_deref(), Some("Dutch Masters"));
    }

    #[test]
    fn test_section_chrome_titles() {
        assert!(is_section_chrome("Exhibitions"));
        assert!(is_section_chrome("What's On"));
        assert!(is_section_chrome(" current exhibitions "));
        assert!(!is_section_chrome("Monet in Focus"));
        assert!(!is_section_chrome("Exhibitions of the Gilded Age"));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let text = "放眼望去全是画作".repeat(20);
        let truncated = truncate_chars(&text, 10);
        assert!(truncated.chars().count() <= 11);
    }
}
