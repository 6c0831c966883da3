//! The harvest pipeline: discovery, per-page extraction with fallback,
//! schedule resolution, venue matching, and dedup, in that order.
//!
//! Candidates are processed sequentially. That keeps the consecutive
//! failure budget meaningful (parallel failures would not be "in a row")
//! and lets one dedup index absorb drafts without locking.

use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Local, NaiveDate};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::dedup::DedupIndex;
use crate::discover::PageDiscoverer;
use crate::error::HarvestError;
use crate::extract::{self, HandlerRegistry};
use crate::fetch::{Fetch, FetchStatus};
use crate::llm::{InferenceHints, ProviderChain};
use crate::schedule::{self, ScheduleOutcome, PERMANENT_SPAN_DAYS};
use crate::types::{
    DiscoveryCandidate, EventCategory, EventDraft, ExtractionResult, ExtractionTier, TimeWindow,
};
use crate::venues::{match_venue, VenueRegistry};

/// One venue to harvest.
#[derive(Debug, Clone)]
pub struct HarvestRequest {
    pub base_url: String,
    pub category: EventCategory,
    pub window: TimeWindow,
    /// Known venue, attached to drafts when location matching finds
    /// nothing better.
    pub venue_id: Option<Uuid>,
    /// Venue name and city, passed to inference providers as context.
    pub venue_name: Option<String>,
    pub city: Option<String>,
}

impl HarvestRequest {
    pub fn new(base_url: impl Into<String>, category: EventCategory, window: TimeWindow) -> Self {
        Self {
            base_url: base_url.into(),
            category,
            window,
            venue_id: None,
            venue_name: None,
            city: None,
        }
    }

    pub fn with_venue(mut self, id: Uuid, name: impl Into<String>) -> Self {
        self.venue_id = Some(id);
        self.venue_name = Some(name.into());
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }
}

/// What one harvest produced.
#[derive(Debug, Default)]
pub struct HarvestReport {
    pub drafts: Vec<EventDraft>,
    pub pages_visited: usize,
    /// Candidates that needed inference or listing fallback.
    pub fallbacks_used: usize,
    /// True when the consecutive failure budget ran out before all
    /// candidates were tried.
    pub abandoned: bool,
}

/// Ties the pieces together for one venue at a time.
pub struct HarvestEngine<F: Fetch> {
    fetcher: F,
    providers: ProviderChain,
    handlers: HandlerRegistry,
    registry: Arc<dyn VenueRegistry>,
    config: EngineConfig,
}

impl<F: Fetch> HarvestEngine<F> {
    pub fn new(
        fetcher: F,
        providers: ProviderChain,
        registry: Arc<dyn VenueRegistry>,
        config: EngineConfig,
    ) -> Self {
        Self {
            fetcher,
            providers,
            handlers: HandlerRegistry::new(),
            registry,
            config,
        }
    }

    pub fn with_handlers(mut self, handlers: HandlerRegistry) -> Self {
        self.handlers = handlers;
        self
    }

    /// Run the full pipeline for one venue.
    pub async fn harvest(&self, request: &HarvestRequest) -> HarvestReport {
        let today = Local::now().date_naive();
        self.harvest_as_of(request, today).await
    }

    /// Like [`harvest`](Self::harvest) with an explicit "today", so
    /// schedule resolution is reproducible in tests.
    pub async fn harvest_as_of(&self, request: &HarvestRequest, today: NaiveDate) -> HarvestReport {
        let discoverer = PageDiscoverer::new(&self.fetcher);
        let candidates = discoverer
            .discover(&request.base_url, request.category, self.config.max_pages)
            .await;

        info!(
            base_url = %request.base_url,
            candidates = candidates.len(),
            "Discovery finished"
        );

        let mut report = HarvestReport::default();
        let mut dedup = DedupIndex::new();
        let mut consecutive_failures = 0usize;

        for candidate in &candidates {
            report.pages_visited += 1;

            let result = self.process_candidate(candidate, request).await;
            let result = match result {
                Some(r) => {
                    consecutive_failures = 0;
                    if r.tier != ExtractionTier::Scraped {
                        report.fallbacks_used += 1;
                    }
                    r
                }
                None => {
                    consecutive_failures += 1;
                    if consecutive_failures >= self.config.failure_budget {
                        warn!(
                            base_url = %request.base_url,
                            failures = consecutive_failures,
                            "Failure budget exhausted, abandoning venue"
                        );
                        report.abandoned = true;
                        break;
                    }
                    continue;
                }
            };

            for draft in self
                .drafts_from_result(&candidate.url, result, request, today)
                .await
            {
                if dedup.insert(&draft) {
                    report.drafts.push(draft);
                }
            }
        }

        info!(
            base_url = %request.base_url,
            drafts = report.drafts.len(),
            pages = report.pages_visited,
            fallbacks = report.fallbacks_used,
            "Harvest complete"
        );
        report
    }

    /// Per-candidate state machine: fetch, extract, fall back to
    /// inference, fall back to listing data. `None` counts against the
    /// failure budget.
    async fn process_candidate(
        &self,
        candidate: &DiscoveryCandidate,
        request: &HarvestRequest,
    ) -> Option<ExtractionResult> {
        let outcome = self.fetcher.fetch(&candidate.url).await;

        match outcome.status {
            FetchStatus::Ok => {
                let html = outcome.raw_html.as_deref().unwrap_or_default();

                let scraped = self
                    .handlers
                    .for_url(&candidate.url)
                    .and_then(|h| h.extract(&candidate.url, html))
                    .unwrap_or_else(|| {
                        extract::extract(&candidate.url, html, self.config.description_limit)
                    });

                if scraped.is_usable() {
                    return Some(scraped);
                }
                let error = HarvestError::ExtractionIncomplete {
                    url: candidate.url.clone(),
                };
                warn!(error = %error, "Scrape found no title, trying inference");
                self.infer_or_listing(candidate, request).await
            }
            FetchStatus::NotFound => {
                warn!(url = %candidate.url, "Candidate page is gone");
                None
            }
            FetchStatus::Blocked | FetchStatus::Timeout | FetchStatus::NetworkError => {
                if let Some(error) = outcome.as_error(&candidate.url) {
                    warn!(error = %error, "Fetch failed, trying inference");
                }
                self.infer_or_listing(candidate, request).await
            }
        }
    }

    async fn infer_or_listing(
        &self,
        candidate: &DiscoveryCandidate,
        request: &HarvestRequest,
    ) -> Option<ExtractionResult> {
        if !self.providers.is_empty() {
            let hints = InferenceHints {
                venue_name: request.venue_name.clone(),
                city: request.city.clone(),
                category: Some(request.category),
            };
            match self.providers.infer(&candidate.url, &hints).await {
                Ok(result) => return Some(result),
                Err(e) => {
                    warn!(url = %candidate.url, error = %e, "Inference chain exhausted");
                }
            }
        }

        ExtractionResult::from_listing_hint(&candidate.listing_hint)
    }

    /// Turn one extraction result into zero or more dated drafts.
    ///
    /// Explicit dates win over schedule text. Recurring schedules expand
    /// inside the request window; concrete dates pass through unfiltered
    /// so the caller sees everything the venue published.
    async fn drafts_from_result(
        &self,
        source_url: &str,
        result: ExtractionResult,
        request: &HarvestRequest,
        today: NaiveDate,
    ) -> Vec<EventDraft> {
        let title = match &result.title {
            Some(t) => t.trim().to_string(),
            None => return Vec::new(),
        };
        if extract::is_section_chrome(&title) {
            info!(url = %source_url, title = %title, "Title is section chrome, discarding draft");
            return Vec::new();
        }

        let (venue_id, city_id) = self.resolve_venue(&result, request).await;

        let base = EventDraft {
            title,
            description: result.description.clone(),
            image_url: result.image_url.clone(),
            start_date: today,
            start_time: None,
            end_date: None,
            end_time: None,
            location_text: result.location_text.clone(),
            venue_id,
            city_id,
            source_url: source_url.to_string(),
            event_type: request.category,
            tier: result.tier,
            confidence: result.confidence,
        };

        if let Some(start_date) = result.start_date {
            let mut draft = base;
            draft.start_date = start_date;
            draft.start_time = result.start_time;
            draft.end_date = result.end_date;
            draft.end_time = result
                .end_time
                .or_else(|| result.start_time.map(schedule::default_end));
            return vec![draft];
        }

        let schedule_text = match &result.schedule_text {
            Some(text) => text,
            None => {
                warn!(url = %source_url, "No date information, discarding draft");
                return Vec::new();
            }
        };

        match schedule::resolve(schedule_text, today) {
            ScheduleOutcome::Concrete {
                start_date,
                start_time,
                end_date,
                end_time,
            } => {
                let mut draft = base;
                draft.start_date = start_date;
                draft.start_time = start_time;
                draft.end_date = end_date;
                draft.end_time = end_time;
                vec![draft]
            }
            ScheduleOutcome::Recurring(rule) => {
                schedule::expand(&rule, &request.window, today)
                    .into_iter()
                    .map(|occ| {
                        let mut draft = base.clone();
                        draft.start_date = occ.date;
                        draft.start_time = Some(occ.start_time);
                        draft.end_date = Some(occ.date);
                        draft.end_time = Some(occ.end_time);
                        draft
                    })
                    .collect()
            }
            ScheduleOutcome::Permanent => {
                let mut draft = base;
                draft.start_date = today;
                draft.end_date = Some(today + ChronoDuration::days(PERMANENT_SPAN_DAYS));
                vec![draft]
            }
            ScheduleOutcome::Unresolved => {
                let error = HarvestError::DateUnresolved {
                    text: schedule_text.clone(),
                };
                warn!(url = %source_url, error = %error, "Discarding draft");
                Vec::new()
            }
        }
    }

    /// Location text takes priority; the request's venue is the
    /// fallback attribution.
    async fn resolve_venue(
        &self,
        result: &ExtractionResult,
        request: &HarvestRequest,
    ) -> (Option<Uuid>, Option<Uuid>) {
        if let Some(location) = &result.location_text {
            let (venue_id, city_id) = match_venue(location, self.registry.as_ref()).await;
            if venue_id.is_some() {
                return (venue_id, city_id);
            }
        }
        (request.venue_id, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchOutcome;
    use crate::testing::{MockFetcher, MockProvider};
    use crate::types::Confidence;
    use crate::venues::StaticVenueRegistry;
    use std::time::Duration;

    fn engine(fetcher: MockFetcher, providers: ProviderChain) -> HarvestEngine<MockFetcher> {
        HarvestEngine::new(
            fetcher,
            providers,
            Arc::new(StaticVenueRegistry::default()),
            EngineConfig::default(),
        )
    }

    fn request() -> HarvestRequest {
        HarvestRequest::new(
            "https://museum.org",
            EventCategory::Exhibition,
            TimeWindow::ThisMonth,
        )
    }

    const LISTING: &str = r#"<html><head><title>Museum</title></head><body><nav>
        <a href="/exhibitions">Exhibitions</a>
    </nav></body></html>"#;

    const DETAIL: &str = r#"<html><head><title>Dutch Masters | Museum</title></head>
    <body><h1>Dutch Masters</h1>
    <p>A sweeping survey of seventeenth-century Dutch painting, drawn from
    collections across three continents and shown together for the first time.</p>
    <p>June 9, 2026 - September 1, 2026</p>
    </body></html>"#;

    #[tokio::test]
    async fn test_harvest_scrapes_detail_pages() {
        let fetcher = MockFetcher::new()
            .with_page("https://museum.org", LISTING)
            .with_page(
                "https://museum.org/exhibitions",
                r#"<html><head><title>Exhibitions | Museum</title></head>
                <body><a href="/exhibitions/dutch-masters">Dutch Masters</a></body></html>"#,
            )
            .with_page("https://museum.org/exhibitions/dutch-masters", DETAIL);

        let engine = engine(fetcher, ProviderChain::new(Duration::from_secs(1)));
        let today = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let report = engine.harvest_as_of(&request(), today).await;

        assert!(!report.abandoned);
        assert_eq!(report.drafts.len(), 1);
        let draft = &report.drafts[0];
        assert_eq!(draft.title, "Dutch Masters");
        assert_eq!(draft.tier, ExtractionTier::Scraped);
        assert_eq!(draft.start_date, NaiveDate::from_ymd_opt(2026, 6, 9).unwrap());
        assert_eq!(draft.end_date, Some(NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()));
    }

    #[tokio::test]
    async fn test_listing_section_title_yields_no_draft() {
        // A listing page scrapes as usable, but its title is the section
        // heading and the date on it belongs to a linked event.
        let fetcher = MockFetcher::new()
            .with_page("https://museum.org", LISTING)
            .with_page(
                "https://museum.org/exhibitions",
                r#"<html><head><title>Exhibitions | Museum</title></head>
                <body><a href="/exhibitions/dutch-masters">Dutch Masters</a>
                <span>Through September 1, 2026</span></body></html>"#,
            )
            .with_outcome(
                "https://museum.org/exhibitions/dutch-masters",
                FetchOutcome::failed(FetchStatus::NotFound, Some(404)),
            );

        let engine = engine(fetcher, ProviderChain::new(Duration::from_secs(1)));
        let today = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let report = engine.harvest_as_of(&request(), today).await;

        assert!(report.drafts.is_empty());
    }

    #[tokio::test]
    async fn test_blocked_page_falls_back_to_inference() {
        let fetcher = MockFetcher::new()
            .with_page("https://museum.org", LISTING)
            .with_page(
                "https://museum.org/exhibitions",
                r#"<html><head><title>Exhibitions | Museum</title></head>
                <body><a href="/exhibitions/secret-show">Secret Show</a></body></html>"#,
            )
            .with_outcome(
                "https://museum.org/exhibitions/secret-show",
                FetchOutcome::failed(FetchStatus::Blocked, Some(403)),
            );

        let mut inferred =
            ExtractionResult::empty(ExtractionTier::LlmInferred, Confidence::Medium);
        inferred.title = Some("Secret Show".to_string());
        inferred.start_date = NaiveDate::from_ymd_opt(2026, 7, 4);

        let providers = ProviderChain::new(Duration::from_secs(1))
            .with_provider(Box::new(MockProvider::with_result("mock", inferred)));

        let engine = engine(fetcher, providers);
        let today = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let report = engine.harvest_as_of(&request(), today).await;

        assert_eq!(report.drafts.len(), 1);
        assert_eq!(report.drafts[0].tier, ExtractionTier::LlmInferred);
        assert_eq!(report.fallbacks_used, 1);
    }

    #[tokio::test]
    async fn test_failure_budget_abandons_venue() {
        // Four dead detail pages behind a live listing; budget is 3.
        let fetcher = MockFetcher::new()
            .with_page("https://museum.org", LISTING)
            .with_page(
                "https://museum.org/exhibitions",
                r#"<html><head><title>Exhibitions | Museum</title></head>
                <body>
                <a href="/exhibitions/a">A</a>
                <a href="/exhibitions/b">B</a>
                <a href="/exhibitions/c">C</a>
                <a href="/exhibitions/d">D</a>
                </body></html>"#,
            );

        let engine = engine(fetcher, ProviderChain::new(Duration::from_secs(1)));
        let today = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let report = engine.harvest_as_of(&request(), today).await;

        assert!(report.abandoned);
        assert!(report.drafts.is_empty());
    }
}
