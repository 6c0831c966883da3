//! Bounded-timeout HTTP fetching with browser-like headers.
//!
//! The fetcher never returns an error: every request resolves to a
//! [`FetchOutcome`] whose status the pipeline maps to a degrade path.
//! Timeouts are short and independent so one slow page cannot stall a
//! venue batch.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::{HarvestError, Result};
use crate::urls;

/// Classification of a single HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStatus {
    Ok,
    /// Bot protection detected (403/503 or an interstitial challenge page)
    Blocked,
    Timeout,
    NetworkError,
    NotFound,
}

/// Result of one request. Owned transiently, never persisted.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub status: FetchStatus,
    pub raw_html: Option<String>,
    pub http_status: Option<u16>,
}

impl FetchOutcome {
    pub fn ok(html: String, http_status: u16) -> Self {
        Self {
            status: FetchStatus::Ok,
            raw_html: Some(html),
            http_status: Some(http_status),
        }
    }

    pub fn failed(status: FetchStatus, http_status: Option<u16>) -> Self {
        Self {
            status,
            raw_html: None,
            http_status,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == FetchStatus::Ok
    }

    pub fn is_blocked(&self) -> bool {
        self.status == FetchStatus::Blocked
    }

    /// The error a failed fetch degrades with, for callers that log it.
    pub fn as_error(&self, url: &str) -> Option<HarvestError> {
        match self.status {
            FetchStatus::Blocked => Some(HarvestError::FetchBlocked {
                url: url.to_string(),
            }),
            FetchStatus::Timeout => Some(HarvestError::FetchTimeout {
                url: url.to_string(),
            }),
            FetchStatus::NetworkError => Some(HarvestError::FetchNetwork {
                url: url.to_string(),
                message: match self.http_status {
                    Some(code) => format!("http status {code}"),
                    None => "transport error".to_string(),
                },
            }),
            FetchStatus::Ok | FetchStatus::NotFound => None,
        }
    }
}

/// Seam between the pipeline and the network, mockable in tests.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetch a page and classify the outcome.
    async fn fetch(&self, url: &str) -> FetchOutcome;

    /// Cheap existence check used by the URL-pattern strategy.
    async fn probe(&self, url: &str) -> bool;
}

/// Production fetcher backed by reqwest.
pub struct PageFetcher {
    client: reqwest::Client,
}

impl PageFetcher {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Ok(accept) =
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8".parse()
        {
            headers.insert(reqwest::header::ACCEPT, accept);
        }
        if let Ok(lang) = "en-US,en;q=0.5".parse() {
            headers.insert(reqwest::header::ACCEPT_LANGUAGE, lang);
        }
        if let Ok(conn) = "keep-alive".parse() {
            headers.insert(reqwest::header::CONNECTION, conn);
        }
        if let Ok(upgrade) = "1".parse() {
            headers.insert(reqwest::header::UPGRADE_INSECURE_REQUESTS, upgrade);
        }

        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.read_timeout)
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self { client })
    }

    /// Heuristic for interstitial bot-check pages served with HTTP 200.
    fn is_challenge_page(html: &str) -> bool {
        let lower = html.to_lowercase();
        (lower.contains("cloudflare") && lower.contains("challenge"))
            || lower.contains("just a moment...")
            || lower.contains("cf-browser-verification")
            || lower.contains("checking your browser")
    }
}

#[async_trait]
impl Fetch for PageFetcher {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        let url = urls::ensure_scheme(url);
        debug!(url = %url, "Fetching page");

        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) if e.is_timeout() => {
                warn!(url = %url, "Fetch timed out");
                return FetchOutcome::failed(FetchStatus::Timeout, None);
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Network error");
                return FetchOutcome::failed(FetchStatus::NetworkError, None);
            }
        };

        let status = response.status();
        match status {
            StatusCode::FORBIDDEN | StatusCode::SERVICE_UNAVAILABLE => {
                warn!(url = %url, status = %status, "Fetch blocked");
                FetchOutcome::failed(FetchStatus::Blocked, Some(status.as_u16()))
            }
            StatusCode::NOT_FOUND | StatusCode::GONE => {
                FetchOutcome::failed(FetchStatus::NotFound, Some(status.as_u16()))
            }
            s if s.is_success() => match response.text().await {
                Ok(html) if Self::is_challenge_page(&html) => {
                    warn!(url = %url, "Challenge page detected");
                    FetchOutcome::failed(FetchStatus::Blocked, Some(s.as_u16()))
                }
                Ok(html) => FetchOutcome::ok(html, s.as_u16()),
                Err(e) if e.is_timeout() => {
                    warn!(url = %url, "Body read timed out");
                    FetchOutcome::failed(FetchStatus::Timeout, Some(s.as_u16()))
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "Failed to read body");
                    FetchOutcome::failed(FetchStatus::NetworkError, Some(s.as_u16()))
                }
            },
            s => {
                warn!(url = %url, status = %s, "HTTP error");
                FetchOutcome::failed(FetchStatus::NetworkError, Some(s.as_u16()))
            }
        }
    }

    async fn probe(&self, url: &str) -> bool {
        let url = urls::ensure_scheme(url);
        match self.client.head(&url).send().await {
            Ok(r) if r.status().is_success() => true,
            // Some servers reject HEAD outright; retry with a cheap GET
            Ok(r) if r.status() == StatusCode::METHOD_NOT_ALLOWED => self
                .client
                .get(&url)
                .send()
                .await
                .map(|r| r.status().is_success())
                .unwrap_or(false),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_challenge_detection() {
        assert!(PageFetcher::is_challenge_page(
            "<title>Just a moment...</title>"
        ));
        assert!(PageFetcher::is_challenge_page(
            "<html>Cloudflare challenge platform</html>"
        ));
        assert!(!PageFetcher::is_challenge_page(
            "<html><h1>Current Exhibitions</h1></html>"
        ));
    }

    #[test]
    fn test_outcome_predicates() {
        let ok = FetchOutcome::ok("<html></html>".to_string(), 200);
        assert!(ok.is_ok());
        assert!(!ok.is_blocked());

        let blocked = FetchOutcome::failed(FetchStatus::Blocked, Some(403));
        assert!(blocked.is_blocked());
        assert!(blocked.raw_html.is_none());
    }

    #[test]
    fn test_failed_outcomes_map_to_errors() {
        let url = "https://museum.org/exhibitions";

        let blocked = FetchOutcome::failed(FetchStatus::Blocked, Some(403));
        assert!(matches!(
            blocked.as_error(url),
            Some(HarvestError::FetchBlocked { .. })
        ));

        let timeout = FetchOutcome::failed(FetchStatus::Timeout, None);
        assert!(matches!(
            timeout.as_error(url),
            Some(HarvestError::FetchTimeout { .. })
        ));

        let network = FetchOutcome::failed(FetchStatus::NetworkError, Some(502));
        match network.as_error(url) {
            Some(HarvestError::FetchNetwork { message, .. }) => {
                assert_eq!(message, "http status 502");
            }
            other => panic!("expected network error, got {:?}", other),
        }

        let ok = FetchOutcome::ok("<html></html>".to_string(), 200);
        assert!(ok.as_error(url).is_none());
    }
}
