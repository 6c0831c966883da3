//! Typed errors for the harvesting engine.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling. None of these variants
//! aborts a batch: every one maps to a degrade path in the pipeline.

use thiserror::Error;

/// Errors that can occur while harvesting a venue.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// No candidate pages found, even after the last-resort link harvest
    #[error("no candidate pages discovered for {base_url}")]
    DiscoveryEmpty { base_url: String },

    /// Bot protection detected on a page
    #[error("fetch blocked: {url}")]
    FetchBlocked { url: String },

    /// Request exceeded its timeout
    #[error("fetch timed out: {url}")]
    FetchTimeout { url: String },

    /// Transport-level failure (DNS, connect, reset)
    #[error("network error fetching {url}: {message}")]
    FetchNetwork { url: String, message: String },

    /// Page fetched but no usable title could be extracted
    #[error("extraction incomplete for {url}: no title")]
    ExtractionIncomplete { url: String },

    /// Schedule text matched no known pattern
    #[error("unresolved schedule text: {text:?}")]
    DateUnresolved { text: String },

    /// A single inference provider failed (non-fatal, chain advances)
    #[error("provider {provider} failed: {message}")]
    Provider { provider: String, message: String },

    /// Every provider in the chain failed for a URL
    #[error("all inference providers failed for {url}")]
    AllProvidersFailed { url: String },

    /// HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    /// URL parsing failed
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A provider returned JSON that did not match the contract
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for harvesting operations.
pub type Result<T> = std::result::Result<T, HarvestError>;
