//! Configuration for the harvesting engine.

use std::time::Duration;

/// Browser-like User-Agent used to avoid trivial bot detection.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Tunable knobs for fetching, discovery and fallback behavior.
///
/// Connect and read timeouts are deliberately short and independent so a
/// single slow page degrades to fallback instead of stalling the batch.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// TCP connect timeout per request.
    pub connect_timeout: Duration,

    /// Total request timeout (connect + read).
    pub read_timeout: Duration,

    /// Timeout for a single inference provider call.
    pub provider_timeout: Duration,

    /// Maximum candidate pages per venue.
    pub max_pages: usize,

    /// Consecutive candidate failures before abandoning a venue.
    pub failure_budget: usize,

    /// Character budget for extracted descriptions.
    pub description_limit: usize,

    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(12),
            provider_timeout: Duration::from_secs(45),
            max_pages: 12,
            failure_budget: 3,
            description_limit: 600,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl EngineConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the total request timeout.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Set the per-provider inference timeout.
    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }

    /// Set the candidate page cap.
    pub fn with_max_pages(mut self, max: usize) -> Self {
        self.max_pages = max;
        self
    }

    /// Set the consecutive-failure budget.
    pub fn with_failure_budget(mut self, budget: usize) -> Self {
        self.failure_budget = budget;
        self
    }

    /// Set the description character budget.
    pub fn with_description_limit(mut self, limit: usize) -> Self {
        self.description_limit = limit;
        self
    }

    /// Set a custom User-Agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
