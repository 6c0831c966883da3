//! Mock implementations for testing pipelines without network or LLM
//! calls.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::error::{HarvestError, Result};
use crate::fetch::{Fetch, FetchOutcome, FetchStatus};
use crate::llm::{InferenceHints, InferenceProvider};
use crate::types::{Confidence, ExtractionResult, ExtractionTier};

/// A fetcher that serves canned outcomes by URL.
///
/// URLs are matched exactly after trailing-slash trimming. Unknown URLs
/// get the configured default outcome (404 unless overridden).
#[derive(Clone)]
pub struct MockFetcher {
    outcomes: Arc<RwLock<HashMap<String, FetchOutcome>>>,
    default: Arc<RwLock<FetchOutcome>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self {
            outcomes: Arc::new(RwLock::new(HashMap::new())),
            default: Arc::new(RwLock::new(FetchOutcome::failed(
                FetchStatus::NotFound,
                Some(404),
            ))),
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an outcome for a URL (builder style).
    pub fn with_outcome(self, url: impl Into<String>, outcome: FetchOutcome) -> Self {
        self.add_outcome(url, outcome);
        self
    }

    /// Register a 200 page for a URL (builder style).
    pub fn with_page(self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.add_outcome(url, FetchOutcome::ok(html.into(), 200));
        self
    }

    /// Set the outcome returned for unregistered URLs.
    pub fn with_default(self, outcome: FetchOutcome) -> Self {
        *self.default.write().unwrap() = outcome;
        self
    }

    pub fn add_outcome(&self, url: impl Into<String>, outcome: FetchOutcome) {
        let key = normalize_key(&url.into());
        self.outcomes.write().unwrap().insert(key, outcome);
    }

    /// URLs fetched so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

fn normalize_key(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

#[async_trait]
impl Fetch for MockFetcher {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        self.calls.write().unwrap().push(url.to_string());
        let key = normalize_key(url);
        self.outcomes
            .read()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or_else(|| self.default.read().unwrap().clone())
    }

    async fn probe(&self, url: &str) -> bool {
        let key = normalize_key(url);
        self.outcomes
            .read()
            .unwrap()
            .get(&key)
            .map(|o| o.is_ok())
            .unwrap_or(false)
    }
}

/// A provider with scripted behavior and call counting.
pub struct MockProvider {
    name: String,
    response: Option<ExtractionResult>,
    calls: Arc<RwLock<usize>>,
}

impl MockProvider {
    /// A provider that always fails.
    pub fn failing(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            response: None,
            calls: Arc::new(RwLock::new(0)),
        }
    }

    /// A provider that returns a minimal usable result with the given
    /// title.
    pub fn succeeding(name: impl Into<String>, title: impl Into<String>) -> Self {
        let mut result = ExtractionResult::empty(ExtractionTier::LlmInferred, Confidence::Medium);
        result.title = Some(title.into());
        Self {
            name: name.into(),
            response: Some(result),
            calls: Arc::new(RwLock::new(0)),
        }
    }

    /// A provider returning a fully specified result.
    pub fn with_result(name: impl Into<String>, result: ExtractionResult) -> Self {
        Self {
            name: name.into(),
            response: Some(result),
            calls: Arc::new(RwLock::new(0)),
        }
    }

    /// Shared call counter, for asserting the chain stopped early.
    pub fn call_counter(&self) -> Arc<RwLock<usize>> {
        self.calls.clone()
    }
}

#[async_trait]
impl InferenceProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn infer(&self, url: &str, _hints: &InferenceHints) -> Result<ExtractionResult> {
        *self.calls.write().unwrap() += 1;
        match &self.response {
            Some(result) => Ok(result.clone()),
            None => Err(HarvestError::Provider {
                provider: self.name.clone(),
                message: format!("scripted failure for {}", url),
            }),
        }
    }
}
