//! Event Discovery & Extraction Engine
//!
//! Harvests structured event drafts (exhibitions, tours) from cultural
//! venue websites whose pages were never meant to be machine-read.
//!
//! # Design Philosophy
//!
//! **"Always degrade, never give up silently"**
//!
//! - Several discovery strategies run and their votes are merged
//! - Scraping comes first; language models only fill the gaps
//! - Partial listing data beats returning nothing
//! - Schedule resolution is pure and never guesses
//!
//! # Usage
//!
//! ```rust,ignore
//! use harvester::{
//!     EngineConfig, EventCategory, HarvestEngine, HarvestRequest, PageFetcher,
//!     ProviderChain, StaticVenueRegistry, TimeWindow,
//! };
//! use std::sync::Arc;
//!
//! let config = EngineConfig::default();
//! let fetcher = PageFetcher::new(&config)?;
//! let providers = ProviderChain::new(config.provider_timeout);
//! let registry = Arc::new(StaticVenueRegistry::default());
//!
//! let engine = HarvestEngine::new(fetcher, providers, registry, config);
//! let request = HarvestRequest::new(
//!     "https://museum.org",
//!     EventCategory::Exhibition,
//!     TimeWindow::ThisMonth,
//! );
//! let report = engine.harvest(&request).await;
//! ```
//!
//! # Modules
//!
//! - [`discover`] - Candidate page discovery strategies
//! - [`fetch`] - HTTP fetching with block/timeout classification
//! - [`extract`] - Heuristic field extraction plus per-venue handlers
//! - [`schedule`] - Schedule text resolution and recurrence expansion
//! - [`llm`] - Inference provider chain for pages scraping cannot read
//! - [`pipeline`] - The engine gluing all of the above together
//! - [`testing`] - Mock implementations for testing

pub mod config;
pub mod dedup;
pub mod discover;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod llm;
pub mod pipeline;
pub mod schedule;
pub mod testing;
pub mod types;
pub mod urls;
pub mod venues;

// Re-export core types at crate root
pub use config::EngineConfig;
pub use dedup::DedupIndex;
pub use discover::PageDiscoverer;
pub use error::{HarvestError, Result};
pub use extract::{extract, HandlerRegistry, VenueExtractor};
pub use fetch::{Fetch, FetchOutcome, FetchStatus, PageFetcher};
pub use llm::{
    anthropic::AnthropicProvider, openai::OpenAiProvider, InferenceHints, InferenceProvider,
    ProviderChain,
};
pub use pipeline::{HarvestEngine, HarvestReport, HarvestRequest};
pub use schedule::{expand, resolve, Occurrence, RecurrenceRule, ScheduleOutcome};
pub use types::{
    Confidence, DiscoveryCandidate, DiscoveryStrategy, EventCategory, EventDraft,
    ExtractionResult, ExtractionTier, ListingHint, TimeWindow, VenueRecord,
};
pub use venues::{match_venue, StaticVenueRegistry, VenueRegistry};
