//! Harvest one venue from the command line.
//!
//! ```sh
//! cargo run --example harvest_venue -- https://museum.org
//! ```
//!
//! Set OPENAI_API_KEY and/or ANTHROPIC_API_KEY (a `.env` file works) to
//! enable the inference fallback for blocked pages.

use std::sync::Arc;

use harvester::{
    AnthropicProvider, EngineConfig, EventCategory, HarvestEngine, HarvestRequest, OpenAiProvider,
    PageFetcher, ProviderChain, StaticVenueRegistry, TimeWindow,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "harvester=info".into()),
        )
        .init();

    let base_url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://www.artsmia.org".to_string());

    let config = EngineConfig::default();
    let fetcher = PageFetcher::new(&config)?;

    let mut providers = ProviderChain::new(config.provider_timeout);
    if let Some(openai) = OpenAiProvider::from_env() {
        providers.push(Box::new(openai));
    }
    if let Some(anthropic) = AnthropicProvider::from_env() {
        providers.push(Box::new(anthropic));
    }
    if providers.is_empty() {
        eprintln!("no API keys set; blocked pages will fall back to listing data only");
    }

    let registry = Arc::new(StaticVenueRegistry::default());
    let engine = HarvestEngine::new(fetcher, providers, registry, config);

    let request = HarvestRequest::new(&base_url, EventCategory::Any, TimeWindow::ThisMonth);
    let report = engine.harvest(&request).await;

    println!(
        "visited {} pages ({} fallbacks{})",
        report.pages_visited,
        report.fallbacks_used,
        if report.abandoned { ", abandoned early" } else { "" },
    );
    for draft in &report.drafts {
        println!(
            "[{}/{}] {} - {}{}",
            draft.tier,
            draft.confidence,
            draft.start_date,
            draft.title,
            draft
                .location_text
                .as_deref()
                .map(|l| format!(" @ {}", l))
                .unwrap_or_default(),
        );
    }

    Ok(())
}
