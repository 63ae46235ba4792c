//! Slide Generator API
//!
//! Turns a topic into a PowerPoint deck:
//! - an LLM drafts a structured slide plan
//! - plans are cached with single-flight deduplication
//! - plans are rendered onto a 16:9 or 4:3 template and packaged as `.pptx`

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::middleware::ClientIdPolicy;
use api::state::AppState;
use infrastructure::{
    llm::LanguageModelFactory, ContentGenerator, DeckRenderer, GenerationCache,
    PipelineOrchestrator, PptxWriter, SlidingWindowRateLimiter,
};
use tracing::info;

/// Wire the generation pipeline from configuration
///
/// Fails when the language model cannot be configured, e.g. no API key.
pub fn create_pipeline(config: &AppConfig) -> anyhow::Result<PipelineOrchestrator> {
    let model = LanguageModelFactory::create(&config.llm)?;
    let limiter = SlidingWindowRateLimiter::from_settings(&config.rate_limit);

    info!(
        provider = %config.llm.provider,
        model = %config.llm.model,
        rate_limit = config.rate_limit.requests,
        rate_window_secs = config.rate_limit.window_secs,
        "Generation pipeline configured"
    );

    Ok(PipelineOrchestrator::new(
        Arc::new(limiter),
        ContentGenerator::new(model, GenerationCache::new()),
        DeckRenderer::default(),
        PptxWriter::new(),
    ))
}

/// Create the application state with all services initialized
pub fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let policy = ClientIdPolicy {
        trust_forwarded_for: config.server.trust_forwarded_for,
    };
    if policy.trust_forwarded_for {
        info!("Rate limiting keyed on X-Forwarded-For");
    }

    Ok(AppState::new(create_pipeline(config)?).with_client_id_policy(policy))
}
