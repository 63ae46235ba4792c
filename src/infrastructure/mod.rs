//! Infrastructure layer - Service implementations

pub mod cache;
pub mod generator;
pub mod llm;
pub mod logging;
pub mod observability;
pub mod pipeline;
pub mod pptx;
pub mod rate_limiter;
pub mod render;

pub use cache::GenerationCache;
pub use generator::ContentGenerator;
pub use pipeline::{GeneratedDeck, PipelineOrchestrator};
pub use pptx::PptxWriter;
pub use rate_limiter::{AdmissionControl, RateLimitDecision, SlidingWindowRateLimiter};
pub use render::DeckRenderer;
