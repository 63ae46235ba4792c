//! Domain layer - Core presentation model and traits

pub mod deck;
pub mod error;
pub mod llm;
pub mod markup;
pub mod presentation;
pub mod template;

pub use deck::{Deck, Paragraph, PlaceholderContent, RenderedSlide};
pub use error::DomainError;
pub use llm::LanguageModel;
pub use markup::{RunStyle, StyledLine, StyledRun};
pub use presentation::{
    AspectRatio, CacheKey, LayoutKind, PresentationRequest, SlidePlan, SlideSpec, TextBlock,
};
pub use template::{PlaceholderRole, Template, TemplateSet};
