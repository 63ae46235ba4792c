//! Presentation request and slide plan model

mod plan;
mod request;

pub use plan::{LayoutKind, SlidePlan, SlideSpec, TextBlock};
pub use request::{
    AspectRatio, CacheKey, PresentationRequest, DEFAULT_SLIDES, MAX_SLIDES, MAX_TOPIC_LENGTH,
    MIN_SLIDES, MIN_TOPIC_LENGTH,
};
