//! Slide content generation through a language model

mod content_generator;
mod prompt;
mod response_parser;

pub use content_generator::ContentGenerator;
pub use prompt::build_prompt;
pub use response_parser::parse_slide_plan;
