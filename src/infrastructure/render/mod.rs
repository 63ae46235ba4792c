//! Binding slide plans to templates

mod renderer;

pub use renderer::DeckRenderer;
