//! Rendered deck model
//!
//! A deck is owned by the render call that produced it and is never cached.

use std::sync::Arc;

use crate::domain::markup::StyledLine;
use crate::domain::presentation::LayoutKind;
use crate::domain::template::{PlaceholderRole, PlaceholderSpec, Template};

/// One paragraph bound to a placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub level: u8,
    pub line: StyledLine,
}

impl Paragraph {
    pub fn new(line: StyledLine, level: u8) -> Self {
        Self { level, line }
    }
}

/// Text bound to one template placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderContent {
    pub spec: PlaceholderSpec,
    pub paragraphs: Vec<Paragraph>,
}

impl PlaceholderContent {
    pub fn role(&self) -> PlaceholderRole {
        self.spec.role
    }

    pub fn plain_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.line.plain_text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A slide with its layout resolved and text bound
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSlide {
    pub layout: LayoutKind,
    pub placeholders: Vec<PlaceholderContent>,
}

impl RenderedSlide {
    pub fn placeholder(&self, role: PlaceholderRole) -> Option<&PlaceholderContent> {
        self.placeholders.iter().find(|p| p.role() == role)
    }
}

/// Ordered rendered slides bound to a template
#[derive(Debug, Clone)]
pub struct Deck {
    template: Arc<Template>,
    slides: Vec<RenderedSlide>,
}

impl Deck {
    pub fn new(template: Arc<Template>, slides: Vec<RenderedSlide>) -> Self {
        Self { template, slides }
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn slides(&self) -> &[RenderedSlide] {
        &self.slides
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Plain text of the first slide's title
    pub fn title(&self) -> Option<String> {
        self.slides
            .first()
            .and_then(|slide| slide.placeholder(PlaceholderRole::Title))
            .map(PlaceholderContent::plain_text)
    }
}
