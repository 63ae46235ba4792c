use std::fmt;

use serde::{Deserialize, Serialize};

/// How a slide arranges its content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutKind {
    Title,
    BulletList,
    TwoColumn,
}

impl LayoutKind {
    /// Resolve the layout hint the language model writes for a slide
    pub fn from_hint(hint: &str) -> Option<Self> {
        match hint.trim() {
            "title_slide" => Some(Self::Title),
            "bullet_points" => Some(Self::BulletList),
            "two_column" => Some(Self::TwoColumn),
            _ => None,
        }
    }

    /// The hint string used in prompts
    pub fn hint(&self) -> &'static str {
        match self {
            Self::Title => "title_slide",
            Self::BulletList => "bullet_points",
            Self::TwoColumn => "two_column",
        }
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hint())
    }
}

/// One paragraph of raw, markup-annotated text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBlock {
    pub text: String,
    /// Indentation level (0 = top level)
    pub level: u8,
}

impl TextBlock {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level: 0,
        }
    }

    pub fn with_level(mut self, level: u8) -> Self {
        self.level = level;
        self
    }
}

/// Content of a single slide before rendering
///
/// `body` holds one sequence of blocks for title and bullet slides and one
/// sequence per column for two-column slides. A two-column slide may carry
/// fewer than two sequences; the missing column renders empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideSpec {
    pub layout: LayoutKind,
    pub title: String,
    pub body: Vec<Vec<TextBlock>>,
}

impl SlideSpec {
    pub fn new(layout: LayoutKind, title: impl Into<String>) -> Self {
        Self {
            layout,
            title: title.into(),
            body: Vec::new(),
        }
    }

    /// Append a body sequence (a bullet list or a column)
    pub fn with_sequence(mut self, blocks: Vec<TextBlock>) -> Self {
        self.body.push(blocks);
        self
    }

    /// Body sequence at `index`, empty when absent
    pub fn sequence(&self, index: usize) -> &[TextBlock] {
        self.body.get(index).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Validated, ordered description of every slide in a deck
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlidePlan {
    slides: Vec<SlideSpec>,
}

impl SlidePlan {
    pub fn new(slides: Vec<SlideSpec>) -> Self {
        Self { slides }
    }

    pub fn slides(&self) -> &[SlideSpec] {
        &self.slides
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SlideSpec> {
        self.slides.iter()
    }
}
