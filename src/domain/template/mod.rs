//! Visual templates, one per aspect ratio
//!
//! A template is data: slide size, base text styles and where each layout
//! puts its placeholders. Rendering never mutates it.

use std::fmt;
use std::sync::Arc;

use crate::domain::presentation::{AspectRatio, LayoutKind};
use crate::domain::DomainError;

/// English Metric Units per inch
pub const EMU_PER_INCH: i64 = 914_400;

const SLIDE_HEIGHT: i64 = 6_858_000;
const WIDESCREEN_WIDTH: i64 = 12_192_000;
const STANDARD_WIDTH: i64 = 9_144_000;

/// Role a placeholder plays on a slide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderRole {
    Title,
    Subtitle,
    Body,
    LeftColumn,
    RightColumn,
}

impl PlaceholderRole {
    /// Whether the placeholder uses the title text style
    pub fn is_title(&self) -> bool {
        matches!(self, Self::Title)
    }
}

impl fmt::Display for PlaceholderRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Title => "title",
            Self::Subtitle => "subtitle",
            Self::Body => "body",
            Self::LeftColumn => "left column",
            Self::RightColumn => "right column",
        };
        f.write_str(name)
    }
}

/// Position and size of a placeholder in EMUs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl Frame {
    /// Frame expressed in thousandths of the slide size
    fn relative(slide_width: i64, slide_height: i64, x: i64, y: i64, w: i64, h: i64) -> Self {
        Self {
            x: slide_width * x / 1000,
            y: slide_height * y / 1000,
            width: slide_width * w / 1000,
            height: slide_height * h / 1000,
        }
    }
}

/// A named placeholder on a layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderSpec {
    pub role: PlaceholderRole,
    /// Placeholder index shared by layout and slide parts
    pub index: u32,
    pub frame: Frame,
}

/// Base font, size and color for a kind of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextStyle {
    pub font: String,
    pub size_pt: u32,
    /// RGB hex without '#'
    pub color: String,
}

impl TextStyle {
    pub fn new(font: impl Into<String>, size_pt: u32, color: impl Into<String>) -> Self {
        Self {
            font: font.into(),
            size_pt,
            color: color.into(),
        }
    }
}

/// Placeholders a template provides for one layout kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutTemplate {
    pub kind: LayoutKind,
    pub name: String,
    pub placeholders: Vec<PlaceholderSpec>,
}

impl LayoutTemplate {
    pub fn placeholder(&self, role: PlaceholderRole) -> Option<&PlaceholderSpec> {
        self.placeholders.iter().find(|p| p.role == role)
    }
}

/// A pre-authored visual skeleton for one aspect ratio
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub name: String,
    pub aspect_ratio: AspectRatio,
    pub slide_width: i64,
    pub slide_height: i64,
    pub title_style: TextStyle,
    pub body_style: TextStyle,
    pub layouts: Vec<LayoutTemplate>,
}

impl Template {
    /// 16:9 template
    pub fn widescreen() -> Self {
        Self::builtin("Widescreen", AspectRatio::Widescreen, WIDESCREEN_WIDTH)
    }

    /// 4:3 template
    pub fn standard() -> Self {
        Self::builtin("Standard", AspectRatio::Standard, STANDARD_WIDTH)
    }

    fn builtin(name: &str, aspect_ratio: AspectRatio, slide_width: i64) -> Self {
        let frame = |x, y, w, h| Frame::relative(slide_width, SLIDE_HEIGHT, x, y, w, h);
        let placeholder = |role, index, frame| PlaceholderSpec { role, index, frame };
        let content_title = frame(69, 53, 862, 145);

        let layouts = vec![
            LayoutTemplate {
                kind: LayoutKind::Title,
                name: "Title Slide".to_string(),
                placeholders: vec![
                    placeholder(PlaceholderRole::Title, 0, frame(125, 164, 750, 348)),
                    placeholder(PlaceholderRole::Subtitle, 1, frame(125, 525, 750, 241)),
                ],
            },
            LayoutTemplate {
                kind: LayoutKind::BulletList,
                name: "Title and Content".to_string(),
                placeholders: vec![
                    placeholder(PlaceholderRole::Title, 0, content_title),
                    placeholder(PlaceholderRole::Body, 1, frame(69, 222, 862, 691)),
                ],
            },
            LayoutTemplate {
                kind: LayoutKind::TwoColumn,
                name: "Two Content".to_string(),
                placeholders: vec![
                    placeholder(PlaceholderRole::Title, 0, content_title),
                    placeholder(PlaceholderRole::LeftColumn, 1, frame(69, 222, 422, 691)),
                    placeholder(PlaceholderRole::RightColumn, 2, frame(509, 222, 422, 691)),
                ],
            },
        ];

        Self {
            name: name.to_string(),
            aspect_ratio,
            slide_width,
            slide_height: SLIDE_HEIGHT,
            title_style: TextStyle::new("Calibri Light", 36, "0A2C52"),
            body_style: TextStyle::new("Calibri", 18, "333333"),
            layouts,
        }
    }

    pub fn layout(&self, kind: LayoutKind) -> Result<&LayoutTemplate, DomainError> {
        self.layouts
            .iter()
            .find(|layout| layout.kind == kind)
            .ok_or_else(|| {
                DomainError::render(format!(
                    "template '{}' has no '{}' layout",
                    self.name, kind
                ))
            })
    }

    /// Placeholder of a layout, a render error when the layout lacks it
    pub fn placeholder(
        &self,
        kind: LayoutKind,
        role: PlaceholderRole,
    ) -> Result<&PlaceholderSpec, DomainError> {
        self.layout(kind)?.placeholder(role).ok_or_else(|| {
            DomainError::render(format!(
                "template '{}' layout '{}' has no {} placeholder",
                self.name, kind, role
            ))
        })
    }

    /// Position of a layout within the template's layout list (0-based)
    pub fn layout_position(&self, kind: LayoutKind) -> Option<usize> {
        self.layouts.iter().position(|layout| layout.kind == kind)
    }

    pub fn text_style(&self, role: PlaceholderRole) -> &TextStyle {
        if role.is_title() {
            &self.title_style
        } else {
            &self.body_style
        }
    }
}

/// The two templates, selected by aspect ratio
#[derive(Debug, Clone)]
pub struct TemplateSet {
    widescreen: Arc<Template>,
    standard: Arc<Template>,
}

impl TemplateSet {
    pub fn new(widescreen: Template, standard: Template) -> Self {
        Self {
            widescreen: Arc::new(widescreen),
            standard: Arc::new(standard),
        }
    }

    pub fn builtin() -> Self {
        Self::new(Template::widescreen(), Template::standard())
    }

    pub fn for_ratio(&self, aspect_ratio: AspectRatio) -> Arc<Template> {
        match aspect_ratio {
            AspectRatio::Widescreen => Arc::clone(&self.widescreen),
            AspectRatio::Standard => Arc::clone(&self.standard),
        }
    }
}

impl Default for TemplateSet {
    fn default() -> Self {
        Self::builtin()
    }
}
