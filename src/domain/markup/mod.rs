//! Inline emphasis markup
//!
//! Generated text carries two emphasis markers:
//! - `**text**` - bold
//! - `__text__` - underline
//!
//! Markers are toggles, not balanced pairs: every doubled marker flips its
//! style, bold and underline toggle independently and may nest, and a style
//! left open at the end of the input simply covers the rest of the text.
//!
//! Known limitation: there is no escape syntax, so a literal `**` or `__`
//! inside text is always read as a toggle.

use serde::{Deserialize, Serialize};

const BOLD_MARKER: &str = "**";
const UNDERLINE_MARKER: &str = "__";

/// Emphasis applied to a run of text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunStyle {
    pub bold: bool,
    pub underline: bool,
}

impl RunStyle {
    pub const PLAIN: Self = Self {
        bold: false,
        underline: false,
    };

    pub const BOLD: Self = Self {
        bold: true,
        underline: false,
    };

    pub const UNDERLINE: Self = Self {
        bold: false,
        underline: true,
    };
}

/// A span of text with one consistent style
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledRun {
    pub text: String,
    pub bold: bool,
    pub underline: bool,
}

impl StyledRun {
    pub fn new(text: impl Into<String>, style: RunStyle) -> Self {
        Self {
            text: text.into(),
            bold: style.bold,
            underline: style.underline,
        }
    }

    pub fn style(&self) -> RunStyle {
        RunStyle {
            bold: self.bold,
            underline: self.underline,
        }
    }
}

/// Ordered runs of one paragraph
///
/// No two adjacent runs share a style and no run is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledLine {
    runs: Vec<StyledRun>,
}

impl StyledLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn runs(&self) -> &[StyledRun] {
        &self.runs
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Text of every run with markers removed
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }

    /// Append text, merging into the last run when the style matches
    pub fn push(&mut self, text: &str, style: RunStyle) {
        if text.is_empty() {
            return;
        }

        match self.runs.last_mut() {
            Some(last) if last.style() == style => last.text.push_str(text),
            _ => self.runs.push(StyledRun::new(text, style)),
        }
    }
}

impl IntoIterator for StyledLine {
    type Item = StyledRun;
    type IntoIter = std::vec::IntoIter<StyledRun>;

    fn into_iter(self) -> Self::IntoIter {
        self.runs.into_iter()
    }
}

/// Parse raw annotated text into styled runs
///
/// Never fails: malformed markup still yields a best-effort line.
pub fn parse(raw: &str) -> StyledLine {
    let mut line = StyledLine::new();
    let mut style = RunStyle::PLAIN;
    let mut pending = String::new();
    let mut rest = raw;

    while !rest.is_empty() {
        let toggled = if rest.starts_with(BOLD_MARKER) {
            Some(RunStyle {
                bold: !style.bold,
                ..style
            })
        } else if rest.starts_with(UNDERLINE_MARKER) {
            Some(RunStyle {
                underline: !style.underline,
                ..style
            })
        } else {
            None
        };

        match toggled {
            Some(next) => {
                line.push(&pending, style);
                pending.clear();
                style = next;
                // both markers are two ASCII bytes
                rest = &rest[2..];
            }
            None => {
                let mut chars = rest.chars();
                if let Some(c) = chars.next() {
                    pending.push(c);
                }
                rest = chars.as_str();
            }
        }
    }

    line.push(&pending, style);
    line
}
