//! Validation of raw model output into a slide plan
//!
//! Expected shape:
//!
//! ```json
//! {"slides": [{"layout": "title_slide", "content": {"title": "...", "subtitle": "..."}}]}
//! ```
//!
//! Text stays raw: emphasis markers are parsed at render time.

use serde_json::{Map, Value};

use crate::domain::{DomainError, LayoutKind, SlidePlan, SlideSpec, TextBlock};

const FENCE: &str = "```";

type Object = Map<String, Value>;

/// Parse a raw completion into a plan of exactly `expected` slides
pub fn parse_slide_plan(raw: &str, expected: usize) -> Result<SlidePlan, DomainError> {
    let json = strip_code_fence(raw);

    let value: Value = serde_json::from_str(json)
        .map_err(|e| DomainError::generation(format!("Response is not valid JSON: {}", e)))?;

    let slides = value
        .get("slides")
        .and_then(Value::as_array)
        .ok_or_else(|| DomainError::generation("Response has no 'slides' array"))?;

    if slides.len() != expected {
        return Err(DomainError::generation(format!(
            "Expected {} slides, got {}",
            expected,
            slides.len()
        )));
    }

    let specs = slides
        .iter()
        .enumerate()
        .map(|(index, slide)| parse_slide(index, slide))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SlidePlan::new(specs))
}

/// Remove a leading and a trailing Markdown code fence, each on its own
fn strip_code_fence(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix(FENCE) {
        // language tag, e.g. ```json
        text = rest.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    }

    if let Some(rest) = text.trim_end().strip_suffix(FENCE) {
        text = rest;
    }

    text.trim()
}

fn parse_slide(index: usize, slide: &Value) -> Result<SlideSpec, DomainError> {
    let slide = slide
        .as_object()
        .ok_or_else(|| DomainError::generation_at(index, "slide", "must be an object"))?;

    let hint = slide
        .get("layout")
        .and_then(Value::as_str)
        .ok_or_else(|| DomainError::generation_at(index, "layout", "missing or not a string"))?;

    let layout = LayoutKind::from_hint(hint).ok_or_else(|| {
        DomainError::generation_at(index, "layout", format!("unrecognized layout '{}'", hint))
    })?;

    let content = slide
        .get("content")
        .and_then(Value::as_object)
        .ok_or_else(|| DomainError::generation_at(index, "content", "missing or not an object"))?;

    let title = content
        .get("title")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            DomainError::generation_at(index, "content.title", "missing or not a string")
        })?;

    let mut spec = SlideSpec::new(layout, title);

    match layout {
        LayoutKind::Title => {
            if let Some(subtitle) = optional_str(index, content, "subtitle")? {
                if !subtitle.trim().is_empty() {
                    spec = spec.with_sequence(vec![TextBlock::new(subtitle)]);
                }
            }
        }
        LayoutKind::BulletList => {
            let points = string_list(index, content, "points", "content.points")?;
            spec = spec.with_sequence(points.into_iter().map(TextBlock::new).collect());
        }
        LayoutKind::TwoColumn => {
            let left = column(index, content, "left_column")?;
            let right = column(index, content, "right_column")?;

            match (left, right) {
                (Some(left), Some(right)) => {
                    spec = spec.with_sequence(left).with_sequence(right);
                }
                (Some(left), None) => spec = spec.with_sequence(left),
                // keep the right column on the right
                (None, Some(right)) => spec = spec.with_sequence(Vec::new()).with_sequence(right),
                (None, None) => {}
            }
        }
    }

    Ok(spec)
}

fn optional_str<'a>(
    index: usize,
    object: &'a Object,
    key: &str,
) -> Result<Option<&'a str>, DomainError> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(DomainError::generation_at(
            index,
            format!("content.{}", key),
            "must be a string",
        )),
    }
}

fn string_list(
    index: usize,
    object: &Object,
    key: &str,
    path: &str,
) -> Result<Vec<String>, DomainError> {
    let items = match object.get(key) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(DomainError::generation_at(index, path, "must be a list")),
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                DomainError::generation_at(index, format!("{}[{}]", path, i), "must be a string")
            })
        })
        .collect()
}

/// Heading at level 0 followed by points at level 1
fn column(index: usize, content: &Object, key: &str) -> Result<Option<Vec<TextBlock>>, DomainError> {
    let column = match content.get(key) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Object(column)) => column,
        Some(_) => {
            return Err(DomainError::generation_at(
                index,
                format!("content.{}", key),
                "must be an object",
            ));
        }
    };

    let mut blocks = Vec::new();

    match column.get("heading") {
        None | Some(Value::Null) => {}
        Some(Value::String(heading)) if heading.trim().is_empty() => {}
        Some(Value::String(heading)) => blocks.push(TextBlock::new(heading.as_str())),
        Some(_) => {
            return Err(DomainError::generation_at(
                index,
                format!("content.{}.heading", key),
                "must be a string",
            ));
        }
    }

    let path = format!("content.{}.points", key);
    blocks.extend(
        string_list(index, column, "points", &path)?
            .into_iter()
            .map(|point| TextBlock::new(point).with_level(1)),
    );

    Ok(Some(blocks))
}
