//! Shared XML building blocks for PresentationML parts

use std::fmt::Write as FmtWrite;

use crate::domain::template::Frame;
use crate::domain::{DomainError, LayoutKind, PlaceholderRole};

pub(super) const XML_DECLARATION: &str =
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

pub(super) const NS_DRAWING: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub(super) const NS_RELATIONSHIPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
pub(super) const NS_PRESENTATION: &str =
    "http://schemas.openxmlformats.org/presentationml/2006/main";

pub(super) const REL_SLIDE_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
pub(super) const REL_SLIDE_MASTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";

/// Escape the five XML special characters
pub fn escape_xml(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            // characters XML 1.0 cannot carry at all
            c if (c as u32) < 0x20 && !matches!(c, '\t' | '\n' | '\r') => {}
            c => escaped.push(c),
        }
    }
    escaped
}

pub(super) fn fmt_error(e: std::fmt::Error) -> DomainError {
    DomainError::render(format!("Failed to build XML: {}", e))
}

/// `xmlns` attributes for the three PresentationML namespaces
pub(super) fn namespaces() -> String {
    format!(
        r#"xmlns:a="{}" xmlns:r="{}" xmlns:p="{}""#,
        NS_DRAWING, NS_RELATIONSHIPS, NS_PRESENTATION
    )
}

/// Relationships part with `(id, type, target)` entries
pub(super) fn relationships(entries: &[(String, &str, String)]) -> Result<String, DomainError> {
    let mut xml = String::with_capacity(256 + entries.len() * 160);
    xml.push_str(XML_DECLARATION);
    xml.push_str(
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for (id, rel_type, target) in entries {
        write!(
            xml,
            r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
            id, rel_type, target
        )
        .map_err(fmt_error)?;
    }
    xml.push_str("</Relationships>");
    Ok(xml)
}

/// Group shape header every shape tree starts with
pub(super) const SHAPE_TREE_HEADER: &str = concat!(
    r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
    r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/>"#,
    r#"<a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#
);

/// `<p:ph>` attributes binding a shape to its layout placeholder
pub(super) fn placeholder_attrs(layout: LayoutKind, role: PlaceholderRole, index: u32) -> String {
    match (layout, role) {
        (LayoutKind::Title, PlaceholderRole::Title) => r#"type="ctrTitle""#.to_string(),
        (_, PlaceholderRole::Title) => r#"type="title""#.to_string(),
        (_, PlaceholderRole::Subtitle) => format!(r#"type="subTitle" idx="{}""#, index),
        (_, PlaceholderRole::Body) => format!(r#"idx="{}""#, index),
        (_, PlaceholderRole::LeftColumn | PlaceholderRole::RightColumn) => {
            format!(r#"sz="half" idx="{}""#, index)
        }
    }
}

pub(super) fn placeholder_name(role: PlaceholderRole) -> &'static str {
    match role {
        PlaceholderRole::Title => "Title",
        PlaceholderRole::Subtitle => "Subtitle",
        PlaceholderRole::Body => "Content Placeholder",
        PlaceholderRole::LeftColumn => "Left Content Placeholder",
        PlaceholderRole::RightColumn => "Right Content Placeholder",
    }
}

/// A placeholder shape with an explicit frame and prebuilt text body
pub(super) fn placeholder_shape(
    xml: &mut String,
    shape_id: u32,
    name: &str,
    ph_attrs: &str,
    frame: &Frame,
    paragraphs: &str,
) -> Result<(), DomainError> {
    write!(
        xml,
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="{} {}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph {}/></p:nvPr></p:nvSpPr>"#,
        shape_id,
        name,
        shape_id.saturating_sub(1),
        ph_attrs
    )
    .map_err(fmt_error)?;

    write!(
        xml,
        r#"<p:spPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm></p:spPr>"#,
        frame.x, frame.y, frame.width, frame.height
    )
    .map_err(fmt_error)?;

    xml.push_str("<p:txBody><a:bodyPr/><a:lstStyle/>");
    if paragraphs.is_empty() {
        xml.push_str(EMPTY_PARAGRAPH);
    } else {
        xml.push_str(paragraphs);
    }
    xml.push_str("</p:txBody></p:sp>");

    Ok(())
}

pub(super) const EMPTY_PARAGRAPH: &str = r#"<a:p><a:endParaRPr lang="en-US" dirty="0"/></a:p>"#;
