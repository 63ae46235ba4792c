//! Slide parts

use std::fmt::Write as FmtWrite;

use super::xml::{
    escape_xml, fmt_error, namespaces, placeholder_attrs, placeholder_name, placeholder_shape,
    relationships, REL_SLIDE_LAYOUT, SHAPE_TREE_HEADER, XML_DECLARATION,
};
use crate::domain::template::TextStyle;
use crate::domain::{DomainError, Paragraph, RenderedSlide, StyledRun, Template};

/// `ppt/slides/slideN.xml`
pub(super) fn slide_xml(template: &Template, slide: &RenderedSlide) -> Result<String, DomainError> {
    let mut xml = String::with_capacity(4096);
    xml.push_str(XML_DECLARATION);
    write!(xml, "<p:sld {}>", namespaces()).map_err(fmt_error)?;
    xml.push_str("<p:cSld><p:spTree>");
    xml.push_str(SHAPE_TREE_HEADER);

    for (position, content) in slide.placeholders.iter().enumerate() {
        let style = template.text_style(content.role());
        let body = paragraphs_xml(&content.paragraphs, style)?;
        let shape_id = position as u32 + 2;

        placeholder_shape(
            &mut xml,
            shape_id,
            placeholder_name(content.role()),
            &placeholder_attrs(slide.layout, content.role(), content.spec.index),
            &content.spec.frame,
            &body,
        )?;
    }

    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
    xml.push_str("</p:sld>");

    Ok(xml)
}

/// `ppt/slides/_rels/slideN.xml.rels`
pub(super) fn slide_rels(layout_number: usize) -> Result<String, DomainError> {
    relationships(&[(
        "rId1".to_string(),
        REL_SLIDE_LAYOUT,
        format!("../slideLayouts/slideLayout{}.xml", layout_number),
    )])
}

fn paragraphs_xml(paragraphs: &[Paragraph], style: &TextStyle) -> Result<String, DomainError> {
    let mut xml = String::new();

    for paragraph in paragraphs {
        xml.push_str("<a:p>");
        if paragraph.level > 0 {
            write!(xml, r#"<a:pPr lvl="{}"/>"#, paragraph.level).map_err(fmt_error)?;
        }

        for run in paragraph.line.runs() {
            run_xml(&mut xml, run, style)?;
        }

        if paragraph.line.is_empty() {
            write!(xml, r#"<a:endParaRPr lang="en-US" sz="{}" dirty="0"/>"#, style.size_pt * 100)
                .map_err(fmt_error)?;
        }
        xml.push_str("</a:p>");
    }

    Ok(xml)
}

/// One formatted run
///
/// Size and color always come from the template style. Bold runs keep the
/// theme font; every other run gets the style's typeface.
fn run_xml(xml: &mut String, run: &StyledRun, style: &TextStyle) -> Result<(), DomainError> {
    write!(xml, r#"<a:r><a:rPr lang="en-US" sz="{}""#, style.size_pt * 100).map_err(fmt_error)?;
    if run.bold {
        xml.push_str(r#" b="1""#);
    }
    if run.underline {
        xml.push_str(r#" u="sng""#);
    }
    xml.push_str(r#" dirty="0">"#);

    write!(
        xml,
        r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#,
        escape_xml(&style.color)
    )
    .map_err(fmt_error)?;

    if !run.bold {
        write!(xml, r#"<a:latin typeface="{}"/>"#, escape_xml(&style.font)).map_err(fmt_error)?;
    }

    write!(xml, "</a:rPr><a:t>{}</a:t></a:r>", escape_xml(&run.text)).map_err(fmt_error)?;

    Ok(())
}
