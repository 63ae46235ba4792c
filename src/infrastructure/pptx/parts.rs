//! Package-level parts: content types, presentation, master, layouts,
//! theme and document properties

use std::fmt::Write as FmtWrite;

use chrono::{DateTime, SecondsFormat, Utc};

use super::xml::{
    escape_xml, fmt_error, namespaces, placeholder_attrs, placeholder_name, placeholder_shape,
    relationships, REL_SLIDE_LAYOUT, REL_SLIDE_MASTER, SHAPE_TREE_HEADER, XML_DECLARATION,
};
use crate::domain::template::{LayoutTemplate, TextStyle};
use crate::domain::{AspectRatio, DomainError, LayoutKind, PlaceholderRole, Template};

const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const REL_CORE_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
const REL_EXTENDED_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
const REL_THEME: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
const REL_SLIDE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";

const CT_PRESENTATION: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
const CT_SLIDE_MASTER: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";
const CT_SLIDE_LAYOUT: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";
const CT_SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
const CT_THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";
const CT_CORE: &str = "application/vnd.openxmlformats-package.core-properties+xml";
const CT_APP: &str = "application/vnd.openxmlformats-officedocument.extended-properties+xml";

/// First slide id; PresentationML requires ids of 256 and above
const FIRST_SLIDE_ID: usize = 256;
const MASTER_ID: u64 = 2_147_483_648;

/// Relationship id of slide `index` in `presentation.xml.rels`
///
/// rId1 is the master and rId2 the theme.
pub(super) fn slide_rel_id(index: usize) -> String {
    format!("rId{}", index + 3)
}

/// `[Content_Types].xml`
pub(super) fn content_types(layout_count: usize, slide_count: usize) -> Result<String, DomainError> {
    let mut xml = String::with_capacity(2048);
    xml.push_str(XML_DECLARATION);
    xml.push_str(
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    );
    xml.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);

    let mut override_part = |name: String, content_type: &str| {
        write!(
            xml,
            r#"<Override PartName="{}" ContentType="{}"/>"#,
            name, content_type
        )
        .map_err(fmt_error)
    };

    override_part("/ppt/presentation.xml".to_string(), CT_PRESENTATION)?;
    override_part("/ppt/slideMasters/slideMaster1.xml".to_string(), CT_SLIDE_MASTER)?;
    for n in 1..=layout_count {
        override_part(format!("/ppt/slideLayouts/slideLayout{}.xml", n), CT_SLIDE_LAYOUT)?;
    }
    for n in 1..=slide_count {
        override_part(format!("/ppt/slides/slide{}.xml", n), CT_SLIDE)?;
    }
    override_part("/ppt/theme/theme1.xml".to_string(), CT_THEME)?;
    override_part("/docProps/core.xml".to_string(), CT_CORE)?;
    override_part("/docProps/app.xml".to_string(), CT_APP)?;

    xml.push_str("</Types>");
    Ok(xml)
}

/// `_rels/.rels`
pub(super) fn package_rels() -> Result<String, DomainError> {
    relationships(&[
        ("rId1".to_string(), REL_OFFICE_DOCUMENT, "ppt/presentation.xml".to_string()),
        ("rId2".to_string(), REL_CORE_PROPERTIES, "docProps/core.xml".to_string()),
        ("rId3".to_string(), REL_EXTENDED_PROPERTIES, "docProps/app.xml".to_string()),
    ])
}

/// `ppt/presentation.xml`
pub(super) fn presentation(template: &Template, slide_count: usize) -> Result<String, DomainError> {
    let mut xml = String::with_capacity(1024 + slide_count * 48);
    xml.push_str(XML_DECLARATION);
    write!(xml, r#"<p:presentation {} saveSubsetFonts="1">"#, namespaces()).map_err(fmt_error)?;

    write!(
        xml,
        r#"<p:sldMasterIdLst><p:sldMasterId id="{}" r:id="rId1"/></p:sldMasterIdLst>"#,
        MASTER_ID
    )
    .map_err(fmt_error)?;

    // an empty sldIdLst is invalid, so it is omitted for an empty deck
    if slide_count > 0 {
        xml.push_str("<p:sldIdLst>");
        for index in 0..slide_count {
            write!(
                xml,
                r#"<p:sldId id="{}" r:id="{}"/>"#,
                FIRST_SLIDE_ID + index,
                slide_rel_id(index)
            )
            .map_err(fmt_error)?;
        }
        xml.push_str("</p:sldIdLst>");
    }

    let size_type = match template.aspect_ratio {
        AspectRatio::Widescreen => "custom",
        AspectRatio::Standard => "screen4x3",
    };
    write!(
        xml,
        r#"<p:sldSz cx="{}" cy="{}" type="{}"/>"#,
        template.slide_width, template.slide_height, size_type
    )
    .map_err(fmt_error)?;
    xml.push_str(r#"<p:notesSz cx="6858000" cy="9144000"/>"#);
    xml.push_str("</p:presentation>");

    Ok(xml)
}

/// `ppt/_rels/presentation.xml.rels`
pub(super) fn presentation_rels(slide_count: usize) -> Result<String, DomainError> {
    let mut entries = vec![
        (
            "rId1".to_string(),
            REL_SLIDE_MASTER,
            "slideMasters/slideMaster1.xml".to_string(),
        ),
        ("rId2".to_string(), REL_THEME, "theme/theme1.xml".to_string()),
    ];
    entries.extend(
        (0..slide_count)
            .map(|index| (slide_rel_id(index), REL_SLIDE, format!("slides/slide{}.xml", index + 1))),
    );
    relationships(&entries)
}

/// `ppt/slideMasters/slideMaster1.xml`
///
/// Title and body placeholders take their frames from the bullet layout;
/// text styles carry the template's fonts.
pub(super) fn slide_master(template: &Template) -> Result<String, DomainError> {
    let title = template.placeholder(LayoutKind::BulletList, PlaceholderRole::Title)?;
    let body = template.placeholder(LayoutKind::BulletList, PlaceholderRole::Body)?;

    let mut xml = String::with_capacity(4096);
    xml.push_str(XML_DECLARATION);
    write!(xml, "<p:sldMaster {}>", namespaces()).map_err(fmt_error)?;
    xml.push_str(r#"<p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg><p:spTree>"#);
    xml.push_str(SHAPE_TREE_HEADER);
    placeholder_shape(&mut xml, 2, "Title Placeholder", r#"type="title""#, &title.frame, "")?;
    placeholder_shape(
        &mut xml,
        3,
        "Text Placeholder",
        r#"type="body" idx="1""#,
        &body.frame,
        "",
    )?;
    xml.push_str("</p:spTree></p:cSld>");

    xml.push_str(concat!(
        r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" "#,
        r#"accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" "#,
        r#"hlink="hlink" folHlink="folHlink"/>"#
    ));

    xml.push_str("<p:sldLayoutIdLst>");
    for n in 1..=template.layouts.len() {
        write!(
            xml,
            r#"<p:sldLayoutId id="{}" r:id="rId{}"/>"#,
            MASTER_ID + n as u64,
            n
        )
        .map_err(fmt_error)?;
    }
    xml.push_str("</p:sldLayoutIdLst>");

    xml.push_str("<p:txStyles><p:titleStyle>");
    level_style(&mut xml, 1, &template.title_style, 0)?;
    xml.push_str("</p:titleStyle><p:bodyStyle>");
    for level in 1..=3 {
        let indent = 228_600 * level as i64;
        level_style(&mut xml, level, &template.body_style, indent)?;
    }
    xml.push_str("</p:bodyStyle>");
    xml.push_str(r#"<p:otherStyle><a:defPPr><a:defRPr lang="en-US"/></a:defPPr></p:otherStyle>"#);
    xml.push_str("</p:txStyles></p:sldMaster>");

    Ok(xml)
}

fn level_style(
    xml: &mut String,
    level: u32,
    style: &TextStyle,
    margin: i64,
) -> Result<(), DomainError> {
    write!(
        xml,
        r#"<a:lvl{}pPr marL="{}"><a:defRPr sz="{}"><a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:latin typeface="{}"/></a:defRPr></a:lvl{}pPr>"#,
        level,
        margin,
        style.size_pt * 100,
        escape_xml(&style.color),
        escape_xml(&style.font),
        level
    )
    .map_err(fmt_error)
}

/// `ppt/slideMasters/_rels/slideMaster1.xml.rels`
pub(super) fn slide_master_rels(layout_count: usize) -> Result<String, DomainError> {
    let mut entries: Vec<(String, &str, String)> = (1..=layout_count)
        .map(|n| {
            (
                format!("rId{}", n),
                REL_SLIDE_LAYOUT,
                format!("../slideLayouts/slideLayout{}.xml", n),
            )
        })
        .collect();
    entries.push((
        format!("rId{}", layout_count + 1),
        REL_THEME,
        "../theme/theme1.xml".to_string(),
    ));
    relationships(&entries)
}

/// `ppt/slideLayouts/slideLayoutN.xml`
pub(super) fn slide_layout(layout: &LayoutTemplate) -> Result<String, DomainError> {
    let layout_type = match layout.kind {
        LayoutKind::Title => "title",
        LayoutKind::BulletList => "obj",
        LayoutKind::TwoColumn => "twoObj",
    };

    let mut xml = String::with_capacity(2048);
    xml.push_str(XML_DECLARATION);
    write!(
        xml,
        r#"<p:sldLayout {} type="{}" preserve="1"><p:cSld name="{}"><p:spTree>"#,
        namespaces(),
        layout_type,
        escape_xml(&layout.name)
    )
    .map_err(fmt_error)?;
    xml.push_str(SHAPE_TREE_HEADER);

    for (position, placeholder) in layout.placeholders.iter().enumerate() {
        placeholder_shape(
            &mut xml,
            position as u32 + 2,
            placeholder_name(placeholder.role),
            &placeholder_attrs(layout.kind, placeholder.role, placeholder.index),
            &placeholder.frame,
            "",
        )?;
    }

    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>");
    Ok(xml)
}

/// `ppt/slideLayouts/_rels/slideLayoutN.xml.rels`
pub(super) fn slide_layout_rels() -> Result<String, DomainError> {
    relationships(&[(
        "rId1".to_string(),
        REL_SLIDE_MASTER,
        "../slideMasters/slideMaster1.xml".to_string(),
    )])
}

/// `ppt/theme/theme1.xml`
pub(super) fn theme(template: &Template) -> Result<String, DomainError> {
    let mut xml = String::with_capacity(4096);
    xml.push_str(XML_DECLARATION);
    write!(
        xml,
        r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="{}">"#,
        escape_xml(&template.name)
    )
    .map_err(fmt_error)?;
    xml.push_str("<a:themeElements>");

    write!(
        xml,
        concat!(
            r#"<a:clrScheme name="{name}">"#,
            r#"<a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>"#,
            r#"<a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>"#,
            r#"<a:dk2><a:srgbClr val="{title}"/></a:dk2>"#,
            r#"<a:lt2><a:srgbClr val="E7E6E6"/></a:lt2>"#,
            r#"<a:accent1><a:srgbClr val="4472C4"/></a:accent1>"#,
            r#"<a:accent2><a:srgbClr val="ED7D31"/></a:accent2>"#,
            r#"<a:accent3><a:srgbClr val="A5A5A5"/></a:accent3>"#,
            r#"<a:accent4><a:srgbClr val="FFC000"/></a:accent4>"#,
            r#"<a:accent5><a:srgbClr val="5B9BD5"/></a:accent5>"#,
            r#"<a:accent6><a:srgbClr val="70AD47"/></a:accent6>"#,
            r#"<a:hlink><a:srgbClr val="0563C1"/></a:hlink>"#,
            r#"<a:folHlink><a:srgbClr val="954F72"/></a:folHlink>"#,
            r#"</a:clrScheme>"#
        ),
        name = escape_xml(&template.name),
        title = escape_xml(&template.title_style.color),
    )
    .map_err(fmt_error)?;

    write!(
        xml,
        concat!(
            r#"<a:fontScheme name="{name}">"#,
            r#"<a:majorFont><a:latin typeface="{major}"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont>"#,
            r#"<a:minorFont><a:latin typeface="{minor}"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont>"#,
            r#"</a:fontScheme>"#
        ),
        name = escape_xml(&template.name),
        major = escape_xml(&template.title_style.font),
        minor = escape_xml(&template.body_style.font),
    )
    .map_err(fmt_error)?;

    xml.push_str(FORMAT_SCHEME);
    xml.push_str("</a:themeElements><a:objectDefaults/><a:extraClrSchemeLst/></a:theme>");
    Ok(xml)
}

const FORMAT_SCHEME: &str = concat!(
    r#"<a:fmtScheme name="Office">"#,
    r#"<a:fillStyleLst>"#,
    r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
    r#"<a:solidFill><a:schemeClr val="phClr"><a:tint val="50000"/></a:schemeClr></a:solidFill>"#,
    r#"<a:solidFill><a:schemeClr val="phClr"><a:shade val="80000"/></a:schemeClr></a:solidFill>"#,
    r#"</a:fillStyleLst>"#,
    r#"<a:lnStyleLst>"#,
    r#"<a:ln w="6350"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#,
    r#"<a:ln w="12700"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#,
    r#"<a:ln w="19050"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#,
    r#"</a:lnStyleLst>"#,
    r#"<a:effectStyleLst>"#,
    r#"<a:effectStyle><a:effectLst/></a:effectStyle>"#,
    r#"<a:effectStyle><a:effectLst/></a:effectStyle>"#,
    r#"<a:effectStyle><a:effectLst/></a:effectStyle>"#,
    r#"</a:effectStyleLst>"#,
    r#"<a:bgFillStyleLst>"#,
    r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
    r#"<a:solidFill><a:schemeClr val="phClr"><a:tint val="95000"/></a:schemeClr></a:solidFill>"#,
    r#"<a:solidFill><a:schemeClr val="phClr"><a:shade val="90000"/></a:schemeClr></a:solidFill>"#,
    r#"</a:bgFillStyleLst>"#,
    r#"</a:fmtScheme>"#
);

/// `docProps/core.xml`
pub(super) fn core_properties(
    title: Option<&str>,
    created: DateTime<Utc>,
) -> Result<String, DomainError> {
    let timestamp = created.to_rfc3339_opts(SecondsFormat::Secs, true);

    let mut xml = String::with_capacity(1024);
    xml.push_str(XML_DECLARATION);
    xml.push_str(concat!(
        r#"<cp:coreProperties "#,
        r#"xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
        r#"xmlns:dc="http://purl.org/dc/elements/1.1/" "#,
        r#"xmlns:dcterms="http://purl.org/dc/terms/" "#,
        r#"xmlns:dcmitype="http://purl.org/dc/dcmitype/" "#,
        r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#
    ));
    if let Some(title) = title {
        write!(xml, "<dc:title>{}</dc:title>", escape_xml(title)).map_err(fmt_error)?;
    }
    write!(
        xml,
        concat!(
            "<dc:creator>{creator}</dc:creator>",
            r#"<dcterms:created xsi:type="dcterms:W3CDTF">{ts}</dcterms:created>"#,
            r#"<dcterms:modified xsi:type="dcterms:W3CDTF">{ts}</dcterms:modified>"#
        ),
        creator = env!("CARGO_PKG_NAME"),
        ts = timestamp,
    )
    .map_err(fmt_error)?;
    xml.push_str("</cp:coreProperties>");
    Ok(xml)
}

/// `docProps/app.xml`
pub(super) fn app_properties(template: &Template, slide_count: usize) -> Result<String, DomainError> {
    let format = match template.aspect_ratio {
        AspectRatio::Widescreen => "Widescreen",
        AspectRatio::Standard => "On-screen Show (4:3)",
    };

    let mut xml = String::with_capacity(512);
    xml.push_str(XML_DECLARATION);
    write!(
        xml,
        concat!(
            r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" "#,
            r#"xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">"#,
            "<Application>{app}</Application>",
            "<PresentationFormat>{format}</PresentationFormat>",
            "<Slides>{slides}</Slides>",
            "<AppVersion>{version}</AppVersion>",
            "</Properties>"
        ),
        app = env!("CARGO_PKG_NAME"),
        format = format,
        slides = slide_count,
        version = app_version(),
    )
    .map_err(fmt_error)?;
    Ok(xml)
}

/// `AppVersion` must look like `XX.YYYY`
fn app_version() -> String {
    let major: u32 = env!("CARGO_PKG_VERSION_MAJOR").parse().unwrap_or(0);
    let minor: u32 = env!("CARGO_PKG_VERSION_MINOR").parse().unwrap_or(0);
    format!("{:02}.{:04}", major, minor)
}
