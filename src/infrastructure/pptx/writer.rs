use std::io::{Cursor, Write};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::{parts, slide};
use crate::domain::{Deck, DomainError};

/// MIME type of a `.pptx` package
pub const PPTX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// Serializes a rendered deck into a PowerPoint package
#[derive(Debug, Clone, Copy, Default)]
pub struct PptxWriter;

impl PptxWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn write(&self, deck: &Deck) -> Result<Bytes, DomainError> {
        self.write_at(deck, Utc::now())
    }

    /// Write with a fixed creation timestamp
    pub fn write_at(&self, deck: &Deck, created: DateTime<Utc>) -> Result<Bytes, DomainError> {
        let template = deck.template();
        let layout_count = template.layouts.len();
        let slide_count = deck.len();

        let mut package = Package::new();

        package.add("[Content_Types].xml", parts::content_types(layout_count, slide_count)?)?;
        package.add("_rels/.rels", parts::package_rels()?)?;
        package.add(
            "docProps/core.xml",
            parts::core_properties(deck.title().as_deref(), created)?,
        )?;
        package.add("docProps/app.xml", parts::app_properties(template, slide_count)?)?;

        package.add("ppt/presentation.xml", parts::presentation(template, slide_count)?)?;
        package.add("ppt/_rels/presentation.xml.rels", parts::presentation_rels(slide_count)?)?;

        package.add("ppt/slideMasters/slideMaster1.xml", parts::slide_master(template)?)?;
        package.add(
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            parts::slide_master_rels(layout_count)?,
        )?;

        for (index, layout) in template.layouts.iter().enumerate() {
            let n = index + 1;
            package.add(
                &format!("ppt/slideLayouts/slideLayout{}.xml", n),
                parts::slide_layout(layout)?,
            )?;
            package.add(
                &format!("ppt/slideLayouts/_rels/slideLayout{}.xml.rels", n),
                parts::slide_layout_rels()?,
            )?;
        }

        package.add("ppt/theme/theme1.xml", parts::theme(template)?)?;

        for (index, rendered) in deck.slides().iter().enumerate() {
            let n = index + 1;
            let layout_number = template
                .layout_position(rendered.layout)
                .map(|position| position + 1)
                .ok_or_else(|| {
                    DomainError::render(format!(
                        "template '{}' has no '{}' layout",
                        template.name, rendered.layout
                    ))
                })?;

            package.add(
                &format!("ppt/slides/slide{}.xml", n),
                slide::slide_xml(template, rendered)?,
            )?;
            package.add(
                &format!("ppt/slides/_rels/slide{}.xml.rels", n),
                slide::slide_rels(layout_number)?,
            )?;
        }

        let bytes = package.finish()?;

        tracing::debug!(slides = slide_count, bytes = bytes.len(), "Serialized deck");

        Ok(bytes)
    }
}

/// In-memory zip archive of package parts
struct Package {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
}

impl Package {
    fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            // fixed entry timestamps keep output reproducible
            options: SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .last_modified_time(zip::DateTime::default()),
        }
    }

    fn add(&mut self, path: &str, content: String) -> Result<(), DomainError> {
        self.zip
            .start_file(path, self.options)
            .map_err(|e| DomainError::render(format!("Failed to add {}: {}", path, e)))?;
        self.zip
            .write_all(content.as_bytes())
            .map_err(|e| DomainError::render(format!("Failed to write {}: {}", path, e)))
    }

    fn finish(self) -> Result<Bytes, DomainError> {
        let cursor = self
            .zip
            .finish()
            .map_err(|e| DomainError::render(format!("Failed to finish package: {}", e)))?;
        Ok(Bytes::from(cursor.into_inner()))
    }
}
