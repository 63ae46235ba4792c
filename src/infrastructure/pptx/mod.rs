//! PowerPoint (`.pptx`) serialization
//!
//! A package is a zip archive of XML parts. Every part is generated from
//! the deck and its template; nothing is read from disk.

mod parts;
mod slide;
mod writer;
mod xml;

pub use writer::{PptxWriter, PPTX_CONTENT_TYPE};
pub use xml::escape_xml;
