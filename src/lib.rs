//! # docweave
//!
//! A Rust library for building structured documents (headings, styled
//! paragraphs, bulleted and numbered lists) and serializing them to DOCX
//! word-processor files.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docweave::{Document, TextRun};
//!
//! fn main() -> docweave::Result<()> {
//!     let mut doc = Document::new();
//!     doc.add_heading(0, "Project report")?;
//!     doc.add_paragraph(vec![TextRun::italic("Generated automatically")], None)?;
//!     doc.add_bullet("First point");
//!     doc.add_bullet("Second point");
//!
//!     // Seals the document and writes it atomically
//!     doc.save("report.docx")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Lists
//!
//! Consecutive list items form one logical list. Any heading or paragraph
//! in between closes it, so the next numbered item starts again at 1.
//! Use [`Document::add_list_item_in`] to continue an earlier list.
//!
//! ## Features
//!
//! - `async`: Async save and write helpers with Tokio

pub mod error;
pub mod model;
pub mod render;

#[cfg(feature = "async")]
pub mod async_api;

// Re-exports
pub use error::{Error, Result};
pub use model::{
    Block, BlockRef, Document, DocumentState, ListId, ListKind, Metadata, SealedDocument,
    StyleDef, StyleSheet, TextRun,
};
pub use render::{
    Compression, DocxOptions, DocxSerializer, MarkdownSerializer, RenderOptions, Serializer,
};

use std::io::Write;
use std::path::Path;

/// Saves a sealed document as DOCX at `path` with default options.
///
/// The whole package is encoded before the file is touched; the file is then
/// replaced atomically, so a failed save never leaves a partial file behind.
///
/// # Example
///
/// ```no_run
/// use docweave::Document;
///
/// let mut doc = Document::new();
/// doc.add_heading(0, "Title")?;
/// let sealed = doc.seal();
/// docweave::save(&sealed, "out.docx")?;
/// # Ok::<(), docweave::Error>(())
/// ```
pub fn save(document: &SealedDocument, path: impl AsRef<Path>) -> Result<()> {
    render::save_with(&DocxSerializer::default(), document, path)
}

/// Writes a sealed document as DOCX to `writer` in one `write_all` call.
pub fn write_to<W: Write>(document: &SealedDocument, writer: &mut W) -> Result<()> {
    render::write_with(&DocxSerializer::default(), document, writer)
}

/// Encodes a sealed document as DOCX bytes with default options.
pub fn to_bytes(document: &SealedDocument) -> Result<Vec<u8>> {
    DocxSerializer::default().to_bytes(document)
}

/// Renders a document to Markdown with default options.
pub fn to_markdown(document: &Document) -> Result<String> {
    render::render_markdown(document, &RenderOptions::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_bytes_is_zip() {
        let mut doc = Document::new();
        doc.add_heading(0, "Title").unwrap();
        let bytes = to_bytes(&doc.seal()).unwrap();
        assert_eq!(&bytes[..4], b"PK\x03\x04");
    }

    #[test]
    fn test_write_to_matches_to_bytes() {
        let mut doc = Document::new();
        doc.add_text("body");
        let sealed = doc.seal();

        let mut sink = Vec::new();
        write_to(&sealed, &mut sink).unwrap();
        assert_eq!(sink, to_bytes(&sealed).unwrap());
    }

    #[test]
    fn test_to_markdown() {
        let mut doc = Document::new();
        doc.add_heading(0, "Title").unwrap();
        doc.add_bullet("point");
        assert_eq!(to_markdown(&doc).unwrap(), "# Title\n\n- point\n");
    }

    // ==================== Edge Case Tests ====================

    #[test]
    fn test_save_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.docx");

        let err = save(&Document::new().seal(), &path).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_save_without_parent_component() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.docx");
        let mut doc = Document::new();
        doc.add_heading(0, "T").unwrap();

        let sealed = doc.save(&path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), to_bytes(&sealed).unwrap());
    }
}
