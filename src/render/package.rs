//! ZIP package writer for DOCX output.

use super::options::Compression;
use crate::error::Result;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Part names inside the package.
pub mod paths {
    pub const CONTENT_TYPES: &str = "[Content_Types].xml";
    pub const PACKAGE_RELS: &str = "_rels/.rels";
    pub const DOCUMENT: &str = "word/document.xml";
    pub const DOCUMENT_RELS: &str = "word/_rels/document.xml.rels";
    pub const STYLES: &str = "word/styles.xml";
    pub const NUMBERING: &str = "word/numbering.xml";
    pub const SETTINGS: &str = "word/settings.xml";
    pub const CORE_PROPS: &str = "docProps/core.xml";
    pub const APP_PROPS: &str = "docProps/app.xml";
}

/// Content types of the parts.
mod content_type {
    pub const RELS: &str = "application/vnd.openxmlformats-package.relationships+xml";
    pub const XML: &str = "application/xml";
    pub const DOCUMENT: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
    pub const STYLES: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml";
    pub const NUMBERING: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml";
    pub const SETTINGS: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml";
    pub const CORE_PROPS: &str = "application/vnd.openxmlformats-package.core-properties+xml";
    pub const APP_PROPS: &str =
        "application/vnd.openxmlformats-officedocument.extended-properties+xml";
}

/// Relationship types.
mod rel_type {
    pub const OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const CORE_PROPS: &str =
        "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
    pub const APP_PROPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
    pub const STYLES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
    pub const NUMBERING: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering";
    pub const SETTINGS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings";
}

/// Parts of a WordprocessingML package, in the order they are written.
#[derive(Debug, Default)]
pub struct DocxParts {
    pub document: String,
    pub styles: String,
    pub numbering: String,
    pub settings: String,
    pub core_props: String,
    pub app_props: String,
}

/// Writes DOCX parts into an in-memory ZIP archive.
///
/// Entries carry the DOS epoch as their modification time so the same parts
/// always produce the same bytes.
pub struct PackageWriter {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
}

impl PackageWriter {
    /// Creates a new in-memory package.
    pub fn new(compression: Compression) -> Self {
        let options = SimpleFileOptions::default()
            .compression_method(compression.into())
            .last_modified_time(zip::DateTime::default());

        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            options,
        }
    }

    /// Writes one part.
    pub fn write_part(&mut self, name: &str, content: &[u8]) -> Result<()> {
        log::debug!("writing part {} ({} bytes)", name, content.len());
        self.zip.start_file(name, self.options)?;
        self.zip.write_all(content)?;
        Ok(())
    }

    /// Writes a complete package: content types, relationships and all parts.
    pub fn write_docx(mut self, parts: &DocxParts) -> Result<Vec<u8>> {
        self.write_part(paths::CONTENT_TYPES, content_types_xml().as_bytes())?;
        self.write_part(paths::PACKAGE_RELS, package_rels_xml().as_bytes())?;
        self.write_part(paths::DOCUMENT, parts.document.as_bytes())?;
        self.write_part(paths::DOCUMENT_RELS, document_rels_xml().as_bytes())?;
        self.write_part(paths::STYLES, parts.styles.as_bytes())?;
        self.write_part(paths::NUMBERING, parts.numbering.as_bytes())?;
        self.write_part(paths::SETTINGS, parts.settings.as_bytes())?;
        self.write_part(paths::CORE_PROPS, parts.core_props.as_bytes())?;
        self.write_part(paths::APP_PROPS, parts.app_props.as_bytes())?;
        self.finish()
    }

    /// Finishes the archive and returns its bytes.
    pub fn finish(self) -> Result<Vec<u8>> {
        let cursor = self.zip.finish()?;
        Ok(cursor.into_inner())
    }
}

fn content_types_xml() -> String {
    let overrides = [
        (paths::DOCUMENT, content_type::DOCUMENT),
        (paths::STYLES, content_type::STYLES),
        (paths::NUMBERING, content_type::NUMBERING),
        (paths::SETTINGS, content_type::SETTINGS),
        (paths::CORE_PROPS, content_type::CORE_PROPS),
        (paths::APP_PROPS, content_type::APP_PROPS),
    ];

    let mut xml = String::with_capacity(1536);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    );
    xml.push_str(&format!(
        r#"<Default Extension="rels" ContentType="{}"/>"#,
        content_type::RELS
    ));
    xml.push_str(&format!(
        r#"<Default Extension="xml" ContentType="{}"/>"#,
        content_type::XML
    ));
    for (part, ct) in overrides {
        xml.push_str(&format!(
            r#"<Override PartName="/{}" ContentType="{}"/>"#,
            part, ct
        ));
    }
    xml.push_str("</Types>");
    xml
}

fn relationships_xml(rels: &[(&str, &str, &str)]) -> String {
    let mut xml = String::with_capacity(512);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for (id, rel_type, target) in rels {
        xml.push_str(&format!(
            r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
            id, rel_type, target
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

fn package_rels_xml() -> String {
    relationships_xml(&[
        ("rId1", rel_type::OFFICE_DOCUMENT, paths::DOCUMENT),
        ("rId2", rel_type::CORE_PROPS, paths::CORE_PROPS),
        ("rId3", rel_type::APP_PROPS, paths::APP_PROPS),
    ])
}

// Targets are relative to word/.
fn document_rels_xml() -> String {
    relationships_xml(&[
        ("rId1", rel_type::STYLES, "styles.xml"),
        ("rId2", rel_type::NUMBERING, "numbering.xml"),
        ("rId3", rel_type::SETTINGS, "settings.xml"),
    ])
}
