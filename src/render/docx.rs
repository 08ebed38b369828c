//! DOCX (WordprocessingML) serializer.

use super::numbering::{style_num_id, NumberingPlan};
use super::options::DocxOptions;
use super::package::{DocxParts, PackageWriter};
use super::Serializer;
use crate::error::{Error, Result};
use crate::model::{
    heading_style_id, Block, ListKind, SealedDocument, StyleDef, StyleSheet, TextRun, LIST_BULLET,
    LIST_NUMBER, NORMAL,
};
use quick_xml::escape::escape;
use std::borrow::Cow;
use std::fmt::Write as FmtWrite;
use unicode_normalization::UnicodeNormalization;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Letter paper with one-inch margins, in twips.
const SECTION_PROPERTIES: &str = concat!(
    r#"<w:sectPr><w:pgSz w:w="12240" w:h="15840"/>"#,
    r#"<w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" "#,
    r#"w:header="720" w:footer="720" w:gutter="0"/></w:sectPr>"#
);

/// Serializes sealed documents to DOCX packages.
///
/// Style names are resolved against the serializer's own [`StyleSheet`], so
/// a document built against a larger vocabulary fails here with
/// [`Error::Serialization`] rather than producing dangling style references.
#[derive(Debug, Clone, Default)]
pub struct DocxSerializer {
    options: DocxOptions,
    styles: StyleSheet,
}

impl DocxSerializer {
    /// Creates a serializer with the built-in style sheet.
    pub fn new(options: DocxOptions) -> Self {
        Self {
            options,
            styles: StyleSheet::builtin(),
        }
    }

    /// Replaces the style sheet used for resolution and for `styles.xml`.
    pub fn with_styles(mut self, styles: StyleSheet) -> Self {
        self.styles = styles;
        self
    }

    /// Returns the serializer options.
    pub fn options(&self) -> &DocxOptions {
        &self.options
    }

    /// Encodes the complete package in memory.
    pub fn to_bytes(&self, document: &SealedDocument) -> Result<Vec<u8>> {
        if document.is_empty() {
            log::warn!("serializing a document with no blocks");
        } else if document.title().is_none() {
            log::warn!("document has no title heading");
        }

        let plan = NumberingPlan::build(document.blocks());
        log::debug!(
            "serializing {} blocks, {} list instances",
            document.len(),
            plan.instances().len()
        );

        let parts = DocxParts {
            document: self.document_xml(document, &plan)?,
            styles: self.styles_xml()?,
            numbering: plan.to_xml()?,
            settings: settings_xml(),
            core_props: self.core_props_xml(document)?,
            app_props: self.app_props_xml()?,
        };

        PackageWriter::new(self.options.compression).write_docx(&parts)
    }

    fn resolve(&self, name: &str, block: usize) -> Result<&StyleDef> {
        self.styles.resolve(name).ok_or_else(|| {
            Error::Serialization(format!("block {}: style '{}' is not defined", block, name))
        })
    }

    /// Generates `word/document.xml`.
    fn document_xml(&self, document: &SealedDocument, plan: &NumberingPlan) -> Result<String> {
        let mut xml = String::with_capacity(1024 + document.len() * 256);

        xml.push_str(XML_DECL);
        write!(xml, r#"<w:document xmlns:w="{}" xmlns:r="{}">"#, W_NS, R_NS)?;
        xml.push_str("<w:body>");

        for (index, block) in document.blocks().iter().enumerate() {
            match block {
                Block::Heading { level, text } => {
                    let style = self.resolve(&heading_style_id(*level), index)?;
                    let run = TextRun::new(text.as_str());
                    let style_id = Some(style.id.as_str());
                    self.write_paragraph(&mut xml, index, style_id, None, &[run])?;
                }
                Block::Paragraph { runs, style } => {
                    let style = match style {
                        Some(name) => Some(self.resolve(name, index)?),
                        None => None,
                    };
                    // Normal is the document default and needs no pStyle.
                    let style_id = style.map(|s| s.id.as_str()).filter(|&id| id != NORMAL);
                    self.write_paragraph(&mut xml, index, style_id, None, runs)?;
                }
                Block::ListItem {
                    text,
                    kind,
                    level,
                    list,
                } => {
                    let style_name = match kind {
                        ListKind::Bullet => LIST_BULLET,
                        ListKind::Number => LIST_NUMBER,
                    };
                    let style = self.resolve(style_name, index)?;
                    let num_id = list
                        .and_then(|id| plan.num_id(id, *kind))
                        .unwrap_or_else(|| style_num_id(*kind));
                    let run = TextRun::new(text.as_str());
                    self.write_paragraph(
                        &mut xml,
                        index,
                        Some(style.id.as_str()),
                        Some((*level, num_id)),
                        &[run],
                    )?;
                }
            }
        }

        xml.push_str(SECTION_PROPERTIES);
        xml.push_str("</w:body></w:document>");
        Ok(xml)
    }

    fn write_paragraph(
        &self,
        xml: &mut String,
        index: usize,
        style_id: Option<&str>,
        numbering: Option<(u8, u32)>,
        runs: &[TextRun],
    ) -> Result<()> {
        xml.push_str("<w:p>");

        if style_id.is_some() || numbering.is_some() {
            xml.push_str("<w:pPr>");
            if let Some(id) = style_id {
                write!(xml, r#"<w:pStyle w:val="{}"/>"#, escape(id))?;
            }
            if let Some((ilvl, num_id)) = numbering {
                write!(
                    xml,
                    r#"<w:numPr><w:ilvl w:val="{}"/><w:numId w:val="{}"/></w:numPr>"#,
                    ilvl, num_id
                )?;
            }
            xml.push_str("</w:pPr>");
        }

        for run in runs {
            self.write_run(xml, index, run)?;
        }

        xml.push_str("</w:p>");
        Ok(())
    }

    fn write_run(&self, xml: &mut String, index: usize, run: &TextRun) -> Result<()> {
        xml.push_str("<w:r>");

        if run.has_formatting() {
            xml.push_str("<w:rPr>");
            if run.bold {
                xml.push_str("<w:b/>");
            }
            if run.italic {
                xml.push_str("<w:i/>");
            }
            xml.push_str("</w:rPr>");
        }

        let text = self.prepare_text(&run.text, index)?;
        let mut segment = String::new();
        for ch in text.chars() {
            match ch {
                '\n' => {
                    flush_text(xml, &mut segment);
                    xml.push_str("<w:br/>");
                }
                '\t' => {
                    flush_text(xml, &mut segment);
                    xml.push_str("<w:tab/>");
                }
                '\r' => {}
                _ => segment.push(ch),
            }
        }
        flush_text(xml, &mut segment);

        xml.push_str("</w:r>");
        Ok(())
    }

    /// Validates and normalizes text for XML output.
    fn prepare_text<'a>(&self, text: &'a str, index: usize) -> Result<Cow<'a, str>> {
        check_xml_chars(text).map_err(|bad| {
            Error::Serialization(format!(
                "block {}: character U+{:04X} cannot be represented in XML",
                index, bad as u32
            ))
        })?;

        if self.options.normalize_unicode {
            Ok(Cow::Owned(text.nfc().collect()))
        } else {
            Ok(Cow::Borrowed(text))
        }
    }

    /// Generates `word/styles.xml` from the serializer's style sheet.
    fn styles_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(8192);

        xml.push_str(XML_DECL);
        write!(xml, r#"<w:styles xmlns:w="{}">"#, W_NS)?;

        check_field("font name", &self.options.font_name)?;
        let font = escape(self.options.font_name.as_str());
        xml.push_str("<w:docDefaults><w:rPrDefault><w:rPr>");
        write!(
            xml,
            r#"<w:rFonts w:ascii="{0}" w:hAnsi="{0}" w:eastAsia="{0}" w:cs="{0}"/>"#,
            font
        )?;
        write!(
            xml,
            r#"<w:sz w:val="{0}"/><w:szCs w:val="{0}"/>"#,
            self.options.font_size
        )?;
        xml.push_str("</w:rPr></w:rPrDefault>");
        xml.push_str(r#"<w:pPrDefault><w:pPr><w:spacing w:line="259" w:lineRule="auto"/></w:pPr></w:pPrDefault>"#);
        xml.push_str("</w:docDefaults>");

        for style in self.styles.iter() {
            write_style(&mut xml, style)?;
        }

        xml.push_str("</w:styles>");
        Ok(xml)
    }

    /// Generates `docProps/core.xml`. Only caller-supplied timestamps are written.
    fn core_props_xml(&self, document: &SealedDocument) -> Result<String> {
        let metadata = &document.metadata;
        let mut xml = String::with_capacity(1024);

        xml.push_str(XML_DECL);
        xml.push_str(concat!(
            r#"<cp:coreProperties "#,
            r#"xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
            r#"xmlns:dc="http://purl.org/dc/elements/1.1/" "#,
            r#"xmlns:dcterms="http://purl.org/dc/terms/" "#,
            r#"xmlns:dcmitype="http://purl.org/dc/dcmitype/" "#,
            r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#
        ));

        let keywords = metadata.keywords.join(", ");
        let fields = [
            ("dc:title", document.title()),
            ("dc:subject", metadata.subject.as_deref()),
            ("dc:creator", metadata.author.as_deref()),
            ("cp:keywords", Some(keywords.as_str()).filter(|k| !k.is_empty())),
        ];
        for (tag, value) in fields {
            if let Some(value) = value {
                check_field(tag, value)?;
                write!(xml, "<{0}>{1}</{0}>", tag, escape(value))?;
            }
        }

        for (tag, value) in [
            ("dcterms:created", &metadata.created),
            ("dcterms:modified", &metadata.modified),
        ] {
            if let Some(value) = value {
                check_field(tag, value)?;
                write!(
                    xml,
                    r#"<{0} xsi:type="dcterms:W3CDTF">{1}</{0}>"#,
                    tag,
                    escape(value.as_str())
                )?;
            }
        }

        xml.push_str("</cp:coreProperties>");
        Ok(xml)
    }

    /// Generates `docProps/app.xml`.
    fn app_props_xml(&self) -> Result<String> {
        check_field("application", &self.options.application)?;

        let mut xml = String::with_capacity(384);
        xml.push_str(XML_DECL);
        xml.push_str(concat!(
            r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" "#,
            r#"xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">"#
        ));
        write!(
            xml,
            "<Application>{}</Application>",
            escape(self.options.application.as_str())
        )?;
        xml.push_str("</Properties>");
        Ok(xml)
    }
}

impl Serializer for DocxSerializer {
    fn serialize(&self, document: &SealedDocument) -> Result<Vec<u8>> {
        self.to_bytes(document)
    }

    fn extension(&self) -> &str {
        "docx"
    }
}

fn flush_text(xml: &mut String, segment: &mut String) {
    if !segment.is_empty() {
        xml.push_str(r#"<w:t xml:space="preserve">"#);
        xml.push_str(&escape(segment.as_str()));
        xml.push_str("</w:t>");
        segment.clear();
    }
}

/// Rejects caller-supplied values that XML 1.0 cannot carry.
fn check_field(context: &str, value: &str) -> Result<()> {
    check_xml_chars(value).map_err(|bad| {
        Error::Serialization(format!(
            "{}: character U+{:04X} cannot be represented in XML",
            context, bad as u32
        ))
    })
}

/// Returns the first character XML 1.0 cannot carry, if any.
fn check_xml_chars(text: &str) -> std::result::Result<(), char> {
    match text.chars().find(|&c| !is_xml_char(c)) {
        Some(bad) => Err(bad),
        None => Ok(()),
    }
}

/// Returns true for characters allowed by the XML 1.0 `Char` production.
fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\u{9}' | '\u{A}' | '\u{D}'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

fn write_style(xml: &mut String, style: &StyleDef) -> Result<()> {
    let values = [
        Some(&style.id),
        Some(&style.name),
        style.based_on.as_ref(),
        style.next.as_ref(),
        style.color.as_ref(),
    ];
    for value in values.into_iter().flatten() {
        check_field("style", value)?;
    }

    write!(xml, r#"<w:style w:type="paragraph""#)?;
    if style.id == NORMAL {
        xml.push_str(r#" w:default="1""#);
    }
    write!(xml, r#" w:styleId="{}">"#, escape(style.id.as_str()))?;
    write!(xml, r#"<w:name w:val="{}"/>"#, escape(style.name.as_str()))?;
    if let Some(ref based_on) = style.based_on {
        write!(xml, r#"<w:basedOn w:val="{}"/>"#, escape(based_on.as_str()))?;
    }
    if let Some(ref next) = style.next {
        write!(xml, r#"<w:next w:val="{}"/>"#, escape(next.as_str()))?;
    }
    write!(xml, r#"<w:uiPriority w:val="{}"/>"#, style.ui_priority)?;
    xml.push_str("<w:qFormat/>");

    if style.has_paragraph_properties() {
        xml.push_str("<w:pPr>");
        if style.keep_next {
            xml.push_str("<w:keepNext/><w:keepLines/>");
        }
        if let Some(kind) = style.list_kind {
            write!(
                xml,
                r#"<w:numPr><w:numId w:val="{}"/></w:numPr>"#,
                style_num_id(kind)
            )?;
        }
        if style.space_before.is_some() || style.space_after.is_some() {
            xml.push_str("<w:spacing");
            if let Some(before) = style.space_before {
                write!(xml, r#" w:before="{}""#, before)?;
            }
            if let Some(after) = style.space_after {
                write!(xml, r#" w:after="{}""#, after)?;
            }
            xml.push_str("/>");
        }
        if let Some(left) = style.indent_left {
            write!(xml, r#"<w:ind w:left="{}"/>"#, left)?;
        }
        if let Some(level) = style.outline_level {
            write!(xml, r#"<w:outlineLvl w:val="{}"/>"#, level)?;
        }
        xml.push_str("</w:pPr>");
    }

    if style.has_run_properties() {
        xml.push_str("<w:rPr>");
        if style.bold {
            xml.push_str("<w:b/><w:bCs/>");
        }
        if style.italic {
            xml.push_str("<w:i/><w:iCs/>");
        }
        if let Some(ref color) = style.color {
            write!(xml, r#"<w:color w:val="{}"/>"#, escape(color.as_str()))?;
        }
        if let Some(size) = style.size {
            write!(xml, r#"<w:sz w:val="{0}"/><w:szCs w:val="{0}"/>"#, size)?;
        }
        xml.push_str("</w:rPr>");
    }

    xml.push_str("</w:style>");
    Ok(())
}

fn settings_xml() -> String {
    let mut xml = String::with_capacity(384);
    xml.push_str(XML_DECL);
    xml.push_str(&format!(r#"<w:settings xmlns:w="{}">"#, W_NS));
    xml.push_str(r#"<w:defaultTabStop w:val="720"/>"#);
    xml.push_str(r#"<w:characterSpacingControl w:val="doNotCompress"/>"#);
    xml.push_str(concat!(
        r#"<w:compat><w:compatSetting w:name="compatibilityMode" "#,
        r#"w:uri="http://schemas.microsoft.com/office/word" w:val="15"/></w:compat>"#
    ));
    xml.push_str("</w:settings>");
    xml
}
