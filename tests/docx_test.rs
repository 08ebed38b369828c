//! Integration tests for DOCX output.

use docweave::render::{paths, save_with};
use docweave::{
    Compression, Document, DocxOptions, DocxSerializer, Error, ListKind, SealedDocument,
    StyleSheet, TextRun,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::{Cursor, Read};
use zip::ZipArchive;

#[derive(Debug, Default)]
struct Para {
    style: Option<String>,
    num_id: Option<u32>,
    ilvl: Option<u8>,
    runs: Vec<Run>,
}

impl Para {
    fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

#[derive(Debug, Default)]
struct Run {
    text: String,
    bold: bool,
    italic: bool,
}

fn read_part(bytes: &[u8], name: &str) -> String {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut content = String::new();
    archive
        .by_name(name)
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    content
}

fn attr(e: &BytesStart, name: &str) -> String {
    e.try_get_attribute(name)
        .unwrap()
        .unwrap_or_else(|| panic!("missing attribute {}", name))
        .unescape_value()
        .unwrap()
        .into_owned()
}

/// Walks `word/document.xml` and collects body paragraphs.
fn parse_paragraphs(xml: &str) -> Vec<Para> {
    let mut reader = Reader::from_str(xml);
    let mut paras = Vec::new();
    let mut current = Para::default();
    let mut in_text = false;

    loop {
        match reader.read_event().unwrap() {
            Event::Start(e) | Event::Empty(e) => match e.name().as_ref() {
                b"w:p" => current = Para::default(),
                b"w:pStyle" => current.style = Some(attr(&e, "w:val")),
                b"w:numId" => current.num_id = Some(attr(&e, "w:val").parse().unwrap()),
                b"w:ilvl" => current.ilvl = Some(attr(&e, "w:val").parse().unwrap()),
                b"w:r" => current.runs.push(Run::default()),
                b"w:b" => current.runs.last_mut().unwrap().bold = true,
                b"w:i" => current.runs.last_mut().unwrap().italic = true,
                b"w:br" => current.runs.last_mut().unwrap().text.push('\n'),
                b"w:t" => in_text = true,
                _ => {}
            },
            Event::Text(t) if in_text => {
                let text = t.unescape().unwrap();
                current.runs.last_mut().unwrap().text.push_str(&text);
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => paras.push(std::mem::take(&mut current)),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    paras
}

fn paragraphs_of(sealed: &SealedDocument) -> Vec<Para> {
    let bytes = docweave::to_bytes(sealed).unwrap();
    parse_paragraphs(&read_part(&bytes, paths::DOCUMENT))
}

#[test]
fn test_end_to_end_report_shape() {
    let mut doc = Document::new();
    doc.add_heading(0, "miVoto").unwrap();
    doc.add_paragraph(vec![TextRun::italic("Generado el 01/02/2024 10:00:00")], None)
        .unwrap();
    doc.add_bullet("Point A");
    doc.add_bullet("Point B");

    let paras = paragraphs_of(&doc.seal());
    assert_eq!(paras.len(), 4);

    assert_eq!(paras[0].style.as_deref(), Some("Title"));
    assert_eq!(paras[0].text(), "miVoto");

    assert_eq!(paras[1].style, None);
    assert_eq!(paras[1].runs.len(), 1);
    assert!(paras[1].runs[0].italic);
    assert!(!paras[1].runs[0].bold);

    for (para, text) in paras[2..].iter().zip(["Point A", "Point B"]) {
        assert_eq!(para.style.as_deref(), Some("ListBullet"));
        assert_eq!(para.ilvl, Some(0));
        assert_eq!(para.text(), text);
    }
    assert_eq!(paras[2].num_id, paras[3].num_id);
}

#[test]
fn test_block_counts_and_order_random() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut doc = Document::new();
    let mut expected = Vec::new();

    for i in 0..300 {
        let text = format!("block {}", i);
        match rng.gen_range(0..3) {
            0 => {
                doc.add_heading(rng.gen_range(0..=9), text.clone()).unwrap();
                expected.push(('h', text));
            }
            1 => {
                doc.add_paragraph(
                    vec![TextRun::new(text.clone()).with_bold(rng.gen_bool(0.5))],
                    None,
                )
                .unwrap();
                expected.push(('p', text));
            }
            _ => {
                let kind = if rng.gen_bool(0.5) {
                    ListKind::Bullet
                } else {
                    ListKind::Number
                };
                doc.add_list_item(text.clone(), kind, rng.gen_range(0..=8))
                    .unwrap();
                expected.push(('l', text));
            }
        }
    }

    let sealed = doc.seal();
    let counts = (
        sealed.heading_count(),
        sealed.paragraph_count(),
        sealed.list_item_count(),
    );
    let paras = paragraphs_of(&sealed);
    assert_eq!(paras.len(), counts.0 + counts.1 + counts.2);
    assert_eq!(paras.len(), expected.len());

    for (para, (kind, text)) in paras.iter().zip(&expected) {
        assert_eq!(&para.text(), text);
        let style = para.style.as_deref().unwrap_or("");
        match kind {
            'h' => assert!(style == "Title" || style.starts_with("Heading"), "{}", style),
            'p' => assert!(para.style.is_none()),
            _ => {
                assert!(style == "ListBullet" || style == "ListNumber", "{}", style);
                assert!(para.num_id.is_some());
            }
        }
    }
}

#[test]
fn test_serialization_is_deterministic() {
    let build = || {
        let mut doc = Document::new().with_created("2024-02-01T10:00:00Z");
        doc.add_heading(0, "Same").unwrap();
        doc.add_numbered("one");
        doc.add_numbered("two");
        doc.add_text("tail");
        doc.seal()
    };

    let sealed = build();
    let first = docweave::to_bytes(&sealed).unwrap();
    let second = docweave::to_bytes(&sealed).unwrap();
    assert_eq!(first, second);

    assert_eq!(first, docweave::to_bytes(&build()).unwrap());
}

#[test]
fn test_numbered_items_share_instance_starting_at_one() {
    let mut doc = Document::new();
    doc.add_numbered("a");
    doc.add_numbered("b");
    doc.add_numbered("c");
    let bytes = docweave::to_bytes(&doc.seal()).unwrap();

    let paras = parse_paragraphs(&read_part(&bytes, paths::DOCUMENT));
    let ids: Vec<_> = paras.iter().map(|p| p.num_id).collect();
    assert_eq!(ids, vec![Some(3); 3]);
    assert!(paras.iter().all(|p| p.style.as_deref() == Some("ListNumber")));

    let numbering = read_part(&bytes, paths::NUMBERING);
    assert!(numbering.contains(concat!(
        r#"<w:num w:numId="3"><w:abstractNumId w:val="1"/>"#,
        r#"<w:lvlOverride w:ilvl="0"><w:startOverride w:val="1"/></w:lvlOverride>"#
    )));
    assert!(numbering.contains(
        r#"<w:lvlOverride w:ilvl="8"><w:startOverride w:val="1"/></w:lvlOverride></w:num>"#
    ));
    assert!(numbering.contains(concat!(
        r#"<w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="decimal"/>"#,
        r#"<w:lvlText w:val="%1."/>"#
    )));
}

#[test]
fn test_numbering_restarts_after_heading() {
    let mut doc = Document::new();
    doc.add_heading(1, "Steps").unwrap();
    doc.add_numbered("a");
    doc.add_numbered("b");
    doc.add_heading(1, "More steps").unwrap();
    doc.add_numbered("c");

    let paras = paragraphs_of(&doc.seal());
    assert_eq!(paras[1].num_id, Some(3));
    assert_eq!(paras[2].num_id, Some(3));
    assert_eq!(paras[4].num_id, Some(4));
}

#[test]
fn test_title_only_document() {
    let mut doc = Document::new();
    doc.add_heading(0, "Only a title").unwrap();
    let bytes = docweave::to_bytes(&doc.seal()).unwrap();

    let archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
    assert_eq!(archive.len(), 9);

    let paras = parse_paragraphs(&read_part(&bytes, paths::DOCUMENT));
    assert_eq!(paras.len(), 1);
    assert_eq!(paras[0].style.as_deref(), Some("Title"));

    let core = read_part(&bytes, paths::CORE_PROPS);
    assert!(core.contains("<dc:title>Only a title</dc:title>"));
    assert!(!core.contains("dcterms:created"));
}

#[test]
fn test_empty_document_is_valid_package() {
    let bytes = docweave::to_bytes(&Document::new().seal()).unwrap();
    let document = read_part(&bytes, paths::DOCUMENT);
    assert!(parse_paragraphs(&document).is_empty());
    assert!(document.contains("<w:sectPr>"));
}

#[test]
fn test_append_errors_leave_document_unchanged() {
    let mut doc = Document::new();
    doc.add_heading(0, "Title").unwrap();

    assert!(matches!(doc.add_heading(-1, "x"), Err(Error::InvalidLevel(-1))));
    assert!(matches!(
        doc.add_paragraph(vec![], Some("Nonexistent")),
        Err(Error::UnknownStyle(_))
    ));
    assert!(matches!(
        doc.add_list_item("x", ListKind::Number, 12),
        Err(Error::InvalidNesting(12))
    ));

    assert_eq!(paragraphs_of(&doc.seal()).len(), 1);
}

#[test]
fn test_save_replaces_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.docx");
    std::fs::write(&path, b"stale").unwrap();

    let mut doc = Document::new();
    doc.add_heading(0, "Fresh").unwrap();
    let sealed = doc.save(&path).unwrap();

    let written = std::fs::read(&path).unwrap();
    assert_eq!(written, docweave::to_bytes(&sealed).unwrap());
    // No temporary files left next to the target.
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_missing_backend_style_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quote.docx");

    let mut doc = Document::new();
    doc.add_paragraph(vec![TextRun::new("cited")], Some("Quote"))
        .unwrap();
    let sealed = doc.seal();

    let serializer = DocxSerializer::default().with_styles(StyleSheet::builtin().without("Quote"));
    let err = save_with(&serializer, &sealed, &path).unwrap_err();

    assert!(matches!(err, Error::Serialization(_)));
    assert!(!path.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_write_to_failing_sink_surfaces_io_error() {
    struct Broken;

    impl std::io::Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let sealed = Document::new().seal();
    let err = docweave::write_to(&sealed, &mut Broken).unwrap_err();
    assert!(matches!(err, Error::Io(ref e) if e.kind() == std::io::ErrorKind::BrokenPipe));
}

#[test]
fn test_unicode_and_markup_text_preserved() {
    let text = "Votación <segura> & auditable: ñandú";
    let mut doc = Document::new();
    doc.add_paragraph(
        vec![TextRun::bold("Nota: "), TextRun::new(text)],
        Some("List Bullet"),
    )
    .unwrap();

    let paras = paragraphs_of(&doc.seal());
    assert_eq!(paras[0].style.as_deref(), Some("ListBullet"));
    assert_eq!(paras[0].num_id, None);
    assert!(paras[0].runs[0].bold);
    assert_eq!(paras[0].runs[1].text, text);
}

#[test]
fn test_stored_compression() {
    let mut doc = Document::new();
    doc.add_text("stored");
    let serializer =
        DocxSerializer::new(DocxOptions::default().with_compression(Compression::Stored));
    let bytes = serializer.to_bytes(&doc.seal()).unwrap();

    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    for i in 0..archive.len() {
        let entry = archive.by_index(i).unwrap();
        assert_eq!(entry.compression(), zip::CompressionMethod::Stored);
    }
}

#[test]
fn test_from_json_content() {
    let json = r#"[
        {"type": "heading", "level": 0, "text": "Informe"},
        {"type": "paragraph", "runs": [{"text": "Intro", "italic": true}]},
        {"type": "list_item", "text": "Paso", "kind": "number"},
        {"type": "list_item", "text": "Detalle", "level": 1}
    ]"#;
    let doc = Document::from_json(json).unwrap();
    let paras = paragraphs_of(&doc.seal());

    assert_eq!(paras.len(), 4);
    assert_eq!(paras[2].style.as_deref(), Some("ListNumber"));
    assert_eq!(paras[3].style.as_deref(), Some("ListBullet"));
    assert_eq!(paras[3].ilvl, Some(1));
}
