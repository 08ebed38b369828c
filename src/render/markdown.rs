//! Markdown renderer implementation.

use super::numbering::NumberingPlan;
use super::{RenderOptions, Serializer};
use crate::error::Result;
use crate::model::{Block, Document, ListKind, SealedDocument, TextRun, LIST_BULLET, LIST_NUMBER};

/// Style rendered as a block quote.
const QUOTE_STYLE: &str = "Quote";

/// Markdown renderer.
///
/// Works on any document, sealed or not, so content can be previewed while
/// it is still being built.
#[derive(Debug, Clone, Default)]
pub struct MarkdownRenderer {
    options: RenderOptions,
}

impl MarkdownRenderer {
    /// Creates a new renderer with the given options.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Renders a document to Markdown string.
    pub fn render(&self, document: &Document) -> Result<String> {
        let plan = NumberingPlan::build(document.blocks());
        let mut output = String::new();

        if self.options.include_frontmatter {
            self.render_frontmatter(document, &mut output);
        }

        // Paragraphs carrying only the List Number style share one counter.
        let mut style_number = 0u32;
        let mut in_list = false;
        // Content column of the latest item at each nesting level.
        let mut content_columns: Vec<usize> = Vec::new();

        for (index, block) in document.blocks().iter().enumerate() {
            let is_list = is_list_block(document, block);
            if in_list && !is_list && self.options.paragraph_spacing {
                output.push('\n');
            }
            in_list = is_list;
            if !matches!(block, Block::ListItem { .. }) {
                content_columns.clear();
            }

            match block {
                Block::Heading { level, text } => {
                    self.render_heading(*level, text, &mut output);
                }
                Block::Paragraph { runs, style } => match style.as_deref() {
                    Some(name) if is_style(document, name, LIST_BULLET) => {
                        output.push(self.options.list_marker);
                        output.push(' ');
                        self.render_runs(runs, &mut output);
                        output.push('\n');
                    }
                    Some(name) if is_style(document, name, LIST_NUMBER) => {
                        style_number += 1;
                        output.push_str(&format!("{}. ", style_number));
                        self.render_runs(runs, &mut output);
                        output.push('\n');
                    }
                    Some(name) if is_style(document, name, QUOTE_STYLE) => {
                        output.push_str("> ");
                        self.render_runs(runs, &mut output);
                        self.end_block(&mut output);
                    }
                    _ => {
                        if runs.iter().all(TextRun::is_empty) {
                            continue;
                        }
                        self.render_runs(runs, &mut output);
                        self.end_block(&mut output);
                    }
                },
                Block::ListItem {
                    text, kind, level, ..
                } => {
                    let marker = match kind {
                        ListKind::Bullet => format!("{} ", self.options.list_marker),
                        ListKind::Number => format!("{}. ", plan.ordinal(index).unwrap_or(1)),
                    };

                    // Nested items start under their parent's content.
                    let level = usize::from(*level);
                    let indent = match level {
                        0 => 0,
                        _ => content_columns
                            .get(level - 1)
                            .or(content_columns.last())
                            .copied()
                            .unwrap_or(0),
                    };
                    content_columns.resize(level, indent);
                    content_columns.push(indent + marker.chars().count());

                    output.push_str(&" ".repeat(indent));
                    output.push_str(&marker);
                    output.push_str(&self.text(text));
                    output.push('\n');
                }
            }
        }

        let trimmed = output.trim_end().len();
        output.truncate(trimmed);
        if !output.is_empty() {
            output.push('\n');
        }

        Ok(output)
    }

    /// Renders YAML frontmatter.
    fn render_frontmatter(&self, document: &Document, output: &mut String) {
        let metadata = &document.metadata;
        output.push_str("---\n");

        if let Some(title) = document.title() {
            output.push_str(&format!("title: \"{}\"\n", escape_yaml(title)));
        }
        if let Some(ref author) = metadata.author {
            output.push_str(&format!("author: \"{}\"\n", escape_yaml(author)));
        }
        if let Some(ref subject) = metadata.subject {
            output.push_str(&format!("description: \"{}\"\n", escape_yaml(subject)));
        }
        if let Some(ref created) = metadata.created {
            output.push_str(&format!("date: \"{}\"\n", escape_yaml(created)));
        }
        if let Some(ref modified) = metadata.modified {
            output.push_str(&format!("lastmod: \"{}\"\n", escape_yaml(modified)));
        }
        if !metadata.keywords.is_empty() {
            output.push_str("tags:\n");
            for keyword in &metadata.keywords {
                output.push_str(&format!("  - \"{}\"\n", escape_yaml(keyword)));
            }
        }

        output.push_str("---\n\n");
    }

    /// Renders a heading. The title is `#`, `Heading N` is N+1 hashes.
    fn render_heading(&self, level: u8, text: &str, output: &mut String) {
        // Empty headings produce nothing.
        if text.trim().is_empty() {
            return;
        }

        let hashes = (level + 1).min(self.options.max_heading_level);
        output.push_str(&"#".repeat(usize::from(hashes)));
        output.push(' ');
        output.push_str(&self.text(text).replace('\n', " "));
        self.end_block(output);
    }

    fn render_runs(&self, runs: &[TextRun], output: &mut String) {
        for run in runs {
            self.render_text_run(run, output);
        }
    }

    /// Renders a text run with formatting.
    fn render_text_run(&self, run: &TextRun, output: &mut String) {
        if run.is_empty() {
            return;
        }

        // Markers hug the text; surrounding whitespace stays outside them.
        let text = self.text(&run.text).replace('\n', "  \n");
        let body = text.trim();
        if body.is_empty() || !run.has_formatting() {
            output.push_str(&text);
            return;
        }

        let leading = &text[..text.len() - text.trim_start().len()];
        let trailing = &text[text.trim_end().len()..];

        let mut marker = String::new();
        if run.bold {
            marker.push_str("**");
        }
        if run.italic {
            marker.push('*');
        }

        output.push_str(leading);
        output.push_str(&marker);
        output.push_str(body);
        output.push_str(&marker);
        output.push_str(trailing);
    }

    fn end_block(&self, output: &mut String) {
        output.push('\n');
        if self.options.paragraph_spacing {
            output.push('\n');
        }
    }

    fn text(&self, text: &str) -> String {
        if self.options.escape_special_chars {
            escape_markdown(text)
        } else {
            text.to_string()
        }
    }
}

/// [`Serializer`] producing UTF-8 Markdown.
#[derive(Debug, Clone, Default)]
pub struct MarkdownSerializer {
    renderer: MarkdownRenderer,
}

impl MarkdownSerializer {
    /// Creates a serializer with the given options.
    pub fn new(options: RenderOptions) -> Self {
        Self {
            renderer: MarkdownRenderer::new(options),
        }
    }
}

impl Serializer for MarkdownSerializer {
    fn serialize(&self, document: &SealedDocument) -> Result<Vec<u8>> {
        Ok(self.renderer.render(document)?.into_bytes())
    }

    fn extension(&self) -> &str {
        "md"
    }
}

fn is_style(document: &Document, name: &str, id: &str) -> bool {
    document
        .styles()
        .resolve(name)
        .map(|style| style.id == id)
        .unwrap_or(false)
}

fn is_list_block(document: &Document, block: &Block) -> bool {
    match block {
        Block::ListItem { .. } => true,
        Block::Paragraph {
            style: Some(name), ..
        } => is_style(document, name, LIST_BULLET) || is_style(document, name, LIST_NUMBER),
        _ => false,
    }
}

/// Escapes special Markdown characters.
fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for ch in text.chars() {
        match ch {
            '\\' | '`' | '*' | '_' | '{' | '}' | '[' | ']' | '(' | ')' | '#' | '+' | '-' | '.'
            | '!' | '|' => {
                result.push('\\');
                result.push(ch);
            }
            _ => result.push(ch),
        }
    }

    result
}

/// Escapes special characters for YAML strings.
fn escape_yaml(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(doc: &Document) -> String {
        MarkdownRenderer::new(RenderOptions::default())
            .render(doc)
            .unwrap()
    }

    #[test]
    fn test_render_simple_paragraph() {
        let mut doc = Document::new();
        doc.add_text("Hello, world!");

        assert_eq!(render(&doc), "Hello, world!\n");
    }

    #[test]
    fn test_render_headings() {
        let mut doc = Document::new();
        doc.add_heading(0, "Report").unwrap();
        doc.add_heading(1, "Section Title").unwrap();

        let result = render(&doc);
        assert!(result.starts_with("# Report\n\n"));
        assert!(result.contains("## Section Title"));
    }

    #[test]
    fn test_max_heading_level_capped() {
        let mut doc = Document::new();
        doc.add_heading(7, "Deep Heading").unwrap();

        let renderer = MarkdownRenderer::new(RenderOptions::default().with_max_heading_level(4));
        let result = renderer.render(&doc).unwrap();

        assert!(result.contains("#### Deep Heading"), "{}", result);
        assert!(!result.contains("#####"), "{}", result);
    }

    #[test]
    fn test_render_run_formatting() {
        let mut doc = Document::new();
        doc.add_paragraph(
            vec![
                TextRun::new("plain "),
                TextRun::bold("bold "),
                TextRun::italic("italic"),
            ],
            None,
        )
        .unwrap();

        assert_eq!(render(&doc), "plain **bold** *italic*\n");
    }

    #[test]
    fn test_numbered_lists_restart_per_list() {
        let mut doc = Document::new();
        doc.add_numbered("a");
        doc.add_numbered("b");
        doc.add_heading(1, "Next").unwrap();
        doc.add_numbered("c");

        let result = render(&doc);
        assert!(result.contains("1. a\n2. b\n\n## Next"), "{}", result);
        assert!(result.contains("1. c"));
    }

    #[test]
    fn test_nested_bullets_indented() {
        let mut doc = Document::new();
        doc.add_bullet("top");
        doc.add_list_item("nested", ListKind::Bullet, 1).unwrap();

        let renderer = MarkdownRenderer::new(RenderOptions::default().with_list_marker('*'));
        assert_eq!(renderer.render(&doc).unwrap(), "* top\n  * nested\n");
    }

    #[test]
    fn test_nested_items_align_with_parent_text() {
        let mut doc = Document::new();
        doc.add_numbered("top");
        doc.add_list_item("nested", ListKind::Bullet, 1).unwrap();
        doc.add_list_item("deeper", ListKind::Number, 2).unwrap();
        doc.add_list_item("back", ListKind::Bullet, 1).unwrap();
        doc.add_numbered("next");

        let renderer = MarkdownRenderer::new(RenderOptions::default().with_list_marker('*'));
        assert_eq!(
            renderer.render(&doc).unwrap(),
            "1. top\n   * nested\n     1. deeper\n   * back\n2. next\n"
        );
    }

    #[test]
    fn test_adjacent_labelled_lists_restart() {
        let json = r#"[
            {"type": "list_item", "text": "a", "kind": "number", "list": 1},
            {"type": "list_item", "text": "b", "kind": "number", "list": 1},
            {"type": "list_item", "text": "c", "kind": "number", "list": 2}
        ]"#;
        let doc = Document::from_json(json).unwrap();

        assert_eq!(render(&doc), "1. a\n2. b\n1. c\n");
    }

    #[test]
    fn test_styled_paragraphs() {
        let mut doc = Document::new();
        doc.add_paragraph(vec![TextRun::new("one")], Some("List Number"))
            .unwrap();
        doc.add_paragraph(vec![TextRun::new("two")], Some("List Number"))
            .unwrap();
        doc.add_paragraph(vec![TextRun::new("wise")], Some("Quote"))
            .unwrap();

        assert_eq!(render(&doc), "1. one\n2. two\n\n> wise\n");
    }

    #[test]
    fn test_frontmatter() {
        let mut doc = Document::new().with_author("iyulab");
        doc.add_heading(0, "Say \"hi\"").unwrap();

        let renderer = MarkdownRenderer::new(RenderOptions::default().with_frontmatter());
        let result = renderer.render(&doc).unwrap();

        assert!(result.starts_with("---\ntitle: \"Say \\\"hi\\\"\"\nauthor: \"iyulab\"\n---\n\n"));
    }

    #[test]
    fn test_escape_markdown() {
        assert_eq!(escape_markdown("*bold*"), "\\*bold\\*");
        assert_eq!(escape_markdown("[link]"), "\\[link\\]");
    }

    #[test]
    fn test_empty_heading_skipped() {
        let mut doc = Document::new();
        doc.add_heading(3, "  ").unwrap();
        doc.add_text("Normal content");

        let result = render(&doc);
        assert!(!result.contains('#'), "{}", result);
        assert!(result.contains("Normal content"));
    }

    #[test]
    fn test_serializer_extension() {
        let mut doc = Document::new();
        doc.add_text("x");
        let sealed = doc.seal();

        let serializer = MarkdownSerializer::default();
        assert_eq!(serializer.extension(), "md");
        assert_eq!(serializer.serialize(&sealed).unwrap(), b"x\n");
    }
}
