//! Document structure, metadata and lifecycle.

use super::{Block, BlockRef, ListId, ListKind, StyleSheet, TextRun, MAX_HEADING_LEVEL, MAX_LIST_LEVEL};
use crate::error::{Error, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::ops::Deref;
use std::path::Path;

/// Lifecycle state of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    /// Created, nothing appended yet
    Empty,
    /// At least one block appended
    Building,
    /// Handed to serialization; no further appends
    Sealed,
}

/// Document metadata written to the package properties.
///
/// Timestamps are supplied by the caller as ISO 8601 strings; the library
/// never reads the clock.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Metadata {
    /// Document title (falls back to the level-0 heading when unset)
    pub title: Option<String>,
    /// Document author
    pub author: Option<String>,
    /// Document subject
    pub subject: Option<String>,
    /// Keywords
    pub keywords: Vec<String>,
    /// Creation date (ISO 8601 format)
    pub created: Option<String>,
    /// Last modified date (ISO 8601 format)
    pub modified: Option<String>,
}

/// A document under construction.
///
/// Blocks render in append order. Appends validate their input and leave the
/// document untouched when they fail.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Document {
    /// Document metadata
    pub metadata: Metadata,
    blocks: Vec<Block>,
    #[serde(skip)]
    styles: StyleSheet,
    #[serde(skip)]
    next_list: u32,
}

impl Document {
    /// Creates a new empty document using the built-in style sheet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new empty document that validates styles against `styles`.
    pub fn with_styles(styles: StyleSheet) -> Self {
        Self {
            styles,
            ..Self::default()
        }
    }

    /// Builds a document by replaying blocks through the append operations.
    ///
    /// List ids carried by the input are treated as labels: the first item with
    /// a given label opens a new list and later items with that label join it.
    /// Unlabelled items follow the usual grouping of consecutive list items.
    pub fn from_blocks(blocks: impl IntoIterator<Item = Block>) -> Result<Self> {
        let mut document = Self::new();
        let mut labels: HashMap<ListId, ListId> = HashMap::new();

        for block in blocks {
            match block {
                Block::Heading { level, text } => {
                    document.add_heading(i32::from(level), text)?;
                }
                Block::Paragraph { runs, style } => {
                    document.add_paragraph(runs, style.as_deref())?;
                }
                Block::ListItem {
                    text,
                    kind,
                    level,
                    list,
                } => {
                    let level = i32::from(level);
                    match list {
                        Some(label) => {
                            let assigned = *labels
                                .entry(label)
                                .or_insert_with(|| document.open_list());
                            document.add_list_item_in(assigned, text, kind, level)?;
                        }
                        None => {
                            document.add_list_item(text, kind, level)?;
                        }
                    }
                }
            }
        }

        Ok(document)
    }

    /// Builds a document from a JSON array of blocks.
    pub fn from_json(json: &str) -> Result<Self> {
        let blocks: Vec<Block> = serde_json::from_str(json)?;
        Self::from_blocks(blocks)
    }

    /// Sets the document title metadata.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.metadata.title = Some(title.into());
        self
    }

    /// Sets the author metadata.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.metadata.author = Some(author.into());
        self
    }

    /// Sets the creation timestamp (ISO 8601).
    pub fn with_created(mut self, created: impl Into<String>) -> Self {
        self.metadata.created = Some(created.into());
        self
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> DocumentState {
        if self.blocks.is_empty() {
            DocumentState::Empty
        } else {
            DocumentState::Building
        }
    }

    /// Returns the style sheet this document validates against.
    pub fn styles(&self) -> &StyleSheet {
        &self.styles
    }

    /// Appends a heading. Level 0 is the document title.
    pub fn add_heading(&mut self, level: i32, text: impl Into<String>) -> Result<BlockRef> {
        let level = u8::try_from(level)
            .ok()
            .filter(|&l| l <= MAX_HEADING_LEVEL)
            .ok_or(Error::InvalidLevel(level))?;

        Ok(self.push(Block::Heading {
            level,
            text: text.into(),
        }))
    }

    /// Appends a paragraph with an optional named style.
    pub fn add_paragraph(&mut self, runs: Vec<TextRun>, style: Option<&str>) -> Result<BlockRef> {
        if let Some(name) = style {
            if !self.styles.contains(name) {
                return Err(Error::UnknownStyle(name.to_string()));
            }
        }

        Ok(self.push(Block::Paragraph {
            runs,
            style: style.map(str::to_string),
        }))
    }

    /// Appends a single-run unstyled paragraph.
    pub fn add_text(&mut self, text: impl Into<String>) -> BlockRef {
        self.push(Block::paragraph(vec![TextRun::new(text)]))
    }

    /// Appends a list item.
    ///
    /// The item continues the list of the immediately preceding block when that
    /// block is a list item; otherwise it opens a new list, so numbering
    /// restarts after any heading or paragraph.
    pub fn add_list_item(
        &mut self,
        text: impl Into<String>,
        kind: ListKind,
        level: i32,
    ) -> Result<BlockRef> {
        let level = validate_nesting(level)?;
        let list = self.current_or_new_list();

        Ok(self.push(Block::ListItem {
            text: text.into(),
            kind,
            level,
            list: Some(list),
        }))
    }

    /// Appends a list item that explicitly continues `list`, even when other
    /// blocks were appended since its last item.
    pub fn add_list_item_in(
        &mut self,
        list: ListId,
        text: impl Into<String>,
        kind: ListKind,
        level: i32,
    ) -> Result<BlockRef> {
        let level = validate_nesting(level)?;
        if list.0 >= self.next_list {
            return Err(Error::UnknownList(list.0));
        }

        Ok(self.push(Block::ListItem {
            text: text.into(),
            kind,
            level,
            list: Some(list),
        }))
    }

    /// Appends a top-level bullet item.
    pub fn add_bullet(&mut self, text: impl Into<String>) -> BlockRef {
        self.append_top_level(text.into(), ListKind::Bullet)
    }

    /// Appends a top-level numbered item.
    pub fn add_numbered(&mut self, text: impl Into<String>) -> BlockRef {
        self.append_top_level(text.into(), ListKind::Number)
    }

    fn append_top_level(&mut self, text: String, kind: ListKind) -> BlockRef {
        let list = self.current_or_new_list();
        self.push(Block::ListItem {
            text,
            kind,
            level: 0,
            list: Some(list),
        })
    }

    fn current_or_new_list(&mut self) -> ListId {
        match self.blocks.last() {
            Some(Block::ListItem { list: Some(id), .. }) => *id,
            _ => self.open_list(),
        }
    }

    fn open_list(&mut self) -> ListId {
        let id = ListId(self.next_list);
        self.next_list += 1;
        id
    }

    fn push(&mut self, block: Block) -> BlockRef {
        self.blocks.push(block);
        BlockRef(self.blocks.len() - 1)
    }

    /// Returns the list a block belongs to, if it is a list item.
    pub fn list_of(&self, at: BlockRef) -> Option<ListId> {
        match self.blocks.get(at.0) {
            Some(Block::ListItem { list, .. }) => *list,
            _ => None,
        }
    }

    /// Returns the block at `at`.
    pub fn block(&self, at: BlockRef) -> Option<&Block> {
        self.blocks.get(at.0)
    }

    /// Returns all blocks in rendering order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Returns the number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns true if no block has been appended.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Returns the number of headings, title included.
    pub fn heading_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_heading()).count()
    }

    /// Returns the number of paragraphs.
    pub fn paragraph_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_paragraph()).count()
    }

    /// Returns the number of list items.
    pub fn list_item_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_list_item()).count()
    }

    /// Returns the title: the metadata title, else the first level-0 heading.
    pub fn title(&self) -> Option<&str> {
        self.metadata.title.as_deref().or_else(|| {
            self.blocks.iter().find_map(|b| match b {
                Block::Heading { level: 0, text } => Some(text.as_str()),
                _ => None,
            })
        })
    }

    /// Returns the plain text content of the entire document.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Returns the document (metadata and blocks) as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Seals the document for serialization.
    pub fn seal(self) -> SealedDocument {
        SealedDocument { inner: self }
    }

    /// Seals the document and saves it as DOCX at `path`.
    ///
    /// Returns the sealed document so it can be serialized again, e.g. to a
    /// second format.
    pub fn save(self, path: impl AsRef<Path>) -> Result<SealedDocument> {
        let sealed = self.seal();
        crate::save(&sealed, path)?;
        Ok(sealed)
    }
}

fn validate_nesting(level: i32) -> Result<u8> {
    u8::try_from(level)
        .ok()
        .filter(|&l| l <= MAX_LIST_LEVEL)
        .ok_or(Error::InvalidNesting(level))
}

/// A document that no longer accepts appends.
///
/// Dereferences to [`Document`] for read access only.
#[derive(Debug, Clone)]
pub struct SealedDocument {
    inner: Document,
}

impl SealedDocument {
    /// Always [`DocumentState::Sealed`].
    pub fn state(&self) -> DocumentState {
        DocumentState::Sealed
    }

    /// Returns the underlying document for reading.
    pub fn document(&self) -> &Document {
        &self.inner
    }
}

impl Deref for SealedDocument {
    type Target = Document;

    fn deref(&self) -> &Document {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_states() {
        let mut doc = Document::new();
        assert_eq!(doc.state(), DocumentState::Empty);

        doc.add_heading(0, "Title").unwrap();
        assert_eq!(doc.state(), DocumentState::Building);

        let sealed = doc.seal();
        assert_eq!(sealed.state(), DocumentState::Sealed);
        assert_eq!(sealed.len(), 1);
    }

    #[test]
    fn test_heading_level_bounds() {
        let mut doc = Document::new();
        assert!(matches!(doc.add_heading(-1, "x"), Err(Error::InvalidLevel(-1))));
        assert!(matches!(doc.add_heading(10, "x"), Err(Error::InvalidLevel(10))));
        assert!(doc.is_empty());

        doc.add_heading(0, "Title").unwrap();
        doc.add_heading(9, "Deep").unwrap();
        assert_eq!(doc.heading_count(), 2);
    }

    #[test]
    fn test_unknown_style_rejected_without_mutation() {
        let mut doc = Document::new();
        let err = doc.add_paragraph(vec![], Some("Nonexistent")).unwrap_err();
        assert!(matches!(err, Error::UnknownStyle(ref s) if s == "Nonexistent"));
        assert_eq!(doc.state(), DocumentState::Empty);

        doc.add_paragraph(vec![TextRun::new("q")], Some("Quote")).unwrap();
        doc.add_paragraph(vec![TextRun::new("b")], Some("List Bullet")).unwrap();
        assert_eq!(doc.paragraph_count(), 2);
    }

    #[test]
    fn test_nesting_bounds() {
        let mut doc = Document::new();
        assert!(matches!(
            doc.add_list_item("a", ListKind::Bullet, -1),
            Err(Error::InvalidNesting(-1))
        ));
        assert!(matches!(
            doc.add_list_item("a", ListKind::Bullet, 9),
            Err(Error::InvalidNesting(9))
        ));
        doc.add_list_item("a", ListKind::Bullet, 8).unwrap();
        assert_eq!(doc.list_item_count(), 1);
    }

    #[test]
    fn test_consecutive_items_share_list() {
        let mut doc = Document::new();
        let a = doc.add_numbered("one");
        let b = doc.add_numbered("two");
        let c = doc.add_list_item("nested", ListKind::Bullet, 1).unwrap();
        assert_eq!(doc.list_of(a), doc.list_of(b));
        assert_eq!(doc.list_of(b), doc.list_of(c));
    }

    #[test]
    fn test_interruption_opens_new_list() {
        let mut doc = Document::new();
        let first = doc.add_numbered("one");
        doc.add_heading(1, "Next section").unwrap();
        let second = doc.add_numbered("one again");

        assert_ne!(doc.list_of(first), doc.list_of(second));
        assert_eq!(doc.list_of(second).unwrap().index(), 1);
    }

    #[test]
    fn test_explicit_continuation() {
        let mut doc = Document::new();
        let first = doc.add_numbered("one");
        doc.add_text("aside");
        let list = doc.list_of(first).unwrap();
        let again = doc
            .add_list_item_in(list, "two", ListKind::Number, 0)
            .unwrap();
        assert_eq!(doc.list_of(again), Some(list));

        let bogus = ListId(7);
        assert!(matches!(
            doc.add_list_item_in(bogus, "x", ListKind::Number, 0),
            Err(Error::UnknownList(7))
        ));
    }

    #[test]
    fn test_block_order_matches_append_order() {
        let mut doc = Document::new();
        let h = doc.add_heading(0, "T").unwrap();
        let p = doc.add_text("p");
        let l = doc.add_bullet("l");

        assert_eq!((h.index(), p.index(), l.index()), (0, 1, 2));
        assert!(doc.block(h).unwrap().is_heading());
        assert!(doc.block(p).unwrap().is_paragraph());
        assert!(doc.block(l).unwrap().is_list_item());
    }

    #[test]
    fn test_title_fallback() {
        let mut doc = Document::new();
        assert!(doc.title().is_none());
        doc.add_heading(1, "Section").unwrap();
        doc.add_heading(0, "Report").unwrap();
        assert_eq!(doc.title(), Some("Report"));

        let doc = doc.with_title("Explicit");
        assert_eq!(doc.title(), Some("Explicit"));
    }

    #[test]
    fn test_from_json_remaps_list_labels() {
        let json = r#"[
            {"type": "list_item", "text": "a", "kind": "number", "list": 40},
            {"type": "paragraph", "runs": [{"text": "break"}]},
            {"type": "list_item", "text": "b", "kind": "number", "list": 40},
            {"type": "list_item", "text": "fresh", "kind": "number"}
        ]"#;
        let doc = Document::from_json(json).unwrap();

        let first = doc.list_of(BlockRef(0)).unwrap();
        assert_eq!(first.index(), 0);
        assert_eq!(doc.list_of(BlockRef(2)), Some(first));
        // Follows the continued list directly, so it joins it.
        assert_eq!(doc.list_of(BlockRef(3)), Some(first));
    }

    #[test]
    fn test_from_json_adjacent_labels_open_separate_lists() {
        let json = r#"[
            {"type": "list_item", "text": "a", "kind": "number", "list": 1},
            {"type": "list_item", "text": "b", "kind": "number", "list": 1},
            {"type": "list_item", "text": "c", "kind": "number", "list": 2}
        ]"#;
        let doc = Document::from_json(json).unwrap();

        let first = doc.list_of(BlockRef(0)).unwrap();
        assert_eq!(doc.list_of(BlockRef(1)), Some(first));
        let second = doc.list_of(BlockRef(2)).unwrap();
        assert_ne!(first, second);
        assert_eq!(second.index(), 1);
    }

    #[test]
    fn test_from_json_validates() {
        let json = r#"[{"type": "heading", "level": 12, "text": "x"}]"#;
        assert!(matches!(Document::from_json(json), Err(Error::InvalidLevel(12))));

        assert!(matches!(Document::from_json("not json"), Err(Error::Json(_))));
    }

    #[test]
    fn test_plain_text_and_json() {
        let mut doc = Document::new().with_author("iyulab");
        doc.add_heading(0, "Title").unwrap();
        doc.add_bullet("Point");
        assert_eq!(doc.plain_text(), "Title\nPoint");

        let json = doc.to_json().unwrap();
        assert!(json.contains("\"author\": \"iyulab\""));
        assert!(json.contains("\"type\": \"list_item\""));
    }
}
