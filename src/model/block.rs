//! Block and text run definitions.

use serde::{Deserialize, Serialize};

/// Highest heading level (`Heading 9`). Level 0 is the document title.
pub const MAX_HEADING_LEVEL: u8 = 9;

/// Highest list nesting depth. WordprocessingML numbering has nine levels.
pub const MAX_LIST_LEVEL: u8 = 8;

/// A text run with uniform formatting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRun {
    /// The text content
    pub text: String,
    /// Bold text
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    /// Italic text
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl TextRun {
    /// Creates a new text run without formatting.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            italic: false,
        }
    }

    /// Creates a bold run.
    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            bold: true,
            ..Self::new(text)
        }
    }

    /// Creates an italic run.
    pub fn italic(text: impl Into<String>) -> Self {
        Self {
            italic: true,
            ..Self::new(text)
        }
    }

    /// Sets the bold flag.
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    /// Sets the italic flag.
    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    /// Returns true if this run is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Returns true if this run has any formatting.
    pub fn has_formatting(&self) -> bool {
        self.bold || self.italic
    }
}

/// List marker kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    /// Unordered list with bullet glyphs
    #[default]
    Bullet,
    /// Ordered list (1, 2, 3, ...)
    Number,
}

/// Identifier of a logical list.
///
/// Items sharing a `ListId` and a [`ListKind`] are numbered as one list.
/// Ids are assigned by [`crate::Document`] in the order lists are opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListId(pub(crate) u32);

impl ListId {
    /// Returns the zero-based index of this list within its document.
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Reference to an appended block (its position in the document).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockRef(pub(crate) usize);

impl BlockRef {
    /// Returns the zero-based position of the block.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A block-level content element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// A heading; level 0 is the document title
    Heading { level: u8, text: String },
    /// A paragraph of runs with an optional named style
    Paragraph {
        #[serde(default)]
        runs: Vec<TextRun>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        style: Option<String>,
    },
    /// A bulleted or numbered list entry
    ListItem {
        text: String,
        #[serde(default)]
        kind: ListKind,
        #[serde(default)]
        level: u8,
        /// Logical list, assigned on append. Content read from JSON may leave
        /// it out or use its own ids, which are remapped on replay.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        list: Option<ListId>,
    },
}

impl Block {
    /// Creates a heading block.
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Block::Heading {
            level,
            text: text.into(),
        }
    }

    /// Creates an unstyled paragraph block.
    pub fn paragraph(runs: Vec<TextRun>) -> Self {
        Block::Paragraph { runs, style: None }
    }

    /// Creates a list item block that is not yet attached to a list.
    pub fn list_item(text: impl Into<String>, kind: ListKind, level: u8) -> Self {
        Block::ListItem {
            text: text.into(),
            kind,
            level,
            list: None,
        }
    }

    /// Returns true for heading blocks.
    pub fn is_heading(&self) -> bool {
        matches!(self, Block::Heading { .. })
    }

    /// Returns true for paragraph blocks.
    pub fn is_paragraph(&self) -> bool {
        matches!(self, Block::Paragraph { .. })
    }

    /// Returns true for list item blocks.
    pub fn is_list_item(&self) -> bool {
        matches!(self, Block::ListItem { .. })
    }

    /// Returns the plain text content of this block.
    pub fn plain_text(&self) -> String {
        match self {
            Block::Heading { text, .. } | Block::ListItem { text, .. } => text.clone(),
            Block::Paragraph { runs, .. } => runs.iter().map(|r| r.text.as_str()).collect(),
        }
    }
}
