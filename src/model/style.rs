//! Named paragraph styles and the lookup table that resolves them.

use super::ListKind;
use serde::Serialize;
use std::collections::HashMap;

/// Style id of the default paragraph style.
pub const NORMAL: &str = "Normal";
/// Style id used for level-0 headings.
pub const TITLE: &str = "Title";
/// Style id of the base style for list paragraphs.
pub const LIST_PARAGRAPH: &str = "ListParagraph";
/// Style id used for bulleted list items.
pub const LIST_BULLET: &str = "ListBullet";
/// Style id used for numbered list items.
pub const LIST_NUMBER: &str = "ListNumber";

/// Returns the style id for a heading level (`Title` for 0, `HeadingN` otherwise).
pub fn heading_style_id(level: u8) -> String {
    if level == 0 {
        TITLE.to_string()
    } else {
        format!("Heading{}", level)
    }
}

/// A paragraph style definition.
///
/// Sizes are in half-points and spacing/indentation in twentieths of a
/// point (twips), the units WordprocessingML uses.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StyleDef {
    /// Style identifier referenced from paragraphs (e.g. `Heading1`)
    pub id: String,
    /// Display name (e.g. `heading 1`, shown as "Heading 1")
    pub name: String,
    /// Parent style id
    pub based_on: Option<String>,
    /// Style applied to the following paragraph
    pub next: Option<String>,
    /// Bold text
    pub bold: bool,
    /// Italic text
    pub italic: bool,
    /// Font size in half-points
    pub size: Option<u32>,
    /// Text color (RGB hex)
    pub color: Option<String>,
    /// Space before paragraph in twips
    pub space_before: Option<u32>,
    /// Space after paragraph in twips
    pub space_after: Option<u32>,
    /// Left indentation in twips
    pub indent_left: Option<u32>,
    /// Outline level for headings (0-based)
    pub outline_level: Option<u8>,
    /// Keep with the next paragraph
    pub keep_next: bool,
    /// List numbering linked to the style itself. Paragraphs that only carry
    /// the style share one document-wide list of this kind.
    pub list_kind: Option<ListKind>,
    /// Sort order in the word processor's style gallery
    pub ui_priority: u32,
}

impl StyleDef {
    fn new(id: &str, name: &str, ui_priority: u32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            based_on: Some(NORMAL.to_string()),
            next: Some(NORMAL.to_string()),
            ui_priority,
            ..Default::default()
        }
    }

    /// Name as users see it: `heading 1` is shown as "Heading 1".
    pub fn display_name(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// Returns true if this style carries paragraph-level properties.
    pub fn has_paragraph_properties(&self) -> bool {
        self.space_before.is_some()
            || self.space_after.is_some()
            || self.indent_left.is_some()
            || self.outline_level.is_some()
            || self.keep_next
            || self.list_kind.is_some()
    }

    /// Returns true if this style carries run-level properties.
    pub fn has_run_properties(&self) -> bool {
        self.bold || self.italic || self.size.is_some() || self.color.is_some()
    }
}

/// Lookup table of the fixed set of named styles.
///
/// Styles are found by id (`ListBullet`) or by display name
/// (`List Bullet`), case-sensitively.
#[derive(Debug, Clone, Serialize)]
pub struct StyleSheet {
    styles: Vec<StyleDef>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self::builtin()
    }
}

impl StyleSheet {
    /// Creates the built-in style set: Normal, Title, Subtitle, Heading 1-9,
    /// List Paragraph, List Bullet, List Number, Quote and Caption.
    pub fn builtin() -> Self {
        let mut styles = Vec::with_capacity(18);

        styles.push(StyleDef {
            based_on: None,
            next: None,
            space_after: Some(160),
            ..StyleDef::new(NORMAL, "Normal", 0)
        });

        styles.push(StyleDef {
            size: Some(56),
            space_after: Some(240),
            color: Some("17365D".to_string()),
            ..StyleDef::new(TITLE, "Title", 10)
        });

        styles.push(StyleDef {
            italic: true,
            size: Some(30),
            color: Some("4F81BD".to_string()),
            ..StyleDef::new("Subtitle", "Subtitle", 11)
        });

        for level in 1..=9u8 {
            // Sizes step down from 16pt to 11pt and then hold.
            let size = match level {
                1 => 32,
                2 => 28,
                3 => 26,
                4 => 24,
                _ => 22,
            };
            styles.push(StyleDef {
                bold: true,
                italic: level >= 4,
                size: Some(size),
                color: Some("365F91".to_string()),
                space_before: Some(if level == 1 { 480 } else { 200 }),
                space_after: Some(0),
                outline_level: Some(level - 1),
                keep_next: true,
                ..StyleDef::new(&heading_style_id(level), &format!("heading {}", level), 9)
            });
        }

        styles.push(StyleDef {
            indent_left: Some(720),
            ..StyleDef::new(LIST_PARAGRAPH, "List Paragraph", 34)
        });

        styles.push(StyleDef {
            based_on: Some(LIST_PARAGRAPH.to_string()),
            next: Some(LIST_BULLET.to_string()),
            list_kind: Some(ListKind::Bullet),
            ..StyleDef::new(LIST_BULLET, "List Bullet", 36)
        });

        styles.push(StyleDef {
            based_on: Some(LIST_PARAGRAPH.to_string()),
            next: Some(LIST_NUMBER.to_string()),
            list_kind: Some(ListKind::Number),
            ..StyleDef::new(LIST_NUMBER, "List Number", 36)
        });

        styles.push(StyleDef {
            italic: true,
            color: Some("404040".to_string()),
            indent_left: Some(864),
            ..StyleDef::new("Quote", "Quote", 29)
        });

        styles.push(StyleDef {
            bold: true,
            size: Some(18),
            color: Some("4F81BD".to_string()),
            space_after: Some(200),
            ..StyleDef::new("Caption", "caption", 35)
        });

        Self::from_styles(styles)
    }

    fn from_styles(styles: Vec<StyleDef>) -> Self {
        let mut index = HashMap::with_capacity(styles.len() * 2);
        for (i, style) in styles.iter().enumerate() {
            index.insert(style.id.clone(), i);
            index.insert(style.display_name(), i);
        }
        Self { styles, index }
    }

    /// Returns a copy of this sheet without the given style.
    ///
    /// Used to model serializer backends whose vocabulary is smaller than the
    /// built-in set.
    pub fn without(&self, name: &str) -> Self {
        let styles = self
            .styles
            .iter()
            .filter(|s| s.id != name && s.display_name() != name)
            .cloned()
            .collect();
        Self::from_styles(styles)
    }

    /// Returns this sheet with `style` added, replacing any style with the
    /// same id.
    pub fn with_style(self, style: StyleDef) -> Self {
        let mut styles: Vec<StyleDef> = self
            .styles
            .into_iter()
            .filter(|s| s.id != style.id)
            .collect();
        styles.push(style);
        Self::from_styles(styles)
    }

    /// Resolves a style by id or display name.
    pub fn resolve(&self, name: &str) -> Option<&StyleDef> {
        self.index.get(name).map(|&i| &self.styles[i])
    }

    /// Returns true if the style is defined.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Returns an iterator over all style definitions.
    pub fn iter(&self) -> impl Iterator<Item = &StyleDef> {
        self.styles.iter()
    }

    /// Returns the number of styles in the sheet.
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// Returns true if the sheet has no styles.
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}
