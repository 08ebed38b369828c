//! List numbering: assignment of numbering instances to logical lists and
//! generation of `word/numbering.xml`.

use crate::error::Result;
use crate::model::{Block, ListId, ListKind, MAX_LIST_LEVEL};
use std::collections::HashMap;
use std::fmt::Write as FmtWrite;

/// Abstract definition holding the bullet glyphs.
const BULLET_ABSTRACT: u32 = 0;
/// Abstract definition holding the decimal formats.
const DECIMAL_ABSTRACT: u32 = 1;

/// Instance linked to the `List Bullet` style.
pub const STYLE_BULLET_NUM: u32 = 1;
/// Instance linked to the `List Number` style.
pub const STYLE_NUMBER_NUM: u32 = 2;

/// Bullet glyphs, cycled by nesting level.
const BULLET_GLYPHS: [&str; 3] = ["\u{2022}", "\u{25E6}", "\u{25AA}"];

/// Returns the abstract definition used for a list kind.
fn abstract_for(kind: ListKind) -> u32 {
    match kind {
        ListKind::Bullet => BULLET_ABSTRACT,
        ListKind::Number => DECIMAL_ABSTRACT,
    }
}

/// Returns the style-linked instance for a list kind.
pub fn style_num_id(kind: ListKind) -> u32 {
    match kind {
        ListKind::Bullet => STYLE_BULLET_NUM,
        ListKind::Number => STYLE_NUMBER_NUM,
    }
}

/// A `<w:num>` instance bound to one logical list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumInstance {
    /// `w:numId`
    pub num_id: u32,
    /// List kind, which selects the abstract definition
    pub kind: ListKind,
}

/// Numbering decisions for one document.
///
/// Each (list, kind) pair gets its own instance so that numbering restarts
/// per logical list. `ordinals` carries the number each list item displays
/// (for bullets, its position among siblings).
#[derive(Debug, Clone, Default)]
pub struct NumberingPlan {
    instances: Vec<NumInstance>,
    by_list: HashMap<(ListId, ListKind), u32>,
    ordinals: Vec<Option<u32>>,
}

impl NumberingPlan {
    /// Assigns numbering instances to every list item in `blocks`.
    pub fn build(blocks: &[Block]) -> Self {
        let mut plan = Self::default();
        // Per instance: one counter per nesting level.
        let mut counters: HashMap<u32, [u32; MAX_LIST_LEVEL as usize + 1]> = HashMap::new();

        for block in blocks {
            let Block::ListItem {
                kind,
                level,
                list: Some(list),
                ..
            } = block
            else {
                plan.ordinals.push(None);
                continue;
            };

            let next_id = STYLE_NUMBER_NUM + 1 + plan.instances.len() as u32;
            let num_id = *plan.by_list.entry((*list, *kind)).or_insert_with(|| {
                log::trace!("list {} ({:?}) -> numId {}", list.index(), kind, next_id);
                next_id
            });
            if num_id == next_id {
                plan.instances.push(NumInstance { num_id, kind: *kind });
            }

            // A shallower item restarts all deeper levels, as word processors do.
            let level = usize::from(*level).min(MAX_LIST_LEVEL as usize);
            let levels = counters.entry(num_id).or_default();
            levels[level] += 1;
            for deeper in levels.iter_mut().skip(level + 1) {
                *deeper = 0;
            }
            plan.ordinals.push(Some(levels[level]));
        }

        plan
    }

    /// Returns the instance id for a list item, if it belongs to a list.
    pub fn num_id(&self, list: ListId, kind: ListKind) -> Option<u32> {
        self.by_list.get(&(list, kind)).copied()
    }

    /// Returns the displayed number of the block at `index`.
    pub fn ordinal(&self, index: usize) -> Option<u32> {
        self.ordinals.get(index).copied().flatten()
    }

    /// Returns the per-list instances in assignment order.
    pub fn instances(&self) -> &[NumInstance] {
        &self.instances
    }

    /// Generates the complete `word/numbering.xml` part.
    pub fn to_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(4096 + self.instances.len() * 160);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(
            r#"<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
        );

        write_abstract(&mut xml, BULLET_ABSTRACT, ListKind::Bullet)?;
        write_abstract(&mut xml, DECIMAL_ABSTRACT, ListKind::Number)?;

        // Style-linked instances continue document-wide.
        write_num(&mut xml, STYLE_BULLET_NUM, BULLET_ABSTRACT, false)?;
        write_num(&mut xml, STYLE_NUMBER_NUM, DECIMAL_ABSTRACT, false)?;

        for instance in &self.instances {
            let restart = instance.kind == ListKind::Number;
            write_num(&mut xml, instance.num_id, abstract_for(instance.kind), restart)?;
        }

        xml.push_str("</w:numbering>");
        Ok(xml)
    }
}

fn write_abstract(xml: &mut String, abstract_id: u32, kind: ListKind) -> Result<()> {
    write!(xml, r#"<w:abstractNum w:abstractNumId="{}">"#, abstract_id)?;
    xml.push_str(r#"<w:multiLevelType w:val="hybridMultilevel"/>"#);

    for ilvl in 0..=u32::from(MAX_LIST_LEVEL) {
        write!(xml, r#"<w:lvl w:ilvl="{}">"#, ilvl)?;
        xml.push_str(r#"<w:start w:val="1"/>"#);
        match kind {
            ListKind::Bullet => {
                let glyph = BULLET_GLYPHS[ilvl as usize % BULLET_GLYPHS.len()];
                xml.push_str(r#"<w:numFmt w:val="bullet"/>"#);
                write!(xml, r#"<w:lvlText w:val="{}"/>"#, glyph)?;
            }
            ListKind::Number => {
                xml.push_str(r#"<w:numFmt w:val="decimal"/>"#);
                write!(xml, r#"<w:lvlText w:val="%{}."/>"#, ilvl + 1)?;
            }
        }
        xml.push_str(r#"<w:lvlJc w:val="left"/>"#);
        write!(
            xml,
            r#"<w:pPr><w:ind w:left="{}" w:hanging="360"/></w:pPr>"#,
            720 * (ilvl + 1)
        )?;
        xml.push_str("</w:lvl>");
    }

    xml.push_str("</w:abstractNum>");
    Ok(())
}

fn write_num(xml: &mut String, num_id: u32, abstract_id: u32, restart: bool) -> Result<()> {
    write!(xml, r#"<w:num w:numId="{}">"#, num_id)?;
    write!(xml, r#"<w:abstractNumId w:val="{}"/>"#, abstract_id)?;
    if restart {
        // Every level restarts, including ones the list opens at.
        for ilvl in 0..=u32::from(MAX_LIST_LEVEL) {
            write!(
                xml,
                r#"<w:lvlOverride w:ilvl="{}"><w:startOverride w:val="1"/></w:lvlOverride>"#,
                ilvl
            )?;
        }
    }
    xml.push_str("</w:num>");
    Ok(())
}
