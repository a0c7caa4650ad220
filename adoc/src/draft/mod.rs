//! The flat draft stream produced by the parser.
//!
//! Every value here is consumed by [`crate::assembly::Assembler`]. Draft types
//! deserialize from any self-describing format; blocks and inline elements are
//! internally tagged by a `type` field, e.g. in TOML:
//!
//! ```toml
//! [[blocks]]
//! type = "list_item"
//! marker = "**"
//! text = [[{ type = "text", text = "nested item" }]]
//! ```

use serde::Deserialize;

use crate::document::{
    Admonition, Attributes, Author, BlockImage, CheckState, DelimitedKind, Line, ListItemPrefix,
    Paragraph, Revision,
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DraftDocument {
    /// Entries parsed from front matter, in source order.
    #[serde(default)]
    pub front_matter: Vec<AttributeEntry>,
    #[serde(default)]
    pub header: Option<DraftHeader>,
    #[serde(default)]
    pub blocks: Vec<DraftBlock>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DraftHeader {
    pub title: Line,
    #[serde(default)]
    pub authors: Vec<Author>,
    #[serde(default)]
    pub revision: Option<Revision>,
    /// Attribute entries written directly below the header lines.
    #[serde(default)]
    pub attributes: Vec<AttributeEntry>,
}

/// `:name: value` or `:!name:`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AttributeEntry {
    Declaration {
        name: String,
        #[serde(default)]
        value: String,
    },
    Reset {
        name: String,
    },
}

impl AttributeEntry {
    pub fn declaration(name: impl Into<String>, value: impl Into<String>) -> Self {
        AttributeEntry::Declaration {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn reset(name: impl Into<String>) -> Self {
        AttributeEntry::Reset { name: name.into() }
    }
}

/// One block of the flat draft stream.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DraftBlock {
    Section(DraftSection),
    Paragraph(Paragraph),
    ListItem(DraftListItem),
    DelimitedBlock(DraftDelimitedBlock),
    Admonition(Admonition),
    Image(BlockImage),
    TableOfContents,
    AttributeDeclaration {
        name: String,
        #[serde(default)]
        value: String,
    },
    AttributeReset {
        name: String,
    },
    BlankLine,
    Comment {
        #[serde(default)]
        text: String,
    },
}

/// A section title line; its content follows as sibling blocks.
#[derive(Debug, Clone, Deserialize)]
pub struct DraftSection {
    pub level: u8,
    pub title: Line,
    #[serde(default)]
    pub attributes: Attributes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DraftListItem {
    #[serde(rename = "marker")]
    pub prefix: ListItemPrefix,
    /// Block attributes written above the item. On the first item of a list
    /// they apply to the list itself.
    #[serde(default)]
    pub attributes: Attributes,
    /// Labeled list term.
    #[serde(default)]
    pub term: Option<Line>,
    #[serde(default)]
    pub check: Option<CheckState>,
    #[serde(default)]
    pub text: Vec<Line>,
    /// Blocks attached with a list continuation.
    #[serde(default)]
    pub elements: Vec<DraftBlock>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DraftDelimitedBlock {
    pub kind: DelimitedKind,
    #[serde(default)]
    pub attributes: Attributes,
    /// Raw content of verbatim blocks.
    #[serde(default)]
    pub lines: Vec<String>,
    /// Content of compound blocks.
    #[serde(default)]
    pub blocks: Vec<DraftBlock>,
}

impl DraftListItem {
    pub fn new(prefix: ListItemPrefix, text: Vec<Line>) -> Self {
        DraftListItem {
            prefix,
            attributes: Attributes::default(),
            term: None,
            check: None,
            text,
            elements: Vec::new(),
        }
    }
}

/// Visit draft blocks in document order, numbering each one.
///
/// A block is numbered before its nested content (delimited block content,
/// list item continuations). Numbering starts at `first`. Returns the next
/// unused number.
pub fn for_each_numbered<F>(blocks: &[DraftBlock], first: usize, visit: &mut F) -> usize
where
    F: FnMut(usize, &DraftBlock),
{
    let mut next = first;
    for block in blocks {
        visit(next, block);
        next += 1;
        match block {
            DraftBlock::DelimitedBlock(delimited) => {
                next = for_each_numbered(&delimited.blocks, next, visit);
            }
            DraftBlock::ListItem(item) => {
                next = for_each_numbered(&item.elements, next, visit);
            }
            _ => {}
        }
    }
    next
}
