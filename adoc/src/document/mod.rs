pub mod inline;
pub mod list;

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

use crate::attributes::AttributeTable;

pub use inline::{
    InlineElement, Line, PassthroughKind, QuoteKind, flatten, flatten_lines, merge_text,
};
pub use list::{
    BulletStyle, CheckState, LabeledList, LabeledListItem, LabeledStyle, List, ListItemPrefix,
    ListKind, ListStyle, NumberingStyle, OrderedList, OrderedListItem, UnorderedList,
    UnorderedListItem,
};

/// The final, fully assembled document handed to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub header: Option<Header>,
    /// Every attribute declared anywhere in the document, with its history.
    pub attributes: AttributeTable,
    pub elements: Vec<Block>,
    pub references: ElementReferences,
}

/// Document header: title line plus author and revision metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub title: Line,
    pub authors: Vec<Author>,
    pub revision: Option<Revision>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Author {
    /// Full name as written, parts separated by spaces. Underscores join
    /// multi-word name parts (`Mary_Sue Brontë`).
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct Revision {
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub remark: Option<String>,
}

/// Block attributes such as `[#id.role,start=3]` or a `.Title` line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Attributes(BTreeMap<String, String>);

impl Attributes {
    pub fn new() -> Self {
        Attributes(BTreeMap::new())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn id(&self) -> Option<&str> {
        self.get("id").filter(|id| !id.is_empty())
    }

    pub fn title(&self) -> Option<&str> {
        self.get("title").filter(|title| !title.is_empty())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Add a role, keeping any roles already present.
    pub fn add_role(&mut self, role: &str) {
        match self.0.get_mut("role") {
            Some(roles) if roles.split_whitespace().any(|r| r == role) => {}
            Some(roles) if !roles.is_empty() => {
                roles.push(' ');
                roles.push_str(role);
            }
            _ => {
                self.0.insert("role".to_string(), role.to_string());
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Attributes(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A block in the final tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Section(Section),
    Preamble(Preamble),
    Paragraph(Paragraph),
    List(List),
    DelimitedBlock(DelimitedBlock),
    Admonition(Admonition),
    Image(BlockImage),
    /// Where the table of contents goes (`toc::[]`, or synthesized).
    TableOfContents,
    AttributeDeclaration {
        name: String,
        value: String,
    },
    AttributeReset {
        name: String,
    },
    Comment(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// 0 is the document-title scope, 1..=5 the nesting depth.
    pub level: u8,
    pub id: String,
    pub title: Line,
    pub attributes: Attributes,
    pub elements: Vec<Block>,
}

/// Root content preceding the first section.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Preamble {
    pub elements: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Paragraph {
    #[serde(default)]
    pub attributes: Attributes,
    pub lines: Vec<Line>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelimitedKind {
    Listing,
    Literal,
    Passthrough,
    Example,
    Quote,
    Sidebar,
    Open,
}

impl DelimitedKind {
    /// Verbatim blocks keep their raw lines; the others contain blocks.
    pub fn is_verbatim(self) -> bool {
        matches!(
            self,
            DelimitedKind::Listing | DelimitedKind::Literal | DelimitedKind::Passthrough
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            DelimitedKind::Listing => "listing",
            DelimitedKind::Literal => "literal",
            DelimitedKind::Passthrough => "passthrough",
            DelimitedKind::Example => "example",
            DelimitedKind::Quote => "quote",
            DelimitedKind::Sidebar => "sidebar",
            DelimitedKind::Open => "open",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DelimitedContent {
    Verbatim(Vec<String>),
    Compound(Vec<Block>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DelimitedBlock {
    pub kind: DelimitedKind,
    pub attributes: Attributes,
    pub content: DelimitedContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmonitionKind {
    Note,
    Tip,
    Important,
    Warning,
    Caution,
}

impl fmt::Display for AdmonitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AdmonitionKind::Note => "Note",
            AdmonitionKind::Tip => "Tip",
            AdmonitionKind::Important => "Important",
            AdmonitionKind::Warning => "Warning",
            AdmonitionKind::Caution => "Caution",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Admonition {
    pub kind: AdmonitionKind,
    #[serde(default)]
    pub attributes: Attributes,
    pub lines: Vec<Line>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BlockImage {
    pub path: String,
    #[serde(default)]
    pub attributes: Attributes,
}

/// Index of every identifiable element, keyed by id.
pub type ElementReferences = BTreeMap<String, ElementReference>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementReference {
    pub kind: ReferenceKind,
    /// Text a cross reference to this element displays by default.
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Section,
    Paragraph,
    List,
    ListItem,
    DelimitedBlock,
    Admonition,
    Image,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReferenceKind::Section => "section",
            ReferenceKind::Paragraph => "paragraph",
            ReferenceKind::List => "list",
            ReferenceKind::ListItem => "list item",
            ReferenceKind::DelimitedBlock => "delimited block",
            ReferenceKind::Admonition => "admonition",
            ReferenceKind::Image => "image",
        };
        f.write_str(name)
    }
}
