//! Document attributes and their point-in-time visibility.

mod predefined;

use indexmap::IndexMap;

use crate::document::{Author, InlineElement, Line, Revision, flatten};
use crate::draft::{AttributeEntry, DraftBlock, DraftDocument, DraftHeader, for_each_numbered};

pub use predefined::predefined;

/// Position of a block in document order.
///
/// Front matter and header entries all sit at [`Position::HEADER`]. Body
/// blocks are numbered from [`Position::BODY_START`] in pre-order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position(pub usize);

impl Position {
    pub const HEADER: Position = Position(0);
    pub const BODY_START: Position = Position(1);
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    position: Position,
    /// `None` is a reset.
    value: Option<String>,
}

/// Result of looking an attribute up at a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved<'a> {
    /// Declared in the document.
    Declared(&'a str),
    /// One of the built-in character attributes.
    Predefined(&'static str),
}

impl<'a> Resolved<'a> {
    pub fn as_str(&self) -> &'a str {
        match *self {
            Resolved::Declared(value) => value,
            Resolved::Predefined(value) => value,
        }
    }
}

/// Ordered store of every declaration and reset of every attribute.
///
/// Names are case-insensitive. The table is built once, then queried with
/// [`AttributeTable::get_at`], which only sees entries strictly before the
/// queried position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeTable {
    entries: IndexMap<String, Vec<Entry>>,
}

impl AttributeTable {
    pub fn new() -> Self {
        AttributeTable::default()
    }

    /// Build the table for a draft document: front matter, then header
    /// metadata, then header entries, then every body declaration and reset.
    pub fn from_draft(draft: &DraftDocument) -> Self {
        let mut table = AttributeTable::new();
        for entry in &draft.front_matter {
            table.apply(entry, Position::HEADER);
        }
        if let Some(header) = &draft.header {
            table.record_header(header);
        }
        table.record_body(&draft.blocks);
        table
    }

    pub fn declare(&mut self, name: &str, value: impl Into<String>, at: Position) {
        self.push(name, at, Some(value.into()));
    }

    pub fn reset(&mut self, name: &str, at: Position) {
        self.push(name, at, None);
    }

    pub fn apply(&mut self, entry: &AttributeEntry, at: Position) {
        match entry {
            AttributeEntry::Declaration { name, value } => self.declare(name, value.as_str(), at),
            AttributeEntry::Reset { name } => self.reset(name, at),
        }
    }

    fn push(&mut self, name: &str, position: Position, value: Option<String>) {
        let history = self.entries.entry(normalize(name)).or_default();
        // Keep the history sorted; entries at the same position stay in
        // insertion order.
        let index = history.partition_point(|e| e.position <= position);
        history.insert(index, Entry { position, value });
    }

    /// The value of `name` as seen by content at position `at`.
    ///
    /// Only entries strictly before `at` are visible. A visible reset hides
    /// the attribute, including any predefined value. With no visible entry
    /// the predefined character attributes are consulted.
    pub fn get_at(&self, name: &str, at: Position) -> Option<Resolved<'_>> {
        let name = normalize(name);
        let visible = self.entries.get(&name).and_then(|history| {
            let count = history.partition_point(|e| e.position < at);
            count.checked_sub(1).map(|last| &history[last])
        });
        match visible {
            Some(entry) => entry.value.as_deref().map(Resolved::Declared),
            None => predefined(&name).map(Resolved::Predefined),
        }
    }

    /// The value of `name` once the whole document has been read.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&normalize(name))
            .and_then(|history| history.last())
            .and_then(|entry| entry.value.as_deref())
    }

    /// The value of `name` as set by front matter and header, before any body
    /// content.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        match self.get_at(name, Position::BODY_START) {
            Some(Resolved::Declared(value)) => Some(value),
            _ => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&normalize(name))
    }

    /// Names in order of first appearance.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn record_header(&mut self, header: &DraftHeader) {
        let at = Position::HEADER;
        // `doctitle` ranks after front matter and before header entries, but
        // its placeholders see every header value.
        let front_matter_titles = self.entries.get("doctitle").map_or(0, Vec::len);
        self.record_authors(&header.authors);
        if let Some(revision) = &header.revision {
            self.record_revision(revision);
        }
        for entry in &header.attributes {
            self.apply(entry, at);
        }

        let title = flatten(&self.substitute_header_values(&header.title));
        if !title.is_empty() {
            let history = self.entries.entry("doctitle".to_string()).or_default();
            let index = front_matter_titles.min(history.len());
            history.insert(
                index,
                Entry {
                    position: at,
                    value: Some(title),
                },
            );
        }
    }

    /// Replace placeholders with their values as of the end of the header.
    /// Unknown names are left in place.
    fn substitute_header_values(&self, line: &[InlineElement]) -> Line {
        line.iter()
            .map(|element| match element {
                InlineElement::AttributeSubstitution { name } => {
                    match self.get_at(name, Position::BODY_START) {
                        Some(value) => InlineElement::text(value.as_str()),
                        None => element.clone(),
                    }
                }
                InlineElement::Quoted { kind, elements } => InlineElement::Quoted {
                    kind: *kind,
                    elements: self.substitute_header_values(elements),
                },
                InlineElement::Link { url, text } => InlineElement::Link {
                    url: url.clone(),
                    text: self.substitute_header_values(text),
                },
                InlineElement::CrossReference { id, label } => InlineElement::CrossReference {
                    id: id.clone(),
                    label: label
                        .as_ref()
                        .map(|label| self.substitute_header_values(label)),
                },
                other => other.clone(),
            })
            .collect()
    }

    fn record_authors(&mut self, authors: &[Author]) {
        let at = Position::HEADER;
        let mut names = Vec::with_capacity(authors.len());
        for (index, author) in authors.iter().enumerate() {
            let suffix = if index == 0 {
                String::new()
            } else {
                format!("_{}", index + 1)
            };
            let name = AuthorName::parse(&author.full_name);
            self.declare(&format!("author{}", suffix), name.full.as_str(), at);
            if let Some(first) = &name.first {
                self.declare(&format!("firstname{}", suffix), first.as_str(), at);
            }
            if let Some(middle) = &name.middle {
                self.declare(&format!("middlename{}", suffix), middle.as_str(), at);
            }
            if let Some(last) = &name.last {
                self.declare(&format!("lastname{}", suffix), last.as_str(), at);
            }
            self.declare(&format!("authorinitials{}", suffix), name.initials, at);
            if let Some(email) = &author.email {
                self.declare(&format!("email{}", suffix), email.as_str(), at);
            }
            names.push(name.full);
        }
        if !names.is_empty() {
            self.declare("authors", names.join(", "), at);
        }
    }

    fn record_revision(&mut self, revision: &Revision) {
        let at = Position::HEADER;
        if let Some(number) = &revision.number {
            self.declare("revnumber", strip_version_prefix(number), at);
        }
        if let Some(date) = &revision.date {
            self.declare("revdate", date.as_str(), at);
        }
        if let Some(remark) = &revision.remark {
            self.declare("revremark", remark.as_str(), at);
        }
    }

    fn record_body(&mut self, blocks: &[DraftBlock]) {
        for_each_numbered(blocks, Position::BODY_START.0, &mut |number, block| {
            match block {
                DraftBlock::AttributeDeclaration { name, value } => {
                    self.declare(name, value.as_str(), Position(number))
                }
                DraftBlock::AttributeReset { name } => self.reset(name, Position(number)),
                _ => {}
            }
        });
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// `v1.2` and `V1.2` are recorded as `1.2`.
fn strip_version_prefix(number: &str) -> &str {
    let trimmed = number.trim();
    match trimmed.strip_prefix(['v', 'V']) {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit()) => rest,
        _ => trimmed,
    }
}

struct AuthorName {
    full: String,
    first: Option<String>,
    middle: Option<String>,
    last: Option<String>,
    initials: String,
}

impl AuthorName {
    /// Split a full name into first, middle and last parts. Two parts are
    /// first and last; three or more put everything between in the middle.
    fn parse(full_name: &str) -> Self {
        let parts: Vec<String> = full_name
            .split_whitespace()
            .map(|part| part.replace('_', " "))
            .collect();
        let (first, middle, last) = match parts.as_slice() {
            [] => (None, None, None),
            [first] => (Some(first.clone()), None, None),
            [first, last] => (Some(first.clone()), None, Some(last.clone())),
            [first, middle @ .., last] => (
                Some(first.clone()),
                Some(middle.join(" ")),
                Some(last.clone()),
            ),
        };
        let initials = [&first, &middle, &last]
            .into_iter()
            .flatten()
            .filter_map(|part| part.chars().next())
            .collect();
        AuthorName {
            full: parts.join(" "),
            first,
            middle,
            last,
            initials,
        }
    }
}
