//! Section nesting, preamble synthesis and table of contents placement.

use std::collections::HashSet;

use crate::attributes::AttributeTable;
use crate::document::{Block, Preamble, Section, flatten};
use crate::draft::DraftSection;

use super::error::{AssemblyError, AssemblyWarning, Pass, StructuralError, Warnings};

/// Deepest section level a document may use.
pub const MAX_SECTION_LEVEL: u8 = 5;

/// How generated ids are spelled (`idprefix` and `idseparator`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugOptions {
    pub prefix: String,
    pub separator: String,
}

impl Default for SlugOptions {
    fn default() -> Self {
        SlugOptions {
            prefix: "_".to_string(),
            separator: "_".to_string(),
        }
    }
}

impl SlugOptions {
    /// Options as set in front matter or header.
    pub fn from_table(table: &AttributeTable) -> Self {
        let defaults = SlugOptions::default();
        SlugOptions {
            prefix: table
                .header_value("idprefix")
                .map_or(defaults.prefix, str::to_string),
            separator: table
                .header_value("idseparator")
                .map_or(defaults.separator, str::to_string),
        }
    }
}

/// Lower-case the alphanumerics of `title` and collapse every run of other
/// characters into one separator. No separator leads or trails. A title
/// without alphanumerics becomes `section`.
pub fn slugify(title: &str, options: &SlugOptions) -> String {
    let mut slug = options.prefix.clone();
    let mut body_empty = true;
    let mut pending_separator = false;
    for ch in title.chars() {
        if ch.is_alphanumeric() {
            if pending_separator && !body_empty {
                slug.push_str(&options.separator);
            }
            pending_separator = false;
            body_empty = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_separator = true;
        }
    }
    if body_empty {
        slug.push_str("section");
    }
    slug
}

/// Turns draft section titles into sections with unique generated ids.
///
/// Explicit ids are kept as written; duplicates among them are reported by
/// the reference collector. A generated id that is already taken gets a
/// numeric suffix (`_intro`, `_intro_2`, ...).
#[derive(Debug, Default)]
pub struct SectionIds {
    options: SlugOptions,
    taken: HashSet<String>,
}

impl SectionIds {
    pub fn new(options: SlugOptions) -> Self {
        SectionIds {
            options,
            taken: HashSet::new(),
        }
    }

    pub fn open_section(&mut self, draft: DraftSection) -> Result<Section, StructuralError> {
        if draft.level > MAX_SECTION_LEVEL {
            return Err(StructuralError::SectionLevelOutOfRange { level: draft.level });
        }
        let id = match draft.attributes.id() {
            Some(id) => id.to_string(),
            None => self.generate(&flatten(&draft.title)),
        };
        self.taken.insert(id.clone());
        Ok(Section {
            level: draft.level,
            id,
            title: draft.title,
            attributes: draft.attributes,
            elements: Vec::new(),
        })
    }

    fn generate(&self, title: &str) -> String {
        let base = slugify(title, &self.options);
        if !self.taken.contains(&base) {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{}{}{}", base, self.options.separator, n);
            if !self.taken.contains(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Nest a flat sequence of blocks under the sections that precede them.
///
/// Sections in `blocks` carry no elements yet. Everything up to the next
/// section of the same or a lower level becomes a child.
pub fn assemble_sections(blocks: Vec<Block>) -> Result<Vec<Block>, AssemblyError> {
    let mut nester = SectionNester::default();
    for block in blocks {
        match block {
            Block::Section(section) => nester.open(section)?,
            other => nester.append(other),
        }
    }
    Ok(nester.finalize())
}

#[derive(Default)]
struct SectionNester {
    section_stack: Vec<Section>,
    top_blocks: Vec<Block>,
    top_level: Option<u8>,
}

impl SectionNester {
    fn open(&mut self, section: Section) -> Result<(), AssemblyError> {
        self.close_sections_to_level(section.level);

        let level = section.level;
        let violation = match (self.section_stack.last(), self.top_level) {
            (Some(parent), _) if level != parent.level + 1 => Some(StructuralError::SectionLevelSkip {
                parent: parent.level,
                level,
            }),
            (None, Some(first)) if level != first => {
                Some(StructuralError::RootLevelMismatch { first, level })
            }
            _ => None,
        };
        if let Some(source) = violation {
            return Err(AssemblyError::new(
                Pass::Sections,
                format!("section \"{}\"", flatten(&section.title)),
                source,
            ));
        }

        if self.section_stack.is_empty() {
            self.top_level = Some(level);
        }
        self.section_stack.push(section);
        Ok(())
    }

    fn append(&mut self, block: Block) {
        match self.section_stack.last_mut() {
            Some(section) => section.elements.push(block),
            None => self.top_blocks.push(block),
        }
    }

    /// Close sections from the stack down to the given level.
    fn close_sections_to_level(&mut self, new_level: u8) {
        while self
            .section_stack
            .last()
            .is_some_and(|top| top.level >= new_level)
        {
            let Some(section) = self.section_stack.pop() else {
                break;
            };
            self.append(Block::Section(section));
        }
    }

    fn finalize(mut self) -> Vec<Block> {
        while let Some(section) = self.section_stack.pop() {
            self.append(Block::Section(section));
        }
        self.top_blocks
    }
}

/// Gather the top-level blocks before the first section into a preamble.
///
/// A document with no sections, or one that starts with a section, is
/// returned unchanged.
pub fn synthesize_preamble(mut elements: Vec<Block>) -> Vec<Block> {
    let Some(first_section) = elements
        .iter()
        .position(|block| matches!(block, Block::Section(_)))
    else {
        return elements;
    };
    if first_section == 0 {
        return elements;
    }
    let rest = elements.split_off(first_section);
    let mut out = Vec::with_capacity(rest.len() + 1);
    out.push(Block::Preamble(Preamble { elements }));
    out.extend(rest);
    out
}

/// Where the `toc` attribute asks for the table of contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TocPlacement {
    /// Before everything else.
    Auto,
    /// At the end of the preamble.
    Preamble,
    /// Only where a `toc::[]` block is written.
    Macro,
}

impl TocPlacement {
    /// Read `toc` as set in front matter or header. `None` when unset or
    /// unrecognized.
    pub fn from_table(table: &AttributeTable, warnings: &mut Warnings) -> Option<Self> {
        let value = table.header_value("toc")?;
        match value.trim() {
            "" | "auto" => Some(TocPlacement::Auto),
            "preamble" => Some(TocPlacement::Preamble),
            "macro" => Some(TocPlacement::Macro),
            other => {
                warnings.push(
                    AssemblyWarning::malformed(
                        Pass::Sections,
                        format!("unknown table of contents placement `{}`", other),
                    )
                    .with_note("expected `auto`, `preamble` or `macro`"),
                );
                None
            }
        }
    }
}

/// Insert the table of contents into the assembled top-level blocks.
pub fn place_toc(elements: &mut Vec<Block>, placement: TocPlacement, warnings: &mut Warnings) {
    match placement {
        TocPlacement::Auto => elements.insert(0, Block::TableOfContents),
        TocPlacement::Preamble => match elements.first_mut() {
            Some(Block::Preamble(preamble)) => preamble.elements.push(Block::TableOfContents),
            _ => warnings.push(
                AssemblyWarning::malformed(
                    Pass::Sections,
                    "`toc` is set to `preamble` but the document has no preamble",
                )
                .with_note("no table of contents was inserted"),
            ),
        },
        TocPlacement::Macro => {}
    }
}
