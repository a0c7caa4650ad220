//! The draft-to-final assembly pass.
//!
//! Passes run in a fixed order: the attribute table is built, placeholders
//! are resolved, lists are assembled scope by scope, sections are nested
//! (with preamble and table of contents), and finally the id index is
//! collected. A structural error in any pass aborts the whole assembly.

pub mod error;
pub mod lists;
pub mod references;
pub mod sections;
pub mod substitution;

use crate::attributes::{AttributeTable, Position};
use crate::document::{
    Block, DelimitedBlock, DelimitedContent, Document, Header, flatten, flatten_lines,
};
use crate::draft::{DraftBlock, DraftDelimitedBlock, DraftDocument, DraftListItem, DraftSection};
use crate::inline::{InlineParser, ValueParser};

pub use error::{AssemblyError, AssemblyWarning, Pass, StructuralError, WarningKind, Warnings};
pub use lists::{PendingItem, assemble_list};
pub use references::collect_references;
pub use sections::{
    SectionIds, SlugOptions, TocPlacement, assemble_sections, place_toc, slugify,
    synthesize_preamble,
};
pub use substitution::SubstitutionResolver;

/// A successfully assembled document and the warnings found on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Assembled {
    pub document: Document,
    pub warnings: Vec<AssemblyWarning>,
}

/// Builds a [`Document`] from a [`DraftDocument`].
pub struct Assembler {
    draft: DraftDocument,
    parser: Box<dyn InlineParser>,
}

impl Assembler {
    pub fn new(draft: DraftDocument) -> Self {
        Assembler {
            draft,
            parser: Box::new(ValueParser),
        }
    }

    /// Use `parser` to turn substituted attribute values into inline content.
    pub fn with_inline_parser(mut self, parser: impl InlineParser + 'static) -> Self {
        self.parser = Box::new(parser);
        self
    }

    pub fn assemble(self) -> Result<Assembled, AssemblyError> {
        let Assembler { draft, parser } = self;
        let mut warnings = Warnings::new();

        tracing::debug!(pass = %Pass::Attributes, "running pass");
        let attributes = AttributeTable::from_draft(&draft);
        let DraftDocument { header, blocks, .. } = draft;

        tracing::debug!(pass = %Pass::Substitution, blocks = blocks.len(), "running pass");
        let resolver = SubstitutionResolver::new(&attributes, parser.as_ref());
        let header = header.map(|header| Header {
            title: resolver.resolve_line(header.title, Position::BODY_START, &mut warnings),
            authors: header.authors,
            revision: header.revision,
        });
        let blocks = resolver.resolve_blocks(blocks, &mut warnings);

        tracing::debug!(pass = %Pass::Lists, "running pass");
        let mut scope = ScopeAssembler {
            ids: SectionIds::new(SlugOptions::from_table(&attributes)),
            warnings: &mut warnings,
        };
        let flat = scope.assemble(blocks, None)?;

        tracing::debug!(pass = %Pass::Sections, "running pass");
        let mut elements = synthesize_preamble(assemble_sections(flat)?);
        if let Some(placement) = TocPlacement::from_table(&attributes, &mut warnings) {
            place_toc(&mut elements, placement, &mut warnings);
        }

        tracing::debug!(pass = %Pass::References, "running pass");
        let references = collect_references(&elements, &mut warnings);

        tracing::debug!(
            elements = elements.len(),
            references = references.len(),
            warnings = warnings.len(),
            "assembly finished"
        );
        Ok(Assembled {
            document: Document {
                header,
                attributes,
                elements,
                references,
            },
            warnings: warnings.into_vec(),
        })
    }
}

/// Converts the draft blocks of one scope: the document body, the blocks
/// attached to a list item, or the content of a compound delimited block.
///
/// List items are gathered into runs and assembled. Sections stay flat; only
/// the document body may contain them.
struct ScopeAssembler<'w> {
    ids: SectionIds,
    warnings: &'w mut Warnings,
}

impl ScopeAssembler<'_> {
    fn assemble(
        &mut self,
        blocks: Vec<DraftBlock>,
        container: Option<&'static str>,
    ) -> Result<Vec<Block>, AssemblyError> {
        let mut out = Vec::with_capacity(blocks.len());
        let mut run: Vec<PendingItem> = Vec::new();

        for block in blocks {
            let block = match block {
                DraftBlock::ListItem(item) => {
                    let same_role = run
                        .first()
                        .is_none_or(|first| first.prefix.style.kind() == item.prefix.style.kind());
                    if !same_role {
                        self.flush_list(&mut run, &mut out)?;
                    }
                    let item = self.pending_item(item)?;
                    run.push(item);
                    continue;
                }
                // Blank lines between items keep the run going.
                DraftBlock::BlankLine => continue,
                DraftBlock::Section(section) => self.open_section(section, container)?,
                DraftBlock::Paragraph(paragraph) => Block::Paragraph(paragraph),
                DraftBlock::DelimitedBlock(delimited) => self.delimited_block(delimited)?,
                DraftBlock::Admonition(admonition) => Block::Admonition(admonition),
                DraftBlock::Image(image) => Block::Image(image),
                DraftBlock::TableOfContents => Block::TableOfContents,
                DraftBlock::AttributeDeclaration { name, value } => {
                    Block::AttributeDeclaration { name, value }
                }
                DraftBlock::AttributeReset { name } => Block::AttributeReset { name },
                DraftBlock::Comment { text } => Block::Comment(text),
            };
            self.flush_list(&mut run, &mut out)?;
            out.push(block);
        }

        self.flush_list(&mut run, &mut out)?;
        Ok(out)
    }

    fn pending_item(&mut self, item: DraftListItem) -> Result<PendingItem, AssemblyError> {
        let elements = self.assemble(item.elements, Some("a list item"))?;
        Ok(PendingItem {
            prefix: item.prefix,
            attributes: item.attributes,
            term: item.term,
            check: item.check,
            text: item.text,
            elements,
        })
    }

    fn flush_list(
        &mut self,
        run: &mut Vec<PendingItem>,
        out: &mut Vec<Block>,
    ) -> Result<(), AssemblyError> {
        if run.is_empty() {
            return Ok(());
        }
        let items = std::mem::take(run);
        let element = describe_run(&items);
        let list = assemble_list(items, self.warnings)
            .map_err(|source| AssemblyError::new(Pass::Lists, element, source))?;
        out.push(Block::List(list));
        Ok(())
    }

    fn open_section(
        &mut self,
        section: DraftSection,
        container: Option<&'static str>,
    ) -> Result<Block, AssemblyError> {
        let element = format!("section \"{}\"", flatten(&section.title));
        if let Some(container) = container {
            let source = StructuralError::NestedSection {
                level: section.level,
                container,
            };
            return Err(AssemblyError::new(Pass::Sections, element, source));
        }
        self.ids
            .open_section(section)
            .map(Block::Section)
            .map_err(|source| AssemblyError::new(Pass::Sections, element, source))
    }

    fn delimited_block(&mut self, delimited: DraftDelimitedBlock) -> Result<Block, AssemblyError> {
        let content = if delimited.kind.is_verbatim() {
            DelimitedContent::Verbatim(delimited.lines)
        } else {
            DelimitedContent::Compound(self.assemble(delimited.blocks, Some("a delimited block"))?)
        };
        Ok(Block::DelimitedBlock(DelimitedBlock {
            kind: delimited.kind,
            attributes: delimited.attributes,
            content,
        }))
    }
}

fn describe_run(items: &[PendingItem]) -> String {
    match items.first() {
        Some(first) => {
            let text = match &first.term {
                Some(term) => flatten(term),
                None => flatten_lines(&first.text),
            };
            format!("{} list starting with \"{}\"", first.prefix.style.kind(), text)
        }
        None => "empty list".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DelimitedKind, InlineElement, List, ListItemPrefix, Paragraph};

    fn item(marker: &str, text: &str) -> DraftBlock {
        DraftBlock::ListItem(DraftListItem::new(
            ListItemPrefix::from_marker(marker).unwrap(),
            vec![vec![InlineElement::text(text)]],
        ))
    }

    fn para(text: &str) -> DraftBlock {
        DraftBlock::Paragraph(Paragraph {
            attributes: Default::default(),
            lines: vec![vec![InlineElement::text(text)]],
        })
    }

    fn heading(level: u8, title: &str) -> DraftBlock {
        DraftBlock::Section(DraftSection {
            level,
            title: vec![InlineElement::text(title)],
            attributes: Default::default(),
        })
    }

    fn assemble(blocks: Vec<DraftBlock>) -> Result<Assembled, AssemblyError> {
        Assembler::new(DraftDocument {
            blocks,
            ..Default::default()
        })
        .assemble()
    }

    #[test]
    fn blank_lines_do_not_split_a_list() {
        let assembled = assemble(vec![
            item("*", "a"),
            DraftBlock::BlankLine,
            item("*", "b"),
        ])
        .unwrap();
        let elements = &assembled.document.elements;
        assert_eq!(elements.len(), 1);
        let Block::List(list) = &elements[0] else {
            panic!("expected a list");
        };
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn other_blocks_and_role_changes_split_lists() {
        let assembled = assemble(vec![
            item("*", "a"),
            DraftBlock::Comment {
                text: "split".into(),
            },
            item("*", "b"),
            item(".", "c"),
            para("end"),
        ])
        .unwrap();
        let kinds: Vec<_> = assembled
            .document
            .elements
            .iter()
            .map(|block| match block {
                Block::List(list) => list.kind().to_string(),
                Block::Comment(_) => "comment".to_string(),
                Block::Paragraph(_) => "paragraph".to_string(),
                other => format!("{:?}", other),
            })
            .collect();
        assert_eq!(
            kinds,
            vec!["unordered", "comment", "unordered", "ordered", "paragraph"]
        );
    }

    #[test]
    fn item_continuations_are_assembled_as_their_own_scope() {
        let mut parent = DraftListItem::new(
            ListItemPrefix::from_marker("1.").unwrap(),
            vec![vec![InlineElement::text("parent")]],
        );
        parent.elements = vec![para("attached"), item("-", "x"), item("-", "y")];
        let assembled = assemble(vec![DraftBlock::ListItem(parent)]).unwrap();

        let Block::List(List::Ordered(list)) = &assembled.document.elements[0] else {
            panic!("expected an ordered list");
        };
        let elements = &list.items[0].elements;
        assert_eq!(elements.len(), 2);
        assert!(matches!(elements[0], Block::Paragraph(_)));
        let Block::List(inner) = &elements[1] else {
            panic!("expected an attached list");
        };
        assert_eq!(inner.len(), 2);
    }

    #[test]
    fn sections_inside_delimited_blocks_are_structural() {
        let err = assemble(vec![DraftBlock::DelimitedBlock(DraftDelimitedBlock {
            kind: DelimitedKind::Example,
            attributes: Default::default(),
            lines: Vec::new(),
            blocks: vec![heading(1, "Hidden")],
        })])
        .unwrap_err();
        assert_eq!(err.pass, Pass::Sections);
        assert_eq!(
            err.source,
            StructuralError::NestedSection {
                level: 1,
                container: "a delimited block",
            }
        );
        assert_eq!(
            err.to_string(),
            "section assembly failed at section \"Hidden\": section at level 1 is not allowed inside a delimited block"
        );
    }

    #[test]
    fn sections_inside_list_items_are_structural() {
        let mut parent = DraftListItem::new(
            ListItemPrefix::from_marker("*").unwrap(),
            vec![vec![InlineElement::text("parent")]],
        );
        parent.elements = vec![para("attached"), heading(2, "Tucked away")];
        let err = assemble(vec![heading(1, "Top"), DraftBlock::ListItem(parent)]).unwrap_err();

        assert_eq!(err.pass, Pass::Sections);
        assert_eq!(err.element, "section \"Tucked away\"");
        assert_eq!(
            err.source,
            StructuralError::NestedSection {
                level: 2,
                container: "a list item",
            }
        );
    }

    #[test]
    fn list_errors_name_the_run() {
        let mut first = DraftListItem::new(ListItemPrefix::from_marker("::").unwrap(), Vec::new());
        first.term = Some(vec![InlineElement::text("CPU")]);
        let second = DraftListItem::new(
            ListItemPrefix::from_marker("::").unwrap(),
            vec![vec![InlineElement::text("no term")]],
        );
        let err = assemble(vec![
            DraftBlock::ListItem(first),
            DraftBlock::ListItem(second),
        ])
        .unwrap_err();
        assert_eq!(err.pass, Pass::Lists);
        assert_eq!(err.element, "labeled list starting with \"CPU\"");
        assert_eq!(err.source, StructuralError::MissingTerm { index: 1 });
    }

    #[test]
    fn verbatim_blocks_keep_their_lines() {
        let assembled = assemble(vec![DraftBlock::DelimitedBlock(DraftDelimitedBlock {
            kind: DelimitedKind::Listing,
            attributes: Default::default(),
            lines: vec!["fn main() {}".into()],
            blocks: Vec::new(),
        })])
        .unwrap();
        let Block::DelimitedBlock(block) = &assembled.document.elements[0] else {
            panic!("expected a delimited block");
        };
        assert_eq!(
            block.content,
            DelimitedContent::Verbatim(vec!["fn main() {}".to_string()])
        );
    }
}
