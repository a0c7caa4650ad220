//! Replacement of `{name}` placeholders with attribute values.

use crate::attributes::{AttributeTable, Position, Resolved};
use crate::document::{InlineElement, Line, merge_text};
use crate::draft::{DraftBlock, DraftDelimitedBlock, DraftListItem};
use crate::inline::InlineParser;

use super::error::{AssemblyWarning, Pass, Warnings};

/// Rewrites inline content using a finished [`AttributeTable`].
///
/// Blocks are visited in the same pre-order the table was numbered in, so a
/// placeholder only sees attributes declared before its block. Values are
/// re-parsed as inline content but never scanned for further placeholders.
pub struct SubstitutionResolver<'a> {
    table: &'a AttributeTable,
    parser: &'a dyn InlineParser,
}

impl<'a> SubstitutionResolver<'a> {
    pub fn new(table: &'a AttributeTable, parser: &'a dyn InlineParser) -> Self {
        SubstitutionResolver { table, parser }
    }

    /// Resolve every block of a draft body, numbering from
    /// [`Position::BODY_START`].
    pub fn resolve_blocks(&self, blocks: Vec<DraftBlock>, warnings: &mut Warnings) -> Vec<DraftBlock> {
        let mut next = Position::BODY_START.0;
        self.resolve_scope(blocks, &mut next, warnings)
    }

    /// Resolve one line as seen from position `at`.
    pub fn resolve_line(&self, line: Line, at: Position, warnings: &mut Warnings) -> Line {
        let mut out = Vec::with_capacity(line.len());
        for element in line {
            match element {
                InlineElement::AttributeSubstitution { name } => {
                    match self.table.get_at(&name, at) {
                        Some(Resolved::Declared(value)) => {
                            out.extend(self.parser.parse_inline(value))
                        }
                        Some(Resolved::Predefined(value)) => out.push(InlineElement::text(value)),
                        None => {
                            warnings.push(
                                AssemblyWarning::unresolved(
                                    Pass::Substitution,
                                    format!("attribute `{}` is not defined at this point", name),
                                )
                                .with_note("the placeholder is kept as literal text"),
                            );
                            out.push(InlineElement::text(format!("{{{}}}", name)));
                        }
                    }
                }
                InlineElement::Quoted { kind, elements } => out.push(InlineElement::Quoted {
                    kind,
                    elements: self.resolve_line(elements, at, warnings),
                }),
                InlineElement::Link { url, text } => out.push(InlineElement::Link {
                    url,
                    text: self.resolve_line(text, at, warnings),
                }),
                InlineElement::CrossReference { id, label } => {
                    out.push(InlineElement::CrossReference {
                        id,
                        label: label.map(|label| self.resolve_line(label, at, warnings)),
                    })
                }
                other => out.push(other),
            }
        }
        merge_text(out)
    }

    fn resolve_lines(&self, lines: Vec<Line>, at: Position, warnings: &mut Warnings) -> Vec<Line> {
        lines
            .into_iter()
            .map(|line| self.resolve_line(line, at, warnings))
            .collect()
    }

    fn resolve_scope(
        &self,
        blocks: Vec<DraftBlock>,
        next: &mut usize,
        warnings: &mut Warnings,
    ) -> Vec<DraftBlock> {
        blocks
            .into_iter()
            .map(|block| self.resolve_block(block, next, warnings))
            .collect()
    }

    fn resolve_block(&self, block: DraftBlock, next: &mut usize, warnings: &mut Warnings) -> DraftBlock {
        let at = Position(*next);
        *next += 1;

        match block {
            DraftBlock::Section(mut section) => {
                section.title = self.resolve_line(section.title, at, warnings);
                DraftBlock::Section(section)
            }
            DraftBlock::Paragraph(mut paragraph) => {
                paragraph.lines = self.resolve_lines(paragraph.lines, at, warnings);
                DraftBlock::Paragraph(paragraph)
            }
            DraftBlock::Admonition(mut admonition) => {
                admonition.lines = self.resolve_lines(admonition.lines, at, warnings);
                DraftBlock::Admonition(admonition)
            }
            DraftBlock::ListItem(item) => {
                let DraftListItem {
                    prefix,
                    attributes,
                    term,
                    check,
                    text,
                    elements,
                } = item;
                let term = term.map(|term| self.resolve_line(term, at, warnings));
                let text = self.resolve_lines(text, at, warnings);
                let elements = self.resolve_scope(elements, next, warnings);
                DraftBlock::ListItem(DraftListItem {
                    prefix,
                    attributes,
                    term,
                    check,
                    text,
                    elements,
                })
            }
            // Verbatim lines are never substituted.
            DraftBlock::DelimitedBlock(delimited) => {
                let DraftDelimitedBlock {
                    kind,
                    attributes,
                    lines,
                    blocks,
                } = delimited;
                let blocks = self.resolve_scope(blocks, next, warnings);
                DraftBlock::DelimitedBlock(DraftDelimitedBlock {
                    kind,
                    attributes,
                    lines,
                    blocks,
                })
            }
            other => other,
        }
    }
}
