//! The id index of a finished document.

use std::collections::BTreeSet;

use crate::document::{
    Attributes, Block, DelimitedContent, ElementReference, ElementReferences, InlineElement, Line,
    List, ReferenceKind, flatten, flatten_lines,
};

use super::error::{AssemblyWarning, Pass, Warnings};

/// Record every identifiable element of `elements`, in document order.
///
/// A later element with an id already in the index replaces the earlier one
/// and a warning is reported. Cross references to ids missing from the
/// finished index are reported too.
pub fn collect_references(elements: &[Block], warnings: &mut Warnings) -> ElementReferences {
    let mut collector = ReferenceCollector {
        references: ElementReferences::new(),
        targets: BTreeSet::new(),
        warnings,
    };
    collector.visit_blocks(elements);

    let ReferenceCollector {
        references,
        targets,
        warnings,
    } = collector;
    for id in targets.iter().filter(|id| !references.contains_key(*id)) {
        warnings.push(AssemblyWarning::unresolved(
            Pass::References,
            format!("cross reference to unknown id `{}`", id),
        ));
    }
    references
}

struct ReferenceCollector<'w> {
    references: ElementReferences,
    /// Ids named by cross references.
    targets: BTreeSet<String>,
    warnings: &'w mut Warnings,
}

impl ReferenceCollector<'_> {
    fn visit_blocks(&mut self, blocks: &[Block]) {
        for block in blocks {
            self.visit_block(block);
        }
    }

    fn visit_block(&mut self, block: &Block) {
        match block {
            Block::Section(section) => {
                self.visit_line(&section.title);
                let text = section
                    .attributes
                    .title()
                    .map(str::to_string)
                    .unwrap_or_else(|| flatten(&section.title));
                self.record(&section.id, ReferenceKind::Section, text);
                self.visit_blocks(&section.elements);
            }
            Block::Preamble(preamble) => self.visit_blocks(&preamble.elements),
            Block::Paragraph(paragraph) => {
                self.visit_lines(&paragraph.lines);
                self.record_block(
                    &paragraph.attributes,
                    ReferenceKind::Paragraph,
                    flatten_lines(&paragraph.lines),
                );
            }
            Block::List(list) => self.visit_list(list),
            Block::DelimitedBlock(delimited) => {
                self.record_block(
                    &delimited.attributes,
                    ReferenceKind::DelimitedBlock,
                    String::new(),
                );
                if let DelimitedContent::Compound(blocks) = &delimited.content {
                    self.visit_blocks(blocks);
                }
            }
            Block::Admonition(admonition) => {
                self.visit_lines(&admonition.lines);
                let content = flatten_lines(&admonition.lines);
                let content = if content.is_empty() {
                    admonition.kind.to_string()
                } else {
                    content
                };
                self.record_block(&admonition.attributes, ReferenceKind::Admonition, content);
            }
            Block::Image(image) => {
                let alt = image.attributes.get("alt").unwrap_or_default().to_string();
                self.record_block(&image.attributes, ReferenceKind::Image, alt);
            }
            Block::TableOfContents
            | Block::AttributeDeclaration { .. }
            | Block::AttributeReset { .. }
            | Block::Comment(_) => {}
        }
    }

    fn visit_list(&mut self, list: &List) {
        self.record_block(list.attributes(), ReferenceKind::List, String::new());
        match list {
            List::Ordered(list) => {
                for item in &list.items {
                    self.visit_item(&item.attributes, None, &item.text, &item.elements);
                }
            }
            List::Unordered(list) => {
                for item in &list.items {
                    self.visit_item(&item.attributes, None, &item.text, &item.elements);
                }
            }
            List::Labeled(list) => {
                for item in &list.items {
                    self.visit_item(&item.attributes, Some(&item.term), &item.text, &item.elements);
                }
            }
        }
    }

    fn visit_item(
        &mut self,
        attributes: &Attributes,
        term: Option<&Line>,
        text: &[Line],
        elements: &[Block],
    ) {
        if let Some(term) = term {
            self.visit_line(term);
        }
        self.visit_lines(text);
        let content = match term {
            Some(term) => flatten(term),
            None => flatten_lines(text),
        };
        self.record_block(attributes, ReferenceKind::ListItem, content);
        self.visit_blocks(elements);
    }

    /// Record a block that has an explicit id. Display text is its title,
    /// else `content`, else a label for its kind.
    fn record_block(&mut self, attributes: &Attributes, kind: ReferenceKind, content: String) {
        let Some(id) = attributes.id() else {
            return;
        };
        let text = match attributes.title() {
            Some(title) => title.to_string(),
            None if !content.is_empty() => content,
            None => default_label(kind).to_string(),
        };
        self.record(id, kind, text);
    }

    fn record(&mut self, id: &str, kind: ReferenceKind, text: String) {
        let reference = ElementReference { kind, text };
        if let Some(previous) = self.references.insert(id.to_string(), reference) {
            self.warnings.push(
                AssemblyWarning::unresolved(Pass::References, format!("duplicate id `{}`", id))
                    .with_note(format!("the earlier {} with this id is no longer referenced", previous.kind)),
            );
        }
    }

    fn visit_lines(&mut self, lines: &[Line]) {
        for line in lines {
            self.visit_line(line);
        }
    }

    /// Note cross reference targets found in inline content.
    fn visit_line(&mut self, elements: &[InlineElement]) {
        for element in elements {
            match element {
                InlineElement::CrossReference { id, label } => {
                    self.targets.insert(id.clone());
                    if let Some(label) = label {
                        self.visit_line(label);
                    }
                }
                InlineElement::Quoted { elements, .. } => self.visit_line(elements),
                InlineElement::Link { text, .. } => self.visit_line(text),
                InlineElement::Text { .. }
                | InlineElement::Passthrough { .. }
                | InlineElement::Image { .. }
                | InlineElement::AttributeSubstitution { .. } => {}
            }
        }
    }
}

fn default_label(kind: ReferenceKind) -> &'static str {
    match kind {
        ReferenceKind::Section => "Section",
        ReferenceKind::Paragraph => "Paragraph",
        ReferenceKind::List => "List",
        ReferenceKind::ListItem => "List item",
        ReferenceKind::DelimitedBlock => "Block",
        ReferenceKind::Admonition => "Admonition",
        ReferenceKind::Image => "Figure",
    }
}
