//! Plain-text views of an assembled document.

use std::fmt::Write;

use adoc::document::{
    Attributes, Block, CheckState, DelimitedContent, Document, List, flatten, flatten_lines,
};

/// One line per block, children indented by two spaces.
pub fn render_outline(document: &Document) -> String {
    let mut out = String::new();
    if let Some(header) = &document.header {
        let _ = writeln!(out, "title \"{}\"", flatten(&header.title));
    }
    write_blocks(&mut out, &document.elements, 0);
    out
}

/// One line per indexed id, in id order.
pub fn render_references(document: &Document) -> String {
    let mut out = String::new();
    for (id, reference) in &document.references {
        let _ = writeln!(out, "{} {} \"{}\"", id, reference.kind, reference.text);
    }
    out
}

fn write_blocks(out: &mut String, blocks: &[Block], depth: usize) {
    for block in blocks {
        write_block(out, block, depth);
    }
}

fn write_block(out: &mut String, block: &Block, depth: usize) {
    let pad = "  ".repeat(depth);
    match block {
        Block::Section(section) => {
            let _ = writeln!(
                out,
                "{}section[{}] #{} \"{}\"",
                pad,
                section.level,
                section.id,
                flatten(&section.title)
            );
            write_blocks(out, &section.elements, depth + 1);
        }
        Block::Preamble(preamble) => {
            let _ = writeln!(out, "{}preamble", pad);
            write_blocks(out, &preamble.elements, depth + 1);
        }
        Block::Paragraph(paragraph) => {
            let _ = writeln!(
                out,
                "{}paragraph{} \"{}\"",
                pad,
                id_suffix(&paragraph.attributes),
                flatten_lines(&paragraph.lines)
            );
        }
        Block::List(list) => write_list(out, list, depth),
        Block::DelimitedBlock(delimited) => {
            let kind = delimited.kind.name();
            let id = id_suffix(&delimited.attributes);
            match &delimited.content {
                DelimitedContent::Verbatim(lines) => {
                    let _ = writeln!(out, "{}{}{} lines={}", pad, kind, id, lines.len());
                }
                DelimitedContent::Compound(blocks) => {
                    let _ = writeln!(out, "{}{}{}", pad, kind, id);
                    write_blocks(out, blocks, depth + 1);
                }
            }
        }
        Block::Admonition(admonition) => {
            let _ = writeln!(
                out,
                "{}admonition[{}]{} \"{}\"",
                pad,
                admonition.kind,
                id_suffix(&admonition.attributes),
                flatten_lines(&admonition.lines)
            );
        }
        Block::Image(image) => {
            let _ = writeln!(
                out,
                "{}image{} \"{}\"",
                pad,
                id_suffix(&image.attributes),
                image.path
            );
        }
        Block::TableOfContents => {
            let _ = writeln!(out, "{}toc", pad);
        }
        Block::AttributeDeclaration { name, value } => {
            let _ = writeln!(out, "{}attribute :{}: {}", pad, name, value);
        }
        Block::AttributeReset { name } => {
            let _ = writeln!(out, "{}attribute :!{}:", pad, name);
        }
        Block::Comment(_) => {
            let _ = writeln!(out, "{}comment", pad);
        }
    }
}

fn write_list(out: &mut String, list: &List, depth: usize) {
    let pad = "  ".repeat(depth);
    let id = id_suffix(list.attributes());
    match list {
        List::Ordered(list) => {
            let _ = writeln!(
                out,
                "{}ordered_list{} style={} start={}",
                pad, id, list.style, list.start
            );
            for item in &list.items {
                let _ = writeln!(
                    out,
                    "{}  item {} \"{}\"",
                    pad,
                    item.number,
                    flatten_lines(&item.text)
                );
                write_blocks(out, &item.elements, depth + 2);
            }
        }
        List::Unordered(list) => {
            let _ = writeln!(out, "{}unordered_list{} style={}", pad, id, list.style.name());
            for item in &list.items {
                let check = match item.check {
                    Some(CheckState::Checked) => "[x] ",
                    Some(CheckState::Unchecked) => "[ ] ",
                    None => "",
                };
                let _ = writeln!(
                    out,
                    "{}  item {}\"{}\"",
                    pad,
                    check,
                    flatten_lines(&item.text)
                );
                write_blocks(out, &item.elements, depth + 2);
            }
        }
        List::Labeled(list) => {
            let _ = writeln!(out, "{}labeled_list{} style={}", pad, id, list.style.name());
            for item in &list.items {
                let _ = writeln!(
                    out,
                    "{}  item \"{}\" \"{}\"",
                    pad,
                    flatten(&item.term),
                    flatten_lines(&item.text)
                );
                write_blocks(out, &item.elements, depth + 2);
            }
        }
    }
}

fn id_suffix(attributes: &Attributes) -> String {
    attributes
        .id()
        .map(|id| format!(" #{}", id))
        .unwrap_or_default()
}
