use adoc::assembly::Pass;
use adoc::document::{
    Block, ElementReference, InlineElement, List, NumberingStyle, ReferenceKind, flatten,
    flatten_lines,
};
use adoc::{Assembled, Assembler, DraftDocument, PlainText, StructuralError, WarningKind};
use pretty_assertions::assert_eq;

fn draft(source: &str) -> DraftDocument {
    toml::from_str(source).expect("draft should deserialize")
}

fn assemble(source: &str) -> Assembled {
    Assembler::new(draft(source))
        .assemble()
        .expect("assembly failed")
}

fn text(s: &str) -> InlineElement {
    InlineElement::text(s)
}

fn paragraph_text(block: &Block) -> String {
    match block {
        Block::Paragraph(paragraph) => flatten_lines(&paragraph.lines),
        other => panic!("expected a paragraph, got {:?}", other),
    }
}

#[test]
fn reset_attribute_is_not_substituted() {
    let assembled = assemble(
        r#"
[[blocks]]
type = "attribute_declaration"
name = "foo"
value = "bar"

[[blocks]]
type = "attribute_reset"
name = "foo"

[[blocks]]
type = "paragraph"
lines = [[{ type = "attribute_substitution", name = "foo" }]]
"#,
    );

    let Block::Paragraph(paragraph) = &assembled.document.elements[2] else {
        panic!("expected a paragraph");
    };
    assert_eq!(paragraph.lines, vec![vec![text("{foo}")]]);
    assert_eq!(assembled.warnings.len(), 1);
    assert_eq!(assembled.warnings[0].kind, WarningKind::UnresolvedReference);
    assert_eq!(assembled.warnings[0].pass, Pass::Substitution);
}

#[test]
fn letters_nest_under_the_item_they_follow() {
    let assembled = assemble(
        r#"
[[blocks]]
type = "list_item"
marker = "1."
text = [[{ type = "text", text = "one" }]]

[[blocks]]
type = "list_item"
marker = "2."
text = [[{ type = "text", text = "two" }]]

[[blocks]]
type = "list_item"
marker = "a."
text = [[{ type = "text", text = "two a" }]]

[[blocks]]
type = "blank_line"

[[blocks]]
type = "list_item"
marker = "b."
text = [[{ type = "text", text = "two b" }]]

[[blocks]]
type = "list_item"
marker = "3."
text = [[{ type = "text", text = "three" }]]
"#,
    );

    let elements = &assembled.document.elements;
    assert_eq!(elements.len(), 1);
    let Block::List(List::Ordered(root)) = &elements[0] else {
        panic!("expected an ordered list");
    };
    assert_eq!(root.items.len(), 3);
    assert!(root.items[0].elements.is_empty());
    assert!(root.items[2].elements.is_empty());

    let [Block::List(List::Ordered(nested))] = root.items[1].elements.as_slice() else {
        panic!("expected one nested ordered list");
    };
    assert_eq!(nested.style, NumberingStyle::LowerAlpha);
    assert_eq!(
        nested
            .items
            .iter()
            .map(|item| flatten_lines(&item.text))
            .collect::<Vec<_>>(),
        vec!["two a", "two b"]
    );
}

#[test]
fn preamble_toc_follows_the_preamble_blocks() {
    let assembled = assemble(
        r#"
[header]
title = [{ type = "text", text = "Guide" }]
attributes = [{ type = "declaration", name = "toc", value = "preamble" }]

[[blocks]]
type = "paragraph"
lines = [[{ type = "text", text = "first" }]]

[[blocks]]
type = "paragraph"
lines = [[{ type = "text", text = "second" }]]

[[blocks]]
type = "section"
level = 1
title = [{ type = "text", text = "Install" }]
"#,
    );

    let elements = &assembled.document.elements;
    assert_eq!(elements.len(), 2);
    let Block::Preamble(preamble) = &elements[0] else {
        panic!("expected a preamble");
    };
    assert_eq!(preamble.elements.len(), 3);
    assert_eq!(paragraph_text(&preamble.elements[0]), "first");
    assert_eq!(paragraph_text(&preamble.elements[1]), "second");
    assert_eq!(preamble.elements[2], Block::TableOfContents);
    assert!(matches!(&elements[1], Block::Section(section) if section.id == "_install"));
    assert!(assembled.warnings.is_empty());
}

#[test]
fn header_attributes_flow_into_the_body() {
    let assembled = assemble(
        r#"
front_matter = [{ type = "declaration", name = "product", value = "Widget" }]

[header]
title = [
    { type = "attribute_substitution", name = "product" },
    { type = "text", text = " Guide" },
]
authors = [{ full_name = "Ada Lovelace", email = "ada@example.org" }]
revision = { number = "v1.2", date = "2024-03-01" }
attributes = [{ type = "declaration", name = "idprefix", value = "" }]

[[blocks]]
type = "section"
level = 1
title = [{ type = "text", text = "Getting Started" }]

[[blocks]]
type = "paragraph"
lines = [[
    { type = "text", text = "See " },
    { type = "cross_reference", id = "next_steps" },
    { type = "text", text = ", written by " },
    { type = "attribute_substitution", name = "author" },
    { type = "text", text = " for " },
    { type = "attribute_substitution", name = "revnumber" },
]]

[[blocks]]
type = "section"
level = 2
title = [{ type = "text", text = "Next Steps" }]
"#,
    );
    let document = &assembled.document;
    assert!(assembled.warnings.is_empty(), "{:?}", assembled.warnings);

    let header = document.header.as_ref().expect("header");
    assert_eq!(header.title, vec![text("Widget Guide")]);
    assert_eq!(header.authors[0].email.as_deref(), Some("ada@example.org"));
    assert_eq!(document.attributes.get("email"), Some("ada@example.org"));
    assert_eq!(document.attributes.get("revdate"), Some("2024-03-01"));

    assert_eq!(document.elements.len(), 1);
    let Block::Section(getting_started) = &document.elements[0] else {
        panic!("expected a section");
    };
    assert_eq!(getting_started.id, "getting_started");
    assert_eq!(
        flatten(match &getting_started.elements[0] {
            Block::Paragraph(paragraph) => &paragraph.lines[0],
            other => panic!("expected a paragraph, got {:?}", other),
        }),
        "See next_steps, written by Ada Lovelace for 1.2"
    );

    assert_eq!(
        document.references.get("next_steps"),
        Some(&ElementReference {
            kind: ReferenceKind::Section,
            text: "Next Steps".into(),
        })
    );
    assert_eq!(document.references.len(), 2);
}

#[test]
fn doctitle_in_the_body_matches_the_resolved_title() {
    let assembled = assemble(
        r#"
front_matter = [{ type = "declaration", name = "product", value = "Widget" }]

[header]
title = [
    { type = "attribute_substitution", name = "product" },
    { type = "text", text = " Guide" },
]

[[blocks]]
type = "paragraph"
lines = [[{ type = "attribute_substitution", name = "doctitle" }]]
"#,
    );
    assert!(assembled.warnings.is_empty(), "{:?}", assembled.warnings);
    let header = assembled.document.header.as_ref().expect("header");
    assert_eq!(header.title, vec![text("Widget Guide")]);
    assert_eq!(paragraph_text(&assembled.document.elements[0]), "Widget Guide");
    assert_eq!(
        assembled.document.attributes.get("doctitle"),
        Some("Widget Guide")
    );
}

#[test]
fn macro_toc_stays_where_it_is_written() {
    let assembled = assemble(
        r#"
[header]
title = [{ type = "text", text = "Guide" }]
attributes = [{ type = "declaration", name = "toc", value = "macro" }]

[[blocks]]
type = "paragraph"
lines = [[{ type = "text", text = "intro" }]]

[[blocks]]
type = "section"
level = 1
title = [{ type = "text", text = "Contents" }]

[[blocks]]
type = "table_of_contents"

[[blocks]]
type = "paragraph"
lines = [[{ type = "text", text = "body" }]]
"#,
    );
    assert!(assembled.warnings.is_empty(), "{:?}", assembled.warnings);

    let elements = &assembled.document.elements;
    assert_eq!(elements.len(), 2);
    let Block::Preamble(preamble) = &elements[0] else {
        panic!("expected a preamble");
    };
    assert_eq!(preamble.elements.len(), 1);
    assert_eq!(paragraph_text(&preamble.elements[0]), "intro");

    let Block::Section(section) = &elements[1] else {
        panic!("expected a section");
    };
    assert_eq!(section.elements.len(), 2);
    assert_eq!(section.elements[0], Block::TableOfContents);
    assert_eq!(paragraph_text(&section.elements[1]), "body");
}

#[test]
fn document_without_sections_has_no_preamble() {
    let assembled = assemble(
        r#"
[header]
title = [{ type = "text", text = "Notes" }]
attributes = [{ type = "declaration", name = "toc", value = "" }]

[[blocks]]
type = "paragraph"
lines = [[{ type = "text", text = "only" }]]
"#,
    );
    let elements = &assembled.document.elements;
    assert_eq!(elements.len(), 2);
    assert_eq!(elements[0], Block::TableOfContents);
    assert_eq!(paragraph_text(&elements[1]), "only");
}

#[test]
fn warnings_do_not_stop_assembly() {
    let assembled = assemble(
        r#"
[[blocks]]
type = "list_item"
marker = "."
attributes = { start = "three", id = "steps" }
text = [[{ type = "text", text = "go" }]]

[[blocks]]
type = "paragraph"
attributes = { id = "steps" }
lines = [[
    { type = "cross_reference", id = "missing" },
    { type = "attribute_substitution", name = "nope" },
]]
"#,
    );

    let kinds: Vec<_> = assembled
        .warnings
        .iter()
        .map(|warning| (warning.pass, warning.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (Pass::Substitution, WarningKind::UnresolvedReference),
            (Pass::Lists, WarningKind::MalformedAttribute),
            (Pass::References, WarningKind::UnresolvedReference),
            (Pass::References, WarningKind::UnresolvedReference),
        ]
    );

    let Block::List(List::Ordered(list)) = &assembled.document.elements[0] else {
        panic!("expected an ordered list");
    };
    assert_eq!(list.start, 1);
    assert_eq!(
        assembled.document.references["steps"].kind,
        ReferenceKind::Paragraph
    );
}

#[test]
fn structural_errors_abort_assembly() {
    let result = Assembler::new(draft(
        r#"
[[blocks]]
type = "section"
level = 1
title = [{ type = "text", text = "Top" }]

[[blocks]]
type = "section"
level = 3
title = [{ type = "text", text = "Too deep" }]
"#,
    ))
    .assemble();

    let err = result.expect_err("level skip should fail");
    assert_eq!(err.pass, Pass::Sections);
    assert_eq!(
        err.source,
        StructuralError::SectionLevelSkip {
            parent: 1,
            level: 3
        }
    );
}

#[test]
fn custom_inline_parser_is_used_for_values() {
    let document = draft(
        r#"
front_matter = [{ type = "declaration", name = "motto", value = "*bold* claims" }]

[[blocks]]
type = "paragraph"
lines = [[{ type = "attribute_substitution", name = "motto" }]]
"#,
    );

    let plain = Assembler::new(document.clone())
        .with_inline_parser(PlainText)
        .assemble()
        .unwrap();
    let Block::Paragraph(paragraph) = &plain.document.elements[0] else {
        panic!("expected a paragraph");
    };
    assert_eq!(paragraph.lines[0], vec![text("*bold* claims")]);

    let rich = adoc::assemble(document).unwrap();
    let Block::Paragraph(paragraph) = &rich.document.elements[0] else {
        panic!("expected a paragraph");
    };
    assert_eq!(paragraph.lines[0].len(), 2);
}

#[test]
fn labeled_and_checklist_items_load_from_toml() {
    let assembled = assemble(
        r#"
[[blocks]]
type = "list_item"
marker = "::"
term = [{ type = "text", text = "CPU" }]
text = [[{ type = "text", text = "does the math" }]]

[[blocks.elements]]
type = "list_item"
marker = "*"
check = "checked"
text = [[{ type = "text", text = "fast" }]]

[[blocks.elements]]
type = "list_item"
marker = "*"
check = "unchecked"
text = [[{ type = "text", text = "cheap" }]]
"#,
    );

    let Block::List(List::Labeled(list)) = &assembled.document.elements[0] else {
        panic!("expected a labeled list");
    };
    assert_eq!(list.items[0].term, vec![text("CPU")]);
    let [Block::List(checklist)] = list.items[0].elements.as_slice() else {
        panic!("expected an attached checklist");
    };
    assert_eq!(checklist.attributes().get("role"), Some("checklist"));
    assert_eq!(checklist.len(), 2);
}
