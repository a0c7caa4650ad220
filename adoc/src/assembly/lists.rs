//! Reconstruction of nested lists from flat runs of list items.
//!
//! The parser tags every item with the `(Style, Level)` suggested by its own
//! marker. Lexical levels are only hints: a deeper marker opens exactly one
//! new level, and a marker style already used further up the list snaps the
//! item back to that level.

use std::collections::HashMap;

use crate::document::{
    Attributes, Block, BulletStyle, CheckState, LabeledList, LabeledListItem, LabeledStyle, Line,
    List, ListItemPrefix, ListStyle, NumberingStyle, OrderedList, OrderedListItem, UnorderedList,
    UnorderedListItem,
};

use super::error::{AssemblyWarning, Pass, StructuralError, Warnings};

/// A list item with its own content assembled, not yet placed in a list.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingItem {
    pub prefix: ListItemPrefix,
    pub attributes: Attributes,
    pub term: Option<Line>,
    pub check: Option<CheckState>,
    pub text: Vec<Line>,
    pub elements: Vec<Block>,
}

impl PendingItem {
    pub fn new(prefix: ListItemPrefix, text: Vec<Line>) -> Self {
        PendingItem {
            prefix,
            attributes: Attributes::default(),
            term: None,
            check: None,
            text,
            elements: Vec::new(),
        }
    }
}

/// Build one nested list from a run of items of the same role.
pub fn assemble_list(
    items: Vec<PendingItem>,
    warnings: &mut Warnings,
) -> Result<List, StructuralError> {
    let Some(root_kind) = items.first().map(|item| item.prefix.style.kind()) else {
        return Err(StructuralError::EmptyListRun);
    };

    let mut levels = LevelStack::default();
    let mut style_levels: HashMap<ListStyle, usize> = HashMap::new();
    let mut previous = Previous::default();

    for (index, item) in items.into_iter().enumerate() {
        let style = item.prefix.style;
        let item_level = item.prefix.level;
        if style.kind() != root_kind {
            return Err(StructuralError::ListKindMismatch {
                index,
                expected: root_kind,
                found: style.kind(),
            });
        }

        let level = resolve_level(item.prefix, &previous, &mut style_levels);
        if level > previous.level + 1 {
            return Err(StructuralError::IllegalLevelJump {
                index,
                from: previous.level,
                to: level,
            });
        }

        while levels.depth() > level {
            levels.close_deepest(warnings)?;
        }
        if levels.depth() < level {
            levels.open();
        }
        levels.push(item);

        previous = Previous {
            lexical: usize::from(item_level),
            level,
            style: Some(style),
        };
    }

    while levels.depth() > 1 {
        levels.close_deepest(warnings)?;
    }
    levels.into_root(warnings)
}

/// The item placed just before the current one.
#[derive(Debug, Default)]
struct Previous {
    /// Level suggested by its marker.
    lexical: usize,
    /// Level it was placed at.
    level: usize,
    style: Option<ListStyle>,
}

/// Decide the level of the next item from the previous one.
///
/// A deeper marker opens exactly one new level below the previous item. A
/// marker style seen before returns to the level it was recorded at, and an
/// unseen style nests one level deeper.
fn resolve_level(
    prefix: ListItemPrefix,
    previous: &Previous,
    style_levels: &mut HashMap<ListStyle, usize>,
) -> usize {
    if usize::from(prefix.level) > previous.lexical {
        let level = previous.level + 1;
        style_levels.insert(prefix.style, level);
        level
    } else if previous.style != Some(prefix.style) {
        *style_levels
            .entry(prefix.style)
            .or_insert(previous.level + 1)
    } else {
        previous.level
    }
}

/// One item buffer per open level. Level 1 is at index 0.
#[derive(Default)]
struct LevelStack {
    buffers: Vec<Vec<PendingItem>>,
}

impl LevelStack {
    fn depth(&self) -> usize {
        self.buffers.len()
    }

    fn open(&mut self) {
        self.buffers.push(Vec::new());
    }

    fn push(&mut self, item: PendingItem) {
        if let Some(buffer) = self.buffers.last_mut() {
            buffer.push(item);
        }
    }

    /// Turn the deepest level into a list attached to the last item of the
    /// level above it.
    fn close_deepest(&mut self, warnings: &mut Warnings) -> Result<(), StructuralError> {
        let level = self.depth();
        let Some(buffer) = self.buffers.pop() else {
            return Ok(());
        };
        let list = build_list(buffer, warnings)?;
        let parent = self
            .buffers
            .last_mut()
            .and_then(|items| items.last_mut())
            .ok_or(StructuralError::OrphanNestedList { level })?;
        parent.elements.push(Block::List(list));
        Ok(())
    }

    fn into_root(mut self, warnings: &mut Warnings) -> Result<List, StructuralError> {
        match self.buffers.pop() {
            Some(buffer) => build_list(buffer, warnings),
            None => Err(StructuralError::EmptyListRun),
        }
    }
}

/// Build a flat list from the items of one level. Block attributes of the
/// first item belong to the list.
fn build_list(
    items: Vec<PendingItem>,
    warnings: &mut Warnings,
) -> Result<List, StructuralError> {
    let mut items = items.into_iter();
    let Some(mut first) = items.next() else {
        return Err(StructuralError::EmptyListRun);
    };
    let attributes = std::mem::take(&mut first.attributes);
    let style = first.prefix.style;
    let items: Vec<PendingItem> = std::iter::once(first).chain(items).collect();

    match style {
        ListStyle::Ordered(inferred) => Ok(List::Ordered(build_ordered(
            attributes, inferred, items, warnings,
        ))),
        ListStyle::Unordered(bullet) => Ok(List::Unordered(build_unordered(
            attributes, bullet, items,
        ))),
        ListStyle::Labeled(separator) => {
            build_labeled(attributes, separator, items).map(List::Labeled)
        }
    }
}

fn build_ordered(
    attributes: Attributes,
    inferred: NumberingStyle,
    items: Vec<PendingItem>,
    warnings: &mut Warnings,
) -> OrderedList {
    let style = match attributes.get("style") {
        Some(name) => name.parse::<NumberingStyle>().unwrap_or_else(|reason| {
            warnings.push(
                AssemblyWarning::malformed(Pass::Lists, format!("ignoring list style: {}", reason))
                    .with_note(format!("using the marker style `{}`", inferred)),
            );
            inferred
        }),
        None => inferred,
    };
    let start = match attributes.get("start") {
        Some(raw) => raw.trim().parse::<u32>().unwrap_or_else(|_| {
            warnings.push(AssemblyWarning::malformed(
                Pass::Lists,
                format!("list start `{}` is not a non-negative integer", raw),
            ));
            1
        }),
        None => 1,
    };

    let items = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| OrderedListItem {
            attributes: item.attributes,
            number: start.saturating_add(u32::try_from(index).unwrap_or(u32::MAX)),
            text: item.text,
            elements: item.elements,
        })
        .collect();

    OrderedList {
        attributes,
        style,
        start,
        items,
    }
}

fn build_unordered(
    mut attributes: Attributes,
    style: BulletStyle,
    items: Vec<PendingItem>,
) -> UnorderedList {
    if items.iter().any(|item| item.check.is_some()) {
        attributes.add_role("checklist");
    }
    let items = items
        .into_iter()
        .map(|item| UnorderedListItem {
            attributes: item.attributes,
            check: item.check,
            text: item.text,
            elements: item.elements,
        })
        .collect();
    UnorderedList {
        attributes,
        style,
        items,
    }
}

fn build_labeled(
    attributes: Attributes,
    style: LabeledStyle,
    items: Vec<PendingItem>,
) -> Result<LabeledList, StructuralError> {
    let items = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let term = item.term.ok_or(StructuralError::MissingTerm { index })?;
            Ok(LabeledListItem {
                attributes: item.attributes,
                term,
                text: item.text,
                elements: item.elements,
            })
        })
        .collect::<Result<_, StructuralError>>()?;
    Ok(LabeledList {
        attributes,
        style,
        items,
    })
}
