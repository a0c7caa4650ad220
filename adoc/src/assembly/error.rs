use std::fmt;

use codespan_reporting::diagnostic::{Diagnostic, Severity};
use thiserror::Error;

use crate::document::ListKind;

/// The sub-passes of assembly, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Attributes,
    Substitution,
    Lists,
    Sections,
    References,
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Pass::Attributes => "attribute table",
            Pass::Substitution => "attribute substitution",
            Pass::Lists => "list assembly",
            Pass::Sections => "section assembly",
            Pass::References => "reference collection",
        };
        f.write_str(name)
    }
}

/// A list or section run that violates a structural invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("list run has no items")]
    EmptyListRun,
    #[error("item {index} has a {found} marker in a run of {expected} items")]
    ListKindMismatch {
        index: usize,
        expected: ListKind,
        found: ListKind,
    },
    #[error("item {index} jumps from level {from} to level {to} with no open parent level")]
    IllegalLevelJump { index: usize, from: usize, to: usize },
    #[error("nested list at level {level} has no parent item")]
    OrphanNestedList { level: usize },
    #[error("labeled list item {index} has no term")]
    MissingTerm { index: usize },
    #[error("section level {level} is out of range 0..=5")]
    SectionLevelOutOfRange { level: u8 },
    #[error("section level jumps from {parent} to {level}")]
    SectionLevelSkip { parent: u8, level: u8 },
    #[error("top-level section at level {level} follows top-level sections at level {first}")]
    RootLevelMismatch { first: u8, level: u8 },
    #[error("section at level {level} is not allowed inside {container}")]
    NestedSection { level: u8, container: &'static str },
}

/// A fatal assembly failure. No partial document is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{pass} failed at {element}: {source}")]
pub struct AssemblyError {
    pub pass: Pass,
    /// Human readable description of the failing element.
    pub element: String,
    #[source]
    pub source: StructuralError,
}

impl AssemblyError {
    pub fn new(pass: Pass, element: impl Into<String>, source: StructuralError) -> Self {
        AssemblyError {
            pass,
            element: element.into(),
            source,
        }
    }

    /// Convert to a codespan-reporting Diagnostic for display.
    pub fn to_diagnostic(&self) -> Diagnostic<usize> {
        Diagnostic::error()
            .with_message(self.to_string())
            .with_notes(vec![format!("assembly aborted during {}", self.pass)])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// Unknown attribute name, duplicate id or dangling cross reference.
    UnresolvedReference,
    /// An attribute value that does not parse; it is treated as absent.
    MalformedAttribute,
}

impl WarningKind {
    pub fn code(self) -> &'static str {
        match self {
            WarningKind::UnresolvedReference => "unresolved-reference",
            WarningKind::MalformedAttribute => "malformed-attribute",
        }
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A non-fatal problem found during assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyWarning {
    pub kind: WarningKind,
    pub pass: Pass,
    pub message: String,
    pub notes: Vec<String>,
}

impl AssemblyWarning {
    pub fn unresolved(pass: Pass, message: impl Into<String>) -> Self {
        AssemblyWarning::new(WarningKind::UnresolvedReference, pass, message)
    }

    pub fn malformed(pass: Pass, message: impl Into<String>) -> Self {
        AssemblyWarning::new(WarningKind::MalformedAttribute, pass, message)
    }

    fn new(kind: WarningKind, pass: Pass, message: impl Into<String>) -> Self {
        AssemblyWarning {
            kind,
            pass,
            message: message.into(),
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Convert to a codespan-reporting Diagnostic for display.
    pub fn to_diagnostic(&self) -> Diagnostic<usize> {
        Diagnostic::new(Severity::Warning)
            .with_code(self.kind.code())
            .with_message(&self.message)
            .with_notes(self.notes.clone())
    }
}

impl fmt::Display for AssemblyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Warnings collected across all passes, in the order they were found.
#[derive(Debug, Default)]
pub struct Warnings {
    items: Vec<AssemblyWarning>,
}

impl Warnings {
    pub fn new() -> Self {
        Warnings::default()
    }

    pub fn push(&mut self, warning: AssemblyWarning) {
        tracing::warn!(pass = %warning.pass, kind = %warning.kind, "{}", warning.message);
        self.items.push(warning);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AssemblyWarning> {
        self.items.iter()
    }

    pub fn into_vec(self) -> Vec<AssemblyWarning> {
        self.items
    }
}
