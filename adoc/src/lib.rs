//! Assembly of parsed draft documents into nested document trees.
//!
//! A parser produces a [`DraftDocument`]: a flat stream of blocks where
//! sections and list items only carry levels. [`Assembler`] turns it into a
//! [`Document`] with nested sections and lists, resolved attribute
//! placeholders, a preamble and table of contents where requested, and an
//! index of every element id.

pub mod assembly;
pub mod attributes;
pub mod document;
pub mod draft;
pub mod inline;

pub use assembly::{
    Assembled, Assembler, AssemblyError, AssemblyWarning, Pass, StructuralError, WarningKind,
};
pub use attributes::{AttributeTable, Position};
pub use document::{Block, Document};
pub use draft::DraftDocument;
pub use inline::{InlineParser, PlainText, ValueParser};

/// Assemble `draft` with the default inline parser.
pub fn assemble(draft: DraftDocument) -> Result<Assembled, AssemblyError> {
    Assembler::new(draft).assemble()
}
