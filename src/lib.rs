//! Parser for the stage-play markup.
//!
//! A play is a text file of titles (`#`, `##`, `###`), metadata lines
//! (`key: value`), stage directions (`> ...`), dialogue (`@handle: ...`) and
//! function calls (`/introduce`, `/include`). [`parse`] turns one file and
//! everything it includes into a [`Document`] tree.
//!
//! In strict mode the first Error-level condition aborts the parse with a
//! [`ParseError`]. In lint mode every condition is recorded in
//! [`Document::violations`] and parsing runs to the end.

mod ast;
mod engine;
mod error;
mod functions;
mod include;
mod inline;
mod parser;
mod patterns;
mod template;
mod types;

#[cfg(feature = "python")]
mod python;

pub use engine::{Engine, ParseOptions};
pub use error::ParseError;
pub use template::{PageLayout, Template};
pub use types::{
    Character, Context, Document, Metadata, Node, NodeKind, Severity, Violation, ViolationKind,
};

use std::path::Path;

/// Parses the play at `path` with a fresh engine.
pub fn parse(path: impl AsRef<Path>, lint: bool) -> Result<Document, ParseError> {
    Engine::with_options(ParseOptions { lint }).parse_file(path)
}
