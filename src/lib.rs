// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. syntax::SyntaxNode)
    clippy::module_name_repetitions
)]

//! # Marksync
//!
//! Keeps a Markdown source and the element tree of a rich-text editor in
//! sync.
//!
//! - **Load** turns Markdown into an annotated element tree. Every element
//!   carries `data-md-*` provenance attributes naming the syntax it came
//!   from, plus a `data-key` identity key for the editing surface.
//! - **Extract** turns an edited tree back into Markdown, dropping editor
//!   artifacts first.
//!
//! Besides CommonMark basics, the parser understands `:name[label]{attrs}`
//! directives. `:Link[target]` becomes an internal link; any other directive
//! is restored to literal text.
//!
//! ## Modules
//!
//! - [`syntax`]: Markdown and directive parsing
//! - [`element`]: The element tree and its JSON form
//! - [`transform`]: Load/extract passes and the [`transform::Pipeline`]
//! - [`config`]: Saved command-line defaults
//! - [`error`]: Error types

pub mod config;
pub mod element;
pub mod error;
pub mod syntax;
pub mod transform;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::element::{Element, Node, PropertyValue, Root};
    pub use crate::error::TreeError;
    pub use crate::transform::{Pipeline, SequentialTokens, TokenSource};
}
