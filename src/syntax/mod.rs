//! Markdown syntax tree.
//!
//! This module handles:
//! - Parsing markdown with comrak into an owned, mdast-like tree
//! - Recognizing `:name[...]{...}` directives in their text, leaf and
//!   container shapes
//! - Keeping backslash-escaped directive punctuation literal

mod directive;
mod escape;
mod parser;
mod types;

pub use directive::{
    extract_block_directives, extract_text_directives, opens_directive, parse_attributes,
};
pub use parser::parse;
pub use types::{Directive, DirectiveShape, SyntaxNode};
