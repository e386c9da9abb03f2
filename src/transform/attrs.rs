//! Provenance attribute names.

pub const SYNTAX: &str = "data-md-syntax";
pub const WRAPPED: &str = "data-md-wrapped";
pub const INLINE: &str = "data-md-inline";
pub const CONTAINER: &str = "data-md-container";
pub const CODE: &str = "data-md-code";
pub const PREFORMATTED: &str = "data-md-preformatted";
pub const LIST: &str = "data-md-list";
pub const BLOCKQUOTE: &str = "data-md-blockquote";
pub const HEADER: &str = "data-md-header";
pub const PARAGRAPH: &str = "data-md-paragraph";
/// Presence flag on anchors; holds the target string on link directives.
pub const LINK: &str = "data-md-link";
pub const LIST_ITEM: &str = "data-md-list-item";
pub const QUOTE_ITEM: &str = "data-md-quote-item";
pub const PRE_ITEM: &str = "data-md-pre-item";

/// Synthetic identity key.
pub const KEY: &str = "data-key";

/// Marker put on nodes the rendering layer synthesizes.
pub const DEFAULT_ARTIFACT_MARKER: &str = "data-editor-artifact";

pub const FENCE: &str = "```";
/// Stand-in body for an emptied fenced block.
pub const NBSP: &str = "\u{a0}";
