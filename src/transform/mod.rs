//! Passes between the syntax tree, the element tree and Markdown.
//!
//! [`Pipeline`] chains them in the two directions the editor needs:
//!
//! - **load**: parse, resolve directives, lower, repair empty fences, assign
//!   identity keys, stamp provenance attributes;
//! - **extract**: clean editor artifacts, repair empty fences, serialize.

pub mod attrs;
mod annotate;
mod cleanup;
mod empty_block;
mod keys;
mod lower;
mod resolve;
mod to_markdown;

pub use annotate::{Tag, annotate_syntax};
pub use cleanup::clean_artifacts;
pub use empty_block::repair_empty_blocks;
pub use keys::{RandomTokens, SequentialTokens, TokenSource, assign_keys};
pub use lower::to_element_tree;
pub use resolve::{DirectiveKind, link_target, resolve_directives, restoration_text};
pub use to_markdown::to_markdown;

use crate::element::{Node, Root};
use crate::syntax;

/// Load and extract with a fixed configuration.
pub struct Pipeline {
    artifact_marker: String,
    keys: bool,
    tokens: Box<dyn TokenSource>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("artifact_marker", &self.artifact_marker)
            .field("keys", &self.keys)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Random identity keys and the default artifact marker.
    pub fn new() -> Self {
        Self {
            artifact_marker: attrs::DEFAULT_ARTIFACT_MARKER.to_string(),
            keys: true,
            tokens: Box::new(RandomTokens),
        }
    }

    /// Attribute that marks editor-only elements for removal on extract.
    #[must_use]
    pub fn with_artifact_marker(mut self, marker: impl Into<String>) -> Self {
        self.artifact_marker = marker.into();
        self
    }

    /// Whether load assigns `data-key` attributes.
    #[must_use]
    pub const fn with_keys(mut self, enabled: bool) -> Self {
        self.keys = enabled;
        self
    }

    #[must_use]
    pub fn with_token_source(mut self, tokens: impl TokenSource + 'static) -> Self {
        self.tokens = Box::new(tokens);
        self
    }

    pub fn artifact_marker(&self) -> &str {
        &self.artifact_marker
    }

    /// Markdown to annotated element tree.
    pub fn load(&mut self, markdown: &str) -> Root {
        let mut tree = syntax::parse(markdown);
        resolve_directives(&mut tree);
        let mut root = to_element_tree(&tree);
        repair_empty_blocks(&mut root);
        if self.keys {
            assign_keys(&mut root, self.tokens.as_mut());
        }
        annotate_syntax(&mut root);
        tracing::debug!(
            bytes = markdown.len(),
            elements = root.element_count(),
            "loaded markdown"
        );
        root
    }

    /// Edited element tree back to Markdown. Cleanup and repair mutate the
    /// tree in place.
    pub fn extract(&self, root: &mut Root) -> String {
        let removed = clean_artifacts(root, &self.artifact_marker);
        let repaired = repair_empty_blocks(root);
        let markdown = to_markdown(root);
        tracing::debug!(removed, repaired, bytes = markdown.len(), "extracted markdown");
        markdown
    }
}

/// Copy of the tree with identity keys removed. Two loads of the same
/// Markdown produce equal outlines even though their keys differ.
pub fn outline(root: &Root) -> Root {
    fn strip(nodes: &[Node]) -> Vec<Node> {
        nodes
            .iter()
            .map(|node| match node {
                Node::Element(el) => {
                    let mut el = el.clone();
                    el.properties.remove(attrs::KEY);
                    el.children = strip(&el.children);
                    Node::Element(el)
                }
                Node::Text(_) => node.clone(),
            })
            .collect()
    }
    Root::new(strip(&root.children))
}

/// Whether `load(extract(load(markdown)))` matches `load(markdown)` in
/// everything but identity keys.
pub fn is_round_trip_stable(pipeline: &mut Pipeline, markdown: &str) -> bool {
    let first = pipeline.load(markdown);
    let mut edited = first.clone();
    let extracted = pipeline.extract(&mut edited);
    let second = pipeline.load(&extracted);
    let stable = outline(&first) == outline(&second);
    if !stable {
        tracing::debug!(%extracted, "round trip changed the tree");
    }
    stable
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;

    fn pipeline() -> Pipeline {
        Pipeline::new().with_token_source(SequentialTokens::new())
    }

    #[test]
    fn test_load_annotates_and_keys() {
        let root = pipeline().load("# Title");
        let h1 = root.children[0].as_element().unwrap();
        assert_eq!(h1.tag_name, "h1");
        assert_eq!(h1.str_property(attrs::HEADER), Some("#"));
        assert_eq!(h1.str_property(attrs::KEY), Some("h1-000000-0"));
    }

    #[test]
    fn test_keys_can_be_disabled() {
        let root = pipeline().with_keys(false).load("text");
        let p = root.children[0].as_element().unwrap();
        assert!(p.property(attrs::KEY).is_none());
        assert!(p.has_flag(attrs::PARAGRAPH));
    }

    #[test]
    fn test_load_resolves_link_directive() {
        let root = pipeline().load("See :Link[Home]");
        let p = root.children[0].as_element().unwrap();
        let a = p.children[1].as_element().unwrap();
        assert_eq!(a.tag_name, "a");
        assert_eq!(a.str_property(attrs::LINK), Some("Home"));
    }

    #[test]
    fn test_extract_uses_configured_marker() {
        let mut pipeline = pipeline().with_artifact_marker("data-caret");
        let mut root = pipeline.load("hello");
        if let Node::Element(p) = &mut root.children[0] {
            p.children
                .push(Element::new("span", vec![Node::text("|")]).with_property("data-caret", true).into());
        }
        assert_eq!(pipeline.extract(&mut root), "hello\n");
    }

    #[test]
    fn test_outline_ignores_keys_only() {
        let mut p = pipeline();
        let a = p.load("*x*");
        let b = p.load("*x*");
        assert_ne!(a, b);
        assert_eq!(outline(&a), outline(&b));
        assert_ne!(outline(&a), outline(&p.load("**x**")));
    }

    #[test]
    fn test_round_trip_stability() {
        let mut p = pipeline();
        assert!(is_round_trip_stable(&mut p, "# A\n\n- one\n- two\n\n> quote"));
        assert!(is_round_trip_stable(&mut p, ":Link[Home Page]{home}"));
    }
}
