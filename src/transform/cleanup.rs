//! Editor artifact cleanup.
//!
//! Removes nodes the editing surface produced on its own: elements flagged
//! with the artifact marker, and line breaks sharing their parent with other
//! content. A line break that is its parent's only child is a deliberate
//! blank line and stays.

use crate::element::{Node, Root};

/// Remove editor artifacts from the tree. Returns the number of nodes removed.
pub fn clean_artifacts(root: &mut Root, marker: &str) -> usize {
    let removed = clean_children(&mut root.children, marker);
    if removed > 0 {
        tracing::debug!(removed, marker, "removed editor artifacts");
    }
    removed
}

fn is_line_break(node: &Node) -> bool {
    matches!(node, Node::Element(el) if el.tag_name == "br")
}

fn clean_children(children: &mut Vec<Node>, marker: &str) -> usize {
    let before = children.len();

    // Marker removal first, so a break left alone by it counts as sole child.
    children.retain(|node| match node {
        Node::Element(el) => !el.properties.contains_key(marker),
        Node::Text(_) => true,
    });

    if children.len() > 1 {
        children.retain(|node| !is_line_break(node));
    }

    let mut removed = before - children.len();
    for child in children.iter_mut() {
        if let Node::Element(el) = child {
            removed += clean_children(&mut el.children, marker);
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;
    use crate::transform::attrs::DEFAULT_ARTIFACT_MARKER;

    fn br() -> Node {
        Element::new("br", Vec::new()).into()
    }

    fn p(children: Vec<Node>) -> Node {
        Element::new("p", children).into()
    }

    fn children_of(node: &Node) -> &[Node] {
        &node.as_element().expect("element").children
    }

    #[test]
    fn test_sole_line_break_is_preserved() {
        let mut root = Root::new(vec![p(vec![br()])]);
        assert_eq!(clean_artifacts(&mut root, DEFAULT_ARTIFACT_MARKER), 0);
        assert_eq!(children_of(&root.children[0]), &[br()]);
    }

    #[test]
    fn test_line_break_beside_text_is_removed() {
        let mut root = Root::new(vec![p(vec![
            Node::text("a"),
            br(),
            Node::text("b"),
        ])]);
        assert_eq!(clean_artifacts(&mut root, DEFAULT_ARTIFACT_MARKER), 1);
        assert_eq!(
            children_of(&root.children[0]),
            &[Node::text("a"), Node::text("b")]
        );
    }

    #[test]
    fn test_marked_elements_are_removed_at_any_depth() {
        let marked = Element::new("span", vec![Node::text("caret")])
            .with_property(DEFAULT_ARTIFACT_MARKER, true);
        let mut root = Root::new(vec![
            marked.clone().into(),
            Element::new("blockquote", vec![p(vec![Node::text("q"), marked.into()])]).into(),
        ]);
        assert_eq!(clean_artifacts(&mut root, DEFAULT_ARTIFACT_MARKER), 2);
        assert_eq!(root.children.len(), 1);
        let quote = &root.children[0];
        assert_eq!(children_of(&children_of(quote)[0]), &[Node::text("q")]);
    }

    #[test]
    fn test_break_left_alone_after_marker_removal_survives() {
        let marked = Element::new("span", Vec::new()).with_property("data-ui", "");
        let mut root = Root::new(vec![p(vec![marked.into(), br()])]);
        assert_eq!(clean_artifacts(&mut root, "data-ui"), 1);
        assert_eq!(children_of(&root.children[0]), &[br()]);
    }

    #[test]
    fn test_removing_last_child_leaves_empty_parent() {
        let marked = Element::new("span", Vec::new()).with_property(DEFAULT_ARTIFACT_MARKER, true);
        let mut root = Root::new(vec![p(vec![marked.into()])]);
        assert_eq!(clean_artifacts(&mut root, DEFAULT_ARTIFACT_MARKER), 1);
        assert!(children_of(&root.children[0]).is_empty());
    }

    #[test]
    fn test_clean_tree_is_untouched() {
        let mut root = Root::new(vec![p(vec![Node::text("plain")])]);
        let before = root.clone();
        assert_eq!(clean_artifacts(&mut root, DEFAULT_ARTIFACT_MARKER), 0);
        assert_eq!(root, before);
    }

    #[test]
    fn test_consecutive_breaks_with_text_all_go() {
        let mut root = Root::new(vec![p(vec![br(), br(), Node::text("x")])]);
        assert_eq!(clean_artifacts(&mut root, DEFAULT_ARTIFACT_MARKER), 2);
        assert_eq!(children_of(&root.children[0]), &[Node::text("x")]);
    }
}
