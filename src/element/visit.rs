//! Pre-order traversal over element trees.
//!
//! Visitors receive `(element, parent tag, index in parent)`. The parent tag
//! is `None` for top-level nodes. Shape-changing passes do not go through
//! these walkers; they collect removals per parent instead (see
//! [`crate::transform::cleanup`]).

use super::{Element, Node, Root};

/// Visit every element in document order.
pub fn walk_elements<F>(root: &Root, f: &mut F)
where
    F: FnMut(&Element, Option<&str>, usize),
{
    walk_children(&root.children, None, f);
}

fn walk_children<F>(children: &[Node], parent: Option<&str>, f: &mut F)
where
    F: FnMut(&Element, Option<&str>, usize),
{
    for (index, child) in children.iter().enumerate() {
        if let Node::Element(el) = child {
            f(el, parent, index);
            walk_children(&el.children, Some(&el.tag_name), f);
        }
    }
}

/// Visit every element in document order, allowing in-place mutation of the
/// element's properties. Children are visited after their parent's callback
/// returns, so a callback may also rewrite its own child list.
pub fn walk_elements_mut<F>(root: &mut Root, f: &mut F)
where
    F: FnMut(&mut Element, Option<&str>, usize),
{
    walk_children_mut(&mut root.children, None, f);
}

fn walk_children_mut<F>(children: &mut [Node], parent: Option<&str>, f: &mut F)
where
    F: FnMut(&mut Element, Option<&str>, usize),
{
    for (index, child) in children.iter_mut().enumerate() {
        if let Node::Element(el) = child {
            f(el, parent, index);
            let Element {
                tag_name, children, ..
            } = el;
            walk_children_mut(children, Some(tag_name.as_str()), f);
        }
    }
}
