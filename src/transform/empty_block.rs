//! Empty fenced block repair.
//!
//! When an empty fenced block passes through the browser-side conversion,
//! its closing fence ends up as the text of the inner `code` element. That
//! text is replaced with a single non-breaking space, which also gives the
//! caret somewhere to sit.

use crate::element::{Node, Root, walk_elements_mut};

use super::attrs::{FENCE, NBSP};

/// Replace swallowed closing fences in `pre > code`. Returns the number of
/// text nodes repaired.
pub fn repair_empty_blocks(root: &mut Root) -> usize {
    let mut repaired = 0;
    walk_elements_mut(root, &mut |el, parent, _| {
        if el.tag_name != "code" || parent != Some("pre") {
            return;
        }
        for child in &mut el.children {
            if let Node::Text(text) = child
                && text.value.trim() == FENCE
            {
                NBSP.clone_into(&mut text.value);
                repaired += 1;
            }
        }
    });
    if repaired > 0 {
        tracing::debug!(repaired, "repaired empty fenced blocks");
    }
    repaired
}
