//! Markdown provenance annotation.
//!
//! Each element is stamped, by tag, with the syntax that produced it so the
//! reverse converter can rebuild Markdown from an edited tree. Values depend
//! only on the element's tag and its parent's tag, which makes the pass
//! idempotent.

use crate::element::{Element, PropertyValue, Root, walk_elements_mut};

use super::attrs;

/// Tags with known Markdown provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    Heading(u8),
    Paragraph,
    Emphasis,
    Strong,
    Strikethrough,
    Code,
    Preformatted,
    BlockQuote,
    UnorderedList,
    OrderedList,
    ListItem,
    Anchor,
    Image,
    ThematicBreak,
    LineBreak,
    Unrecognized(String),
}

impl Tag {
    pub fn from_name(name: &str) -> Self {
        match name {
            "h1" => Self::Heading(1),
            "h2" => Self::Heading(2),
            "h3" => Self::Heading(3),
            "h4" => Self::Heading(4),
            "h5" => Self::Heading(5),
            "h6" => Self::Heading(6),
            "p" => Self::Paragraph,
            "em" => Self::Emphasis,
            "strong" => Self::Strong,
            "del" => Self::Strikethrough,
            "code" => Self::Code,
            "pre" => Self::Preformatted,
            "blockquote" => Self::BlockQuote,
            "ul" => Self::UnorderedList,
            "ol" => Self::OrderedList,
            "li" => Self::ListItem,
            "a" => Self::Anchor,
            "img" => Self::Image,
            "hr" => Self::ThematicBreak,
            "br" => Self::LineBreak,
            other => Self::Unrecognized(other.to_string()),
        }
    }
}

fn set(el: &mut Element, key: &str, value: impl Into<PropertyValue>) {
    el.properties.insert(key.to_string(), value.into());
}

fn set_wrapped_inline(el: &mut Element, syntax: &str) {
    set(el, attrs::SYNTAX, syntax);
    set(el, attrs::WRAPPED, true);
    set(el, attrs::INLINE, true);
}

/// Stamp the attributes owned by the element's own tag.
fn stamp_own(el: &mut Element, parent: Option<&Tag>) {
    match Tag::from_name(&el.tag_name) {
        Tag::Heading(level) => {
            let prefix = "#".repeat(usize::from(level));
            set(el, attrs::SYNTAX, prefix.as_str());
            set(el, attrs::HEADER, prefix);
        }
        Tag::Paragraph => set(el, attrs::PARAGRAPH, true),
        Tag::Emphasis => set_wrapped_inline(el, "*"),
        Tag::Strong => set_wrapped_inline(el, "**"),
        Tag::Strikethrough => set_wrapped_inline(el, "~~"),
        Tag::Code => {
            set_wrapped_inline(el, "`");
            set(el, attrs::CODE, true);
        }
        Tag::Preformatted => {
            set(el, attrs::SYNTAX, attrs::FENCE);
            set(el, attrs::PREFORMATTED, true);
            set(el, attrs::CONTAINER, true);
        }
        Tag::BlockQuote => {
            set(el, attrs::SYNTAX, ">");
            set(el, attrs::BLOCKQUOTE, true);
            set(el, attrs::CONTAINER, true);
        }
        Tag::UnorderedList => {
            set(el, attrs::SYNTAX, "-");
            set(el, attrs::LIST, true);
            set(el, attrs::CONTAINER, true);
        }
        Tag::OrderedList => {
            set(el, attrs::SYNTAX, "1.");
            set(el, attrs::LIST, true);
            set(el, attrs::CONTAINER, true);
        }
        Tag::ListItem => {
            let marker = if parent == Some(&Tag::OrderedList) { "1." } else { "-" };
            set(el, attrs::SYNTAX, marker);
        }
        Tag::Anchor => {
            set(el, attrs::INLINE, true);
            // A link directive already stores its target here.
            if !el.properties.contains_key(attrs::LINK) {
                set(el, attrs::LINK, true);
            }
        }
        Tag::Image => {
            set(el, attrs::SYNTAX, "!");
            set(el, attrs::INLINE, true);
        }
        Tag::ThematicBreak => set(el, attrs::SYNTAX, "---"),
        Tag::LineBreak => set(el, attrs::INLINE, true),
        Tag::Unrecognized(_) => {}
    }
}

/// Stamp the relational flags derived from the parent's tag.
fn stamp_relational(el: &mut Element, parent: &Tag) {
    match parent {
        Tag::UnorderedList | Tag::OrderedList => set(el, attrs::LIST_ITEM, true),
        Tag::BlockQuote => set(el, attrs::QUOTE_ITEM, true),
        Tag::Preformatted => {
            set(el, attrs::PRE_ITEM, true);
            // Code directly inside `pre` is a fenced block, not inline code.
            set(el, attrs::SYNTAX, attrs::FENCE);
        }
        _ => {}
    }
}

/// Stamp provenance attributes on every element of the tree.
pub fn annotate_syntax(root: &mut Root) {
    let mut annotated = 0usize;
    walk_elements_mut(root, &mut |el, parent, _index| {
        let parent = parent.map(Tag::from_name);
        stamp_own(el, parent.as_ref());
        if let Some(parent) = &parent {
            stamp_relational(el, parent);
        }
        annotated += 1;
    });
    tracing::trace!(annotated, "provenance attributes stamped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Node;

    fn annotated(el: Element) -> Element {
        let mut root = Root::new(vec![el.into()]);
        annotate_syntax(&mut root);
        match root.children.remove(0) {
            Node::Element(el) => el,
            Node::Text(_) => unreachable!(),
        }
    }

    fn child(el: &Element, index: usize) -> &Element {
        el.children[index].as_element().expect("element child")
    }

    #[test]
    fn test_heading_prefix() {
        let h = annotated(Element::new("h3", vec![Node::text("T")]));
        assert_eq!(h.str_property(attrs::HEADER), Some("###"));
        assert_eq!(h.str_property(attrs::SYNTAX), Some("###"));
        assert!(!h.has_flag(attrs::WRAPPED));
    }

    #[test]
    fn test_wrapped_inline_tags() {
        for (tag, syntax) in [("em", "*"), ("strong", "**"), ("del", "~~"), ("code", "`")] {
            let el = annotated(Element::new(tag, vec![Node::text("x")]));
            assert_eq!(el.str_property(attrs::SYNTAX), Some(syntax), "{tag}");
            assert!(el.has_flag(attrs::WRAPPED), "{tag}");
            assert!(el.has_flag(attrs::INLINE), "{tag}");
        }
        let code = annotated(Element::new("code", Vec::new()));
        assert!(code.has_flag(attrs::CODE));
    }

    #[test]
    fn test_code_inside_pre_is_a_fence() {
        let pre = annotated(Element::new(
            "pre",
            vec![Element::new("code", vec![Node::text("x\n")]).into()],
        ));
        assert!(pre.has_flag(attrs::PREFORMATTED));
        assert!(pre.has_flag(attrs::CONTAINER));
        let code = child(&pre, 0);
        assert!(code.has_flag(attrs::PRE_ITEM));
        assert_eq!(code.str_property(attrs::SYNTAX), Some("```"));
    }

    #[test]
    fn test_any_child_of_pre_gets_fence_syntax() {
        let pre = annotated(Element::new(
            "pre",
            vec![Element::new("span", vec![Node::text("x")]).into()],
        ));
        let span = child(&pre, 0);
        assert_eq!(span.str_property(attrs::SYNTAX), Some("```"));
        assert!(span.has_flag(attrs::PRE_ITEM));
    }

    #[test]
    fn test_relational_flags() {
        let ul = annotated(Element::new(
            "ul",
            vec![Element::new("li", vec![Node::text("a")]).into()],
        ));
        assert!(child(&ul, 0).has_flag(attrs::LIST_ITEM));
        assert_eq!(child(&ul, 0).str_property(attrs::SYNTAX), Some("-"));

        let ol = annotated(Element::new(
            "ol",
            vec![Element::new("li", vec![Node::text("a")]).into()],
        ));
        assert_eq!(child(&ol, 0).str_property(attrs::SYNTAX), Some("1."));

        let quote = annotated(Element::new(
            "blockquote",
            vec![Element::new("p", vec![Node::text("q")]).into()],
        ));
        let p = child(&quote, 0);
        assert!(p.has_flag(attrs::QUOTE_ITEM));
        assert!(p.has_flag(attrs::PARAGRAPH));
        assert!(!p.has_flag(attrs::LIST_ITEM));
    }

    #[test]
    fn test_anchor_keeps_directive_target() {
        let link = annotated(Element::new("a", vec![Node::text("Home")]).with_property(attrs::LINK, "home"));
        assert_eq!(link.str_property(attrs::LINK), Some("home"));
        assert!(link.has_flag(attrs::INLINE));

        let plain = annotated(Element::new("a", vec![Node::text("x")]).with_property("href", "/x"));
        assert_eq!(plain.property(attrs::LINK), Some(&PropertyValue::Bool(true)));
    }

    #[test]
    fn test_unknown_tag_is_untouched() {
        let el = Element::new("span", vec![Node::text("x")]).with_property("class", "c");
        let out = annotated(el.clone());
        assert_eq!(out, el);
    }

    #[test]
    fn test_wrapped_always_has_syntax() {
        let mut root = Root::new(vec![
            Element::new(
                "p",
                vec![
                    Element::new("em", Vec::new()).into(),
                    Element::new("strong", Vec::new()).into(),
                    Element::new("code", Vec::new()).into(),
                ],
            )
            .into(),
            Element::new("pre", vec![Element::new("code", Vec::new()).into()]).into(),
        ]);
        annotate_syntax(&mut root);
        crate::element::walk_elements(&root, &mut |el, _, _| {
            if el.has_flag(attrs::WRAPPED) {
                assert!(el.str_property(attrs::SYNTAX).is_some_and(|s| !s.is_empty()));
            }
        });
    }

    #[test]
    fn test_second_run_is_a_no_op() {
        let mut root = Root::new(vec![
            Element::new("h1", vec![Node::text("T")]).into(),
            Element::new(
                "blockquote",
                vec![
                    Element::new(
                        "ul",
                        vec![Element::new("li", vec![Element::new("code", Vec::new()).into()]).into()],
                    )
                    .into(),
                ],
            )
            .into(),
            Element::new("pre", vec![Element::new("code", vec![Node::text("x")]).into()]).into(),
        ]);
        annotate_syntax(&mut root);
        let once = root.to_json(false).unwrap();
        annotate_syntax(&mut root);
        assert_eq!(root.to_json(false).unwrap(), once);
    }
}
