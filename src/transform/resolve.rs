//! Directive resolution (load direction only).
//!
//! `:Link[...]` becomes an anchor element carrying its target in
//! `data-md-link`. Every other directive is restored to literal text. The
//! restoration keeps attribute keys but drops their values.

use crate::element::Properties;
use crate::syntax::{Directive, DirectiveShape, SyntaxNode};

use super::attrs;

/// Directive names this editor understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectiveKind {
    Link,
    Unrecognized(String),
}

impl DirectiveKind {
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("link") {
            Self::Link
        } else {
            Self::Unrecognized(name.to_string())
        }
    }
}

/// Resolve every directive in a syntax tree, in place.
pub fn resolve_directives(node: &mut SyntaxNode) {
    let Some(children) = node.children_mut() else {
        return;
    };
    let taken = std::mem::take(children);
    let mut resolved = Vec::with_capacity(taken.len());
    for child in taken {
        match child {
            SyntaxNode::Directive(directive) => resolve_one(directive, &mut resolved),
            mut other => {
                resolve_directives(&mut other);
                resolved.push(other);
            }
        }
    }
    *children = resolved;
}

fn resolve_one(directive: Directive, out: &mut Vec<SyntaxNode>) {
    let kind = DirectiveKind::from_name(&directive.name);
    match (kind, directive.shape) {
        (DirectiveKind::Link, DirectiveShape::Text) if !directive.children.is_empty() => {
            out.push(link_element(directive));
        }
        (kind, _) => {
            tracing::debug!(name = %directive.name, ?kind, "restoring directive as text");
            restore(directive, out);
        }
    }
}

/// The link target: explicit `{target="…"}` or a sole bare key `{home}`,
/// otherwise the first child's text.
pub fn link_target(directive: &Directive) -> String {
    if let Some(target) = directive.attributes.get("target") {
        return target.clone();
    }
    let mut bare = directive.attributes.iter().filter(|(_, v)| v.is_empty());
    if directive.attributes.len() == 1
        && let Some((key, _)) = bare.next()
    {
        return key.clone();
    }
    directive
        .children
        .first()
        .map(SyntaxNode::text_value)
        .unwrap_or_default()
}

fn link_element(mut directive: Directive) -> SyntaxNode {
    let target = link_target(&directive);
    let mut properties = Properties::new();
    properties.insert(attrs::LINK.to_string(), target.into());

    let mut children = std::mem::take(&mut directive.children);
    for child in &mut children {
        resolve_directives(child);
    }
    SyntaxNode::Element {
        tag_name: "a".to_string(),
        properties,
        children,
    }
}

/// Literal form `<colons>name[c1,c2]{k1,k2}` of a directive.
pub fn restoration_text(directive: &Directive) -> String {
    let mut out = String::from(directive.shape.marker());
    out.push_str(&directive.name);

    let label: Vec<String> = match &directive.label {
        Some(label) => vec![label.clone()],
        None if directive.shape == DirectiveShape::Container => Vec::new(),
        None => directive.children.iter().map(SyntaxNode::text_value).collect(),
    };
    if !label.is_empty() {
        out.push('[');
        out.push_str(&label.join(","));
        out.push(']');
    }
    if !directive.attributes.is_empty() {
        let keys: Vec<&str> = directive.attributes.keys().map(String::as_str).collect();
        out.push('{');
        out.push_str(&keys.join(","));
        out.push('}');
    }
    out
}

fn restore(directive: Directive, out: &mut Vec<SyntaxNode>) {
    let text = restoration_text(&directive);
    match directive.shape {
        DirectiveShape::Text => out.push(SyntaxNode::Text(text)),
        DirectiveShape::Leaf => out.push(SyntaxNode::Paragraph(vec![SyntaxNode::Text(text)])),
        DirectiveShape::Container => {
            out.push(SyntaxNode::Paragraph(vec![SyntaxNode::Text(text)]));
            for mut child in directive.children {
                resolve_directives(&mut child);
                out.push(child);
            }
            out.push(SyntaxNode::Paragraph(vec![SyntaxNode::Text(
                DirectiveShape::Container.marker().to_string(),
            )]));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::PropertyValue;

    fn text(s: &str) -> SyntaxNode {
        SyntaxNode::Text(s.to_string())
    }

    fn resolve_inline(directive: Directive) -> Vec<SyntaxNode> {
        let mut paragraph = SyntaxNode::Paragraph(vec![SyntaxNode::Directive(directive)]);
        resolve_directives(&mut paragraph);
        match paragraph {
            SyntaxNode::Paragraph(children) => children,
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_link_directive_becomes_anchor() {
        let mut directive = Directive::new(DirectiveShape::Text, "Link");
        directive.children.push(text("Home"));
        let nodes = resolve_inline(directive);
        assert_eq!(
            nodes,
            vec![SyntaxNode::Element {
                tag_name: "a".to_string(),
                properties: [(attrs::LINK.to_string(), PropertyValue::from("Home"))]
                    .into_iter()
                    .collect(),
                children: vec![text("Home")],
            }]
        );
    }

    #[test]
    fn test_link_target_from_bare_key() {
        let mut directive = Directive::new(DirectiveShape::Text, "link");
        directive.children.push(text("Home Page"));
        directive.attributes.insert("home".to_string(), String::new());
        assert_eq!(link_target(&directive), "home");
    }

    #[test]
    fn test_link_target_from_target_attribute() {
        let mut directive = Directive::new(DirectiveShape::Text, "Link");
        directive.children.push(text("Docs"));
        directive
            .attributes
            .insert("target".to_string(), "User Guide".to_string());
        assert_eq!(link_target(&directive), "User Guide");
    }

    #[test]
    fn test_link_target_uses_first_child_text_for_formatted_label() {
        let mut directive = Directive::new(DirectiveShape::Text, "Link");
        directive
            .children
            .push(SyntaxNode::Strong(vec![text("Home")]));
        directive.children.push(text(" page"));
        assert_eq!(link_target(&directive), "Home");
    }

    #[test]
    fn test_unknown_directive_restores_keys_only() {
        let mut directive = Directive::new(DirectiveShape::Text, "foo");
        directive
            .attributes
            .insert("bar".to_string(), "1".to_string());
        assert_eq!(resolve_inline(directive), vec![text(":foo{bar}")]);
    }

    #[test]
    fn test_unknown_directive_restores_children_and_keys() {
        let mut directive = Directive::new(DirectiveShape::Text, "abbr");
        directive.children.push(text("HTML"));
        directive
            .attributes
            .insert("title".to_string(), "HyperText".to_string());
        directive.attributes.insert("lang".to_string(), "en".to_string());
        assert_eq!(resolve_inline(directive), vec![text(":abbr[HTML]{lang,title}")]);
    }

    #[test]
    fn test_link_without_children_falls_back() {
        let mut directive = Directive::new(DirectiveShape::Text, "Link");
        directive.attributes.insert("home".to_string(), String::new());
        assert_eq!(resolve_inline(directive), vec![text(":Link{home}")]);
    }

    #[test]
    fn test_leaf_link_is_not_recognized() {
        let mut directive = Directive::new(DirectiveShape::Leaf, "Link");
        directive.children.push(text("Home"));
        let mut root = SyntaxNode::Root(vec![SyntaxNode::Directive(directive)]);
        resolve_directives(&mut root);
        assert_eq!(
            root,
            SyntaxNode::Root(vec![SyntaxNode::Paragraph(vec![text("::Link[Home]")])])
        );
    }

    #[test]
    fn test_container_restores_fences_around_blocks() {
        let mut directive = Directive::new(DirectiveShape::Container, "note");
        directive.label = Some("Heads up".to_string());
        directive
            .children
            .push(SyntaxNode::Paragraph(vec![text("Inside")]));
        let mut root = SyntaxNode::Root(vec![SyntaxNode::Directive(directive)]);
        resolve_directives(&mut root);
        assert_eq!(
            root,
            SyntaxNode::Root(vec![
                SyntaxNode::Paragraph(vec![text(":::note[Heads up]")]),
                SyntaxNode::Paragraph(vec![text("Inside")]),
                SyntaxNode::Paragraph(vec![text(":::")]),
            ])
        );
    }

    #[test]
    fn test_nested_link_inside_unknown_container_is_resolved() {
        let mut link = Directive::new(DirectiveShape::Text, "Link");
        link.children.push(text("Home"));
        let mut container = Directive::new(DirectiveShape::Container, "note");
        container
            .children
            .push(SyntaxNode::Paragraph(vec![SyntaxNode::Directive(link)]));
        let mut root = SyntaxNode::Root(vec![SyntaxNode::Directive(container)]);
        resolve_directives(&mut root);
        let SyntaxNode::Root(blocks) = root else {
            panic!("expected root");
        };
        assert!(matches!(
            &blocks[1],
            SyntaxNode::Paragraph(children) if matches!(children[0], SyntaxNode::Element { .. })
        ));
    }

    #[test]
    fn test_directive_kind_is_case_insensitive() {
        assert_eq!(DirectiveKind::from_name("Link"), DirectiveKind::Link);
        assert_eq!(DirectiveKind::from_name("LINK"), DirectiveKind::Link);
        assert_eq!(
            DirectiveKind::from_name("links"),
            DirectiveKind::Unrecognized("links".to_string())
        );
    }
}
