//! Syntax tree to element tree lowering.

use crate::element::{Element, Node, Root};
use crate::syntax::SyntaxNode;

use super::resolve::restoration_text;

/// Lower a resolved syntax tree into an element tree.
pub fn to_element_tree(tree: &SyntaxNode) -> Root {
    match tree {
        SyntaxNode::Root(children) => Root::new(lower_all(children, false)),
        other => Root::new(lower(other, false)),
    }
}

fn lower_all(nodes: &[SyntaxNode], tight: bool) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::new();
    for node in nodes.iter().flat_map(|n| lower(n, tight)) {
        // Adjacent text (prose next to raw HTML) reads back as one node.
        if let Node::Text(next) = &node
            && let Some(Node::Text(prev)) = out.last_mut()
        {
            prev.value.push_str(&next.value);
            continue;
        }
        out.push(node);
    }
    out
}

fn element(tag: &str, children: Vec<Node>) -> Vec<Node> {
    vec![Element::new(tag, children).into()]
}

/// Lower one node. `tight` is set for the direct children of a tight list
/// item, whose paragraphs are unwrapped.
fn lower(node: &SyntaxNode, tight: bool) -> Vec<Node> {
    match node {
        SyntaxNode::Root(children) => lower_all(children, false),
        SyntaxNode::Paragraph(children) if tight => lower_all(children, false),
        SyntaxNode::Paragraph(children) => element("p", lower_all(children, false)),
        SyntaxNode::Heading { depth, children } => {
            let tag = format!("h{}", (*depth).clamp(1, 6));
            element(&tag, lower_all(children, false))
        }
        SyntaxNode::ThematicBreak => element("hr", Vec::new()),
        SyntaxNode::BlockQuote(children) => element("blockquote", lower_all(children, false)),
        SyntaxNode::List {
            ordered,
            start,
            tight,
            children,
        } => {
            let items = children
                .iter()
                .flat_map(|item| match item {
                    SyntaxNode::ListItem(inner) => element("li", lower_all(inner, *tight)),
                    other => lower(other, false),
                })
                .collect();
            let mut list = Element::new(if *ordered { "ol" } else { "ul" }, items);
            if *ordered && *start != 1 {
                list = list.with_property("start", start.to_string());
            }
            vec![list.into()]
        }
        SyntaxNode::ListItem(children) => element("li", lower_all(children, tight)),
        SyntaxNode::Code { lang, value } => {
            let mut code = Element::new("code", vec![Node::text(value.clone())]);
            if let Some(lang) = lang {
                code = code.with_property("class", format!("language-{lang}"));
            }
            element("pre", vec![code.into()])
        }
        SyntaxNode::Html(value) | SyntaxNode::Text(value) => vec![Node::text(value.clone())],
        SyntaxNode::Emphasis(children) => element("em", lower_all(children, false)),
        SyntaxNode::Strong(children) => element("strong", lower_all(children, false)),
        SyntaxNode::Delete(children) => element("del", lower_all(children, false)),
        SyntaxNode::InlineCode(value) => element("code", vec![Node::text(value.clone())]),
        SyntaxNode::Break => vec![Element::new("br", Vec::new()).into(), Node::text("\n")],
        SyntaxNode::Link {
            url,
            title,
            children,
        } => {
            let mut link = Element::new("a", lower_all(children, false)).with_property("href", url.as_str());
            if let Some(title) = title {
                link = link.with_property("title", title.as_str());
            }
            vec![link.into()]
        }
        SyntaxNode::Image { url, alt } => vec![
            Element::new("img", Vec::new())
                .with_property("src", url.as_str())
                .with_property("alt", alt.as_str())
                .into(),
        ],
        SyntaxNode::Element {
            tag_name,
            properties,
            children,
        } => vec![
            Element {
                tag_name: tag_name.clone(),
                properties: properties.clone(),
                children: lower_all(children, false),
            }
            .into(),
        ],
        // Directives the resolver did not see still lower to their text.
        SyntaxNode::Directive(directive) => vec![Node::text(restoration_text(directive))],
    }
}
