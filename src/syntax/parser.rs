//! Markdown parsing with comrak.

use comrak::nodes::{AstNode, ListType, NodeValue};
use comrak::{Arena, Options, parse_document};

use super::types::SyntaxNode;
use super::{directive, escape};

/// Parse markdown source into a syntax tree with directives recognized.
///
/// # Example
///
/// ```
/// use marksync::syntax::{SyntaxNode, parse};
///
/// let tree = parse("# Hello\n\nSee :Link[Home]");
/// assert!(matches!(tree, SyntaxNode::Root(ref children) if children.len() == 2));
/// ```
pub fn parse(source: &str) -> SyntaxNode {
    let arena = Arena::new();
    let options = create_options();
    let protected = escape::protect(source);
    let root = parse_document(&arena, &protected, &options);

    let mut tree = convert(root).unwrap_or_else(|| SyntaxNode::Root(Vec::new()));
    directive::apply(&mut tree);
    escape::restore(&mut tree);
    tree
}

fn create_options() -> Options {
    let mut options = Options::default();

    // GFM strikethrough is the only extension the editor round-trips.
    options.extension.strikethrough = true;

    options
}

fn convert_children<'a>(node: &'a AstNode<'a>) -> Vec<SyntaxNode> {
    node.children().filter_map(convert).collect()
}

/// Convert one comrak node. Constructs outside the supported subset lower to
/// their literal text, or are skipped when they carry none.
fn convert<'a>(node: &'a AstNode<'a>) -> Option<SyntaxNode> {
    let converted = match &node.data.borrow().value {
        NodeValue::Document => SyntaxNode::Root(convert_children(node)),
        NodeValue::Paragraph => SyntaxNode::Paragraph(convert_children(node)),
        NodeValue::Heading(heading) => SyntaxNode::Heading {
            depth: heading.level,
            children: convert_children(node),
        },
        NodeValue::ThematicBreak => SyntaxNode::ThematicBreak,
        NodeValue::BlockQuote => SyntaxNode::BlockQuote(convert_children(node)),
        NodeValue::List(list) => SyntaxNode::List {
            ordered: list.list_type == ListType::Ordered,
            start: list.start,
            tight: list.tight,
            children: convert_children(node),
        },
        NodeValue::Item(_) => SyntaxNode::ListItem(convert_children(node)),
        NodeValue::CodeBlock(code_block) => {
            let lang = code_block
                .info
                .split_whitespace()
                .next()
                .filter(|s| !s.is_empty())
                .map(ToString::to_string);
            SyntaxNode::Code {
                lang,
                value: code_block.literal.clone(),
            }
        }
        NodeValue::HtmlBlock(html) => SyntaxNode::Html(html.literal.clone()),
        NodeValue::HtmlInline(html) => SyntaxNode::Html(html.clone()),
        NodeValue::Text(text) => SyntaxNode::Text(text.clone()),
        NodeValue::SoftBreak => SyntaxNode::Text("\n".to_string()),
        NodeValue::LineBreak => SyntaxNode::Break,
        NodeValue::Code(code) => SyntaxNode::InlineCode(code.literal.clone()),
        NodeValue::Emph => SyntaxNode::Emphasis(convert_children(node)),
        NodeValue::Strong => SyntaxNode::Strong(convert_children(node)),
        NodeValue::Strikethrough => SyntaxNode::Delete(convert_children(node)),
        NodeValue::Link(link) => SyntaxNode::Link {
            url: link.url.clone(),
            title: Some(link.title.clone()).filter(|t| !t.is_empty()),
            children: convert_children(node),
        },
        NodeValue::Image(image) => {
            let alt = convert_children(node)
                .iter()
                .map(SyntaxNode::text_value)
                .collect();
            SyntaxNode::Image {
                url: image.url.clone(),
                alt,
            }
        }
        _ => {
            let children = convert_children(node);
            if children.is_empty() {
                return None;
            }
            SyntaxNode::Paragraph(children)
        }
    };
    Some(converted)
}
