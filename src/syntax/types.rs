//! Syntax tree types.

use std::collections::BTreeMap;

use crate::element::Properties;

/// A node of the parsed Markdown syntax tree (mdast-like).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxNode {
    Root(Vec<SyntaxNode>),
    Paragraph(Vec<SyntaxNode>),
    Heading {
        depth: u8,
        children: Vec<SyntaxNode>,
    },
    ThematicBreak,
    BlockQuote(Vec<SyntaxNode>),
    List {
        ordered: bool,
        start: usize,
        /// Tight lists render their items without paragraph wrappers.
        tight: bool,
        children: Vec<SyntaxNode>,
    },
    ListItem(Vec<SyntaxNode>),
    /// Fenced or indented code block.
    Code {
        lang: Option<String>,
        value: String,
    },
    /// Raw HTML, kept as literal text.
    Html(String),
    Text(String),
    Emphasis(Vec<SyntaxNode>),
    Strong(Vec<SyntaxNode>),
    Delete(Vec<SyntaxNode>),
    InlineCode(String),
    /// Hard line break.
    Break,
    Link {
        url: String,
        title: Option<String>,
        children: Vec<SyntaxNode>,
    },
    Image {
        url: String,
        alt: String,
    },
    Directive(Directive),
    /// A node already resolved to an element whose children are still
    /// syntax nodes. Lowering turns it into an element verbatim.
    Element {
        tag_name: String,
        properties: Properties,
        children: Vec<SyntaxNode>,
    },
}

impl SyntaxNode {
    /// Child list of container variants; empty for leaves.
    pub fn children(&self) -> &[Self] {
        match self {
            Self::Root(children)
            | Self::Paragraph(children)
            | Self::BlockQuote(children)
            | Self::ListItem(children)
            | Self::Emphasis(children)
            | Self::Strong(children)
            | Self::Delete(children)
            | Self::Heading { children, .. }
            | Self::List { children, .. }
            | Self::Link { children, .. }
            | Self::Element { children, .. } => children,
            Self::Directive(directive) => &directive.children,
            Self::ThematicBreak
            | Self::Code { .. }
            | Self::Html(_)
            | Self::Text(_)
            | Self::InlineCode(_)
            | Self::Break
            | Self::Image { .. } => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Self>> {
        match self {
            Self::Root(children)
            | Self::Paragraph(children)
            | Self::BlockQuote(children)
            | Self::ListItem(children)
            | Self::Emphasis(children)
            | Self::Strong(children)
            | Self::Delete(children)
            | Self::Heading { children, .. }
            | Self::List { children, .. }
            | Self::Link { children, .. }
            | Self::Element { children, .. } => Some(children),
            Self::Directive(directive) => Some(&mut directive.children),
            Self::ThematicBreak
            | Self::Code { .. }
            | Self::Html(_)
            | Self::Text(_)
            | Self::InlineCode(_)
            | Self::Break
            | Self::Image { .. } => None,
        }
    }

    /// Plain text of the node: literal values of leaves, concatenated text
    /// of containers.
    pub fn text_value(&self) -> String {
        match self {
            Self::Text(value) | Self::InlineCode(value) | Self::Html(value) => value.clone(),
            Self::Code { value, .. } => value.clone(),
            Self::Image { alt, .. } => alt.clone(),
            Self::Break => "\n".to_string(),
            Self::ThematicBreak => String::new(),
            other => other.children().iter().map(Self::text_value).collect(),
        }
    }
}

/// The three directive shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveShape {
    /// `:name[label]{attrs}` inside a paragraph.
    Text,
    /// `::name[label]{attrs}` on a line of its own.
    Leaf,
    /// `:::name[label]{attrs}` ... `:::` wrapping blocks.
    Container,
}

impl DirectiveShape {
    /// The colon run that introduces this shape.
    pub const fn marker(self) -> &'static str {
        match self {
            Self::Text => ":",
            Self::Leaf => "::",
            Self::Container => ":::",
        }
    }
}

/// A parsed directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub shape: DirectiveShape,
    pub name: String,
    pub attributes: BTreeMap<String, String>,
    /// Bracket label of a container directive. Text and leaf directives keep
    /// their label as `children`.
    pub label: Option<String>,
    pub children: Vec<SyntaxNode>,
}

impl Directive {
    pub fn new(shape: DirectiveShape, name: impl Into<String>) -> Self {
        Self {
            shape,
            name: name.into(),
            attributes: BTreeMap::new(),
            label: None,
            children: Vec::new(),
        }
    }
}
