//! Renderable element tree.
//!
//! This is the hast-like form handed to the editing surface: tagged elements
//! with a property map and an ordered child list. The JSON shape matches what
//! a browser-side consumer expects:
//!
//! ```json
//! {"children":[{"type":"element","tagName":"p","properties":{},"children":[
//!     {"type":"text","value":"Hello"}]}]}
//! ```
//!
//! Keys in the `data-md-*` family and `data-key` are provenance metadata and
//! are not display attributes.

mod visit;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::TreeError;

pub use visit::{walk_elements, walk_elements_mut};

/// Property map of an element. Ordered so serialized output is stable.
pub type Properties = BTreeMap<String, PropertyValue>;

/// A property value: either a string attribute or a boolean flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Str(String),
}

impl PropertyValue {
    /// String view of the value, if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            Self::Bool(_) => None,
        }
    }

    /// Whether the value counts as a set flag.
    ///
    /// DOM attributes round-trip as strings, so `"true"` and `""` (a bare
    /// attribute) count as set as well as a real boolean.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Str(s) => s != "false",
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// A node in the element tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    Element(Element),
    Text(Text),
}

impl Node {
    /// Create a text node.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(Text {
            value: value.into(),
        })
    }

    pub const fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(el) => Some(el),
            Self::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Self::Element(el) => Some(el),
            Self::Text(_) => None,
        }
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        push_text(self, &mut out);
        out
    }
}

fn push_text(node: &Node, out: &mut String) {
    match node {
        Node::Text(text) => out.push_str(&text.value),
        Node::Element(el) => {
            for child in &el.children {
                push_text(child, out);
            }
        }
    }
}

/// A text leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Text {
    pub value: String,
}

/// A tagged element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    #[serde(rename = "tagName")]
    pub tag_name: String,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Element {
    /// Create an element with no properties.
    pub fn new(tag_name: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            tag_name: tag_name.into(),
            properties: Properties::new(),
            children,
        }
    }

    /// Builder-style property setter.
    #[must_use]
    pub fn with_property(mut self, key: &str, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }

    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// String value of a property, if present and a string.
    pub fn str_property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(PropertyValue::as_str)
    }

    /// Whether a flag property is present and set.
    pub fn has_flag(&self, key: &str) -> bool {
        self.properties.get(key).is_some_and(PropertyValue::is_truthy)
    }

    /// Whether any provenance attribute was stamped on this element.
    pub fn is_annotated(&self) -> bool {
        self.properties.keys().any(|k| k.starts_with("data-md-"))
    }

    /// Concatenated text of all descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            push_text(child, &mut out);
        }
        out
    }
}

impl From<Element> for Node {
    fn from(value: Element) -> Self {
        Self::Element(value)
    }
}

/// Root of an element tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Root {
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Root {
    pub const fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    /// Decode a tree from its JSON wire form.
    pub fn from_json(json: &str) -> Result<Self, TreeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Encode the tree to its JSON wire form.
    pub fn to_json(&self, pretty: bool) -> Result<String, TreeError> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    /// Number of elements in the tree.
    pub fn element_count(&self) -> usize {
        let mut count = 0;
        walk_elements(self, &mut |_, _, _| count += 1);
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Root {
        Root::new(vec![
            Element::new(
                "p",
                vec![
                    Node::text("Hello "),
                    Element::new("strong", vec![Node::text("world")]).into(),
                ],
            )
            .with_property("data-md-paragraph", true)
            .into(),
        ])
    }

    #[test]
    fn test_text_content_concatenates_descendants() {
        let root = sample();
        assert_eq!(root.children[0].text_content(), "Hello world");
    }

    #[test]
    fn test_json_shape_matches_hast() {
        let json = sample().to_json(false).unwrap();
        assert!(json.contains(r#""type":"element""#));
        assert!(json.contains(r#""tagName":"p""#));
        assert!(json.contains(r#""type":"text","value":"Hello ""#));
        assert!(json.contains(r#""data-md-paragraph":true"#));
    }

    #[test]
    fn test_json_decode_accepts_missing_properties() {
        let json = r#"{"children":[{"type":"element","tagName":"br"}]}"#;
        let root = Root::from_json(json).unwrap();
        let el = root.children[0].as_element().unwrap();
        assert_eq!(el.tag_name, "br");
        assert!(el.properties.is_empty());
        assert!(el.children.is_empty());
    }

    #[test]
    fn test_json_decode_rejects_garbage() {
        assert!(Root::from_json("{not json").is_err());
        assert!(Root::from_json(r#"{"children":[{"type":"comment"}]}"#).is_err());
    }

    #[test]
    fn test_string_flags_count_as_set() {
        let el = Element::new("em", Vec::new())
            .with_property("data-md-wrapped", "true")
            .with_property("data-md-inline", "")
            .with_property("data-md-code", "false");
        assert!(el.has_flag("data-md-wrapped"));
        assert!(el.has_flag("data-md-inline"));
        assert!(!el.has_flag("data-md-code"));
        assert!(!el.has_flag("data-md-list"));
    }

    #[test]
    fn test_is_annotated_ignores_plain_attributes() {
        let plain = Element::new("span", Vec::new()).with_property("class", "x");
        assert!(!plain.is_annotated());
        let marked = plain.with_property("data-md-inline", true);
        assert!(marked.is_annotated());
    }

    #[test]
    fn test_element_count() {
        assert_eq!(sample().element_count(), 2);
    }
}
