//! Element tree to Markdown (extract direction).
//!
//! Provenance attributes decide which syntax is emitted; tag names are only
//! consulted where the attributes leave a gap (`br`, plain links). Elements
//! without provenance contribute their content with no syntax of their own.
//! Text is backslash-escaped so it reads back as the same characters.

use crate::element::{Element, Node, Root};
use crate::syntax::opens_directive;

use super::attrs;

/// Serialize an element tree to Markdown.
pub fn to_markdown(root: &Root) -> String {
    let body = render_flow(&root.children, "\n\n");
    if body.is_empty() {
        body
    } else {
        format!("{body}\n")
    }
}

fn is_thematic_break(el: &Element) -> bool {
    el.str_property(attrs::SYNTAX) == Some("---")
        && !el.has_flag(attrs::INLINE)
        && !el.has_flag(attrs::WRAPPED)
}

fn is_block(node: &Node) -> bool {
    node.as_element().is_some_and(is_block_element)
}

fn is_block_element(el: &Element) -> bool {
    [
        attrs::PARAGRAPH,
        attrs::HEADER,
        attrs::PREFORMATTED,
        attrs::BLOCKQUOTE,
        attrs::LIST,
        attrs::CONTAINER,
    ]
    .iter()
    .any(|key| el.has_flag(key))
        || is_thematic_break(el)
}

/// Render nodes in block context. Runs of inline nodes form one chunk;
/// chunks are joined with `separator`.
fn render_flow(nodes: &[Node], separator: &str) -> String {
    let mut chunks: Vec<String> = Vec::new();
    let mut run: Vec<&Node> = Vec::new();

    for node in nodes {
        match node {
            Node::Element(el) if is_block(node) => {
                flush_run(&mut run, &mut chunks);
                chunks.push(render_block(el));
            }
            _ => run.push(node),
        }
    }
    flush_run(&mut run, &mut chunks);

    chunks.join(separator)
}

fn flush_run(run: &mut Vec<&Node>, chunks: &mut Vec<String>) {
    if run.is_empty() {
        return;
    }
    let mut text = String::new();
    for node in run.drain(..) {
        push_inline(&mut text, node);
    }
    // Whitespace between blocks is layout, not content.
    if !text.trim().is_empty() {
        chunks.push(text.trim_matches('\n').to_string());
    }
}

fn render_block(el: &Element) -> String {
    if let Some(prefix) = el.str_property(attrs::HEADER) {
        let content = render_inline(&el.children).replace('\n', " ");
        let content = content.trim();
        // A trailing `#` would read as a closing sequence.
        return match content.strip_suffix('#') {
            Some(head) if !head.ends_with('\\') => format!("{prefix} {head}\\#"),
            _ => format!("{prefix} {content}"),
        };
    }
    if el.has_flag(attrs::PREFORMATTED) {
        return render_fence(el);
    }
    if el.has_flag(attrs::BLOCKQUOTE) {
        return quote(&render_flow(&el.children, "\n\n"));
    }
    if el.has_flag(attrs::LIST) {
        return render_list(el);
    }
    if is_thematic_break(el) {
        return "---".to_string();
    }
    if el.has_flag(attrs::PARAGRAPH) {
        return render_inline(&el.children);
    }
    render_flow(&el.children, "\n\n")
}

fn quote(body: &str) -> String {
    body.lines()
        .map(|line| {
            if line.is_empty() {
                ">".to_string()
            } else {
                format!("> {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn longest_backtick_run(text: &str) -> usize {
    text.split(|c: char| c != '`').map(str::len).max().unwrap_or(0)
}

fn render_fence(pre: &Element) -> String {
    let code = pre.children.iter().find_map(Node::as_element);
    let lang = code
        .and_then(|c| c.str_property("class"))
        .and_then(|class| {
            class
                .split_whitespace()
                .find_map(|c| c.strip_prefix("language-"))
        })
        .unwrap_or_default();

    let content = code.map_or_else(|| pre.text_content(), Element::text_content);
    let body = content.strip_suffix('\n').unwrap_or(&content);
    let body = if body == attrs::NBSP { "" } else { body };

    let fence = "`".repeat(longest_backtick_run(body).max(2) + 1);
    if body.is_empty() {
        format!("{fence}{lang}\n{fence}")
    } else {
        format!("{fence}{lang}\n{body}\n{fence}")
    }
}

/// CommonMark list numbers have at most nine digits.
const MAX_LIST_START: usize = 999_999_999;

fn render_list(list: &Element) -> String {
    let ordered = list.tag_name == "ol" || list.str_property(attrs::SYNTAX) == Some("1.");
    let start = list
        .str_property("start")
        .and_then(|s| s.trim().parse::<usize>().ok())
        .map_or(1, |n| n.min(MAX_LIST_START));
    let loose = list.children.iter().filter_map(Node::as_element).any(|item| {
        item.children
            .iter()
            .filter_map(Node::as_element)
            .any(|c| c.has_flag(attrs::PARAGRAPH))
    });
    let item_separator = if loose { "\n\n" } else { "\n" };

    let mut items = Vec::new();
    for child in &list.children {
        let content = match child {
            Node::Element(item) => render_flow(&item.children, item_separator),
            Node::Text(text) if text.value.trim().is_empty() => continue,
            Node::Text(text) => escape_text(&text.value, true),
        };
        let marker = if ordered {
            format!("{}.", start.saturating_add(items.len()))
        } else {
            child
                .as_element()
                .and_then(|item| item.str_property(attrs::SYNTAX))
                .filter(|s| !s.is_empty())
                .unwrap_or("-")
                .to_string()
        };
        items.push(list_item(&marker, &content));
    }
    items.join(item_separator)
}

fn list_item(marker: &str, content: &str) -> String {
    let indent = " ".repeat(marker.len() + 1);
    let mut out = String::new();
    for (i, line) in content.lines().enumerate() {
        if i == 0 {
            out.push_str(marker);
            out.push(' ');
        } else {
            out.push('\n');
            if !line.is_empty() {
                out.push_str(&indent);
            }
        }
        out.push_str(line);
    }
    if out.is_empty() {
        out.push_str(marker);
    }
    out
}

/// Byte offset of the character that would open a block construct if
/// `line` started a line: heading, quote, list item, setext underline.
fn block_marker(line: &str) -> Option<usize> {
    let body = line.trim_start_matches(' ');
    let indent = line.len() - body.len();
    let digits = body.bytes().take_while(u8::is_ascii_digit).count();
    match body.chars().next()? {
        '#' | '>' | '-' | '+' | '=' => Some(indent),
        _ if digits > 0 && matches!(body[digits..].chars().next(), Some('.' | ')')) => {
            Some(indent + digits)
        }
        _ => None,
    }
}

fn escape_line(line: &str, at_line_start: bool, out: &mut String) {
    let marker = if at_line_start {
        block_marker(line)
    } else {
        None
    };
    let mut colon_run_escaped = false;
    for (i, c) in line.char_indices() {
        let next = line[i + c.len_utf8()..].chars().next();
        let escape = match c {
            '\\' | '*' | '_' | '`' | '~' | '[' | ']' => true,
            '<' => next.is_some_and(|n| n.is_ascii_alphabetic() || matches!(n, '/' | '!' | '?')),
            '&' => next.is_some_and(|n| n.is_ascii_alphanumeric() || n == '#'),
            ':' => {
                if !line[..i].ends_with(':') {
                    colon_run_escaped = opens_directive(line, i);
                }
                colon_run_escaped
            }
            _ => marker == Some(i),
        };
        if escape {
            out.push('\\');
        }
        out.push(c);
    }
}

/// Backslash-escape text so the next parse reads it as the same literal
/// characters. `at_line_start` says whether the text begins a line.
fn escape_text(text: &str, at_line_start: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for (n, line) in text.split('\n').enumerate() {
        if n > 0 {
            out.push('\n');
        }
        escape_line(line, at_line_start || n > 0, &mut out);
    }
    out
}

fn render_inline(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        push_inline(&mut out, node);
    }
    out
}

fn push_inline(out: &mut String, node: &Node) {
    match node {
        Node::Text(text) => {
            let at_line_start = out.is_empty() || out.ends_with('\n');
            out.push_str(&escape_text(&text.value, at_line_start));
        }
        Node::Element(el) => out.push_str(&render_inline_element(el)),
    }
}

/// A target that survives as a bare `{key}` attribute.
fn is_bare_key(target: &str) -> bool {
    target.chars().next().is_some_and(char::is_alphanumeric)
        && target
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '-' | '/'))
}

/// Quote an attribute value with whichever quote it does not contain.
/// Values holding both kinds have no faithful form; `"` is used.
fn quote_attribute(value: &str) -> String {
    let quote = if value.contains('"') && !value.contains('\'') {
        '\''
    } else {
        '"'
    };
    format!("{quote}{}{quote}", escape_text(value, false))
}

fn render_link_directive(link: &Element, target: &str) -> String {
    let display = render_inline(&link.children);
    let compact = matches!(link.children.as_slice(), [Node::Text(text)] if text.value == target);
    if compact {
        format!(":Link[{display}]")
    } else if is_bare_key(target) {
        format!(":Link[{display}]{{{target}}}")
    } else {
        format!(":Link[{display}]{{target={}}}", quote_attribute(target))
    }
}

fn render_code_span(content: &str) -> String {
    let run = longest_backtick_run(content);
    let fence = "`".repeat(run + 1);
    // One space is stripped from each side when both sides have one.
    let padded = content.starts_with(' ')
        && content.ends_with(' ')
        && !content.trim_start_matches(' ').is_empty();
    if run > 0 || padded {
        format!("{fence} {content} {fence}")
    } else {
        format!("{fence}{content}{fence}")
    }
}

fn render_inline_element(el: &Element) -> String {
    if is_block_element(el) {
        return render_block(el);
    }

    let href = el.str_property("href");
    if let (Some(target), None) = (el.str_property(attrs::LINK), href) {
        return render_link_directive(el, target);
    }
    if el.has_flag(attrs::LINK)
        && let Some(href) = href
    {
        let display = render_inline(&el.children);
        return match el.str_property("title") {
            Some(title) => {
                let title = title.replace('\\', "\\\\").replace('"', "\\\"");
                format!("[{display}]({href} \"{title}\")")
            }
            None => format!("[{display}]({href})"),
        };
    }

    if el.tag_name == "br" {
        return String::new();
    }

    match el.str_property(attrs::SYNTAX) {
        Some("!") if el.has_flag(attrs::INLINE) => {
            let alt = escape_text(el.str_property("alt").unwrap_or_default(), false);
            let src = el.str_property("src").unwrap_or_default();
            format!("![{alt}]({src})")
        }
        Some(syntax) if el.has_flag(attrs::WRAPPED) && !syntax.is_empty() => {
            if el.has_flag(attrs::CODE) {
                render_code_span(&el.text_content())
            } else {
                format!("{syntax}{}{syntax}", render_inline(&el.children))
            }
        }
        _ => render_inline(&el.children),
    }
}
