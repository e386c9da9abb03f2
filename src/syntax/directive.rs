//! Directive syntax recognition.
//!
//! Comrak has no notion of generic directives, so they are recognized on the
//! lowered syntax tree:
//!
//! - text directives `:name[label]{attrs}` inside inline runs, where the
//!   label may span formatted nodes (`:Link[**Home**]`);
//! - leaf directives `::name[label]{attrs}` forming a whole paragraph;
//! - container directives opened by a `:::name[label]{attrs}` line and
//!   closed by a `:::` line, wrapping the blocks in between.
//!
//! A candidate that does not complete (unclosed bracket, invalid name) stays
//! literal text.

use std::collections::{BTreeMap, VecDeque};

use super::types::{Directive, DirectiveShape, SyntaxNode};

/// Recognize directives throughout a syntax tree, in place.
pub fn apply(node: &mut SyntaxNode) {
    match node {
        SyntaxNode::Root(children)
        | SyntaxNode::BlockQuote(children)
        | SyntaxNode::ListItem(children) => {
            let blocks = std::mem::take(children);
            *children = extract_block_directives(blocks);
            for child in children.iter_mut() {
                apply(child);
            }
        }
        SyntaxNode::Directive(directive) if directive.shape == DirectiveShape::Container => {
            for child in &mut directive.children {
                apply(child);
            }
        }
        SyntaxNode::List { children, .. } => {
            for child in children.iter_mut() {
                apply(child);
            }
        }
        SyntaxNode::Paragraph(children)
        | SyntaxNode::Emphasis(children)
        | SyntaxNode::Strong(children)
        | SyntaxNode::Delete(children)
        | SyntaxNode::Heading { children, .. }
        | SyntaxNode::Link { children, .. } => {
            let inlines = std::mem::take(children);
            *children = extract_text_directives(inlines);
        }
        _ => {}
    }
}

/// Merge runs of adjacent text nodes. Comrak splits text at bracket and
/// emphasis delimiter candidates.
pub fn merge_text(nodes: Vec<SyntaxNode>) -> Vec<SyntaxNode> {
    let mut out: Vec<SyntaxNode> = Vec::with_capacity(nodes.len());
    for node in nodes {
        push_inline(&mut out, node);
    }
    out
}

fn push_inline(out: &mut Vec<SyntaxNode>, node: SyntaxNode) {
    if let SyntaxNode::Text(value) = node {
        push_text(out, &value);
    } else {
        out.push(node);
    }
}

fn push_text(out: &mut Vec<SyntaxNode>, value: &str) {
    if value.is_empty() {
        return;
    }
    if let Some(SyntaxNode::Text(prev)) = out.last_mut() {
        prev.push_str(value);
    } else {
        out.push(SyntaxNode::Text(value.to_string()));
    }
}

/// A directive opener found inside a text run.
struct Opening {
    /// Byte offset of the colon.
    start: usize,
    name: String,
    /// Byte offset just past the name.
    after_name: usize,
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic()
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Whether the colon run starting at byte `at` would open a directive when
/// parsed: the text shape needs a name then `[` or `{`, the block shapes
/// (two or more colons) only a name.
pub fn opens_directive(text: &str, at: usize) -> bool {
    if text[..at]
        .chars()
        .next_back()
        .is_some_and(|c| c.is_alphanumeric() || c == ':')
    {
        return false;
    }
    let colons = text[at..]
        .find(|c: char| c != ':')
        .unwrap_or(text.len() - at);
    let after = &text[at + colons..];
    if colons == 0 || !after.chars().next().is_some_and(is_name_start) {
        return false;
    }
    let name_len = after.find(|c: char| !is_name_char(c)).unwrap_or(after.len());
    colons >= 2 || matches!(after[name_len..].chars().next(), Some('[' | '{'))
}

/// Find the next `:name` followed by `[` or `{` at or after `from`.
fn find_opening(text: &str, from: usize) -> Option<Opening> {
    let mut search = from;
    while let Some(rel) = text[search..].find(':') {
        let start = search + rel;
        search = start + 1;

        let preceded_ok = text[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric() && c != ':');
        if !preceded_ok {
            continue;
        }

        let after_colon = &text[start + 1..];
        if !after_colon.chars().next().is_some_and(is_name_start) {
            continue;
        }
        let name_len = after_colon
            .find(|c: char| !is_name_char(c))
            .unwrap_or(after_colon.len());
        let after_name = start + 1 + name_len;
        if matches!(text[after_name..].chars().next(), Some('[' | '{')) {
            return Some(Opening {
                start,
                name: after_colon[..name_len].to_string(),
                after_name,
            });
        }
    }
    None
}

/// Scan for the `]` closing a label. `depth` counts nested brackets already
/// open inside the label and carries across text fragments.
fn find_label_close(s: &str, depth: &mut usize) -> Option<usize> {
    for (i, c) in s.char_indices() {
        match c {
            '[' => *depth += 1,
            ']' if *depth == 0 => return Some(i),
            ']' => *depth -= 1,
            _ => {}
        }
    }
    None
}

/// Parse `{...}` at the start of `s`. Returns the inner text and the bytes
/// consumed; quoted values may contain `}`.
fn parse_braces(s: &str) -> Option<(&str, usize)> {
    if !s.starts_with('{') {
        return None;
    }
    let mut quote: Option<char> = None;
    for (i, c) in s.char_indices().skip(1) {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '}') => return Some((&s[1..i], i + 1)),
            _ => {}
        }
    }
    None
}

/// Parse directive attributes: `#id .class key="value" key='value' key=value bare`.
///
/// `#id` maps to `id`, classes accumulate space-separated under `class`, and
/// bare keys map to an empty value.
pub fn parse_attributes(src: &str) -> BTreeMap<String, String> {
    let mut attrs = BTreeMap::new();
    let mut remaining = src.trim();

    while !remaining.is_empty() {
        if let Some(rest) = remaining.strip_prefix('#') {
            let end = rest
                .find(|c: char| c.is_whitespace() || c == '.' || c == '#')
                .unwrap_or(rest.len());
            if end > 0 {
                attrs.insert("id".to_string(), rest[..end].to_string());
            }
            remaining = rest[end..].trim_start();
        } else if let Some(rest) = remaining.strip_prefix('.') {
            let end = rest
                .find(|c: char| c.is_whitespace() || c == '.' || c == '#')
                .unwrap_or(rest.len());
            if end > 0 {
                let class = attrs.entry("class".to_string()).or_insert_with(String::new);
                if !class.is_empty() {
                    class.push(' ');
                }
                class.push_str(&rest[..end]);
            }
            remaining = rest[end..].trim_start();
        } else {
            let key_end = remaining
                .find(|c: char| c.is_whitespace() || c == '=')
                .unwrap_or(remaining.len());
            let key = &remaining[..key_end];
            let after_key = &remaining[key_end..];

            let Some(after_eq) = after_key.strip_prefix('=') else {
                if !key.is_empty() {
                    attrs.insert(key.to_string(), String::new());
                }
                remaining = after_key.trim_start();
                continue;
            };

            let (value, rest) = if let Some(quote) = after_eq.chars().next().filter(|c| *c == '"' || *c == '\'') {
                let body = &after_eq[1..];
                match body.find(quote) {
                    Some(end) => (&body[..end], &body[end + 1..]),
                    None => (body, ""),
                }
            } else {
                let end = after_eq.find(char::is_whitespace).unwrap_or(after_eq.len());
                (&after_eq[..end], &after_eq[end..])
            };
            if !key.is_empty() {
                attrs.insert(key.to_string(), value.to_string());
            }
            remaining = rest.trim_start();
        }
    }

    attrs
}

/// Where a text directive's label closes, relative to the pending queue.
struct LabelEnd {
    /// Number of queued nodes fully inside the label.
    inner_nodes: usize,
    /// Byte offset of `]` within the queued text node after them.
    close: usize,
}

/// Look ahead through queued siblings for the label's closing bracket.
fn find_label_end(queue: &VecDeque<SyntaxNode>, mut depth: usize) -> Option<LabelEnd> {
    for (index, node) in queue.iter().enumerate() {
        if let SyntaxNode::Text(text) = node
            && let Some(close) = find_label_close(text, &mut depth)
        {
            return Some(LabelEnd {
                inner_nodes: index,
                close,
            });
        }
    }
    None
}

/// Outcome of trying to complete a directive at an opening.
enum Completion {
    /// Finished inside the current run; the run continues at this offset.
    InRun(Directive, usize),
    /// The label spilled into queued siblings; the run is exhausted and this
    /// leftover text goes back on the queue.
    Spilled(Directive, String),
}

fn complete_opening(
    text: &str,
    open: Opening,
    queue: &mut VecDeque<SyntaxNode>,
) -> Option<Completion> {
    let rest = &text[open.after_name..];
    let mut directive = Directive::new(DirectiveShape::Text, open.name);

    let Some(label) = rest.strip_prefix('[') else {
        // `:name{attrs}` with no label.
        let (inner, used) = parse_braces(rest)?;
        directive.attributes = parse_attributes(inner);
        return Some(Completion::InRun(directive, open.after_name + used));
    };

    let mut depth = 0;
    if let Some(close) = find_label_close(label, &mut depth) {
        if close > 0 {
            directive.children.push(SyntaxNode::Text(label[..close].to_string()));
        }
        let mut end = open.after_name + 1 + close + 1;
        if let Some((inner, used)) = parse_braces(&text[end..]) {
            directive.attributes = parse_attributes(inner);
            end += used;
        }
        return Some(Completion::InRun(directive, end));
    }

    // Label continues into following siblings.
    let end = find_label_end(queue, depth)?;
    let mut label_nodes = Vec::new();
    push_text(&mut label_nodes, label);
    for inner in queue.drain(..end.inner_nodes) {
        push_inline(&mut label_nodes, inner);
    }
    let tail = match queue.pop_front() {
        Some(SyntaxNode::Text(tail)) => tail,
        _ => return None,
    };
    push_text(&mut label_nodes, &tail[..end.close]);
    directive.children = extract_text_directives(label_nodes);

    let mut after = &tail[end.close + 1..];
    if let Some((inner, used)) = parse_braces(after) {
        directive.attributes = parse_attributes(inner);
        after = &after[used..];
    }
    Some(Completion::Spilled(directive, after.to_string()))
}

/// Split an inline run into text and text-directive nodes.
pub fn extract_text_directives(nodes: Vec<SyntaxNode>) -> Vec<SyntaxNode> {
    let mut queue: VecDeque<SyntaxNode> = merge_text(nodes).into();
    let mut out = Vec::new();

    while let Some(node) = queue.pop_front() {
        let SyntaxNode::Text(text) = node else {
            let mut node = node;
            apply(&mut node);
            out.push(node);
            continue;
        };

        let mut cursor = 0;
        let mut emitted = 0;
        while let Some(open) = find_opening(&text, cursor) {
            let start = open.start;
            match complete_opening(&text, open, &mut queue) {
                Some(Completion::InRun(directive, end)) => {
                    push_text(&mut out, &text[emitted..start]);
                    out.push(SyntaxNode::Directive(directive));
                    emitted = end;
                    cursor = end;
                }
                Some(Completion::Spilled(directive, leftover)) => {
                    push_text(&mut out, &text[emitted..start]);
                    out.push(SyntaxNode::Directive(directive));
                    if !leftover.is_empty() {
                        queue.push_front(SyntaxNode::Text(leftover));
                    }
                    emitted = text.len();
                    break;
                }
                None => cursor = start + 1,
            }
        }
        push_text(&mut out, &text[emitted..]);
    }

    out
}

/// Sole text of a paragraph, if it consists of text only.
fn paragraph_text(node: &SyntaxNode) -> Option<&str> {
    match node {
        SyntaxNode::Paragraph(children) => match children.as_slice() {
            [SyntaxNode::Text(text)] => Some(text.as_str()),
            _ => None,
        },
        _ => None,
    }
}

/// Parse `name[label]{attrs}` filling a whole line. Returns the directive
/// without its shape-specific label placement applied.
fn parse_block_line(line: &str, shape: DirectiveShape) -> Option<(Directive, Option<String>)> {
    let body = line.trim_start();
    if !body.chars().next().is_some_and(is_name_start) {
        return None;
    }
    let name_len = body.find(|c: char| !is_name_char(c)).unwrap_or(body.len());
    let mut directive = Directive::new(shape, &body[..name_len]);
    let mut rest = &body[name_len..];

    let mut label = None;
    if let Some(inner) = rest.strip_prefix('[') {
        let mut depth = 0;
        let close = find_label_close(inner, &mut depth)?;
        label = Some(inner[..close].to_string());
        rest = &inner[close + 1..];
    }
    if let Some((inner, used)) = parse_braces(rest) {
        directive.attributes = parse_attributes(inner);
        rest = &rest[used..];
    }
    rest.trim().is_empty().then_some((directive, label))
}

fn parse_leaf(text: &str) -> Option<Directive> {
    let line = text.trim();
    let body = line.strip_prefix("::")?;
    if body.starts_with(':') || line.contains('\n') {
        return None;
    }
    let (mut directive, label) = parse_block_line(body, DirectiveShape::Leaf)?;
    if let Some(label) = label.filter(|l| !l.is_empty()) {
        directive.children.push(SyntaxNode::Text(label));
    }
    Some(directive)
}

fn parse_container_open(line: &str) -> Option<Directive> {
    let line = line.trim();
    let colons = line.chars().take_while(|&c| c == ':').count();
    if colons < 3 {
        return None;
    }
    let (mut directive, label) = parse_block_line(&line[colons..], DirectiveShape::Container)?;
    directive.label = label;
    Some(directive)
}

fn is_container_close(line: &str) -> bool {
    let line = line.trim();
    line.len() >= 3 && line.chars().all(|c| c == ':')
}

/// Split a paragraph whose first line opens or last line closes a container
/// into separate paragraphs, so fences written without blank lines are seen.
fn split_fence_lines(block: SyntaxNode, out: &mut Vec<SyntaxNode>) {
    let SyntaxNode::Paragraph(children) = block else {
        out.push(block);
        return;
    };
    let mut children = children;
    let mut opener = None;
    let mut closer = false;

    if let Some(SyntaxNode::Text(first)) = children.first_mut()
        && let Some((line, rest)) = first.split_once('\n')
        && parse_container_open(line).is_some()
    {
        opener = Some(line.to_string());
        *first = rest.to_string();
    }
    if let Some(SyntaxNode::Text(last)) = children.last_mut()
        && let Some((rest, line)) = last.rsplit_once('\n')
        && is_container_close(line)
    {
        closer = true;
        *last = rest.to_string();
    }

    if let Some(line) = opener {
        out.push(SyntaxNode::Paragraph(vec![SyntaxNode::Text(line)]));
    }
    children.retain(|c| !matches!(c, SyntaxNode::Text(t) if t.is_empty()));
    if !children.is_empty() {
        out.push(SyntaxNode::Paragraph(children));
    }
    if closer {
        out.push(SyntaxNode::Paragraph(vec![SyntaxNode::Text(":::".to_string())]));
    }
}

/// Recognize leaf and container directives in a list of blocks.
pub fn extract_block_directives(blocks: Vec<SyntaxNode>) -> Vec<SyntaxNode> {
    let mut split = Vec::with_capacity(blocks.len());
    for block in blocks {
        let block = match block {
            SyntaxNode::Paragraph(children) => SyntaxNode::Paragraph(merge_text(children)),
            other => other,
        };
        split_fence_lines(block, &mut split);
    }

    let mut out = Vec::with_capacity(split.len());
    let mut iter = split.into_iter().peekable();
    let mut pending: Vec<SyntaxNode> = Vec::new();

    while let Some(block) = iter.next() {
        if let Some(directive) = paragraph_text(&block).and_then(parse_leaf) {
            out.push(SyntaxNode::Directive(directive));
            continue;
        }
        let Some(mut directive) = paragraph_text(&block).and_then(parse_container_open) else {
            out.push(block);
            continue;
        };

        // Collect blocks up to the matching close, honoring nesting.
        pending.clear();
        let mut depth = 1;
        let mut closed = false;
        for inner in iter.by_ref() {
            let text = paragraph_text(&inner);
            if text.is_some_and(|t| parse_container_open(t).is_some()) {
                depth += 1;
            } else if text.is_some_and(is_container_close) {
                depth -= 1;
                if depth == 0 {
                    closed = true;
                    break;
                }
            }
            pending.push(inner);
        }

        if closed {
            directive.children = extract_block_directives(std::mem::take(&mut pending));
            out.push(SyntaxNode::Directive(directive));
        } else {
            out.push(block);
            out.append(&mut pending);
        }
    }

    out
}
