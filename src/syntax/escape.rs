//! Backslash-escaped directive punctuation.
//!
//! Comrak consumes the backslash of `\:` or `\[` while parsing, after which
//! the directive scanner can no longer tell escaped punctuation from real
//! syntax. Escaped `:` `[` `]` `{` `}` are therefore swapped for private-use
//! stand-ins before parsing and turned back once directives are recognized.
//! Literal contexts (code, raw HTML) get their backslash back.

use std::borrow::Cow;

use super::types::SyntaxNode;

const STAND_INS: [(char, char); 5] = [
    (':', '\u{e000}'),
    ('[', '\u{e001}'),
    (']', '\u{e002}'),
    ('{', '\u{e003}'),
    ('}', '\u{e004}'),
];

fn stand_in_for(c: char) -> Option<char> {
    STAND_INS.iter().find(|(orig, _)| *orig == c).map(|(_, s)| *s)
}

fn original_of(c: char) -> Option<char> {
    STAND_INS.iter().find(|(_, s)| *s == c).map(|(orig, _)| *orig)
}

/// Replace escaped directive punctuation with stand-ins. An escape is a
/// punctuation character after an odd run of backslashes.
pub fn protect(source: &str) -> Cow<'_, str> {
    if !source.contains('\\') {
        return Cow::Borrowed(source);
    }
    let mut out = String::with_capacity(source.len());
    let mut backslashes = 0usize;
    for c in source.chars() {
        if c == '\\' {
            backslashes += 1;
            out.push(c);
            continue;
        }
        match stand_in_for(c) {
            Some(stand_in) if backslashes % 2 == 1 => {
                out.pop();
                out.push(stand_in);
            }
            _ => out.push(c),
        }
        backslashes = 0;
    }
    Cow::Owned(out)
}

fn restore_with(value: &mut String, literal: bool) {
    if !value.chars().any(|c| original_of(c).is_some()) {
        return;
    }
    let mut out = String::with_capacity(value.len() + 4);
    for c in value.chars() {
        match original_of(c) {
            Some(orig) => {
                if literal {
                    out.push('\\');
                }
                out.push(orig);
            }
            None => out.push(c),
        }
    }
    *value = out;
}

fn restore_text(value: &mut String) {
    restore_with(value, false);
}

fn restore_literal(value: &mut String) {
    restore_with(value, true);
}

/// Turn stand-ins back into their characters throughout a tree.
pub fn restore(node: &mut SyntaxNode) {
    match node {
        SyntaxNode::Text(value) => restore_text(value),
        SyntaxNode::Html(value) | SyntaxNode::InlineCode(value) => restore_literal(value),
        SyntaxNode::Code { lang, value } => {
            if let Some(lang) = lang {
                restore_text(lang);
            }
            restore_literal(value);
        }
        SyntaxNode::Link {
            url,
            title,
            children,
        } => {
            restore_text(url);
            if let Some(title) = title {
                restore_text(title);
            }
            children.iter_mut().for_each(restore);
        }
        SyntaxNode::Image { url, alt } => {
            restore_text(url);
            restore_text(alt);
        }
        SyntaxNode::Directive(directive) => {
            directive.attributes = std::mem::take(&mut directive.attributes)
                .into_iter()
                .map(|(mut key, mut value)| {
                    restore_text(&mut key);
                    restore_text(&mut value);
                    (key, value)
                })
                .collect();
            if let Some(label) = &mut directive.label {
                restore_text(label);
            }
            directive.children.iter_mut().for_each(restore);
        }
        other => {
            if let Some(children) = other.children_mut() {
                children.iter_mut().for_each(restore);
            }
        }
    }
}
