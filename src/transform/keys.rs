//! Identity-key annotation.
//!
//! Every element gets a `data-key` of the form `<tag>-<token>-<index>`. The
//! keys only stabilize caret and selection handling in the editing surface;
//! they say nothing about content.

use uuid::Uuid;

use crate::element::{Root, walk_elements_mut};

use super::attrs;

/// Source of the random-looking middle part of identity keys.
pub trait TokenSource {
    fn next_token(&mut self) -> String;
}

/// Tokens drawn from UUID v4 randomness.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomTokens;

impl TokenSource for RandomTokens {
    fn next_token(&mut self) -> String {
        let mut token = Uuid::new_v4().simple().to_string();
        token.truncate(10);
        token
    }
}

/// Monotonic counter tokens, for reproducible output.
#[derive(Debug, Default, Clone)]
pub struct SequentialTokens {
    next: u64,
}

impl SequentialTokens {
    pub const fn new() -> Self {
        Self { next: 0 }
    }
}

impl TokenSource for SequentialTokens {
    fn next_token(&mut self) -> String {
        let token = format!("{:06x}", self.next);
        self.next += 1;
        token
    }
}

/// Assign identity keys to elements that lack one. Returns how many were
/// assigned.
pub fn assign_keys(root: &mut Root, tokens: &mut dyn TokenSource) -> usize {
    let mut assigned = 0;
    walk_elements_mut(root, &mut |el, _parent, index| {
        if el.properties.contains_key(attrs::KEY) {
            return;
        }
        let key = format!("{}-{}-{}", el.tag_name, tokens.next_token(), index);
        el.properties.insert(attrs::KEY.to_string(), key.into());
        assigned += 1;
    });
    tracing::trace!(assigned, "identity keys assigned");
    assigned
}
