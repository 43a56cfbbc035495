//! Token and tree primitives (component A).
//!
//! Tokens live in a single arena owned by the [`Engine`](crate::Engine) for the
//! duration of a parse. Every cross-reference (`next`, `prev`, `child`, `tail`,
//! `mate`) is an index into that arena rather than a pointer, so the tree can be
//! torn down in one step by dropping the arena.

use crate::kind::TokenKind;

/// An index into a [`TokenArena`]. Stable for the lifetime of the arena that
/// produced it.
pub type TokenId = usize;

/// A single node in the token tree: a half-open byte range tagged with a
/// [`TokenKind`], plus the sibling/child/mate links that make up the tree.
///
/// `can_open`/`can_close` are only meaningful for ambidextrous kinds (see
/// [`TokenKind::is_ambidextrous`]); every other kind leaves them at their
/// default of `true`, matching the reference engine where the fields exist on
/// every token but are only inspected for a handful of kinds.
#[derive(Clone, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub len: usize,
    pub next: Option<TokenId>,
    pub prev: Option<TokenId>,
    pub child: Option<TokenId>,
    /// Last sibling of this token's children. Only valid when read from the
    /// *first* child of a parent; see the crate-level invariant notes.
    pub tail: Option<TokenId>,
    pub mate: Option<TokenId>,
    pub can_open: bool,
    pub can_close: bool,
}

impl Token {
    fn new(kind: TokenKind, start: usize, len: usize) -> Self {
        Token {
            kind,
            start,
            len,
            next: None,
            prev: None,
            child: None,
            tail: None,
            mate: None,
            can_open: true,
            can_close: true,
        }
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Owns every [`Token`] produced while parsing a single document.
///
/// Unreachable tokens (pruned siblings, replaced line-token shells) are simply
/// left as unused entries; there is no explicit free, because the whole arena
/// is reclaimed at once when the [`Engine`](crate::Engine) is dropped. This is
/// the Rust analogue of the reference engine's optional token-pool allocator,
/// whose lifetime is likewise the lifetime of the owning engine.
#[derive(Debug, Default)]
pub struct TokenArena {
    tokens: Vec<Token>,
}

impl TokenArena {
    pub fn new() -> Self {
        TokenArena { tokens: Vec::new() }
    }

    pub fn alloc(&mut self, kind: TokenKind, start: usize, len: usize) -> TokenId {
        self.tokens.push(Token::new(kind, start, len));
        self.tokens.len() - 1
    }

    #[inline]
    pub fn get(&self, id: TokenId) -> &Token {
        &self.tokens[id]
    }

    #[inline]
    pub fn get_mut(&mut self, id: TokenId) -> &mut Token {
        &mut self.tokens[id]
    }

    pub fn text<'s>(&self, id: TokenId, source: &'s str) -> &'s str {
        let t = self.get(id);
        &source[t.start..t.end()]
    }

    /// Appends `child` as the new last child of `parent`, maintaining the
    /// `tail`-on-first-sibling cache in O(1).
    pub fn append_child(&mut self, parent: TokenId, child: TokenId) {
        self.get_mut(child).prev = None;
        self.get_mut(child).next = None;

        match self.get(parent).child {
            None => {
                self.get_mut(parent).child = Some(child);
                self.get_mut(child).tail = Some(child);
            }
            Some(first) => {
                let last = self.get(first).tail.unwrap_or(first);
                self.get_mut(last).next = Some(child);
                self.get_mut(child).prev = Some(last);
                self.get_mut(first).tail = Some(child);
            }
        }
    }

    /// Removes and returns `parent`'s first child, relinking the remaining
    /// chain (and its cached `tail`) to start at the new head.
    pub fn remove_first_child(&mut self, parent: TokenId) -> Option<TokenId> {
        let first = self.get(parent).child?;
        let tail = self.get(first).tail;
        let rest = self.get(first).next;

        self.get_mut(parent).child = rest;
        if let Some(rest) = rest {
            self.get_mut(rest).prev = None;
            self.get_mut(rest).tail = tail;
        }
        self.get_mut(first).next = None;
        self.get_mut(first).tail = None;
        Some(first)
    }

    pub fn remove_last_child(&mut self, parent: TokenId) -> Option<TokenId> {
        let first = self.get(parent).child?;
        let last = self.get(first).tail.unwrap_or(first);

        if last == first {
            self.get_mut(parent).child = None;
            self.get_mut(first).tail = None;
            return Some(first);
        }

        let new_last = self.get(last).prev.unwrap();
        self.get_mut(new_last).next = None;
        self.get_mut(first).tail = Some(new_last);
        self.get_mut(last).prev = None;
        Some(last)
    }

    /// Removes the closed range of siblings `[from, to]` from whatever chain
    /// contains them, relinking their former neighbors. Used both for
    /// "prune" (drop these tokens) and for `PRUNE_MATCH` reparenting, where
    /// the caller re-attaches the removed range as children of a pair token.
    pub fn unlink_range(&mut self, from: TokenId, to: TokenId) {
        let before = self.get(from).prev;
        let after = self.get(to).next;

        if let Some(before) = before {
            self.get_mut(before).next = after;
        }
        if let Some(after) = after {
            self.get_mut(after).prev = before;
        }

        self.get_mut(from).prev = None;
        self.get_mut(to).next = None;
    }

    /// Finds the parent's cached or computed last child. Falls back to a
    /// linear walk when `tail` wasn't maintained for this token (e.g. it is
    /// not the first sibling) -- see the open question in the design notes
    /// about the ATX header marker's `tail` lookup.
    pub fn last_child(&self, parent: TokenId) -> Option<TokenId> {
        let first = self.get(parent).child?;
        match self.get(first).tail {
            Some(tail) => Some(tail),
            None => {
                let mut cur = first;
                while let Some(next) = self.get(cur).next {
                    cur = next;
                }
                Some(cur)
            }
        }
    }

    pub fn children(&self, parent: TokenId) -> Vec<TokenId> {
        let mut out = Vec::new();
        let mut cur = self.get(parent).child;
        while let Some(id) = cur {
            out.push(id);
            cur = self.get(id).next;
        }
        out
    }

    pub fn siblings_from(&self, first: TokenId) -> Vec<TokenId> {
        let mut out = Vec::new();
        let mut cur = Some(first);
        while let Some(id) = cur {
            out.push(id);
            cur = self.get(id).next;
        }
        out
    }
}
