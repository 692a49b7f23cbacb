//! Per-line token tree.
//!
//! The lexer collects one line's tokens into a small tree: siblings in
//! source order, with bracketed groups hanging a nested expression under
//! the bracket token. Nodes live in a single `Vec` arena that is reset and
//! reused between lines; links are indices into the arena.

use crate::error::{Error, Result};

/// Token categories produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    /// Synthetic top node of each line.
    Root,
    /// `( ... )` group.
    Parenthesis,
    /// `[ ... ]` group.
    SquareBrackets,
    /// `{ ... }` group.
    CurlyBrackets,
    /// Bare or quoted text.
    Text,
    /// Integer-looking literal (kept as text).
    Integer,
    /// Decimal-looking literal (kept as text).
    Decimal,
    /// `:`.
    Assign,
    /// Leading `-`.
    ListItem,
    /// Leading `$`.
    Directive,
    /// `,` between expressions inside a group.
    ExpressionBreak,
    /// Synthetic expression node under a bracket token.
    Block,
    /// `%name`.
    Reference,
}

/// Index of a token in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TokenId(u32);

pub(crate) struct Token {
    kind: TokenKind,
    text: String,
    next: Option<TokenId>,
    child: Option<TokenId>,
    parent: Option<TokenId>,
}

/// Arena of one line's tokens. Index 0 is always the synthetic root.
pub(crate) struct TokenTree {
    nodes: Vec<Token>,
}

impl TokenTree {
    pub(crate) const ROOT: TokenId = TokenId(0);

    pub(crate) fn new() -> Self {
        let mut tree = TokenTree { nodes: Vec::new() };
        tree.clear();
        tree
    }

    /// Resets the tree for the next line, keeping the allocation.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.nodes.push(Token {
            kind: TokenKind::Root,
            text: String::new(),
            next: None,
            child: None,
            parent: None,
        });
    }

    fn node(&self, id: TokenId) -> &Token {
        &self.nodes[id.0 as usize]
    }

    fn node_mut(&mut self, id: TokenId) -> &mut Token {
        &mut self.nodes[id.0 as usize]
    }

    pub(crate) fn kind(&self, id: TokenId) -> TokenKind {
        self.node(id).kind
    }

    pub(crate) fn text(&self, id: TokenId) -> &str {
        &self.node(id).text
    }

    pub(crate) fn next(&self, id: TokenId) -> Option<TokenId> {
        self.node(id).next
    }

    pub(crate) fn child(&self, id: TokenId) -> Option<TokenId> {
        self.node(id).child
    }

    pub(crate) fn parent(&self, id: TokenId) -> Option<TokenId> {
        self.node(id).parent
    }

    pub(crate) fn has_children(&self, id: TokenId) -> bool {
        self.node(id).child.is_some()
    }

    /// Appends a token under `parent`: as the next sibling of `after`, or
    /// as the first child when `after` is `None`.
    pub(crate) fn append(
        &mut self,
        parent: TokenId,
        after: Option<TokenId>,
        kind: TokenKind,
        text: String,
    ) -> TokenId {
        let id = TokenId(self.nodes.len() as u32);
        self.nodes.push(Token {
            kind,
            text,
            next: None,
            child: None,
            parent: Some(parent),
        });
        match after {
            Some(prev) => self.node_mut(prev).next = Some(id),
            None => self.node_mut(parent).child = Some(id),
        }
        id
    }

    /// The sibling after `id`; its absence is a grammar error.
    pub(crate) fn expect_next(&self, id: TokenId) -> Result<TokenId> {
        self.next(id)
            .ok_or_else(|| Error::grammar("unexpected end of line"))
    }

    /// The first child of `id`; its absence is a grammar error.
    pub(crate) fn expect_child(&self, id: TokenId) -> Result<TokenId> {
        self.child(id)
            .ok_or_else(|| Error::grammar("data missing"))
    }
}
