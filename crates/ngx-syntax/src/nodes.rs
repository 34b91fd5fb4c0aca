//! Arena storage for tokens, nodes and child lists.
//!
//! Everything is addressed by `u32` index into boxed slices owned by the
//! tree. Token 0 is a zero-length sentinel so that the start of any token (or
//! of any node, empty ones included) is the end of the token before it.

use text_size::{TextRange, TextSize};

use crate::SyntaxKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Token {
    pub(crate) kind: SyntaxKind,
    pub(crate) attached_trivia: AttachedTrivia,
    pub(crate) end: TextSize,
    pub(crate) parent: u32,
}

/// How many trivia tokens sit directly before and after a significant token.
///
/// Trivia tokens themselves carry `AttachedTrivia::NONE`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct AttachedTrivia {
    leading: u32,
    trailing: u32,
}

impl AttachedTrivia {
    pub(crate) const NONE: Self = Self { leading: 0, trailing: 0 };

    #[inline]
    pub(crate) fn new(leading: usize, trailing: usize) -> Self {
        let leading = u32::try_from(leading).expect("too much leading trivia");
        let trailing = u32::try_from(trailing).expect("too much trailing trivia");
        Self { leading, trailing }
    }

    #[inline]
    pub(crate) fn leading(self) -> u32 {
        self.leading
    }

    #[inline]
    pub(crate) fn trailing(self) -> u32 {
        self.trailing
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Node {
    pub(crate) parent: Option<u32>,
    pub(crate) children_start: u32,
    pub(crate) children_len: u32,
    pub(crate) kind: SyntaxKind,
    /// First token (trivia included) spanned by the node.
    pub(crate) first_token: u32,
    /// One past the last token spanned by the node.
    pub(crate) end_token: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Child {
    Token(u32),
    Node(u32),
}

/// Owning storage for one tree.
#[derive(PartialEq, Eq)]
pub(crate) struct TreeInner {
    pub(crate) text: Box<str>,
    /// Always starts with the sentinel token.
    pub(crate) tokens: Box<[Token]>,
    /// The root is always at index 0.
    pub(crate) nodes: Box<[Node]>,
    pub(crate) children: Box<[Child]>,
}

impl TreeInner {
    #[inline]
    pub(crate) fn token(&self, index: u32) -> &Token {
        &self.tokens[index as usize]
    }

    #[inline]
    pub(crate) fn node(&self, index: u32) -> &Node {
        &self.nodes[index as usize]
    }

    #[inline]
    pub(crate) fn token_range(&self, index: u32) -> TextRange {
        let start = self.token(index - 1).end;
        TextRange::new(start, self.token(index).end)
    }

    #[inline]
    pub(crate) fn node_range(&self, index: u32) -> TextRange {
        let node = self.node(index);
        let start = self.token(node.first_token - 1).end;
        let end = self.token(node.end_token - 1).end;
        TextRange::new(start, end)
    }

    #[inline]
    pub(crate) fn node_children(&self, index: u32) -> &[Child] {
        let node = self.node(index);
        let start = node.children_start as usize;
        &self.children[start..start + node.children_len as usize]
    }
}
