//! Incremental builder for the immutable syntax tree.

use text_size::TextSize;

use crate::nodes::{AttachedTrivia, Child, Node, Token, TreeInner};
use crate::{SyntaxKind, SyntaxTree, TriviaPiece};

/// Builds a `SyntaxTree` from a well-nested sequence of node starts, tokens
/// and node finishes.
pub struct Builder {
    text: Box<str>,
    tokens: Vec<Token>,
    nodes: Vec<Node>,
    children: Vec<Child>,

    /// Children of the currently opened nodes, innermost last.
    pending: Vec<Child>,
    /// Opened nodes with the index into `pending` where their children begin.
    opened: Vec<(u32, usize)>,
    text_len: TextSize,
}

impl Drop for Builder {
    fn drop(&mut self) {
        if !std::thread::panicking() && !self.opened.is_empty() {
            panic!("you should call `Builder::finish()`");
        }
    }
}

const DEFAULT_TREE_DEPTH: usize = 32;
const DEFAULT_TREE_SIZE: usize = 1024;

impl Builder {
    /// Creates a new builder for `text`.
    ///
    /// The token buffer is seeded with a sentinel at index 0 to make token
    /// ranges uniform.
    pub fn new(text: &str) -> Self {
        let mut tokens = Vec::with_capacity(DEFAULT_TREE_SIZE);
        tokens.push(Token {
            kind: SyntaxKind::TOMBSTONE,
            attached_trivia: AttachedTrivia::NONE,
            end: TextSize::new(0),
            parent: 0,
        });
        Self {
            text: text.into(),
            tokens,
            nodes: Vec::with_capacity(DEFAULT_TREE_SIZE / 4),
            children: Vec::with_capacity(DEFAULT_TREE_SIZE),
            pending: Vec::with_capacity(DEFAULT_TREE_SIZE / 4),
            opened: Vec::with_capacity(DEFAULT_TREE_DEPTH),
            text_len: TextSize::new(0),
        }
    }

    #[track_caller]
    fn current_node(&self) -> u32 {
        self.opened.last().expect("no opened nodes?").0
    }

    /// Starts a new node of the given kind.
    pub fn start_node(&mut self, kind: SyntaxKind) {
        assert!(!kind.is_token(), "`{kind:?}` is not a node kind");
        let parent = self.opened.last().map(|&(node, _)| node);
        assert!(parent.is_some() || self.nodes.is_empty(), "a tree has exactly one root");

        let index = to_u32(self.nodes.len());
        let first_token = to_u32(self.tokens.len());
        self.nodes.push(Node {
            parent,
            children_start: 0,
            children_len: 0,
            kind,
            first_token,
            end_token: first_token,
        });
        if parent.is_some() {
            self.pending.push(Child::Node(index));
        }
        self.opened.push((index, self.pending.len()));
    }

    /// Finishes the most recently started node.
    pub fn finish_node(&mut self) {
        let (index, children_start) = self.opened.pop().expect("no opened nodes?");
        let end_token = to_u32(self.tokens.len());
        let node = &mut self.nodes[index as usize];
        node.end_token = end_token;
        node.children_start = to_u32(self.children.len());
        node.children_len = to_u32(self.pending.len() - children_start);
        self.children.extend(self.pending.drain(children_start..));
    }

    /// Adds a token with its leading and trailing trivia.
    pub fn token(
        &mut self,
        leading_trivia: &[TriviaPiece],
        kind: SyntaxKind,
        text_len: TextSize,
        trailing_trivia: &[TriviaPiece],
    ) {
        assert!(kind.is_token() && !kind.is_trivia(), "`{kind:?}` is not a significant token");
        let parent = self.current_node();

        for piece in leading_trivia {
            self.push_token(piece.kind.to_syntax_kind(), AttachedTrivia::NONE, piece.len, parent);
        }
        let attached = AttachedTrivia::new(leading_trivia.len(), trailing_trivia.len());
        let token = self.push_token(kind, attached, text_len, parent);
        self.pending.push(Child::Token(token));
        for piece in trailing_trivia {
            self.push_token(piece.kind.to_syntax_kind(), AttachedTrivia::NONE, piece.len, parent);
        }
    }

    fn push_token(
        &mut self,
        kind: SyntaxKind,
        attached_trivia: AttachedTrivia,
        len: TextSize,
        parent: u32,
    ) -> u32 {
        self.text_len += len;
        assert!(
            self.text.is_char_boundary(usize::from(self.text_len)),
            "token ends at {:?}, which is not a char boundary",
            self.text_len
        );
        let index = to_u32(self.tokens.len());
        self.tokens.push(Token { kind, attached_trivia, end: self.text_len, parent });
        index
    }

    /// Finishes building and returns the immutable `SyntaxTree`.
    pub fn finish(mut self) -> SyntaxTree {
        assert!(self.opened.is_empty(), "unfinished nodes");
        assert!(!self.nodes.is_empty(), "a tree needs a root node");
        assert_eq!(
            usize::from(self.text_len),
            self.text.len(),
            "tokens must cover the whole text"
        );

        let tree = SyntaxTree {
            inner: TreeInner {
                text: std::mem::take(&mut self.text),
                tokens: std::mem::take(&mut self.tokens).into_boxed_slice(),
                nodes: std::mem::take(&mut self.nodes).into_boxed_slice(),
                children: std::mem::take(&mut self.children).into_boxed_slice(),
            },
        };
        #[cfg(debug_assertions)]
        tree.assert_invariants();
        tree
    }
}

#[inline]
fn to_u32(index: usize) -> u32 {
    u32::try_from(index).expect("syntax tree too large")
}
