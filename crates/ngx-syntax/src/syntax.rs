//! Public syntax tree API built on immutable, parent-linked nodes.

use std::fmt::{self, Write as _};
use std::hash::{Hash, Hasher};

use text_size::{TextRange, TextSize};

use crate::SyntaxKind;
use crate::nodes::{Child, TreeInner};

/// Owned syntax tree for a single source text.
#[derive(PartialEq, Eq)]
pub struct SyntaxTree {
    pub(crate) inner: TreeInner,
}

impl SyntaxTree {
    /// Returns the root syntax node.
    #[inline]
    pub fn root(&self) -> SyntaxNode<'_> {
        SyntaxNode { tree: &self.inner, index: 0 }
    }

    /// Returns the full source text for this tree.
    #[inline]
    pub fn text(&self) -> &str {
        &self.inner.text
    }

    /// Iterates over every token in source order, trivia included.
    pub fn tokens(&self) -> impl DoubleEndedIterator<Item = SyntaxToken<'_>> + ExactSizeIterator {
        let tree = &self.inner;
        (1..tree.tokens.len() as u32).map(move |index| SyntaxToken { tree, index })
    }

    /// Checks the structural invariants of the tree and panics on the first
    /// violation.
    ///
    /// Siblings must tile their parent's range in order, every node but the
    /// root must be listed by exactly one parent, and the tokens must cover
    /// the text without gaps.
    pub fn assert_invariants(&self) {
        let tree = &self.inner;
        let text_len = TextSize::of(&*tree.text);

        assert_eq!(tree.token(0).end, TextSize::new(0), "sentinel token must be empty");
        assert!(
            tree.tokens.windows(2).all(|pair| pair[0].end <= pair[1].end),
            "token ends must be monotonic"
        );
        assert_eq!(tree.tokens.last().map(|token| token.end), Some(text_len));

        let root = tree.node(0);
        assert_eq!(root.parent, None, "root must not have a parent");
        assert_eq!(tree.node_range(0), TextRange::up_to(text_len), "root must span the text");

        let mut listed = vec![0u32; tree.nodes.len()];
        for index in 0..tree.nodes.len() as u32 {
            let range = tree.node_range(index);
            let mut cursor = range.start();

            for &child in tree.node_children(index) {
                let child_range = match child {
                    Child::Node(child) => {
                        assert_eq!(tree.node(child).parent, Some(index), "wrong parent link");
                        assert!(child > index, "child node created before its parent");
                        listed[child as usize] += 1;
                        tree.node_range(child)
                    }
                    Child::Token(token) => {
                        let handle = SyntaxToken { tree, index: token };
                        assert!(!handle.is_trivia(), "trivia listed as a child");
                        for token in
                            handle.leading_trivia().chain([handle]).chain(handle.trailing_trivia())
                        {
                            assert_eq!(tree.token(token.index).parent, index, "wrong token parent");
                        }
                        handle.text_range()
                    }
                };
                assert_eq!(child_range.start(), cursor, "children of {index} leave a gap");
                assert!(range.contains_range(child_range), "child outside of its parent");
                cursor = child_range.end();
            }
            assert_eq!(cursor, range.end(), "children of {index} do not reach the end");
        }

        assert_eq!(listed[0], 0, "root listed as a child");
        assert!(listed[1..].iter().all(|&count| count == 1), "node without exactly one parent");
    }

    /// Renders the tree in an indented, one element per line format.
    pub fn debug_dump(&self) -> String {
        self.root().debug_dump()
    }
}

impl fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("text_len", &self.text().len())
            .field("nodes", &self.inner.nodes.len())
            .finish_non_exhaustive()
    }
}

/// Token handle tied to the lifetime of the tree.
#[derive(Clone, Copy)]
pub struct SyntaxToken<'a> {
    tree: &'a TreeInner,
    index: u32,
}

impl<'a> SyntaxToken<'a> {
    /// Returns this token's kind.
    #[inline]
    pub fn kind(self) -> SyntaxKind {
        self.tree.token(self.index).kind
    }

    /// Returns `true` if this token is trivia.
    #[inline]
    pub fn is_trivia(self) -> bool {
        self.kind().is_trivia()
    }

    /// Returns the token text range including attached trivia.
    #[inline]
    pub fn text_range(self) -> TextRange {
        let first = self.leading_trivia().next().unwrap_or(self);
        let last = self.trailing_trivia().next_back().unwrap_or(self);
        TextRange::new(first.trimmed_range().start(), last.trimmed_range().end())
    }

    /// Returns the token text range excluding trivia.
    #[inline]
    pub fn trimmed_range(self) -> TextRange {
        self.tree.token_range(self.index)
    }

    /// Returns the token text including trivia.
    #[inline]
    pub fn text(self) -> &'a str {
        &self.tree.text[self.text_range()]
    }

    /// Returns the token text excluding trivia.
    #[inline]
    pub fn text_trimmed(self) -> &'a str {
        &self.tree.text[self.trimmed_range()]
    }

    /// Returns the previous token in the arena, trivia included.
    #[inline]
    pub fn prev_token(self) -> Option<Self> {
        (self.index > 1).then(|| Self { tree: self.tree, index: self.index - 1 })
    }

    /// Returns the next token in the arena, trivia included.
    #[inline]
    pub fn next_token(self) -> Option<Self> {
        let index = self.index + 1;
        ((index as usize) < self.tree.tokens.len()).then_some(Self { tree: self.tree, index })
    }

    /// Iterates over leading trivia tokens.
    #[inline]
    pub fn leading_trivia(self) -> TriviaIter<'a> {
        let count = self.tree.token(self.index).attached_trivia.leading();
        TriviaIter { tree: self.tree, start: self.index - count, end: self.index }
    }

    /// Iterates over trailing trivia tokens.
    #[inline]
    pub fn trailing_trivia(self) -> TriviaIter<'a> {
        let count = self.tree.token(self.index).attached_trivia.trailing();
        TriviaIter { tree: self.tree, start: self.index + 1, end: self.index + 1 + count }
    }

    /// Returns the parent node.
    #[inline]
    pub fn parent(self) -> SyntaxNode<'a> {
        SyntaxNode { tree: self.tree, index: self.tree.token(self.index).parent }
    }

    /// Returns an iterator of parent nodes, starting from the immediate parent.
    #[inline]
    pub fn parent_ancestors(self) -> impl Iterator<Item = SyntaxNode<'a>> + Clone {
        self.parent().ancestors()
    }
}

impl PartialEq for SyntaxToken<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.index == other.index
    }
}

impl Eq for SyntaxToken<'_> {}

impl Hash for SyntaxToken<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(self.tree, state);
        self.index.hash(state);
    }
}

impl fmt::Debug for SyntaxToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?} {:?}", self.kind(), self.trimmed_range(), self.text_trimmed())
    }
}

impl fmt::Display for SyntaxToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text_trimmed())
    }
}

/// Iterator over trivia tokens.
#[derive(Clone)]
pub struct TriviaIter<'a> {
    tree: &'a TreeInner,
    start: u32,
    end: u32,
}

impl<'a> Iterator for TriviaIter<'a> {
    type Item = SyntaxToken<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.start == self.end {
            return None;
        }
        let index = self.start;
        self.start += 1;
        Some(SyntaxToken { tree: self.tree, index })
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = (self.end - self.start) as usize;
        (len, Some(len))
    }
}

impl DoubleEndedIterator for TriviaIter<'_> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.start == self.end {
            return None;
        }
        self.end -= 1;
        Some(SyntaxToken { tree: self.tree, index: self.end })
    }
}

impl ExactSizeIterator for TriviaIter<'_> {}

/// Node handle tied to the lifetime of the tree.
#[derive(Clone, Copy)]
pub struct SyntaxNode<'a> {
    tree: &'a TreeInner,
    index: u32,
}

impl<'a> SyntaxNode<'a> {
    /// Returns this node's kind.
    #[inline]
    pub fn kind(self) -> SyntaxKind {
        self.tree.node(self.index).kind
    }

    /// Returns the text range covered by this node, trivia included.
    #[inline]
    pub fn text_range(self) -> TextRange {
        self.tree.node_range(self.index)
    }

    /// Returns the range with leading/trailing trivia trimmed away.
    #[inline]
    pub fn trimmed_range(self) -> TextRange {
        match (self.first_token(), self.last_token()) {
            (Some(first), Some(last)) => {
                TextRange::new(first.trimmed_range().start(), last.trimmed_range().end())
            }
            _ => TextRange::empty(self.text_range().start()),
        }
    }

    /// Returns the text slice covered by this node.
    #[inline]
    pub fn text(self) -> &'a str {
        &self.tree.text[self.text_range()]
    }

    /// Returns the text slice excluding leading/trailing trivia.
    #[inline]
    pub fn text_trimmed(self) -> &'a str {
        &self.tree.text[self.trimmed_range()]
    }

    /// Returns the parent node if any.
    #[inline]
    pub fn parent(self) -> Option<Self> {
        let parent = self.tree.node(self.index).parent?;
        Some(Self { tree: self.tree, index: parent })
    }

    /// Returns an iterator of ancestors starting from this node.
    #[inline]
    pub fn ancestors(self) -> impl Iterator<Item = SyntaxNode<'a>> + Clone {
        std::iter::successors(Some(self), |it| it.parent())
    }

    /// Iterates children including tokens.
    #[inline]
    pub fn children_with_tokens(self) -> ChildrenWithTokens<'a> {
        ChildrenWithTokens { tree: self.tree, children: self.tree.node_children(self.index).iter() }
    }

    /// Iterates child nodes, skipping tokens.
    #[inline]
    pub fn children(self) -> Children<'a> {
        Children { inner: self.children_with_tokens() }
    }

    /// Child nodes of the given kind, in source order.
    #[inline]
    pub fn children_of_kind(self, kind: SyntaxKind) -> impl Iterator<Item = SyntaxNode<'a>> {
        children_of_kind(self, kind)
    }

    /// Direct child tokens, in source order.
    #[inline]
    pub fn child_tokens(self) -> impl DoubleEndedIterator<Item = SyntaxToken<'a>> {
        self.children_with_tokens().filter_map(NodeOrToken::into_token)
    }

    /// Returns the first non-trivia token spanned by this node.
    pub fn first_token(self) -> Option<SyntaxToken<'a>> {
        let node = self.tree.node(self.index);
        (node.first_token..node.end_token)
            .map(|index| SyntaxToken { tree: self.tree, index })
            .find(|token| !token.is_trivia())
    }

    /// Returns the last non-trivia token spanned by this node.
    pub fn last_token(self) -> Option<SyntaxToken<'a>> {
        let node = self.tree.node(self.index);
        (node.first_token..node.end_token)
            .rev()
            .map(|index| SyntaxToken { tree: self.tree, index })
            .find(|token| !token.is_trivia())
    }

    /// Returns the token at the given offset, if any.
    pub fn token_at_offset(self, offset: TextSize) -> TokenAtOffset<SyntaxToken<'a>> {
        let node = self.tree.node(self.index);
        if !self.text_range().contains_inclusive(offset) {
            return TokenAtOffset::None;
        }

        let tokens = &self.tree.tokens[node.first_token as usize..node.end_token as usize];
        let position = tokens.partition_point(|token| token.end < offset);
        if position == tokens.len() {
            return TokenAtOffset::None;
        }

        let left = SyntaxToken { tree: self.tree, index: node.first_token + position as u32 };
        let right = left.index + 1;
        if left.trimmed_range().end() == offset && right < node.end_token {
            TokenAtOffset::Between(left, SyntaxToken { tree: self.tree, index: right })
        } else {
            TokenAtOffset::Single(left)
        }
    }

    /// Returns the smallest element that fully covers `range`.
    pub fn covering_element(self, range: TextRange) -> SyntaxElement<'a> {
        let Some(token) = self.token_at_offset(range.start()).right_biased() else {
            return NodeOrToken::Node(self);
        };
        if token.trimmed_range().contains_range(range) {
            return NodeOrToken::Token(token);
        }
        let node = token
            .parent_ancestors()
            .find(|ancestor| ancestor.text_range().contains_range(range))
            .unwrap_or(self);
        NodeOrToken::Node(node)
    }

    /// Returns a preorder iterator over nodes.
    #[inline]
    pub fn preorder(self) -> Preorder<'a> {
        Preorder::new(self)
    }

    /// Returns a preorder iterator over nodes and tokens.
    #[inline]
    pub fn preorder_with_tokens(self) -> PreorderWithTokens<'a> {
        PreorderWithTokens::new(self)
    }

    /// All nodes of the subtree in preorder, this node first.
    pub fn descendants(self) -> impl Iterator<Item = SyntaxNode<'a>> {
        self.preorder().filter_map(|event| match event {
            WalkEvent::Enter(node) => Some(node),
            WalkEvent::Leave(_) => None,
        })
    }

    /// Renders the subtree in an indented, one element per line format.
    pub fn debug_dump(self) -> String {
        let mut buf = String::new();
        let mut indent = 0;
        for event in self.preorder_with_tokens() {
            match event {
                WalkEventWithTokens::EnterNode(node) => {
                    _ = writeln!(buf, "{:indent$}{:?}@{:?}", "", node.kind(), node.text_range());
                    indent += 2;
                }
                WalkEventWithTokens::LeaveNode(_) => indent -= 2,
                WalkEventWithTokens::Token(token) => {
                    for token in
                        token.leading_trivia().chain([token]).chain(token.trailing_trivia())
                    {
                        _ = writeln!(buf, "{:indent$}{token:?}", "");
                    }
                }
            }
        }
        buf
    }
}

impl PartialEq for SyntaxNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.index == other.index
    }
}

impl Eq for SyntaxNode<'_> {}

impl Hash for SyntaxNode<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(self.tree, state);
        self.index.hash(state);
    }
}

impl fmt::Debug for SyntaxNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?}", self.kind(), self.text_range())
    }
}

impl fmt::Display for SyntaxNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Child nodes of `node` with the given kind, in source order.
///
/// This is a filtered view over the owned child list; it costs one pass over
/// the children per call.
pub fn children_of_kind<'a>(
    node: SyntaxNode<'a>,
    kind: SyntaxKind,
) -> impl Iterator<Item = SyntaxNode<'a>> {
    node.children().filter(move |child| child.kind() == kind)
}

/// Node or token element inside the tree.
pub type SyntaxElement<'a> = NodeOrToken<SyntaxNode<'a>, SyntaxToken<'a>>;

impl<'a> SyntaxElement<'a> {
    pub fn kind(&self) -> SyntaxKind {
        match self {
            NodeOrToken::Node(node) => node.kind(),
            NodeOrToken::Token(token) => token.kind(),
        }
    }

    pub fn text_range(&self) -> TextRange {
        match self {
            NodeOrToken::Node(node) => node.text_range(),
            NodeOrToken::Token(token) => token.text_range(),
        }
    }
}

/// Iterator over children including tokens.
#[derive(Clone)]
pub struct ChildrenWithTokens<'a> {
    tree: &'a TreeInner,
    children: std::slice::Iter<'a, Child>,
}

impl<'a> ChildrenWithTokens<'a> {
    #[inline]
    fn map_child(&self, child: Child) -> SyntaxElement<'a> {
        let tree = self.tree;
        match child {
            Child::Token(index) => NodeOrToken::Token(SyntaxToken { tree, index }),
            Child::Node(index) => NodeOrToken::Node(SyntaxNode { tree, index }),
        }
    }
}

impl<'a> Iterator for ChildrenWithTokens<'a> {
    type Item = SyntaxElement<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let child = *self.children.next()?;
        Some(self.map_child(child))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.children.size_hint()
    }
}

impl DoubleEndedIterator for ChildrenWithTokens<'_> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        let child = *self.children.next_back()?;
        Some(self.map_child(child))
    }
}

impl ExactSizeIterator for ChildrenWithTokens<'_> {}

/// Iterator over child nodes only.
#[derive(Clone)]
pub struct Children<'a> {
    inner: ChildrenWithTokens<'a>,
}

impl<'a> Iterator for Children<'a> {
    type Item = SyntaxNode<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.find_map(NodeOrToken::into_node)
    }
}

impl DoubleEndedIterator for Children<'_> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.by_ref().rev().find_map(NodeOrToken::into_node)
    }
}

/// Preorder traversal over nodes.
#[derive(Clone)]
pub struct Preorder<'a> {
    inner: PreorderWithTokens<'a>,
}

impl<'a> Preorder<'a> {
    #[inline]
    fn new(start: SyntaxNode<'a>) -> Self {
        Self { inner: PreorderWithTokens::new(start) }
    }

    /// Skips the current subtree during traversal.
    #[inline]
    pub fn skip_subtree(&mut self) {
        self.inner.skip_subtree();
    }
}

impl<'a> Iterator for Preorder<'a> {
    type Item = WalkEvent<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.find_map(|item| match item {
            WalkEventWithTokens::EnterNode(it) => Some(WalkEvent::Enter(it)),
            WalkEventWithTokens::LeaveNode(it) => Some(WalkEvent::Leave(it)),
            WalkEventWithTokens::Token(_) => None,
        })
    }
}

/// Preorder walk event for nodes.
#[derive(Clone, Copy, Debug)]
pub enum WalkEvent<'a> {
    Enter(SyntaxNode<'a>),
    Leave(SyntaxNode<'a>),
}

/// Preorder traversal over nodes and tokens.
#[derive(Clone)]
pub struct PreorderWithTokens<'a> {
    stack: Vec<(SyntaxNode<'a>, ChildrenWithTokens<'a>)>,
    root: Option<SyntaxNode<'a>>,
}

impl<'a> PreorderWithTokens<'a> {
    #[inline]
    fn new(start: SyntaxNode<'a>) -> Self {
        Self { stack: Vec::with_capacity(16), root: Some(start) }
    }

    /// Skips the current subtree during traversal.
    ///
    /// Call right after receiving the `EnterNode` event of that subtree; its
    /// `LeaveNode` event is skipped as well.
    #[inline]
    pub fn skip_subtree(&mut self) {
        assert!(self.stack.pop().is_some(), "must have a subtree to skip");
    }
}

impl<'a> Iterator for PreorderWithTokens<'a> {
    type Item = WalkEventWithTokens<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if let Some(root) = self.root.take() {
            self.stack.push((root, root.children_with_tokens()));
            return Some(WalkEventWithTokens::EnterNode(root));
        }
        let (_, active_node) = self.stack.last_mut()?;
        match active_node.next() {
            Some(NodeOrToken::Node(child)) => {
                self.stack.push((child, child.children_with_tokens()));
                Some(WalkEventWithTokens::EnterNode(child))
            }
            Some(NodeOrToken::Token(child)) => Some(WalkEventWithTokens::Token(child)),
            None => {
                let (exited_node, _) = self.stack.pop()?;
                Some(WalkEventWithTokens::LeaveNode(exited_node))
            }
        }
    }
}

/// Preorder walk event including tokens.
#[derive(Clone, Copy, Debug)]
pub enum WalkEventWithTokens<'a> {
    EnterNode(SyntaxNode<'a>),
    LeaveNode(SyntaxNode<'a>),
    Token(SyntaxToken<'a>),
}

/// Identifies a node by kind and trimmed range, so it can be found again in
/// another tree built from the same text.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SyntaxNodePtr {
    /// Node kind used for lookup.
    pub kind: SyntaxKind,
    /// Non-trivia text range used for lookup.
    pub range: TextRange,
}

impl SyntaxNodePtr {
    /// Builds a pointer from a concrete node.
    pub fn new(node: SyntaxNode<'_>) -> Self {
        Self { kind: node.kind(), range: node.trimmed_range() }
    }

    /// Attempts to resolve this pointer within `root`.
    pub fn try_to_node<'a>(&self, root: SyntaxNode<'a>) -> Option<SyntaxNode<'a>> {
        if root.parent().is_some() {
            return None;
        }

        let start_node = match root.covering_element(self.range) {
            NodeOrToken::Node(node) => node,
            NodeOrToken::Token(token) => token.parent(),
        };
        start_node
            .ancestors()
            .find(|node| node.kind() == self.kind && node.trimmed_range() == self.range)
    }
}

/// Node-or-token wrapper used throughout the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeOrToken<N, T> {
    Node(N),
    Token(T),
}

impl<N, T> NodeOrToken<N, T> {
    /// Converts into the node variant, if any.
    pub fn into_node(self) -> Option<N> {
        match self {
            NodeOrToken::Node(node) => Some(node),
            NodeOrToken::Token(_) => None,
        }
    }

    /// Converts into the token variant, if any.
    pub fn into_token(self) -> Option<T> {
        match self {
            NodeOrToken::Node(_) => None,
            NodeOrToken::Token(token) => Some(token),
        }
    }

    /// Returns a shared reference to the node, if any.
    pub fn as_node(&self) -> Option<&N> {
        match self {
            NodeOrToken::Node(node) => Some(node),
            NodeOrToken::Token(_) => None,
        }
    }

    /// Returns a shared reference to the token, if any.
    pub fn as_token(&self) -> Option<&T> {
        match self {
            NodeOrToken::Node(_) => None,
            NodeOrToken::Token(token) => Some(token),
        }
    }
}

/// There might be zero, one or two tokens at a given offset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenAtOffset<T> {
    /// No tokens at offset.
    None,
    /// Only a single token at offset.
    Single(T),
    /// Offset is exactly between two tokens.
    Between(T, T),
}

impl<T> TokenAtOffset<T> {
    /// Maps tokens to a different type.
    pub fn map<F: Fn(T) -> U, U>(self, f: F) -> TokenAtOffset<U> {
        match self {
            TokenAtOffset::None => TokenAtOffset::None,
            TokenAtOffset::Single(it) => TokenAtOffset::Single(f(it)),
            TokenAtOffset::Between(l, r) => TokenAtOffset::Between(f(l), f(r)),
        }
    }

    /// Convert to option, preferring the right token in case of a tie.
    pub fn right_biased(self) -> Option<T> {
        match self {
            Self::None => None,
            Self::Single(it) | Self::Between(_, it) => Some(it),
        }
    }

    /// Convert to option, preferring the left token in case of a tie.
    pub fn left_biased(self) -> Option<T> {
        match self {
            Self::None => None,
            Self::Single(it) | Self::Between(it, _) => Some(it),
        }
    }
}

impl<T> Iterator for TokenAtOffset<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        match std::mem::replace(self, Self::None) {
            Self::None => None,
            Self::Single(it) => Some(it),
            Self::Between(left, right) => {
                *self = Self::Single(right);
                Some(left)
            }
        }
    }
}
