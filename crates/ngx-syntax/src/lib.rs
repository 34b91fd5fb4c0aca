//! Lossless, immutable syntax tree for nginx configuration files.
//!
//! The tree owns its source text and is navigated through cheap `Copy`
//! handles that borrow it. Every byte of the input belongs to exactly one
//! token, so printing the tokens in order reproduces the file.

/// Typed wrappers and the visitor.
pub mod ast;
mod builder;
mod nodes;
mod syntax;
mod syntax_kind;
mod syntax_set;
mod trivia;

pub use ast::{AstNode, Visitor, accept, walk};
/// Incremental builder for constructing a `SyntaxTree`.
pub use builder::Builder;
/// Primary syntax tree API types and adapters.
pub use syntax::{
    Children, ChildrenWithTokens, NodeOrToken, Preorder, PreorderWithTokens, SyntaxElement,
    SyntaxNode, SyntaxNodePtr, SyntaxToken, SyntaxTree, TokenAtOffset, TriviaIter, WalkEvent,
    WalkEventWithTokens, children_of_kind,
};
/// Token and node kinds used throughout the tree.
pub use syntax_kind::SyntaxKind;
/// Compact set for grouping `SyntaxKind` values.
pub use syntax_set::SyntaxSet;
pub use text_size::{TextLen, TextRange, TextSize};
/// Trivia pieces attached to tokens.
pub use trivia::{TriviaPiece, TriviaPieceKind};
