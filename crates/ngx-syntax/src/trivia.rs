//! Trivia pieces attached to tokens.

use text_size::TextSize;

use crate::SyntaxKind;

/// Kinds of trivia stored alongside tokens.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TriviaPieceKind {
    Whitespace,
    Newline,
    Comment,
}

impl TriviaPieceKind {
    #[inline]
    pub fn to_syntax_kind(self) -> SyntaxKind {
        match self {
            Self::Whitespace => SyntaxKind::WHITESPACE,
            Self::Newline => SyntaxKind::NEWLINE,
            Self::Comment => SyntaxKind::COMMENT,
        }
    }

    #[inline]
    pub fn from_syntax_kind(kind: SyntaxKind) -> Option<Self> {
        match kind {
            SyntaxKind::WHITESPACE => Some(Self::Whitespace),
            SyntaxKind::NEWLINE => Some(Self::Newline),
            SyntaxKind::COMMENT => Some(Self::Comment),
            _ => None,
        }
    }
}

/// A trivia fragment with its kind and length.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TriviaPiece {
    pub kind: TriviaPieceKind,
    pub len: TextSize,
}

impl TriviaPiece {
    /// Creates a new trivia piece with the given kind and length.
    pub fn new(kind: TriviaPieceKind, len: TextSize) -> Self {
        Self { kind, len }
    }
}
