//! Lexer for nginx configuration files.
//!
//! [`Lexer`] yields every lexeme, trivia included, and can restart at any
//! offset. [`Tokenizer`] sits on top of it for the parser: it folds trivia
//! into the significant token it belongs to and ends with a zero-length
//! `EOF` token.

mod cursor;
mod lexer;
mod lua;

pub use lexer::{LexError, Lexer, Token, tokenize, tokenize_from};
pub use ngx_syntax::SyntaxKind;
use ngx_syntax::SyntaxKind::*;
use ngx_syntax::{TriviaPiece, TriviaPieceKind};
use text_size::{TextRange, TextSize};

/// A significant token with the trivia attached to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenWithTrivia {
    pub leading: Vec<TriviaPiece>,
    pub kind: SyntaxKind,
    /// Range of the token itself, trivia excluded.
    pub range: TextRange,
    pub trailing: Vec<TriviaPiece>,
    pub error: Option<LexError>,
}

impl TokenWithTrivia {
    fn eof(leading: Vec<TriviaPiece>, offset: TextSize) -> Self {
        Self {
            leading,
            kind: EOF,
            range: TextRange::empty(offset),
            trailing: Vec::new(),
            error: None,
        }
    }

    /// Start of the leading trivia.
    pub fn full_start(&self) -> TextSize {
        self.range.start() - trivia_len(&self.leading)
    }

    /// End of the trailing trivia.
    pub fn full_end(&self) -> TextSize {
        self.range.end() + trivia_len(&self.trailing)
    }
}

fn trivia_len(pieces: &[TriviaPiece]) -> TextSize {
    pieces.iter().map(|piece| piece.len).sum()
}

/// Parser-facing token stream with one token of lookahead.
///
/// Trailing trivia is the whitespace and comments on the same line after a
/// token; the newline and everything after it lead the next token.
pub struct Tokenizer<'a> {
    lexer: std::iter::Peekable<Lexer<'a>>,
    end: TextSize,
    current: TokenWithTrivia,
}

impl<'a> Tokenizer<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut tokenizer = Self {
            lexer: Lexer::new(text).peekable(),
            end: TextSize::of(text),
            current: TokenWithTrivia::eof(Vec::new(), TextSize::new(0)),
        };
        tokenizer.next_token();
        tokenizer
    }

    pub fn peek(&self) -> &TokenWithTrivia {
        &self.current
    }

    /// Returns the current token and moves to the next one. Keeps returning
    /// `EOF` once the text is exhausted.
    pub fn next_token(&mut self) -> TokenWithTrivia {
        let next = self.lex();
        std::mem::replace(&mut self.current, next)
    }

    fn lex(&mut self) -> TokenWithTrivia {
        let mut leading = Vec::new();
        let token = loop {
            match self.lexer.next() {
                Some(token) if token.kind.is_trivia() => leading.push(piece(token)),
                Some(token) => break token,
                None => return TokenWithTrivia::eof(leading, self.end),
            }
        };

        let mut trailing = Vec::new();
        while let Some(next) = self.lexer.next_if(|next| matches!(next.kind, WHITESPACE | COMMENT))
        {
            trailing.push(piece(next));
        }

        TokenWithTrivia {
            leading,
            kind: token.kind,
            range: token.range,
            trailing,
            error: token.error,
        }
    }
}

fn piece(token: Token) -> TriviaPiece {
    let kind = TriviaPieceKind::from_syntax_kind(token.kind)
        .unwrap_or_else(|| unreachable!("`{:?}` is not trivia", token.kind));
    TriviaPiece::new(kind, token.range.len())
}

#[cfg(test)]
mod tests;
