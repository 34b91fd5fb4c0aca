use std::str::Chars;

use text_size::{TextLen, TextSize};

pub(crate) const EOF_CHAR: char = '\0';

pub(crate) struct Cursor<'a> {
    chars: Chars<'a>,
    len: TextSize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self { chars: text.chars(), len: text.text_len() }
    }

    /// Bytes left to lex.
    pub(crate) fn len(&self) -> TextSize {
        self.as_str().text_len()
    }

    pub(crate) fn as_str(&self) -> &'a str {
        self.chars.as_str()
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.as_str().is_empty()
    }

    pub(crate) fn pos_within_token(&self) -> TextSize {
        self.len - self.len()
    }

    pub(crate) fn reset_pos_within_token(&mut self) {
        self.len = self.len();
    }

    pub(crate) fn peek(&self) -> char {
        self.chars.clone().next().unwrap_or(EOF_CHAR)
    }

    pub(crate) fn bump(&mut self) -> Option<char> {
        self.chars.next()
    }

    /// Skips `len` bytes; `len` must end on a char boundary.
    pub(crate) fn bump_bytes(&mut self, len: usize) {
        self.chars = self.as_str()[len..].chars();
    }

    pub(crate) fn advance_while(&mut self, f: impl Fn(char) -> bool + Copy) {
        while !self.is_eof() && f(self.peek()) {
            self.bump();
        }
    }
}
