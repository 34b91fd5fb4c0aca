use ngx_syntax::SyntaxKind::{self, *};
use text_size::{TextRange, TextSize};

use crate::cursor::Cursor;
use crate::lua;

/// A malformed region the lexer covered with an `ERROR_TOKEN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated Lua block")]
    UnterminatedLuaBlock,
}

/// One lexeme, trivia included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub range: TextRange,
    pub error: Option<LexError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    /// Right after `if`; a `(` opens the condition.
    AfterIf,
    /// Inside `if (...)`.
    Condition,
    /// Between a `*_by_lua_block` keyword and its `{`.
    AfterLuaKeyword,
    /// Right after the `{` of a Lua block.
    LuaBody,
}

/// Lazy lexer over a whole text or any suffix of it.
///
/// Never fails: malformed input becomes `ERROR_TOKEN`s and lexing goes on.
pub struct Lexer<'a> {
    text: &'a str,
    cursor: Cursor<'a>,
    mode: Mode,
    /// Parenthesis depth inside condition words, `(a|b)` in a regex.
    depth: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(text: &'a str) -> Self {
        Self::new_at(text, TextSize::new(0))
    }

    /// Starts lexing at `offset` in the top-level mode.
    ///
    /// # Panics
    ///
    /// If `offset` is not a char boundary of `text`.
    pub fn new_at(text: &'a str, offset: TextSize) -> Self {
        let offset = usize::from(offset);
        assert!(text.is_char_boundary(offset), "lexing must start on a char boundary");
        Self { text, cursor: Cursor::new(&text[offset..]), mode: Mode::Normal, depth: 0 }
    }

    /// Offset of the next unlexed byte.
    pub fn offset(&self) -> TextSize {
        TextSize::of(self.text) - self.cursor.len()
    }

    fn range(&self) -> TextRange {
        let end = self.offset();
        TextRange::new(end - self.cursor.pos_within_token(), end)
    }

    fn token_text(&self) -> &'a str {
        &self.text[self.range()]
    }

    fn token_kind(&mut self) -> (SyntaxKind, Option<LexError>) {
        if self.mode == Mode::LuaBody {
            self.mode = Mode::Normal;
            match lua::body_len(self.cursor.as_str()) {
                Some(0) => {}
                Some(len) => {
                    self.cursor.bump_bytes(len);
                    return (LUA_CODE, None);
                }
                None => {
                    self.cursor.bump_bytes(self.cursor.as_str().len());
                    return (ERROR_TOKEN, Some(LexError::UnterminatedLuaBlock));
                }
            }
        }

        let Some(first) = self.cursor.bump() else {
            return (EOF, None);
        };
        let kind = match first {
            '\n' => NEWLINE,
            '\r' if self.cursor.peek() == '\n' => {
                self.cursor.bump();
                NEWLINE
            }
            c if c.is_whitespace() => {
                self.cursor.advance_while(|c| c.is_whitespace() && c != '\n' && c != '\r');
                WHITESPACE
            }
            '#' => {
                self.cursor.advance_while(|c| c != '\n' && c != '\r');
                COMMENT
            }
            ';' => SEMICOLON,
            '{' => LEFT_BRACE,
            '}' => RIGHT_BRACE,
            '"' | '\'' => return self.string(first),
            '(' if self.mode == Mode::AfterIf => LEFT_PAREN,
            ')' if self.mode == Mode::Condition && self.depth == 0 => RIGHT_PAREN,
            first => {
                self.word(first);
                self.classify_word()
            }
        };
        (kind, None)
    }

    fn string(&mut self, quote: char) -> (SyntaxKind, Option<LexError>) {
        while let Some(c) = self.cursor.bump() {
            match c {
                '\\' => {
                    self.cursor.bump();
                }
                c if c == quote => return (STRING, None),
                _ => {}
            }
        }
        (ERROR_TOKEN, Some(LexError::UnterminatedString))
    }

    fn word(&mut self, first: char) {
        let mut c = first;
        loop {
            match c {
                '\\' => {
                    self.cursor.bump();
                }
                '$' if self.cursor.peek() == '{' => {
                    self.cursor.bump();
                    self.cursor.advance_while(|c| c != '}' && !ends_word(c));
                    if self.cursor.peek() == '}' {
                        self.cursor.bump();
                    }
                }
                '(' if self.mode == Mode::Condition => self.depth += 1,
                ')' if self.mode == Mode::Condition => self.depth = self.depth.saturating_sub(1),
                _ => {}
            }

            let next = self.cursor.peek();
            if self.cursor.is_eof()
                || ends_word(next)
                || (next == ')' && self.mode == Mode::Condition && self.depth == 0)
            {
                break;
            }
            c = next;
            self.cursor.bump();
        }
    }

    fn classify_word(&self) -> SyntaxKind {
        let text = self.token_text();
        if self.mode == Mode::Condition {
            return if is_operator(text) {
                OPERATOR
            } else if is_variable(text) {
                VARIABLE
            } else {
                WORD
            };
        }

        match text {
            "if" => IF_KW,
            "set" => SET_KW,
            "include" => INCLUDE_KW,
            "geo" => GEO_KW,
            _ if text.ends_with("_by_lua_block") => LUA_BLOCK_KW,
            _ if is_variable(text) => VARIABLE,
            _ => WORD,
        }
    }

    fn transition(&mut self, kind: SyntaxKind) {
        if kind.is_trivia() {
            return;
        }
        self.mode = match (self.mode, kind) {
            (Mode::AfterIf, LEFT_PAREN) => {
                self.depth = 0;
                Mode::Condition
            }
            (Mode::Condition, RIGHT_PAREN | LEFT_BRACE | RIGHT_BRACE | SEMICOLON) => Mode::Normal,
            (Mode::Condition, _) => Mode::Condition,
            (Mode::AfterLuaKeyword, LEFT_BRACE) => Mode::LuaBody,
            (Mode::AfterLuaKeyword, RIGHT_BRACE | SEMICOLON) => Mode::Normal,
            (Mode::AfterLuaKeyword, _) => Mode::AfterLuaKeyword,
            (_, IF_KW) => Mode::AfterIf,
            (_, LUA_BLOCK_KW) => Mode::AfterLuaKeyword,
            _ => Mode::Normal,
        };
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.cursor.is_eof() && self.mode != Mode::LuaBody {
            return None;
        }

        let (kind, error) = self.token_kind();
        if kind == EOF {
            return None;
        }
        let range = self.range();
        self.cursor.reset_pos_within_token();
        self.transition(kind);
        Some(Token { kind, range, error })
    }
}

fn ends_word(c: char) -> bool {
    c.is_whitespace() || matches!(c, ';' | '{' | '}')
}

fn is_operator(text: &str) -> bool {
    matches!(
        text,
        "=" | "!="
            | "~"
            | "~*"
            | "!~"
            | "!~*"
            | "-f"
            | "!-f"
            | "-d"
            | "!-d"
            | "-e"
            | "!-e"
            | "-x"
            | "!-x"
    )
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// `$name` or `${name}`, nothing else.
fn is_variable(text: &str) -> bool {
    let Some(name) = text.strip_prefix('$') else {
        return false;
    };
    let name = name.strip_prefix('{').and_then(|name| name.strip_suffix('}')).unwrap_or(name);
    !name.is_empty() && name.chars().all(is_name_char)
}

/// Lexes `text` from the start.
pub fn tokenize(text: &str) -> Lexer<'_> {
    Lexer::new(text)
}

/// Lexes `text` from `offset`, as if a new file started there.
pub fn tokenize_from(text: &str, offset: TextSize) -> Lexer<'_> {
    Lexer::new_at(text, offset)
}
