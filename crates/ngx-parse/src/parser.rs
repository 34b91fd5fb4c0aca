use drop_bomb::DropBomb;
use ngx_errors::{Diagnostic, DiagnosticKind};
use ngx_syntax::{Builder, SyntaxKind, SyntaxSet, SyntaxTree};
use ngx_tokenizer::{TokenWithTrivia, Tokenizer};
use text_size::{TextRange, TextSize};

pub(crate) struct Parser<'a> {
    text: &'a str,
    tokenizer: Tokenizer<'a>,
    events: Vec<Event>,
    diagnostics: Vec<Diagnostic>,
    /// Number of blocks currently open.
    depth: u32,
    /// End of the last consumed token, trivia excluded.
    prev_end: TextSize,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            text,
            tokenizer: Tokenizer::new(text),
            events: Vec::new(),
            diagnostics: Vec::new(),
            depth: 0,
            prev_end: TextSize::new(0),
        }
    }

    /// Starts with `depth` blocks already open, for parsing a nested block
    /// on its own.
    pub(crate) fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    pub(crate) fn peek_kind(&self) -> SyntaxKind {
        self.tokenizer.peek().kind
    }

    pub(crate) fn peek_range(&self) -> TextRange {
        self.tokenizer.peek().range
    }

    pub(crate) fn peek_text(&self) -> &'a str {
        &self.text[self.peek_range()]
    }

    pub(crate) fn prev_end(&self) -> TextSize {
        self.prev_end
    }

    pub(crate) fn depth(&self) -> u32 {
        self.depth
    }

    pub(crate) fn enter_block(&mut self) {
        self.depth += 1;
    }

    pub(crate) fn exit_block(&mut self) {
        self.depth -= 1;
    }

    pub(crate) fn at(&self, kind: SyntaxKind) -> bool {
        self.peek_kind() == kind
    }

    pub(crate) fn at_set(&self, set: SyntaxSet) -> bool {
        set.contains(self.peek_kind())
    }

    /// Consumes the current token. `EOF` is only consumed by [`Parser::bump_eof`].
    pub(crate) fn advance(&mut self) {
        if self.at(SyntaxKind::EOF) {
            return;
        }

        let token = self.tokenizer.next_token();
        if let Some(error) = token.error {
            self.diagnostics.push(Diagnostic::error(
                DiagnosticKind::Lex,
                error.to_string(),
                token.range,
            ));
        }
        self.prev_end = token.range.end();
        self.events.push(Event::Token(token));
    }

    pub(crate) fn bump_eof(&mut self) {
        assert!(self.at(SyntaxKind::EOF), "tokens left before the end of file");
        let token = self.tokenizer.next_token();
        self.events.push(Event::Token(token));
    }

    pub(crate) fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn eat_set(&mut self, set: SyntaxSet) -> bool {
        if self.at_set(set) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn start(&mut self) -> Marker {
        let pos = self.events.len() as u32;
        self.events.push(Event::TOMBSTONE);
        Marker::new(pos)
    }

    /// Reports `message` at the current token.
    pub(crate) fn error(&mut self, message: impl Into<String>) {
        let range = self.peek_range();
        self.error_at(message, range);
    }

    /// Reports `message` right after the last consumed token, where
    /// something is missing.
    pub(crate) fn error_after(&mut self, message: impl Into<String>) {
        let range = TextRange::empty(self.prev_end);
        self.error_at(message, range);
    }

    pub(crate) fn error_at(&mut self, message: impl Into<String>, range: TextRange) {
        self.diagnostics.push(Diagnostic::error(DiagnosticKind::Syntax, message, range));
    }

    pub(crate) fn warning_at(&mut self, message: impl Into<String>, range: TextRange) {
        self.diagnostics.push(Diagnostic::warning(DiagnosticKind::Syntax, message, range));
    }

    /// Reports `message` and wraps the current token in an `ERROR` node.
    pub(crate) fn error_and_bump(&mut self, message: impl Into<String>) {
        let m = self.start();
        self.error(message);
        self.advance();
        m.complete(self, SyntaxKind::ERROR);
    }

    /// Events and diagnostics, the latter ordered by start offset.
    pub(crate) fn finish(self) -> (Vec<Event>, Vec<Diagnostic>) {
        let Parser { mut diagnostics, events, .. } = self;
        diagnostics.sort_by_key(|diagnostic| diagnostic.range().start());
        (events, diagnostics)
    }

    pub(crate) fn build_tree(self) -> (SyntaxTree, Vec<Diagnostic>) {
        let text = self.text;
        let (events, diagnostics) = self.finish();
        let mut builder = Builder::new(text);
        replay(events, &mut builder);
        (builder.finish(), diagnostics)
    }
}

/// Feeds parser events into `builder`.
pub(crate) fn replay(events: Vec<Event>, builder: &mut Builder) {
    for event in events {
        match event {
            Event::Start { kind: SyntaxKind::TOMBSTONE } => {}
            Event::Start { kind } => builder.start_node(kind),
            Event::Finish => builder.finish_node(),
            Event::Token(TokenWithTrivia { leading, kind, range, trailing, .. }) => {
                builder.token(&leading, kind, range.len(), &trailing);
            }
        }
    }
}

pub(crate) enum Event {
    Start { kind: SyntaxKind },
    Token(TokenWithTrivia),
    Finish,
}

impl Event {
    const TOMBSTONE: Self = Event::Start { kind: SyntaxKind::TOMBSTONE };
}

pub(crate) struct Marker {
    position: u32,
    bomb: DropBomb,
}

impl Marker {
    fn new(pos: u32) -> Marker {
        Marker {
            position: pos,
            bomb: DropBomb::new("Marker must be either completed or abandoned"),
        }
    }

    pub(crate) fn complete(mut self, p: &mut Parser<'_>, kind: SyntaxKind) {
        self.bomb.defuse();

        match &mut p.events[self.position as usize] {
            Event::Start { kind: slot } => *slot = kind,
            _ => unreachable!(),
        }

        p.events.push(Event::Finish);
    }
}
