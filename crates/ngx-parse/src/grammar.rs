use ngx_syntax::SyntaxKind::{self, *};
use ngx_syntax::SyntaxSet;
use text_size::TextRange;

use crate::parser::Parser;

mod geo;
mod statements;

pub(crate) use statements::statement;

/// Tokens that can be a directive name or argument.
pub(crate) const VALUE: SyntaxSet = SyntaxSet::new([WORD, VARIABLE, STRING]);

/// Deeper blocks are kept in the tree but not parsed.
const MAX_DEPTH: u32 = 256;

pub(crate) fn source_file(p: &mut Parser<'_>) {
    let m = p.start();

    while !p.at(EOF) {
        if p.at(RIGHT_BRACE) {
            p.error_and_bump("unmatched `}`");
            continue;
        }
        statement(p);
    }

    p.bump_eof();
    m.complete(p, SOURCE_FILE);
}

/// `{ statement* }`
pub(crate) fn block(p: &mut Parser<'_>) {
    block_with(p, BLOCK_STMT, statement);
}

/// Parses one block of `kind` that must make up the whole input. Returns
/// `false` if the input is anything else.
pub(crate) fn isolated_block(p: &mut Parser<'_>, kind: SyntaxKind) -> bool {
    if !p.at(LEFT_BRACE) {
        return false;
    }
    let closed = match kind {
        BLOCK_STMT => block_with(p, BLOCK_STMT, statement),
        GEO_BLOCK_STMT => block_with(p, GEO_BLOCK_STMT, geo::geo_block_content),
        _ => return false,
    };
    closed && p.at(EOF)
}

/// Parses a braced block whose items are parsed by `item`. An unclosed
/// block is closed at the end of input and reported at its `{`.
///
/// Returns whether the block was closed by its own `}`.
pub(crate) fn block_with(
    p: &mut Parser<'_>,
    kind: SyntaxKind,
    item: fn(&mut Parser<'_>),
) -> bool {
    debug_assert_eq!(p.peek_kind(), LEFT_BRACE);
    if p.depth() >= MAX_DEPTH {
        too_deep(p);
        return false;
    }

    let m = p.start();
    let l_brace = p.peek_range();
    p.advance();
    p.enter_block();

    while !p.at(RIGHT_BRACE) && !p.at(EOF) {
        item(p);
    }

    let closed = p.eat(RIGHT_BRACE);
    if !closed {
        p.error_at("unclosed `{`", l_brace);
    }
    p.exit_block();
    m.complete(p, kind);
    closed
}

fn too_deep(p: &mut Parser<'_>) {
    let m = p.start();
    p.error("blocks nested too deeply");

    let mut open = 0u32;
    loop {
        match p.peek_kind() {
            EOF => break,
            LEFT_BRACE => open += 1,
            RIGHT_BRACE => {
                open -= 1;
                if open == 0 {
                    p.advance();
                    break;
                }
            }
            _ => {}
        }
        p.advance();
    }

    m.complete(p, ERROR);
}

/// Wraps values the statement has no room for in one `ERROR` node.
pub(crate) fn extra_values(p: &mut Parser<'_>) {
    if !p.at_set(VALUE) {
        return;
    }

    let m = p.start();
    let start = p.peek_range().start();
    while p.eat_set(VALUE) {}
    p.error_at("unexpected extra values", TextRange::new(start, p.prev_end()));
    m.complete(p, ERROR);
}

/// Extra values, then the terminating `;`.
pub(crate) fn semicolon(p: &mut Parser<'_>) {
    extra_values(p);
    if !p.eat(SEMICOLON) {
        p.error_after("expected `;`");
    }
}

/// A single value, reporting `message` if it is missing.
pub(crate) fn value(p: &mut Parser<'_>, message: &str) -> bool {
    let found = p.eat_set(VALUE);
    if !found {
        p.error_after(message);
    }
    found
}
