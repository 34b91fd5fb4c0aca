use ngx_syntax::SyntaxKind::*;
use ngx_syntax::SyntaxSet;
use text_size::TextRange;

use super::{VALUE, block_with, extra_values, statement, value};
use crate::parser::Parser;

const ENTRY_START: SyntaxSet = VALUE.union(SyntaxSet::new([INCLUDE_KW]));

/// `geo [$address] $variable { entries }`
pub(crate) fn geo_stmt(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance();

    let mut values = 0;
    while values < 2 && p.eat_set(VALUE) {
        values += 1;
    }
    if values == 0 {
        p.error_after("expected a variable after `geo`");
    }
    extra_values(p);

    if p.at(LEFT_BRACE) {
        block_with(p, GEO_BLOCK_STMT, geo_block_content);
    } else {
        p.error_after("expected `{`");
    }
    m.complete(p, GEO_STMT);
}

/// One `;`-terminated entry. The first statement is the entry; any more
/// before the `;` are wrapped together in an `ERROR` node and reported once.
pub(super) fn geo_block_content(p: &mut Parser<'_>) {
    match p.peek_kind() {
        WORD | VARIABLE | STRING | INCLUDE_KW => {}
        SEMICOLON => {
            p.error_and_bump("empty geo entry");
            return;
        }
        ERROR_TOKEN => {
            let m = p.start();
            p.advance();
            m.complete(p, ERROR);
            return;
        }
        _ => {
            let m = p.start();
            p.error("expected a geo entry");
            statement(p);
            m.complete(p, ERROR);
            return;
        }
    }

    let m = p.start();
    geo_entry(p, true);

    if p.at_set(ENTRY_START) {
        let extra = p.start();
        let start = p.peek_range().start();
        while p.at_set(ENTRY_START) {
            geo_entry(p, false);
        }
        p.error_at(
            "a geo entry holds a single statement; expected `;`",
            TextRange::new(start, p.prev_end()),
        );
        extra.complete(p, ERROR);
    }

    if !p.eat(SEMICOLON) {
        p.error_after("expected `;`");
    }
    m.complete(p, GEO_BLOCK_CONTENT);
}

/// Missing operands are only reported when `strict`; surplus entries are
/// already covered by a single diagnostic.
fn geo_entry(p: &mut Parser<'_>, strict: bool) {
    let m = p.start();
    let kind = if p.at(INCLUDE_KW) {
        p.advance();
        operand(p, strict, "expected a file path after `include`");
        GEO_INCLUDE_STMT
    } else {
        let keyword = if p.at(WORD) { p.peek_text() } else { "" };
        p.advance();
        match keyword {
            "default" => {
                operand(p, strict, "expected a value after `default`");
                GEO_DEFAULT_STMT
            }
            "delete" => {
                operand(p, strict, "expected a network after `delete`");
                GEO_DELETE_STMT
            }
            "proxy" => {
                operand(p, strict, "expected an address after `proxy`");
                GEO_PROXY_STMT
            }
            "proxy_recursive" => GEO_PROXY_STMT,
            "ranges" => GEO_RANGES_STMT,
            _ => {
                operand(p, strict, "expected a value for the network");
                GEO_VALUE_STMT
            }
        }
    };
    m.complete(p, kind);
}

fn operand(p: &mut Parser<'_>, strict: bool, message: &str) {
    if strict {
        value(p, message);
    } else {
        p.eat_set(VALUE);
    }
}
