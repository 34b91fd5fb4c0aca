use ngx_syntax::SyntaxKind::{self, *};
use ngx_syntax::SyntaxSet;
use text_size::{TextRange, TextSize};

use super::{VALUE, block, extra_values, geo, semicolon, value};
use crate::parser::Parser;

/// Tokens that can start a condition expression.
const CONDITION_START: SyntaxSet = VALUE.union(SyntaxSet::new([OPERATOR]));

/// Anything a directive may take as an argument. Unterminated strings are
/// kept in the directive they interrupt.
const ARGUMENT: SyntaxSet = VALUE.union(SyntaxSet::new([ERROR_TOKEN]));

pub(crate) fn statement(p: &mut Parser<'_>) {
    match p.peek_kind() {
        IF_KW => condition_stmt(p),
        SET_KW => variable_stmt(p),
        INCLUDE_KW => include_stmt(p),
        GEO_KW => geo::geo_stmt(p),
        LUA_BLOCK_KW => lua_block_stmt(p),
        WORD | VARIABLE | STRING => directive_stmt(p),
        LEFT_BRACE => {
            let m = p.start();
            p.error("expected a directive name before `{`");
            block(p);
            m.complete(p, ERROR);
        }
        ERROR_TOKEN => {
            // Already reported by the lexer.
            let m = p.start();
            p.advance();
            m.complete(p, ERROR);
        }
        SEMICOLON => p.error_and_bump("unexpected `;`"),
        kind => p.error_and_bump(format!("unexpected {}", describe(kind))),
    }
}

fn describe(kind: SyntaxKind) -> &'static str {
    match kind {
        LEFT_PAREN => "`(`",
        RIGHT_PAREN => "`)`",
        RIGHT_BRACE => "`}`",
        OPERATOR => "operator",
        LUA_CODE => "Lua code",
        _ => "token",
    }
}

/// `name args* ;` or `name args* { ... }`.
///
/// A directive cut short by anything else becomes an `ERROR` node and the
/// enclosing block carries on with the next statement.
fn directive_stmt(p: &mut Parser<'_>) {
    let m = p.start();
    let name = p.peek_text();
    let start = p.peek_range().start();
    p.advance();
    while p.eat_set(ARGUMENT) {}

    match p.peek_kind() {
        SEMICOLON => {
            p.advance();
            m.complete(p, DIRECTIVE_STMT);
        }
        LEFT_BRACE => {
            block(p);
            m.complete(p, DIRECTIVE_STMT);
        }
        _ => {
            let range = TextRange::new(start, p.prev_end());
            p.error_at(format!("expected `;` or `{{` after `{name}`"), range);
            m.complete(p, ERROR);
        }
    }
}

/// `set $name value;`
fn variable_stmt(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance();

    if p.at(VARIABLE) || p.at(WORD) {
        p.advance();
        value(p, "expected a value to assign");
    } else {
        p.error_after("expected a variable name after `set`");
    }

    semicolon(p);
    m.complete(p, VARIABLE_STMT);
}

/// `include path;`
fn include_stmt(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance();
    value(p, "expected a file path after `include`");
    semicolon(p);
    m.complete(p, INCLUDE_DIRECTIVE_STMT);
}

/// `if (condition) { ... }`
fn condition_stmt(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance();

    let mut complete = false;
    if p.eat(LEFT_PAREN) {
        conditions(p);
        complete = p.eat(RIGHT_PAREN);
        if !complete {
            p.error_after("expected `)`");
        }
    } else {
        p.error_after("expected `(` after `if`");
    }

    if p.at(LEFT_BRACE) {
        block(p);
    } else if complete {
        p.error_after("expected `{`");
    }
    m.complete(p, CONDITION_STMT);
}

/// Condition expressions, left to right. nginx evaluates exactly one, so
/// anything after the first is kept but flagged.
fn conditions(p: &mut Parser<'_>) {
    let mut count = 0;
    let mut extra_start = TextSize::new(0);

    while p.at_set(CONDITION_START) {
        if count == 1 {
            extra_start = p.peek_range().start();
        }
        condition_expr(p);
        count += 1;
    }

    match count {
        0 => p.error_after("expected a condition"),
        1 => {}
        _ => {
            let range = TextRange::new(extra_start, p.prev_end());
            p.warning_at("only the first condition is evaluated", range);
        }
    }
}

/// `value`, `value op value` or `op value`.
fn condition_expr(p: &mut Parser<'_>) {
    let m = p.start();
    if p.eat(OPERATOR) {
        value(p, "expected an operand");
    } else {
        p.advance();
        if p.eat(OPERATOR) {
            value(p, "expected an operand");
        }
    }
    m.complete(p, CONDITION_EXPR);
}

/// `set_by_lua_block $var { lua }` or `*_by_lua_block { lua }`
fn lua_block_stmt(p: &mut Parser<'_>) {
    let m = p.start();
    let name = p.peek_text();
    let kind = SyntaxKind::lua_block_stmt(name);
    p.advance();
    if kind == SET_BY_LUA_BLOCK_STMT {
        value(p, "expected a variable after `set_by_lua_block`");
    }
    extra_values(p);

    if p.at(LEFT_BRACE) {
        let l_brace = p.peek_range();
        p.advance();
        let unterminated = p.at(ERROR_TOKEN);
        if !p.eat(LUA_CODE) {
            p.eat(ERROR_TOKEN);
        }
        if !p.eat(RIGHT_BRACE) && !unterminated {
            p.error_at("unclosed `{`", l_brace);
        }
    } else {
        p.error_after(format!("expected `{{` after `{name}`"));
        p.eat(SEMICOLON);
    }
    m.complete(p, kind);
}
