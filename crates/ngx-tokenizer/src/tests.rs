use std::fmt::Write as _;

use expect_test::{Expect, expect};
use text_size::TextSize;

use super::*;

fn check(text: &str, expect: Expect) {
    let mut actual = String::new();
    for token in tokenize(text) {
        let error = token.error.map(|error| format!(" ({error})")).unwrap_or_default();
        let text = &text[token.range];
        let _ = writeln!(actual, "{:?}@{:?} {text:?}{error}", token.kind, token.range);
    }
    expect.assert_eq(&actual);
}

#[test]
fn directive_in_block() {
    check(
        "server { listen 80; }",
        expect![[r#"
            WORD@0..6 "server"
            WHITESPACE@6..7 " "
            LEFT_BRACE@7..8 "{"
            WHITESPACE@8..9 " "
            WORD@9..15 "listen"
            WHITESPACE@15..16 " "
            WORD@16..18 "80"
            SEMICOLON@18..19 ";"
            WHITESPACE@19..20 " "
            RIGHT_BRACE@20..21 "}"
        "#]],
    );
}

#[test]
fn condition_with_regex_groups() {
    check(
        "if ($request_uri ~ ^/(a|b)$) { }",
        expect![[r#"
            IF_KW@0..2 "if"
            WHITESPACE@2..3 " "
            LEFT_PAREN@3..4 "("
            VARIABLE@4..16 "$request_uri"
            WHITESPACE@16..17 " "
            OPERATOR@17..18 "~"
            WHITESPACE@18..19 " "
            WORD@19..27 "^/(a|b)$"
            RIGHT_PAREN@27..28 ")"
            WHITESPACE@28..29 " "
            LEFT_BRACE@29..30 "{"
            WHITESPACE@30..31 " "
            RIGHT_BRACE@31..32 "}"
        "#]],
    );
}

#[test]
fn operators_only_inside_conditions() {
    check(
        "if (!-f $file) {} = ~",
        expect![[r#"
            IF_KW@0..2 "if"
            WHITESPACE@2..3 " "
            LEFT_PAREN@3..4 "("
            OPERATOR@4..7 "!-f"
            WHITESPACE@7..8 " "
            VARIABLE@8..13 "$file"
            RIGHT_PAREN@13..14 ")"
            WHITESPACE@14..15 " "
            LEFT_BRACE@15..16 "{"
            RIGHT_BRACE@16..17 "}"
            WHITESPACE@17..18 " "
            WORD@18..19 "="
            WHITESPACE@19..20 " "
            WORD@20..21 "~"
        "#]],
    );
}

#[test]
fn keywords_are_exact() {
    check(
        "set $a 1; if=$x; geo include",
        expect![[r#"
            SET_KW@0..3 "set"
            WHITESPACE@3..4 " "
            VARIABLE@4..6 "$a"
            WHITESPACE@6..7 " "
            WORD@7..8 "1"
            SEMICOLON@8..9 ";"
            WHITESPACE@9..10 " "
            WORD@10..15 "if=$x"
            SEMICOLON@15..16 ";"
            WHITESPACE@16..17 " "
            GEO_KW@17..20 "geo"
            WHITESPACE@20..21 " "
            INCLUDE_KW@21..28 "include"
        "#]],
    );
}

#[test]
fn variables() {
    check(
        "$1 ${host} ${host}x $ a$b",
        expect![[r#"
            VARIABLE@0..2 "$1"
            WHITESPACE@2..3 " "
            VARIABLE@3..10 "${host}"
            WHITESPACE@10..11 " "
            WORD@11..19 "${host}x"
            WHITESPACE@19..20 " "
            WORD@20..21 "$"
            WHITESPACE@21..22 " "
            WORD@22..25 "a$b"
        "#]],
    );
}

#[test]
fn strings_hide_structure() {
    check(
        r#"return 200 "a;{b}";"#,
        expect![[r#"
            WORD@0..6 "return"
            WHITESPACE@6..7 " "
            WORD@7..10 "200"
            WHITESPACE@10..11 " "
            STRING@11..18 "\"a;{b}\""
            SEMICOLON@18..19 ";"
        "#]],
    );
}

#[test]
fn escapes() {
    check(
        r"a\;b 'it\'s';",
        expect![[r#"
            WORD@0..4 "a\\;b"
            WHITESPACE@4..5 " "
            STRING@5..12 "'it\\'s'"
            SEMICOLON@12..13 ";"
        "#]],
    );
}

#[test]
fn unterminated_string() {
    check(
        "root \"abc;\n}",
        expect![[r#"
            WORD@0..4 "root"
            WHITESPACE@4..5 " "
            ERROR_TOKEN@5..12 "\"abc;\n}" (unterminated string literal)
        "#]],
    );
}

#[test]
fn comments_and_newlines() {
    check(
        "a # b;\r\n#c\n",
        expect![[r##"
            WORD@0..1 "a"
            WHITESPACE@1..2 " "
            COMMENT@2..6 "# b;"
            NEWLINE@6..8 "\r\n"
            COMMENT@8..10 "#c"
            NEWLINE@10..11 "\n"
        "##]],
    );
}

#[test]
fn lua_body_is_opaque() {
    check(
        r#"content_by_lua_block { ngx.say("}") }"#,
        expect![[r#"
            LUA_BLOCK_KW@0..20 "content_by_lua_block"
            WHITESPACE@20..21 " "
            LEFT_BRACE@21..22 "{"
            LUA_CODE@22..36 " ngx.say(\"}\") "
            RIGHT_BRACE@36..37 "}"
        "#]],
    );
}

#[test]
fn lua_block_arguments_and_empty_body() {
    check(
        "set_by_lua_block $x {}",
        expect![[r#"
            LUA_BLOCK_KW@0..16 "set_by_lua_block"
            WHITESPACE@16..17 " "
            VARIABLE@17..19 "$x"
            WHITESPACE@19..20 " "
            LEFT_BRACE@20..21 "{"
            RIGHT_BRACE@21..22 "}"
        "#]],
    );
}

#[test]
fn unterminated_lua_body() {
    check(
        "access_by_lua_block { if x then",
        expect![[r#"
            LUA_BLOCK_KW@0..19 "access_by_lua_block"
            WHITESPACE@19..20 " "
            LEFT_BRACE@20..21 "{"
            ERROR_TOKEN@21..31 " if x then" (unterminated Lua block)
        "#]],
    );
}

#[test]
fn lexemes_tile_the_text() {
    let texts = [
        "http {\n  server { listen 80; } # done\n}\n",
        "if ($a = (b) { x; }",
        "geo $a { default 0; 10.0.0.0/8 1; }",
        "content_by_lua_block { local t = {} -- }\n }",
        "'unterminated",
        "\u{feff}ключ значение;",
    ];
    for text in texts {
        let mut end = TextSize::new(0);
        for token in tokenize(text) {
            assert_eq!(token.range.start(), end, "gap before {token:?} in {text:?}");
            end = token.range.end();
        }
        assert_eq!(end, TextSize::of(text), "{text:?} not fully lexed");
    }
}

#[test]
fn restart_in_the_middle() {
    let text = "a { b; }";
    let restarted: Vec<_> =
        tokenize_from(text, TextSize::new(4)).map(|token| (token.kind, token.range)).collect();
    let full: Vec<_> = tokenize(text).map(|token| (token.kind, token.range)).skip(4).collect();
    assert_eq!(restarted, full);
    assert_eq!(restarted[0].0, WORD);
}

#[test]
fn trivia_attachment() {
    let text = "a b;\n# c\n}";
    let mut tokenizer = Tokenizer::new(text);
    let mut tokens = Vec::new();
    loop {
        let token = tokenizer.next_token();
        let kind = token.kind;
        tokens.push(token);
        if kind == EOF {
            break;
        }
    }

    let summary: Vec<_> = tokens
        .iter()
        .map(|token| {
            let kinds = |pieces: &[TriviaPiece]| {
                pieces.iter().map(|piece| piece.kind.to_syntax_kind()).collect::<Vec<_>>()
            };
            (kinds(&token.leading), token.kind, kinds(&token.trailing))
        })
        .collect();
    assert_eq!(
        summary,
        [
            (vec![], WORD, vec![WHITESPACE]),
            (vec![], WORD, vec![]),
            (vec![], SEMICOLON, vec![]),
            (vec![NEWLINE, COMMENT, NEWLINE], RIGHT_BRACE, vec![]),
            (vec![], EOF, vec![]),
        ]
    );

    let eof = tokens.last().unwrap();
    assert_eq!(eof.range, TextRange::empty(TextSize::of(text)));
    assert_eq!(tokenizer.next_token().kind, EOF);
}

#[test]
fn trailing_trivia_stops_at_newline() {
    let mut tokenizer = Tokenizer::new("a; # note\n  b;");
    tokenizer.next_token();
    let semicolon = tokenizer.next_token();
    assert_eq!(semicolon.kind, SEMICOLON);
    assert_eq!(semicolon.full_end(), TextSize::new(9));

    let b = tokenizer.next_token();
    assert_eq!(b.full_start(), TextSize::new(9));
    assert_eq!(b.leading.len(), 2);
}
