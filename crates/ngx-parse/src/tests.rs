use std::fs;
use std::path::{Path, PathBuf};

use expect_test::{Expect, expect, expect_file};
use ngx_syntax::ast::{AstNode as _, Stmt, Visitor};
use ngx_syntax::{SyntaxKind, TextRange, TextSize};

use crate::{Parse, TextEdit, parse, reparse};

#[derive(PartialEq, Eq, PartialOrd, Ord)]
struct TestCase {
    input: PathBuf,
    expected: PathBuf,
    text: String,
}

impl TestCase {
    fn list() -> Vec<Self> {
        let test_data_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("test_data");

        let mut cases = fs::read_dir(&test_data_dir)
            .unwrap_or_else(|err| {
                panic!("Cannot read directory {}: {err}", test_data_dir.display())
            })
            .filter_map(|entry| {
                let path = entry.ok()?.path();
                if path.extension()? == "conf" {
                    let expected = path.with_extension("tree");
                    let text = fs::read_to_string(&path).ok()?;
                    Some(Self { input: path, expected, text })
                } else {
                    None
                }
            })
            .collect::<Vec<_>>();

        cases.sort();
        cases
    }
}

#[test]
fn parse_test_data() {
    let cases = TestCase::list();
    assert!(!cases.is_empty(), "no test data");

    for case in cases {
        let parse = parse(&case.text);
        assert_eq!(parse.text(), case.text, "{} does not round-trip", case.input.display());
        parse.tree().assert_invariants();
        expect_file![&case.expected].assert_eq(&parse.debug_dump());
    }
}

fn check_diagnostics(text: &str, expect: Expect) {
    let parse = parse(text);
    let actual: String =
        parse.diagnostics().iter().map(|diagnostic| format!("{diagnostic}\n")).collect();
    expect.assert_eq(&actual);
}

/// Inputs that exercise recovery; every one of them must still round-trip.
const BROKEN: &[&str] = &[
    "",
    "}",
    "{",
    "http {",
    "http { server {",
    "a b c",
    ";;;",
    "if",
    "if (",
    "if ($a",
    "if ($a) return;",
    "if () {}",
    "if ($a = ) {}",
    "if ($a = b c = d) {}",
    "set;",
    "set $a;",
    "set $a 1 2;",
    "include;",
    "geo {}",
    "geo $a $b $c {}",
    "geo $a { ; }",
    "geo $a { default; }",
    "geo $a { 1.2.3.4 }",
    "geo $a { if ($x) {} }",
    "geo $a { include a b c; }",
    "content_by_lua_block",
    "content_by_lua_block;",
    "content_by_lua_block { if x then",
    "root \"unterminated;\n}",
    "a 'b\n",
    "http { ( ) }",
    "\u{feff}ключ значение",
    "a\r\nb;\r\n# c",
];

#[test]
fn broken_inputs_round_trip() {
    for text in BROKEN {
        let parse = parse(text);
        assert_eq!(parse.text(), *text);
        assert_eq!(parse.root().text(), *text);
        parse.tree().assert_invariants();
        assert_eq!(parse.root().kind(), SyntaxKind::SOURCE_FILE);
        let last = parse.root().last_token().map(|token| token.kind());
        assert_eq!(last, Some(SyntaxKind::EOF), "{text:?}");
        for diagnostic in parse.diagnostics() {
            assert!(parse.root().text_range().contains_range(diagnostic.range()), "{text:?}");
        }
    }
}

#[test]
fn diagnostics_are_sorted() {
    for text in BROKEN {
        let parse = parse(text);
        let starts: Vec<_> = parse.diagnostics().iter().map(|d| d.range().start()).collect();
        assert!(starts.is_sorted(), "{text:?}: {starts:?}");
    }
}

#[test]
fn clean_config_has_no_diagnostics() {
    let text = r#"
user nginx;
worker_processes auto; # tune later

events {
    worker_connections 1024;
}

http {
    include mime.types;
    geo $remote_addr $blocked {
        default 0;
        ranges;
        proxy 10.0.0.1;
        proxy_recursive;
        delete 127.0.0.0/16;
        include geo.conf;
        192.168.1.0/24 1;
    }

    server {
        listen 80;
        set $root "/srv/www";
        if ($request_uri ~* ^/(static|media)/) {
            expires 30d;
        }
        location / {
            content_by_lua_block {
                local t = { a = "}" } -- }
                ngx.say(t.a)
            }
        }
    }
}
"#;
    let parse = parse(text);
    assert!(parse.diagnostics().is_empty(), "{:?}", parse.diagnostics());
    assert!(!parse.has_errors());
    assert_eq!(parse.root().descendants().filter(|n| n.kind() == SyntaxKind::ERROR).count(), 0);
}

#[test]
fn recovery_keeps_following_statements() {
    let parse = parse("block { set x 1 ; garbage_token set y 2 ; }");
    assert_eq!(parse.diagnostics().len(), 1);

    let variables = parse
        .root()
        .descendants()
        .filter(|node| node.kind() == SyntaxKind::VARIABLE_STMT)
        .count();
    assert_eq!(variables, 2);
}

#[test]
fn missing_pieces() {
    check_diagnostics(
        "http {\n    listen 80\n}\n",
        expect![[r#"
            error 11..20: expected `;` or `{` after `listen`
        "#]],
    );
    check_diagnostics(
        "server {",
        expect![[r#"
            error 7..8: unclosed `{`
        "#]],
    );
    check_diagnostics(
        "set $a;",
        expect![[r#"
            error 6..6: expected a value to assign
        "#]],
    );
    check_diagnostics(
        "if ($a) return;",
        expect![[r#"
            error 7..7: expected `{`
        "#]],
    );
    check_diagnostics(
        "if $a {}",
        expect![[r#"
            error 2..2: expected `(` after `if`
        "#]],
    );
}

#[test]
fn extra_conditions_are_a_warning() {
    let parse = parse("if ($a = b $c) {}");
    assert!(!parse.has_errors());
    let [warning] = parse.diagnostics() else { panic!("{:?}", parse.diagnostics()) };
    assert!(!warning.is_error());
    assert_eq!(warning.range(), TextRange::new(11.into(), 13.into()));

    let condition = parse
        .source_file()
        .statements()
        .find_map(|stmt| match stmt {
            Stmt::Condition(condition) => Some(condition),
            _ => None,
        })
        .unwrap();
    assert_eq!(condition.conditions().count(), 2);
}

#[test]
fn lex_errors_are_reported_once() {
    check_diagnostics(
        "root \"abc;\n}",
        expect![[r#"
            error 0..12: expected `;` or `{` after `root`
            error 5..12: unterminated string literal
        "#]],
    );
    check_diagnostics(
        "access_by_lua_block { if x then",
        expect![[r#"
            error 21..31: unterminated Lua block
        "#]],
    );
}

#[test]
fn geo_entries_are_exclusive() {
    let parse = parse("geo $a { proxy 1.1.1.1 default 0; 10.0.0.0/8 1; }");
    assert_eq!(parse.diagnostics().len(), 1);

    let contents: Vec<_> = parse
        .root()
        .descendants()
        .filter(|node| node.kind() == SyntaxKind::GEO_BLOCK_CONTENT)
        .collect();
    assert_eq!(contents.len(), 2);
    for content in contents {
        let entries = content.children().filter(|node| node.kind().is_geo_entry()).count();
        assert_eq!(entries, 1, "{content:?}");
    }
}

#[test]
fn lua_code_is_opaque() {
    let parse = parse("rewrite_by_lua_block { if a then b() end; x = { } }");
    assert!(parse.diagnostics().is_empty(), "{:?}", parse.diagnostics());

    let lua = parse.root().children().next().unwrap();
    assert_eq!(lua.kind(), SyntaxKind::REWRITE_BY_LUA_BLOCK_STMT);
    let kinds: Vec<_> = lua.child_tokens().map(|token| token.kind()).collect();
    assert_eq!(
        kinds,
        [
            SyntaxKind::LUA_BLOCK_KW,
            SyntaxKind::LEFT_BRACE,
            SyntaxKind::LUA_CODE,
            SyntaxKind::RIGHT_BRACE,
        ]
    );
}

#[test]
fn lua_block_arguments() {
    check_diagnostics("set_by_lua_block $a { return 1 }", expect![[""]]);
    check_diagnostics(
        "set_by_lua_block { return 1 }",
        expect![[r#"
            error 16..16: expected a variable after `set_by_lua_block`
        "#]],
    );
    check_diagnostics(
        "set_by_lua_block $a $b { return 1 }",
        expect![[r#"
            error 20..22: unexpected extra values
        "#]],
    );

    // A missing `{` must not turn the next block into Lua silently.
    let text = "content_by_lua_block\nlocation / { return 200; }\n";
    check_diagnostics(
        text,
        expect![[r#"
            error 21..31: unexpected extra values
        "#]],
    );
    let parse = parse(text);
    let lua = parse.root().children().next().unwrap();
    assert_eq!(lua.kind(), SyntaxKind::CONTENT_BY_LUA_BLOCK_STMT);
    let extra: Vec<_> = lua.children().map(|node| (node.kind(), node.text_trimmed())).collect();
    assert_eq!(extra, [(SyntaxKind::ERROR, "location /")]);
}

#[test]
fn deep_nesting_is_cut_off() {
    let depth = 300;
    let text = format!("{}{}", "a {".repeat(depth), "}".repeat(depth));
    let parse = parse(&text);
    assert_eq!(parse.text(), text);
    parse.tree().assert_invariants();

    let messages: Vec<_> = parse.diagnostics().iter().map(|d| d.message()).collect();
    assert_eq!(messages, ["blocks nested too deeply"]);
}

#[test]
fn visitor_sees_every_statement() {
    #[derive(Default)]
    struct Names(Vec<String>);

    impl<'a> Visitor<'a> for Names {
        fn visit_directive_stmt(&mut self, node: ngx_syntax::ast::DirectiveStmt<'a>) {
            if let Some(name) = node.name() {
                self.0.push(name.text_trimmed().to_owned());
            }
            ngx_syntax::ast::walk(self, node.syntax());
        }
    }

    let parse = parse("http { server { listen 80; } if ($a) { return 403; } }");
    let mut names = Names::default();
    parse.source_file().accept(&mut names);
    assert_eq!(names.0, ["http", "server", "listen", "return"]);
}

fn check_reparse(before: &str, edit: TextEdit) -> Parse {
    let old = parse(before);
    let reparsed = reparse(&old, &edit).unwrap();
    let after = edit.apply(before).unwrap();
    let fresh = parse(&after);
    assert_eq!(reparsed.debug_dump(), fresh.debug_dump(), "{before:?} -> {after:?}");
    assert_eq!(reparsed, fresh);
    reparsed
}

#[test]
fn reparse_matches_full_parse() {
    let text = "http {\n    server { listen 80; }\n}\nevents { a; }\n";
    let at = |needle: &str| TextSize::of(&text[..text.find(needle).unwrap()]);

    // Inside the inner block.
    check_reparse(text, TextEdit::replace(TextRange::at(at("80"), 2.into()), "443 ssl"));
    // A new statement in the outer block.
    check_reparse(text, TextEdit::insert(at("    server"), "    gzip on;\n"));
    // Breaking a statement.
    check_reparse(text, TextEdit::delete(TextRange::at(at("; }"), 1.into())));
    // Closing a block early.
    check_reparse(text, TextEdit::insert(at("listen"), "} "));
    // Opening a string that runs past the block.
    check_reparse(text, TextEdit::insert(at("listen"), "\""));
    // Outside of every block.
    check_reparse(text, TextEdit::replace(TextRange::at(at("events"), 6.into()), "stream"));
    // A Lua body that swallows the closing brace.
    check_reparse(text, TextEdit::insert(at("a; }"), "content_by_lua_block { "));
}

#[test]
fn empty_edit_changes_nothing() {
    let texts = BROKEN.iter().copied().chain(["http {\n    server { listen 80; }\n}\n"]);
    for text in texts {
        let parsed = parse(text);
        assert_eq!(parse(text), parsed, "{text:?}");
        let reparsed = reparse(&parsed, &TextEdit::insert(0.into(), "")).unwrap();
        assert_eq!(reparsed, parsed, "{text:?}");
    }
}

#[test]
fn reparse_keeps_diagnostics_elsewhere() {
    let text = "a {\n    b;\n}\nset;\ne { f }\n";
    assert_eq!(parse(text).diagnostics().len(), 2);
    let at = |needle: &str| TextSize::of(&text[..text.find(needle).unwrap()]);

    let reparsed = check_reparse(text, TextEdit::insert(at("b;"), "x y;\n    "));
    assert_eq!(reparsed.diagnostics().len(), 2);

    let reparsed = check_reparse(text, TextEdit::replace(TextRange::at(at("f }"), 1.into()), "f;"));
    assert_eq!(reparsed.diagnostics().len(), 1);
}

#[test]
fn reparse_in_geo_block() {
    let text = "geo $a {\n    default 0;\n}\n";
    let at = |needle: &str| TextSize::of(&text[..text.find(needle).unwrap()]);
    check_reparse(text, TextEdit::insert(at("}"), "    10.0.0.0/8 1;\n"));
    check_reparse(text, TextEdit::insert(at("}"), "    10.0.0.0/8 1 2\n"));
}

#[test]
fn reparse_rejects_bad_edits() {
    let old = parse("a;");
    let edit = TextEdit::delete(TextRange::new(1.into(), 5.into()));
    assert!(reparse(&old, &edit).is_err());
}
