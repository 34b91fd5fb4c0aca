use expect_test::{Expect, expect};

use crate::{FormatConfig, FormatError, NewlineStyle, format};

#[track_caller]
fn check_with(config: &FormatConfig, before: &str, after: &str) {
    let formatted = format(before, config).unwrap();
    assert_eq!(formatted, after);
    let again = format(&formatted, config).unwrap();
    assert_eq!(again, formatted, "formatting is not idempotent");
}

#[track_caller]
fn check(before: &str, after: &str) {
    check_with(&FormatConfig::default(), before, after);
}

#[track_caller]
fn check_expect(before: &str, expect: Expect) {
    let formatted = format(before, &FormatConfig::default()).unwrap();
    expect.assert_eq(&formatted);
}

#[test]
fn basic_block_indent() {
    check(
        "server {\nlisten 80;\nserver_name localhost;\n}",
        "server {\n    listen 80;\n    server_name localhost;\n}",
    );
}

#[test]
fn nested_blocks() {
    check("http {\nserver {\nlisten 80;\n}\n}", "http {\n    server {\n        listen 80;\n    }\n}");
}

#[test]
fn deeply_nested() {
    check(
        "http {\nserver {\nlocation / {\nreturn 200;\n}\n}\n}",
        "http {\n    server {\n        location / {\n            return 200;\n        }\n    }\n}",
    );
}

#[test]
fn map_and_types_blocks() {
    check("map $uri $new {\ndefault 0;\n/foo 1;\n}", "map $uri $new {\n    default 0;\n    /foo 1;\n}");
    check(
        "types {\ntext/html html;\napplication/json json;\n}",
        "types {\n    text/html html;\n    application/json json;\n}",
    );
}

#[test]
fn geo_block_indent() {
    check(
        "geo $geo {\ndefault 0;\n10.0.0.0/8 1;\n}",
        "geo $geo {\n    default 0;\n    10.0.0.0/8 1;\n}",
    );
}

#[test]
fn no_space_before_semicolon() {
    check("listen 80 ;", "listen 80;");
}

#[test]
fn space_before_brace() {
    check("server{\nlisten 80;\n}", "server {\n    listen 80;\n}");
    check("if ($a)   {\nreturn 403;\n}", "if ($a) {\n    return 403;\n}");
}

#[test]
fn if_directive() {
    check("if ($var) {\nreturn 200;\n}", "if ($var) {\n    return 200;\n}");
}

#[test]
fn preserves_blank_line_at_block_start() {
    check("server {\n\n    listen 80;\n}", "server {\n\n    listen 80;\n}");
}

#[test]
fn preserves_multi_line_continuation() {
    let text = "log_format combined '$remote_addr - $remote_user [$time_local] '\n                    '\"$request\" $status $body_bytes_sent '\n                    '\"$http_referer\" \"$http_user_agent\"';";
    check(text, text);
}

#[test]
fn single_line_blocks_stay() {
    check("events { worker_connections 512; }", "events { worker_connections 512; }");
    check("location / { }", "location / {}");
}

#[test]
fn blank_lines_are_capped() {
    check("a;\n\n\n\n\nb;", "a;\n\n\nb;");
    check_with(&FormatConfig::default().with_keep_blank_lines(0), "a;\n\nb;", "a;\nb;");
}

#[test]
fn file_edges() {
    check("\n\n  a;\n\n\n", "a;\n");
    check("", "");
    check("# only a comment\n\n", "# only a comment\n");
}

#[test]
fn comments() {
    check_expect(
        "# top\nserver { # open\n# first\nlisten 80;   # trailing\n\n      # closing\n}\n",
        expect![[r#"
            # top
            server { # open
                # first
                listen 80; # trailing

                # closing
            }
        "#]],
    );
}

#[test]
fn lua_body_is_untouched() {
    let text = "location / {\n    content_by_lua_block {\n          ngx.say(1)\n  }\n}";
    check(text, text);
    check(
        "location / {\ncontent_by_lua_block{ngx.say(1)}\n}",
        "location / {\n    content_by_lua_block {ngx.say(1)}\n}",
    );
}

#[test]
fn tabs_and_widths() {
    let text = "a {\nb {\nc;\n}\n}";
    check_with(&FormatConfig::default().with_tabs(true), text, "a {\n\tb {\n\t\tc;\n\t}\n}");
    check_with(&FormatConfig::default().with_indent_width(2), text, "a {\n  b {\n    c;\n  }\n}");
}

#[test]
fn newline_style() {
    let text = "a {\r\nb;\r\n}\r\n";
    check(text, "a {\n    b;\n}\n");
    check_with(
        &FormatConfig::default().with_newline(NewlineStyle::Crlf),
        text,
        "a {\r\n    b;\r\n}\r\n",
    );
}

#[test]
fn warnings_do_not_block_formatting() {
    check("if ($a = b $c) {\nreturn 403;\n}", "if ($a = b $c) {\n    return 403;\n}");
}

#[test]
fn syntax_errors_are_refused() {
    let err = format("server {\n    listen 80\n", &FormatConfig::default()).unwrap_err();
    let FormatError::Syntax { diagnostics } = &err;
    assert!(diagnostics.iter().all(|diagnostic| diagnostic.is_error()));
    assert!(diagnostics.iter().any(|diagnostic| diagnostic.message() == "unclosed `{`"));
    let expected = format!("cannot format a file with syntax errors ({} found)", diagnostics.len());
    assert_eq!(err.to_string(), expected);
}
