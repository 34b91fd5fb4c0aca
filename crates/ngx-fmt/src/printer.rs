use ngx_syntax::SyntaxKind::{self, *};
use ngx_syntax::ast::{BlockStmt, GeoBlockStmt, SourceFile, Visitor, walk};
use ngx_syntax::{AstNode as _, SyntaxNode, SyntaxToken, TextSize, WalkEventWithTokens};
use rustc_hash::FxHashSet;

use crate::FormatConfig;

pub(crate) fn print(file: SourceFile<'_>, config: &FormatConfig) -> String {
    let mut items = ItemStarts::default();
    file.accept(&mut items);

    let mut printer = Printer {
        config,
        out: String::with_capacity(file.syntax().text().len()),
        item_starts: items.0,
    };

    let mut prev = None;
    for event in file.syntax().preorder_with_tokens() {
        let WalkEventWithTokens::Token(token) = event else { continue };
        printer.gap(prev, token);
        printer.out.push_str(token.text_trimmed());
        prev = Some(token);
    }
    printer.out
}

/// Offsets where a statement or geo entry begins.
#[derive(Default)]
struct ItemStarts(FxHashSet<TextSize>);

impl<'a> Visitor<'a> for ItemStarts {
    fn visit_source_file(&mut self, node: SourceFile<'a>) {
        self.0.extend(node.statements().map(|stmt| stmt.syntax().trimmed_range().start()));
        walk(self, node.syntax());
    }

    fn visit_block_stmt(&mut self, node: BlockStmt<'a>) {
        self.0.extend(node.statements().map(|stmt| stmt.syntax().trimmed_range().start()));
        walk(self, node.syntax());
    }

    fn visit_geo_block_stmt(&mut self, node: GeoBlockStmt<'a>) {
        self.0.extend(node.entries().map(|entry| entry.syntax().trimmed_range().start()));
        walk(self, node.syntax());
    }
}

/// How the line breaks of one gap are laid out.
struct Layout {
    indent: usize,
    /// Indent of comments that start their own line.
    comment_indent: usize,
    min_newlines: usize,
    max_newlines: usize,
    /// Written instead when the token stays on the previous line.
    same_line: &'static str,
}

struct Printer<'c> {
    config: &'c FormatConfig,
    out: String,
    item_starts: FxHashSet<TextSize>,
}

impl Printer<'_> {
    /// Writes the trivia between `prev` and `token`.
    fn gap(&mut self, prev: Option<SyntaxToken<'_>>, token: SyntaxToken<'_>) {
        let trivia: Vec<_> = prev
            .into_iter()
            .flat_map(SyntaxToken::trailing_trivia)
            .chain(token.leading_trivia())
            .collect();
        let max_newlines = self.config.keep_blank_lines + 1;

        let Some(prev) = prev else {
            let max_newlines = if token.kind() == EOF { 1 } else { max_newlines };
            let layout =
                Layout { indent: 0, comment_indent: 0, min_newlines: 0, max_newlines, same_line: "" };
            self.lines(&trivia, &layout);
            return;
        };

        if token.kind() == EOF {
            let layout = Layout {
                indent: 0,
                comment_indent: 0,
                min_newlines: 0,
                max_newlines: 1,
                same_line: "",
            };
            self.lines(&trivia, &layout);
            return;
        }

        let in_lua_body = token.kind() == LUA_CODE
            || prev.kind() == LUA_CODE
            || (prev.kind() == LEFT_BRACE && prev.parent().kind().is_lua_block());
        if in_lua_body {
            self.verbatim(&trivia);
            return;
        }

        let parent = token.parent();
        let layout = match token.kind() {
            RIGHT_BRACE if is_block(parent.kind()) => {
                let depth = depth(token);
                let empty = prev.kind() == LEFT_BRACE && prev.parent() == parent;
                Layout {
                    indent: depth,
                    comment_indent: depth + 1,
                    min_newlines: usize::from(spans_lines(parent)),
                    max_newlines,
                    same_line: if empty { "" } else { " " },
                }
            }
            _ if self.item_starts.contains(&token.trimmed_range().start()) => {
                let depth = depth(token);
                let opens_block = prev.kind() == LEFT_BRACE
                    && is_block(prev.parent().kind())
                    && spans_lines(prev.parent());
                Layout {
                    indent: depth,
                    comment_indent: depth,
                    min_newlines: usize::from(opens_block),
                    max_newlines,
                    same_line: " ",
                }
            }
            SEMICOLON if !has_break(&trivia) => return,
            LEFT_BRACE if is_block(parent.kind()) || parent.kind().is_lua_block() => {
                let depth = depth(token);
                Layout {
                    indent: depth,
                    comment_indent: depth,
                    min_newlines: 0,
                    max_newlines,
                    same_line: " ",
                }
            }
            _ => {
                self.verbatim(&trivia);
                return;
            }
        };
        self.lines(&trivia, &layout);
    }

    /// Keeps comments and the number of line breaks (within limits) and
    /// replaces all horizontal whitespace.
    fn lines(&mut self, trivia: &[SyntaxToken<'_>], layout: &Layout) {
        let mut newlines = 0;
        let mut same_line = true;
        for piece in trivia {
            match piece.kind() {
                NEWLINE => {
                    newlines += 1;
                    same_line = false;
                }
                COMMENT => {
                    if same_line && !self.out.is_empty() {
                        self.out.push(' ');
                    } else {
                        self.newlines(newlines, self.config.keep_blank_lines + 1);
                        self.config.push_indent(&mut self.out, layout.comment_indent);
                    }
                    self.out.push_str(piece.text_trimmed());
                    newlines = 0;
                }
                _ => {}
            }
        }

        let newlines = newlines.max(layout.min_newlines);
        if newlines == 0 {
            self.out.push_str(layout.same_line);
        } else {
            self.newlines(newlines, layout.max_newlines);
            self.config.push_indent(&mut self.out, layout.indent);
        }
    }

    /// Writes the trivia unchanged apart from the line terminators and
    /// whitespace at the end of a line.
    fn verbatim(&mut self, trivia: &[SyntaxToken<'_>]) {
        for (i, piece) in trivia.iter().enumerate() {
            match piece.kind() {
                NEWLINE => self.out.push_str(self.config.newline.as_str()),
                WHITESPACE if trivia.get(i + 1).is_some_and(|next| next.kind() == NEWLINE) => {}
                _ => self.out.push_str(piece.text_trimmed()),
            }
        }
    }

    /// Line breaks never open the output.
    fn newlines(&mut self, count: usize, max: usize) {
        if !self.out.is_empty() {
            self.config.push_newlines(&mut self.out, count.min(max));
        }
    }
}

fn is_block(kind: SyntaxKind) -> bool {
    matches!(kind, BLOCK_STMT | GEO_BLOCK_STMT)
}

/// Nesting level of `token`. The braces of a block sit at the level of the
/// statement that owns it.
fn depth(token: SyntaxToken<'_>) -> usize {
    let blocks = token.parent_ancestors().filter(|node| is_block(node.kind())).count();
    let own_brace =
        matches!(token.kind(), LEFT_BRACE | RIGHT_BRACE) && is_block(token.parent().kind());
    blocks - usize::from(own_brace)
}

fn spans_lines(block: SyntaxNode<'_>) -> bool {
    block.text_trimmed().contains('\n')
}

fn has_break(trivia: &[SyntaxToken<'_>]) -> bool {
    trivia.iter().any(|piece| matches!(piece.kind(), NEWLINE | COMMENT))
}
