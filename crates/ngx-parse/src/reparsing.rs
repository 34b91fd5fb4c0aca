//! Incremental reparsing.
//!
//! An edit that stays between the braces of a block only needs that block
//! reparsed. The lexer starts over in its default state after every `{` and
//! `}`, so tokens outside the block are the same before and after the edit,
//! and the spliced tree is the one a full parse would build. Whenever that
//! cannot be shown cheaply, the whole text is parsed again.

use ngx_errors::{Diagnostic, DiagnosticKind};
use ngx_syntax::SyntaxKind::{self, *};
use ngx_syntax::{
    Builder, SyntaxNode, SyntaxToken, TextRange, TriviaIter, TriviaPiece,
    TriviaPieceKind, WalkEventWithTokens,
};

use crate::edit::{EditError, TextEdit};
use crate::parser::{Event, Parser, replay};
use crate::{Parse, grammar, parse};

/// Applies `edit` to the text of `old` and returns the parse of the result.
///
/// The result is always equal to `parse(&edited_text)`; only the amount of
/// work differs.
pub fn reparse(old: &Parse, edit: &TextEdit) -> Result<Parse, EditError> {
    let text = edit.apply(old.text())?;
    match reparse_block(old, edit, &text) {
        Ok(reparsed) => Ok(reparsed),
        Err(reason) => {
            tracing::debug!(reason, "falling back to a full parse");
            Ok(parse(&text))
        }
    }
}

fn reparse_block(old: &Parse, edit: &TextEdit, text: &str) -> Result<Parse, &'static str> {
    let root = old.root();
    let (block, l_brace, r_brace) = root
        .descendants()
        .filter_map(braced_block)
        .filter(|&(_, l_brace, r_brace)| interior(l_brace, r_brace).contains_range(edit.delete))
        .last()
        .ok_or("no block encloses the edit")?;

    let old_range = TextRange::new(l_brace.trimmed_range().start(), r_brace.trimmed_range().end());
    let new_end = old_range.end() - edit.delete.len() + edit.insert_len();
    let slice = &text[TextRange::new(old_range.start(), new_end)];

    let (before, after) = split_diagnostics(old.diagnostics(), interior(l_brace, r_brace))?;

    let depth = block.ancestors().skip(1).filter(|node| is_block(node.kind())).count();
    let mut parser = Parser::new(slice).with_depth(depth as u32);
    if !grammar::isolated_block(&mut parser, block.kind()) {
        return Err("the edit changes where the block ends");
    }
    let (mut events, inner) = parser.finish();
    if inner.iter().any(|diagnostic| diagnostic.kind() == DiagnosticKind::Lex) {
        return Err("malformed token inside the block");
    }
    reattach_trivia(&mut events, l_brace, r_brace);

    let mut builder = Builder::new(text);
    let mut walk = root.preorder_with_tokens();
    while let Some(event) = walk.next() {
        match event {
            WalkEventWithTokens::EnterNode(node) if node == block => {
                walk.skip_subtree();
                replay(std::mem::take(&mut events), &mut builder);
            }
            WalkEventWithTokens::EnterNode(node) => builder.start_node(node.kind()),
            WalkEventWithTokens::LeaveNode(_) => builder.finish_node(),
            WalkEventWithTokens::Token(token) => builder.token(
                &pieces(token.leading_trivia()),
                token.kind(),
                token.trimmed_range().len(),
                &pieces(token.trailing_trivia()),
            ),
        }
    }

    let mut diagnostics: Vec<_> = before.into_iter().cloned().collect();
    diagnostics.extend(inner.into_iter().map(|diagnostic| {
        let range = diagnostic.range() + old_range.start();
        diagnostic.with_range(range)
    }));
    diagnostics.extend(after.into_iter().map(|diagnostic| {
        let range = diagnostic.range() - edit.delete.len() + edit.insert_len();
        diagnostic.clone().with_range(range)
    }));
    diagnostics.sort_by_key(|diagnostic| diagnostic.range().start());

    tracing::debug!(kind = ?block.kind(), range = ?old_range, "reparsed block");
    Ok(Parse::new(builder.finish(), diagnostics))
}

fn interior(l_brace: SyntaxToken<'_>, r_brace: SyntaxToken<'_>) -> TextRange {
    TextRange::new(l_brace.trimmed_range().end(), r_brace.trimmed_range().start())
}

fn is_block(kind: SyntaxKind) -> bool {
    matches!(kind, BLOCK_STMT | GEO_BLOCK_STMT)
}

/// A block or geo block closed by its own `}`, with both braces.
type BracedBlock<'a> = (SyntaxNode<'a>, SyntaxToken<'a>, SyntaxToken<'a>);

fn braced_block(node: SyntaxNode<'_>) -> Option<BracedBlock<'_>> {
    if !is_block(node.kind()) {
        return None;
    }
    let mut tokens = node.child_tokens();
    let l_brace = tokens.next().filter(|token| token.kind() == LEFT_BRACE)?;
    let r_brace = tokens.next_back().filter(|token| token.kind() == RIGHT_BRACE)?;
    Some((node, l_brace, r_brace))
}

/// Splits the diagnostics that belong to the rest of the file into those
/// before and after the block interior. The ones inside are dropped.
fn split_diagnostics(
    diagnostics: &[Diagnostic],
    interior: TextRange,
) -> Result<(Vec<&Diagnostic>, Vec<&Diagnostic>), &'static str> {
    let mut before = Vec::new();
    let mut after = Vec::new();
    for diagnostic in diagnostics {
        let range = diagnostic.range();
        if interior.contains_range(range) {
            continue;
        } else if range.end() <= interior.start() {
            before.push(diagnostic);
        } else if range.start() >= interior.end() {
            after.push(diagnostic);
        } else {
            return Err("a diagnostic crosses the block boundary");
        }
    }
    Ok((before, after))
}

/// The block was parsed on its own, so its braces lack the trivia they have
/// in the whole file.
fn reattach_trivia(events: &mut [Event], l_brace: SyntaxToken<'_>, r_brace: SyntaxToken<'_>) {
    let mut tokens = events.iter_mut().filter_map(|event| match event {
        Event::Token(token) => Some(token),
        _ => None,
    });
    if let Some(first) = tokens.next() {
        debug_assert_eq!(first.kind, LEFT_BRACE);
        first.leading = pieces(l_brace.leading_trivia());
    }
    if let Some(last) = tokens.next_back() {
        debug_assert_eq!(last.kind, RIGHT_BRACE);
        last.trailing = pieces(r_brace.trailing_trivia());
    }
}

fn pieces(trivia: TriviaIter<'_>) -> Vec<TriviaPiece> {
    trivia
        .map(|token| {
            let kind = TriviaPieceKind::from_syntax_kind(token.kind())
                .unwrap_or_else(|| unreachable!("`{:?}` is not trivia", token.kind()));
            TriviaPiece::new(kind, token.trimmed_range().len())
        })
        .collect()
}
