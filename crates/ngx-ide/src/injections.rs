use ngx_db::SourceFile;
use ngx_syntax::ast::{AnyLuaBlock, Visitor};
use ngx_syntax::{AstNode as _, SyntaxKind, SyntaxToken};
use text_size::{TextRange, TextSize};

use crate::Analysis;

/// Lua source embedded in a `*_by_lua_block` directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LuaInjection {
    /// Kind of the statement holding the code.
    pub directive: SyntaxKind,
    /// The body without its blank first and last lines.
    pub range: TextRange,
}

impl Analysis {
    pub fn lua_injections(&self, file: SourceFile) -> Vec<LuaInjection> {
        let mut injections = Injections::default();
        file.parse(self.db()).source_file().accept(&mut injections);
        injections.0
    }
}

#[derive(Default)]
struct Injections(Vec<LuaInjection>);

impl<'a> Visitor<'a> for Injections {
    fn visit_token(&mut self, token: SyntaxToken<'a>) {
        let Some(lua) = AnyLuaBlock::cast(token.parent()) else { return };
        if lua.lua_code() != Some(token) {
            return;
        }
        if let Some(range) = content_range(token.text_trimmed()) {
            let range = range + token.trimmed_range().start();
            self.0.push(LuaInjection { directive: lua.syntax().kind(), range });
        }
    }
}

/// From the start of the first non-blank line to the end of the last one,
/// its line break included. `None` when every line is blank.
fn content_range(code: &str) -> Option<TextRange> {
    let mut start = None;
    let mut end = TextSize::new(0);
    let mut offset = TextSize::new(0);
    for line in code.split_inclusive('\n') {
        let len = TextSize::of(line);
        if !line.trim().is_empty() {
            start.get_or_insert(offset);
            end = offset + len;
        }
        offset += len;
    }
    Some(TextRange::new(start?, end))
}
