use ngx_db::SourceFile;
use ngx_syntax::ast::{AnyLuaBlock, BlockStmt, GeoBlockStmt, Visitor, walk};
use ngx_syntax::{AstNode as _, SyntaxKind, SyntaxToken};
use text_size::TextRange;

use crate::Analysis;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldKind {
    Block,
    Lua,
}

/// A foldable region: everything between a pair of braces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fold {
    pub range: TextRange,
    pub kind: FoldKind,
}

impl Analysis {
    /// Folds for every closed block with something between its braces, in
    /// source order.
    pub fn folding_ranges(&self, file: SourceFile) -> Vec<Fold> {
        let mut folds = Folds::default();
        file.parse(self.db()).source_file().accept(&mut folds);
        folds.0
    }
}

#[derive(Default)]
struct Folds(Vec<Fold>);

impl Folds {
    fn push(
        &mut self,
        l_brace: Option<SyntaxToken<'_>>,
        r_brace: Option<SyntaxToken<'_>>,
        kind: FoldKind,
    ) {
        let (Some(l_brace), Some(r_brace)) = (l_brace, r_brace) else { return };
        let range = TextRange::new(l_brace.trimmed_range().end(), r_brace.trimmed_range().start());
        if !range.is_empty() {
            self.0.push(Fold { range, kind });
        }
    }
}

impl<'a> Visitor<'a> for Folds {
    fn visit_block_stmt(&mut self, node: BlockStmt<'a>) {
        self.push(node.l_brace(), node.r_brace(), FoldKind::Block);
        walk(self, node.syntax());
    }

    fn visit_geo_block_stmt(&mut self, node: GeoBlockStmt<'a>) {
        self.push(node.l_brace(), node.r_brace(), FoldKind::Block);
        walk(self, node.syntax());
    }

    // Lua statements come in several kinds; their `{` is the common hook.
    fn visit_token(&mut self, token: SyntaxToken<'a>) {
        if token.kind() != SyntaxKind::LEFT_BRACE {
            return;
        }
        if let Some(lua) = AnyLuaBlock::cast(token.parent()) {
            self.push(lua.l_brace(), lua.r_brace(), FoldKind::Lua);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Analysis, FoldKind};

    fn check(text: &str, expected: &[(FoldKind, &str)]) {
        let analysis = Analysis::default();
        let file = analysis.add_file("nginx.conf", text.to_owned());
        let folds: Vec<_> = analysis
            .folding_ranges(file)
            .into_iter()
            .map(|fold| (fold.kind, &text[fold.range]))
            .collect();
        assert_eq!(folds, expected);
    }

    #[test]
    fn blocks_with_content() {
        check(
            "http {\n    server {}\n    content_by_lua_block { ngx.say(1) }\n    geo $a { default 0; }\n}\n",
            &[
                (
                    FoldKind::Block,
                    "\n    server {}\n    content_by_lua_block { ngx.say(1) }\n    geo $a { default 0; }\n",
                ),
                (FoldKind::Lua, " ngx.say(1) "),
                (FoldKind::Block, " default 0; "),
            ],
        );
    }

    #[test]
    fn empty_and_unclosed_blocks() {
        check("a {}\nb { }\ncontent_by_lua_block {}\n", &[(FoldKind::Block, " ")]);
        check("a {\n    b;\n", &[]);
    }

    #[test]
    fn if_blocks() {
        check("if ($a) {\n    return 403;\n}", &[(FoldKind::Block, "\n    return 403;\n")]);
    }
}
