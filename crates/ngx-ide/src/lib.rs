//! Editor features computed from the syntax tree: folding, brace matching
//! and the ranges of embedded Lua code.

mod folding;
mod injections;
mod matching_brace;

pub use folding::{Fold, FoldKind};
pub use injections::LuaInjection;
use ngx_db::SourceFile;
use ngx_syntax::{SyntaxKind, SyntaxToken, TokenAtOffset};
use salsa::Setter as _;
use text_size::TextSize;

#[derive(Debug, Clone, Copy)]
pub struct FilePosition {
    pub file: SourceFile,
    pub offset: TextSize,
}

/// Entry point for editor queries. Owns the database the files live in.
pub struct Analysis {
    db: salsa::DatabaseImpl,
}

impl Default for Analysis {
    fn default() -> Self {
        Self { db: salsa::DatabaseImpl::new() }
    }
}

impl Analysis {
    pub fn db(&self) -> &salsa::DatabaseImpl {
        &self.db
    }

    pub fn add_file(&self, path: &str, text: String) -> SourceFile {
        SourceFile::new(&self.db, path.into(), text)
    }

    pub fn set_text(&mut self, file: SourceFile, text: String) {
        tracing::debug!(path = %file.path(&self.db), "text changed");
        file.set_text(&mut self.db).to(text);
    }
}

/// Picks the token at `offset` that `rank` likes best; ties go to the right.
fn pick_best_token<'a>(
    tokens: TokenAtOffset<SyntaxToken<'a>>,
    rank: impl Fn(SyntaxKind) -> usize,
) -> Option<SyntaxToken<'a>> {
    tokens.max_by_key(|token| rank(token.kind()))
}

#[cfg(test)]
mod tests {
    use text_size::TextSize;

    pub(crate) const CURSOR_MARKER: &str = "$0";

    pub(crate) fn extract_offset(text: &str) -> (TextSize, String) {
        let cursor_pos = text.find(CURSOR_MARKER).expect("Cursor marker not found");
        let mut new_text = String::with_capacity(text.len() - CURSOR_MARKER.len());
        new_text.push_str(&text[..cursor_pos]);
        new_text.push_str(&text[cursor_pos + CURSOR_MARKER.len()..]);
        let cursor_pos = TextSize::from(cursor_pos as u32);
        (cursor_pos, new_text)
    }
}
