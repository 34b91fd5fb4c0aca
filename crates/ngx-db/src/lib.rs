//! Memoized per-file queries.
//!
//! A [`SourceFile`] is a salsa input; its parse and line index are computed
//! on first use and reused until the text is set again.

pub use line_index::{LineCol, LineIndex};
pub use ngx_errors::Diagnostic;
pub use ngx_parse::Parse;

#[salsa::input(debug)]
pub struct SourceFile {
    #[returns(ref)]
    pub path: camino::Utf8PathBuf,
    #[returns(deref)]
    pub text: String,
}

#[salsa::tracked]
impl SourceFile {
    #[salsa::tracked(returns(ref), no_eq)]
    pub fn line_index(self, db: &dyn salsa::Database) -> LineIndex {
        LineIndex::new(self.text(db))
    }

    #[salsa::tracked(returns(ref))]
    pub fn parse(self, db: &dyn salsa::Database) -> Parse {
        tracing::debug!(path = %self.path(db), "parsing");
        ngx_parse::parse(self.text(db))
    }
}

/// Diagnostics of `file`, in source order.
pub fn diagnostics(db: &dyn salsa::Database, file: SourceFile) -> &[Diagnostic] {
    file.parse(db).diagnostics()
}

/// Zero-based line and column of `diagnostic` in `file`.
pub fn diagnostic_position(
    db: &dyn salsa::Database,
    file: SourceFile,
    diagnostic: &Diagnostic,
) -> LineCol {
    file.line_index(db).line_col(diagnostic.range().start())
}
