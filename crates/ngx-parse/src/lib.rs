//! Error-tolerant parser for nginx configuration files.
//!
//! [`parse`] never fails: whatever it cannot make sense of ends up in `ERROR`
//! nodes, and every problem is reported as a [`Diagnostic`]. The tree always
//! reproduces the input text byte for byte.

mod edit;
mod grammar;
mod parser;
mod reparsing;
#[cfg(test)]
mod tests;

use std::fmt::Write as _;
use std::sync::Arc;

pub use edit::{EditError, TextEdit};
use ngx_errors::Diagnostic;
use ngx_syntax::ast::{self, AstNode as _};
use ngx_syntax::{SyntaxNode, SyntaxTree};
pub use reparsing::reparse;

/// A syntax tree together with the diagnostics found while building it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parse {
    tree: Arc<SyntaxTree>,
    diagnostics: Vec<Diagnostic>,
}

impl Parse {
    pub(crate) fn new(tree: SyntaxTree, diagnostics: Vec<Diagnostic>) -> Self {
        Self { tree: Arc::new(tree), diagnostics }
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn root(&self) -> SyntaxNode<'_> {
        self.tree.root()
    }

    pub fn source_file(&self) -> ast::SourceFile<'_> {
        ast::SourceFile::cast(self.root()).expect("the root is always a source file")
    }

    /// Diagnostics ordered by their start offset.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn text(&self) -> &str {
        self.tree.text()
    }

    /// The tree dump followed by one line per diagnostic.
    pub fn debug_dump(&self) -> String {
        let mut buf = self.tree.debug_dump();
        for diagnostic in &self.diagnostics {
            _ = writeln!(buf, "{diagnostic}");
        }
        buf
    }
}

/// Parses a whole configuration file.
pub fn parse(text: &str) -> Parse {
    let mut parser = parser::Parser::new(text);
    grammar::source_file(&mut parser);
    let (tree, diagnostics) = parser.build_tree();
    tracing::debug!(len = text.len(), diagnostics = diagnostics.len(), "parsed");
    Parse::new(tree, diagnostics)
}
