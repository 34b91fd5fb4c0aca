use std::fmt::{self, Display};

pub use annotate_snippets::Renderer;
use annotate_snippets::{Level, Snippet};
pub use text_size::TextRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    fn level(self) -> Level {
        match self {
            Self::Error => Level::Error,
            Self::Warning => Level::Warning,
        }
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
            Self::Warning => "warning",
        })
    }
}

/// Which stage found the problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Malformed token: unterminated string or Lua block.
    Lex,
    /// Unexpected or missing token, or a grammar rule violation.
    Syntax,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    range: TextRange,
    message: String,
    severity: Severity,
    kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn error(kind: DiagnosticKind, message: impl Into<String>, range: TextRange) -> Self {
        Self { range, message: message.into(), severity: Severity::Error, kind }
    }

    pub fn warning(kind: DiagnosticKind, message: impl Into<String>, range: TextRange) -> Self {
        Self { range, message: message.into(), severity: Severity::Warning, kind }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Same diagnostic, moved to `range`.
    #[must_use]
    pub fn with_range(self, range: TextRange) -> Self {
        Self { range, ..self }
    }

    pub fn render<'a>(
        &'a self,
        renderer: &'a Renderer,
        path: &'a str,
        text: &'a str,
    ) -> impl Display + 'a {
        let level = self.severity.level();
        let message = level.title(&self.message).snippet(
            Snippet::source(text)
                .origin(path)
                .annotation(level.span(self.range.into()).label("here"))
                .fold(true),
        );
        renderer.render(message)
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}: {}", self.severity, self.range, self.message)
    }
}
