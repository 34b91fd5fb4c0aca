/// Line terminator written at every line break the formatter emits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NewlineStyle {
    #[default]
    Lf,
    Crlf,
}

impl NewlineStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::Crlf => "\r\n",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatConfig {
    /// Spaces per nesting level when not indenting with tabs.
    pub indent_width: usize,
    pub use_tabs: bool,
    /// Blank lines kept in a row; longer runs are collapsed.
    pub keep_blank_lines: usize,
    pub newline: NewlineStyle,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self { indent_width: 4, use_tabs: false, keep_blank_lines: 2, newline: NewlineStyle::Lf }
    }
}

impl FormatConfig {
    #[must_use]
    pub fn with_indent_width(self, indent_width: usize) -> Self {
        Self { indent_width, ..self }
    }

    #[must_use]
    pub fn with_tabs(self, use_tabs: bool) -> Self {
        Self { use_tabs, ..self }
    }

    #[must_use]
    pub fn with_keep_blank_lines(self, keep_blank_lines: usize) -> Self {
        Self { keep_blank_lines, ..self }
    }

    #[must_use]
    pub fn with_newline(self, newline: NewlineStyle) -> Self {
        Self { newline, ..self }
    }

    pub(crate) fn push_indent(&self, out: &mut String, level: usize) {
        if self.use_tabs {
            out.extend(std::iter::repeat_n('\t', level));
        } else {
            out.extend(std::iter::repeat_n(' ', level * self.indent_width));
        }
    }

    /// Pushes `count` line breaks, at most one more than the blank lines kept.
    pub(crate) fn push_newlines(&self, out: &mut String, count: usize) {
        for _ in 0..count.min(self.keep_blank_lines + 1) {
            out.push_str(self.newline.as_str());
        }
    }
}
