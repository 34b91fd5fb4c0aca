//! Formatter for nginx configuration files.
//!
//! Only the whitespace around statements and braces is rewritten. Statements
//! are indented one level per enclosing block, `{` gets a single space before
//! it and `;` none. Comments are kept; argument lists that span several lines
//! and the bodies of Lua blocks are left as written.

mod config;
mod printer;
#[cfg(test)]
mod tests;

pub use config::{FormatConfig, NewlineStyle};
use ngx_errors::Diagnostic;
use ngx_parse::Parse;

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("cannot format a file with syntax errors ({} found)", .diagnostics.len())]
    Syntax { diagnostics: Vec<Diagnostic> },
}

pub fn format(text: &str, config: &FormatConfig) -> Result<String, FormatError> {
    format_parse(&ngx_parse::parse(text), config)
}

/// Formats an existing parse. Warnings do not stop formatting; errors do.
pub fn format_parse(parse: &Parse, config: &FormatConfig) -> Result<String, FormatError> {
    if parse.has_errors() {
        let diagnostics =
            parse.diagnostics().iter().filter(|diagnostic| diagnostic.is_error()).cloned().collect();
        return Err(FormatError::Syntax { diagnostics });
    }

    let formatted = printer::print(parse.source_file(), config);
    tracing::debug!(before = parse.text().len(), after = formatted.len(), "formatted");
    Ok(formatted)
}
