mod logging;

use std::process::ExitCode;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use ngx_db::{LineCol, SourceFile, diagnostic_position, diagnostics};
use ngx_errors::Renderer;
use ngx_fmt::FormatConfig;
use salsa::DatabaseImpl;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "ngx", version, about = "Checks and formats nginx configuration files")]
enum Options {
    /// Reports syntax errors and warnings.
    Check {
        #[arg(required = true)]
        paths: Vec<Utf8PathBuf>,
        /// One `path:line:col: severity: message` line per diagnostic.
        #[arg(long)]
        short: bool,
    },
    /// Prints the formatted file.
    Fmt {
        path: Utf8PathBuf,
        /// Only report whether the file is formatted.
        #[arg(long)]
        check: bool,
        #[arg(long, default_value_t = 4)]
        indent_width: usize,
        #[arg(long)]
        use_tabs: bool,
        #[arg(long, default_value_t = 2)]
        keep_blank_lines: usize,
    },
    /// Prints the syntax tree.
    Tree { path: Utf8PathBuf },
}

fn main() -> anyhow::Result<ExitCode> {
    logging::init();

    let db = DatabaseImpl::default();
    match Options::parse() {
        Options::Check { paths, short } => check(&db, &paths, short),
        Options::Fmt { path, check, indent_width, use_tabs, keep_blank_lines } => {
            let config = FormatConfig::default()
                .with_indent_width(indent_width)
                .with_tabs(use_tabs)
                .with_keep_blank_lines(keep_blank_lines);
            fmt(&db, &path, &config, check)
        }
        Options::Tree { path } => {
            let file = load(&db, &path)?;
            print!("{}", file.parse(&db).debug_dump());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load(db: &DatabaseImpl, path: &Utf8Path) -> anyhow::Result<SourceFile> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("failed to read `{path}`"))?;
    Ok(SourceFile::new(db, path.to_owned(), text))
}

fn check(db: &DatabaseImpl, paths: &[Utf8PathBuf], short: bool) -> anyhow::Result<ExitCode> {
    let renderer = Renderer::styled();
    let mut errors = 0;

    for path in paths {
        let file = load(db, path)?;
        let text = file.text(db);

        for diagnostic in diagnostics(db, file) {
            if diagnostic.is_error() {
                errors += 1;
            }

            if short {
                let LineCol { line, col } = diagnostic_position(db, file, diagnostic);
                println!(
                    "{path}:{}:{}: {}: {}",
                    line + 1,
                    col + 1,
                    diagnostic.severity(),
                    diagnostic.message()
                );
            } else {
                eprintln!("{}", diagnostic.render(&renderer, path.as_str(), text));
            }
        }
    }

    tracing::debug!(files = paths.len(), errors, "checked");
    Ok(if errors == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn fmt(
    db: &DatabaseImpl,
    path: &Utf8Path,
    config: &FormatConfig,
    check: bool,
) -> anyhow::Result<ExitCode> {
    let file = load(db, path)?;
    let formatted = ngx_fmt::format_parse(file.parse(db), config)
        .with_context(|| format!("failed to format `{path}`"))?;

    if !check {
        print!("{formatted}");
        return Ok(ExitCode::SUCCESS);
    }
    if formatted == file.text(db) {
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("`{path}` is not formatted");
        Ok(ExitCode::FAILURE)
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory as _, Parser as _};

    use super::Options;

    #[test]
    fn command_is_well_formed() {
        Options::command().debug_assert();
    }

    #[test]
    fn fmt_flags() {
        let options = Options::try_parse_from([
            "ngx",
            "fmt",
            "nginx.conf",
            "--check",
            "--indent-width",
            "2",
            "--use-tabs",
        ])
        .unwrap();
        let Options::Fmt { path, check, indent_width, use_tabs, keep_blank_lines } = options else {
            panic!("expected the fmt command");
        };
        assert_eq!(path, "nginx.conf");
        assert!(check && use_tabs);
        assert_eq!((indent_width, keep_blank_lines), (2, 2));
    }

    #[test]
    fn check_needs_a_path() {
        assert!(Options::try_parse_from(["ngx", "check"]).is_err());
        assert!(Options::try_parse_from(["ngx", "check", "a.conf", "b.conf", "--short"]).is_ok());
    }
}
