use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

const ENV_VAR: &str = "NGX_LOG";

/// Logs to stderr, filtered by `NGX_LOG` and warnings only when it is unset.
pub(crate) fn init() {
    let filter = EnvFilter::try_from_env(ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
