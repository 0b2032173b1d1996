//! Tracing setup.
//!
//! `RUST_LOG` takes precedence over the configured level:
//!   RUST_LOG=kanban=debug,tower_http=debug kanban serve

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingSection};

/// Build the filter: `RUST_LOG` if set, else `level`, else `info`.
fn build_filter(level: &str, verbose: bool) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let level = if verbose { "debug" } else { level };
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Logs go to stderr so `kanban board`
/// output stays clean JSON on stdout.
pub fn init_tracing(logging: &LoggingSection, verbose: bool) -> Result<()> {
    let filter = build_filter(&logging.level, verbose);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose);

    match logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
    .map_err(|err| anyhow!(err))
}
