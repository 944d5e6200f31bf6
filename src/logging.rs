//! Logging configuration for personaldb.
//!
//! The server has no terminal UI to protect, so everything goes to stderr.

use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

/// Default filter used when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "info";

/// Initializes logging to stderr.
///
/// Honors `RUST_LOG`; falls back to `info`. Colors only when stderr is a
/// terminal.
pub fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(default_env_filter())
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();
}

fn default_env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
