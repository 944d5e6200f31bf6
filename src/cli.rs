//! Command-line argument parsing for personaldb.
//!
//! Uses clap to parse CLI arguments. The DSN is validated by hand rather than
//! through clap's `required` so that a missing value exits with status 1
//! after printing usage, like any other startup failure.

use crate::config::Config;
use crate::error::{DbError, Result};
use clap::{CommandFactory, Parser};
use std::ffi::OsString;
use std::path::PathBuf;

/// Runs batches of SQL posted to /query against an embedded SQLite database.
#[derive(Parser, Debug)]
#[command(name = "personaldb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Datasource name: a SQLite file path or sqlite: URL
    #[arg(long, value_name = "DSN", env = "PERSONALDB_DSN")]
    pub dsn: Option<String>,

    /// Listen address (overrides the config file)
    #[arg(long, value_name = "ADDR")]
    pub addr: Option<String>,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Result<Self> {
        Self::parse_args_from(std::env::args_os())
    }

    /// Parses `args`, printing clap's message on failure.
    ///
    /// `--help` and `--version` print and exit 0. Any other parse failure is
    /// a config error, so the process exits 1 like other startup failures.
    pub fn parse_args_from<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::try_parse_from(args).map_err(|e| {
            if !e.use_stderr() {
                e.exit();
            }
            let _ = e.print();
            DbError::config("invalid command-line arguments")
        })
    }

    /// Returns the DSN, printing usage to stderr when it is missing or blank.
    pub fn require_dsn(&self) -> Result<&str> {
        match self.dsn.as_deref().map(str::trim) {
            Some(dsn) if !dsn.is_empty() => Ok(dsn),
            _ => {
                eprintln!("{}", Self::command().render_usage());
                Err(DbError::config("required: --dsn"))
            }
        }
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Applies command-line overrides on top of the loaded file config.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(addr) = &self.addr {
            config.server.addr = addr.clone();
        }
    }
}
