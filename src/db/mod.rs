//! Database handle for personaldb.
//!
//! Wraps the shared SQLite pool that every request borrows from. The handle
//! is constructed once at startup and passed down explicitly.

mod types;

pub use types::{render_line, Cell, MutationSummary};

use crate::config::DatabaseConfig;
use crate::error::{DbError, Result};
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Sqlite;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// How long a request waits for a pooled connection.
const ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// Shared handle to the embedded database.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the database named by `dsn`, creating the file if needed.
    ///
    /// `dsn` is either a `sqlite:` URL or a plain filesystem path.
    pub async fn open(dsn: &str, config: &DatabaseConfig) -> Result<Self> {
        let options = connect_options(dsn)?.busy_timeout(config.busy_timeout());

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .acquire_timeout(Duration::from_secs(ACQUIRE_TIMEOUT_SECS))
            .connect_with(options)
            .await
            .map_err(|e| DbError::connection(format!("Failed to open {dsn}: {e}")))?;

        info!("Database opened: {dsn}");
        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Checks out a dedicated connection; it returns to the pool on drop.
    pub async fn acquire(&self) -> Result<PoolConnection<Sqlite>> {
        debug!("Acquiring connection");
        self.pool
            .acquire()
            .await
            .map_err(|e| DbError::connection(format!("Failed to acquire connection: {e}")))
    }

    /// Closes the connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn connect_options(dsn: &str) -> Result<SqliteConnectOptions> {
    if dsn.starts_with("sqlite:") {
        return SqliteConnectOptions::from_str(dsn)
            .map_err(|e| DbError::config(format!("Invalid DSN '{dsn}': {e}")));
    }

    Ok(SqliteConnectOptions::new()
        .filename(dsn)
        .create_if_missing(true))
}
