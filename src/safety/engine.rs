//! Engine-native classification.
//!
//! Prepares the statement on a dedicated SQLite connection and asks the
//! engine whether the compiled program writes to the database. Nothing is
//! executed.

use std::ffi::CStr;
use std::os::raw::{c_char, c_int};
use std::ptr::{self, NonNull};

use async_trait::async_trait;
use libsqlite3_sys::{
    sqlite3, sqlite3_errmsg, sqlite3_finalize, sqlite3_prepare_v2, sqlite3_stmt,
    sqlite3_stmt_readonly, SQLITE_OK,
};
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::debug;

use crate::db::Database;
use crate::error::{DbError, Result};

use super::StatementClassifier;

/// Classifier backed by `sqlite3_stmt_readonly`.
#[derive(Debug, Clone)]
pub struct SqliteClassifier {
    db: Database,
}

impl SqliteClassifier {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StatementClassifier for SqliteClassifier {
    async fn is_read_only(&self, sql: &str) -> Result<bool> {
        let mut conn = self.db.acquire().await?;
        let mut handle = conn
            .lock_handle()
            .await
            .map_err(|e| DbError::connection(format!("Failed to lock connection: {e}")))?;

        // The busy handler may sleep inside prepare while another
        // connection holds a write lock.
        let read_only = run_blocking(|| prepare_read_only(handle.as_raw_handle(), sql));
        drop(handle);

        debug!(?read_only, "classified statement");
        read_only
    }

    fn name(&self) -> &'static str {
        "engine"
    }
}

/// Runs `f` without stalling other tasks on a multi-threaded runtime.
///
/// `block_in_place` is unavailable on the current-thread runtime, where `f`
/// simply runs inline.
fn run_blocking<R>(f: impl FnOnce() -> R) -> R {
    match Handle::try_current().map(|h| h.runtime_flavor()) {
        Ok(RuntimeFlavor::MultiThread) => tokio::task::block_in_place(f),
        _ => f(),
    }
}

/// Owns a prepared statement and finalizes it on drop.
struct PreparedStatement(*mut sqlite3_stmt);

impl Drop for PreparedStatement {
    fn drop(&mut self) {
        // Finalizing a null pointer is a no-op.
        unsafe {
            sqlite3_finalize(self.0);
        }
    }
}

/// Prepares `sql` on `db` and reports the statement's read-only flag.
///
/// Text that compiles to no statement (empty, whitespace, comments) is
/// read-only: there is nothing to run.
fn prepare_read_only(db: NonNull<sqlite3>, sql: &str) -> Result<bool> {
    let len = c_int::try_from(sql.len())
        .map_err(|_| DbError::prepare("statement too long to prepare"))?;

    let mut raw: *mut sqlite3_stmt = ptr::null_mut();
    // SAFETY: `db` is a live handle held under the connection lock for the
    // duration of this call, and the pointer/length pair describes `sql`.
    let rc = unsafe {
        sqlite3_prepare_v2(
            db.as_ptr(),
            sql.as_ptr().cast::<c_char>(),
            len,
            &mut raw,
            ptr::null_mut(),
        )
    };
    let stmt = PreparedStatement(raw);

    if rc != SQLITE_OK {
        return Err(DbError::prepare(last_error_message(db)));
    }

    if stmt.0.is_null() {
        return Ok(true);
    }

    // SAFETY: `stmt.0` is a non-null statement prepared on `db` above.
    let read_only = unsafe { sqlite3_stmt_readonly(stmt.0) } != 0;
    Ok(read_only)
}

fn last_error_message(db: NonNull<sqlite3>) -> String {
    // SAFETY: sqlite3_errmsg always returns a valid NUL-terminated string
    // owned by the connection.
    unsafe { CStr::from_ptr(sqlite3_errmsg(db.as_ptr())) }
        .to_string_lossy()
        .into_owned()
}
