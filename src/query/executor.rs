//! Batch dispatch with read-only classification.
//!
//! Each statement is classified, then routed to either the row-streaming
//! query path or the mutation path. Output is written to the sink as soon as
//! it is produced, in statement order.

use std::sync::Arc;

use futures::TryStreamExt;
use sqlx::{Column, Executor, Row, Statement};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::db::{render_line, Cell, Database, MutationSummary};
use crate::error::{DbError, Result};
use crate::safety::StatementClassifier;

use super::batch::{split_batch, BatchSummary, Route};

/// Routes statements from a batch to the matching execution path.
pub struct Dispatcher {
    db: Database,
    classifier: Arc<dyn StatementClassifier>,
}

impl Dispatcher {
    /// Creates a dispatcher over a shared database handle.
    pub fn new(db: Database, classifier: Arc<dyn StatementClassifier>) -> Self {
        Self { db, classifier }
    }

    /// Runs every statement in `body` and writes the rendered output to `sink`.
    ///
    /// Stops at the first failing statement. Mutations that already ran stay
    /// applied, and whatever was written to `sink` before the failure stays
    /// written.
    pub async fn handle_batch<W>(&self, body: &str, sink: &mut W) -> Result<BatchSummary>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let mut summary = BatchSummary::default();

        for (index, sql) in split_batch(body).into_iter().enumerate() {
            let route = match self.dispatch(sql, sink, &mut summary).await {
                Ok(route) => route,
                Err(e) => {
                    warn!(index, classifier = self.classifier.name(), "batch aborted: {e}");
                    return Err(e);
                }
            };
            debug!(index, ?route, "statement done");
            summary.record(route);
        }

        sink.flush().await?;
        info!(
            statements = summary.statements,
            queries = summary.queries,
            mutations = summary.mutations,
            rows = summary.rows,
            "batch complete"
        );
        Ok(summary)
    }

    /// Classifies one statement, then runs it. Classification finishes and
    /// releases its connection before execution starts.
    async fn dispatch<W>(
        &self,
        sql: &str,
        sink: &mut W,
        summary: &mut BatchSummary,
    ) -> Result<Route>
    where
        W: AsyncWrite + Unpin + Send,
    {
        if self.classifier.is_read_only(sql).await? {
            summary.rows += self.run_query(sql, sink).await?;
            Ok(Route::Query)
        } else {
            self.run_mutation(sql, sink).await?;
            Ok(Route::Mutation)
        }
    }

    /// Streams a read-only statement's rows to the sink. Returns the number
    /// of data rows written.
    ///
    /// Blank text has no columns and nothing to run, so it writes nothing.
    async fn run_query<W>(&self, sql: &str, sink: &mut W) -> Result<usize>
    where
        W: AsyncWrite + Unpin + Send,
    {
        if sql.trim().is_empty() {
            return Ok(0);
        }

        let mut conn = self.db.acquire().await?;
        let statement = (&mut *conn).prepare(sql).await.map_err(query_error)?;
        let columns: Vec<String> = statement
            .columns()
            .iter()
            .map(|col| col.name().to_string())
            .collect();

        if !columns.is_empty() {
            sink.write_all(render_line(&columns).as_bytes()).await?;
        }

        // Drained even when there are no columns so the statement still runs.
        let mut rows = statement.query().fetch(&mut *conn);
        let mut written = 0;
        while let Some(row) = rows.try_next().await.map_err(query_error)? {
            if columns.is_empty() {
                continue;
            }
            let cells = (0..columns.len())
                .map(|i| row.try_get_unchecked::<Option<Vec<u8>>, _>(i).map(Cell::from))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(query_error)?;
            sink.write_all(render_line(&cells).as_bytes()).await?;
            written += 1;
        }

        Ok(written)
    }

    /// Executes a mutating statement and writes its summary line.
    async fn run_mutation<W>(&self, sql: &str, sink: &mut W) -> Result<()>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let result = sqlx::query(sql)
            .execute(self.db.pool())
            .await
            .map_err(query_error)?;

        let summary = MutationSummary {
            rows_affected: result.rows_affected(),
            last_insert_rowid: result.last_insert_rowid(),
        };
        sink.write_all(summary.to_line().as_bytes()).await?;
        Ok(())
    }
}

fn query_error(e: sqlx::Error) -> DbError {
    DbError::query(e.to_string())
}
