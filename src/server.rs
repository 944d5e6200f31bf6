//! HTTP front end.
//!
//! Exposes `/query` on top of the [`Dispatcher`]. Every other path is a 404.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::error::{DbError, Result};
use crate::query::Dispatcher;

/// Builds the router. The method is not checked.
pub fn router(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        .route("/query", any(query_handler))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(dispatcher)
}

/// Binds `addr` and returns the listener.
pub async fn bind(addr: SocketAddr) -> Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .map_err(|e| DbError::io(format!("Failed to bind {addr}: {e}")))
}

/// Serves requests until `shutdown` is cancelled, then waits for in-flight
/// requests to finish.
pub async fn serve(
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
    shutdown: CancellationToken,
) -> Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("listening on {addr}");
    }

    axum::serve(listener, router(dispatcher))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| DbError::io(format!("Server error: {e}")))
}

/// Runs the body as a batch.
///
/// The whole response is rendered into memory before the status is sent, so
/// a statement failing late in the batch still turns into a 500 with the
/// error text. Rows are still read one at a time from the engine, but memory
/// use grows with the size of the result.
async fn query_handler(State(dispatcher): State<Arc<Dispatcher>>, body: Bytes) -> Response {
    let sql = match std::str::from_utf8(&body) {
        Ok(sql) => sql,
        Err(e) => {
            return error_response(DbError::query(format!("request body is not UTF-8: {e}")));
        }
    };

    let mut out = Vec::new();
    match dispatcher.handle_batch(sql, &mut out).await {
        Ok(_) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            out,
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

fn error_response(e: DbError) -> Response {
    warn!("{}: {}", e.category(), e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        format!("{e}\n"),
    )
        .into_response()
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "not found\n")
}
