//! personaldb - run batches of SQL against an embedded SQLite database over HTTP.

use std::sync::Arc;

use personaldb::cli::Cli;
use personaldb::config::Config;
use personaldb::db::Database;
use personaldb::error::{DbError, Result};
use personaldb::logging;
use personaldb::query::Dispatcher;
use personaldb::safety::classifier_for;
use personaldb::server;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    logging::init_stderr_logging();

    if let Err(e) = run().await {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse_args()?;
    let dsn = cli.require_dsn()?;

    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let mut config = Config::load_from_file(&config_path)?;
    cli.apply_overrides(&mut config);
    let addr = config.server.socket_addr()?;

    let db = Database::open(dsn, &config.database).await?;
    let classifier = classifier_for(config.database.classifier, &db);
    info!("Using {} classifier", classifier.name());
    let dispatcher = Arc::new(Dispatcher::new(db.clone(), classifier));

    let shutdown = CancellationToken::new();
    tokio::spawn(watch_signals(shutdown.clone()));

    let listener = server::bind(addr).await?;
    server::serve(listener, dispatcher, shutdown).await?;

    db.close().await;
    Ok(())
}

/// Cancels `shutdown` on SIGTERM or Ctrl-C.
async fn watch_signals(shutdown: CancellationToken) {
    match wait_for_signal().await {
        Ok(()) => {
            info!("received signal, shutting down");
            shutdown.cancel();
        }
        Err(e) => error!("{}: {}", e.category(), e),
    }
}

#[cfg(unix)]
async fn wait_for_signal() -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = signal(SignalKind::terminate())
        .map_err(|e| DbError::internal(format!("Failed to install SIGTERM handler: {e}")))?;

    tokio::select! {
        _ = term.recv() => Ok(()),
        res = tokio::signal::ctrl_c() => res.map_err(DbError::from),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> Result<()> {
    tokio::signal::ctrl_c().await.map_err(DbError::from)
}
