//! Error types for personaldb.
//!
//! Defines the main error enum used throughout the application.

use thiserror::Error;

/// Main error type for personaldb operations.
#[derive(Error, Debug)]
pub enum DbError {
    /// Configuration errors (missing DSN, unreadable config file, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Opening the database or acquiring a pooled connection failed.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The engine refused to prepare a statement during classification.
    #[error("Prepare error: {0}")]
    Prepare(String),

    /// Query or mutation execution errors (constraint violations, missing tables, etc.)
    #[error("Query error: {0}")]
    Query(String),

    /// Writing output or binding the listener failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a prepare error with the given message.
    pub fn prepare(msg: impl Into<String>) -> Self {
        Self::Prepare(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates an I/O error with the given message.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "Configuration Error",
            Self::Connection(_) => "Connection Error",
            Self::Prepare(_) => "Prepare Error",
            Self::Query(_) => "Query Error",
            Self::Io(_) => "I/O Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

impl From<std::io::Error> for DbError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

/// Result type alias using DbError.
pub type Result<T> = std::result::Result<T, DbError>;
